use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::ai::features::EncodingScheme;
use crate::error::PredictionError;

/// Number of most recent outcomes a request carries.
pub const WINDOW_SIZE: usize = 5;

/// The last five observed outcomes, oldest first.
///
/// Arity is validated on construction. Individual values are kept as sent:
/// values outside `0..=36` are tolerated here and contribute nothing to the
/// encoded features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutcomeWindow([i64; WINDOW_SIZE]);

impl OutcomeWindow {
    pub fn new(values: &[i64]) -> Result<Self, PredictionError> {
        let outcomes: [i64; WINDOW_SIZE] = values
            .try_into()
            .map_err(|_| PredictionError::InvalidWindow(values.len()))?;
        Ok(Self(outcomes))
    }

    pub fn outcomes(&self) -> &[i64; WINDOW_SIZE] {
        &self.0
    }

    /// Values that do not name a pocket and will be ignored by the encoder.
    pub fn out_of_range(&self) -> Vec<i64> {
        self.0
            .iter()
            .copied()
            .filter(|n| !(0..=36).contains(n))
            .collect()
    }
}

impl TryFrom<Vec<i64>> for OutcomeWindow {
    type Error = PredictionError;

    fn try_from(values: Vec<i64>) -> Result<Self, Self::Error> {
        Self::new(&values)
    }
}

/// Five physically adjacent pockets, in wheel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segment(pub Vec<u8>);

impl Segment {
    pub fn numbers(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Outcome of one model for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelResult {
    Ok { blocks: Vec<Segment> },
    Unavailable { reason: String },
    Error { message: String },
}

impl ModelResult {
    pub fn blocks(&self) -> Option<&[Segment]> {
        match self {
            ModelResult::Ok { blocks } => Some(blocks),
            _ => None,
        }
    }

    pub fn outcome_label(&self) -> &'static str {
        match self {
            ModelResult::Ok { .. } => "ok",
            ModelResult::Unavailable { .. } => "unavailable",
            ModelResult::Error { .. } => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelReport {
    pub model: String,
    #[serde(flatten)]
    pub result: ModelResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ConsensusEntry {
    pub number: u8,
    pub votes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub encoding: EncodingScheme,
    /// One report per roster entry, in roster order.
    pub models: Vec<ModelReport>,
    pub consensus_predictions: Vec<u8>,
    pub consensus_votes: Vec<ConsensusEntry>,
}

impl PredictionResponse {
    pub fn result_for(&self, model: &str) -> Option<&ModelResult> {
        self.models
            .iter()
            .find(|report| report.model == model)
            .map(|report| &report.result)
    }
}
