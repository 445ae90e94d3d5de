use serde::{Deserialize, Serialize};

use crate::error::PredictionError;

pub const WINDOW_FIELD: &str = "last_5_numbers";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub last_5_numbers: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&PredictionError> for ErrorResponse {
    fn from(e: &PredictionError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

impl PredictRequest {
    /// Parses a raw body, telling apart a missing field from a field of the
    /// wrong shape. Arity is checked later, by the orchestrator.
    pub fn parse(body: &[u8]) -> Result<Self, PredictionError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|_| PredictionError::Malformed("body is not valid JSON".to_string()))?;

        let field = value.get(WINDOW_FIELD).ok_or(PredictionError::MissingField)?;
        let items = field.as_array().ok_or_else(|| {
            PredictionError::Malformed(format!("\"{}\" must be a list of 5 numbers", WINDOW_FIELD))
        })?;

        let last_5_numbers = items
            .iter()
            .map(|item| {
                item.as_i64().ok_or_else(|| {
                    PredictionError::Malformed(format!(
                        "\"{}\" must contain integers, got {}",
                        WINDOW_FIELD, item
                    ))
                })
            })
            .collect::<Result<Vec<i64>, _>>()?;

        Ok(Self { last_5_numbers })
    }
}
