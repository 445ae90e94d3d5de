use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;
use uuid::Uuid;

use super::types::{ModelReport, ModelResult, OutcomeWindow, PredictionResponse};
use crate::ai::consensus::ConsensusAggregator;
use crate::ai::features::{FeatureEncoder, FeatureVector};
use crate::ai::roster::{ModelHandle, ModelRoster, RosterEntry};
use crate::core::{Config, PredictionMetrics};
use crate::error::{ModelError, PredictionError};
use crate::wheel::blocks::BlockScorer;
use crate::wheel::topology::{WheelTopology, POCKETS};

/// Blocks reported per model.
pub const BLOCKS_PER_MODEL: usize = 3;
/// Pockets per block.
pub const BLOCK_SIZE: usize = 5;

/// Runs one request end to end: encode, score every model, vote.
///
/// Holds no per-request state; a single instance serves all requests
/// concurrently.
pub struct PredictionOrchestrator {
    wheel: Arc<WheelTopology>,
    encoder: FeatureEncoder,
    roster: Arc<ModelRoster>,
    aggregator: ConsensusAggregator,
    model_timeout: Option<Duration>,
    metrics: Option<PredictionMetrics>,
}

impl PredictionOrchestrator {
    pub fn new(
        wheel: Arc<WheelTopology>,
        encoder: FeatureEncoder,
        roster: Arc<ModelRoster>,
        aggregator: ConsensusAggregator,
    ) -> Self {
        Self {
            wheel,
            encoder,
            roster,
            aggregator,
            model_timeout: None,
            metrics: None,
        }
    }

    pub fn from_config(config: &Config, roster: Arc<ModelRoster>) -> Self {
        let wheel = Arc::new(WheelTopology::european());
        let encoder = FeatureEncoder::new(config.prediction.encoding, wheel.clone());
        let aggregator = ConsensusAggregator::new(
            config.prediction.min_votes,
            config.prediction.max_consensus,
        );

        let orchestrator = Self::new(wheel, encoder, roster, aggregator);
        if config.models.timeout_ms > 0 {
            orchestrator.with_model_timeout(Duration::from_millis(config.models.timeout_ms))
        } else {
            orchestrator
        }
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model_timeout = Some(timeout);
        self
    }

    pub fn with_metrics(mut self, metrics: PredictionMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn metrics(&self) -> Option<&PredictionMetrics> {
        self.metrics.as_ref()
    }

    pub fn roster(&self) -> &ModelRoster {
        &self.roster
    }

    /// Validates the window and predicts. Only malformed input fails;
    /// model failures are reported inside the response.
    pub async fn predict(&self, last_numbers: &[i64]) -> Result<PredictionResponse, PredictionError> {
        let window = match OutcomeWindow::new(last_numbers) {
            Ok(window) => window,
            Err(e) => {
                tracing::error!("❌ Rejected request: {}", e);
                if let Some(metrics) = &self.metrics {
                    metrics.record_rejected();
                }
                return Err(e);
            }
        };

        Ok(self.predict_window(window).await)
    }

    pub async fn predict_window(&self, window: OutcomeWindow) -> PredictionResponse {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("predict", %request_id);
        self.run(request_id, window).instrument(span).await
    }

    async fn run(&self, request_id: Uuid, window: OutcomeWindow) -> PredictionResponse {
        let started = Instant::now();
        if let Some(metrics) = &self.metrics {
            metrics.record_request();
        }

        tracing::info!("🎲 Received last numbers: {:?}", window.outcomes());
        let ignored = window.out_of_range();
        if !ignored.is_empty() {
            tracing::warn!("⚠️  Ignoring out-of-range values {:?} during encoding", ignored);
        }

        let features = self.encoder.encode(&window);

        let models: Vec<ModelReport> = join_all(
            self.roster
                .entries()
                .iter()
                .map(|entry| self.run_model(entry, &features)),
        )
        .await;

        let votes = self
            .aggregator
            .aggregate(models.iter().map(|report| &report.result));
        let consensus: Vec<u8> = votes.iter().map(|entry| entry.number).collect();

        tracing::info!(
            "🤝 Consensus (min_votes={}): {:?}",
            self.aggregator.min_votes(),
            consensus
        );

        if let Some(metrics) = &self.metrics {
            metrics.observe_request(started.elapsed(), consensus.len());
        }

        PredictionResponse {
            request_id,
            generated_at: chrono::Utc::now(),
            encoding: self.encoder.scheme(),
            models,
            consensus_predictions: consensus,
            consensus_votes: votes,
        }
    }

    async fn run_model(&self, entry: &RosterEntry, features: &FeatureVector) -> ModelReport {
        let result = match self.invoke(entry, features).await {
            Ok(probabilities) => {
                let blocks = BlockScorer::new(&self.wheel).top_segments(
                    &probabilities,
                    BLOCKS_PER_MODEL,
                    BLOCK_SIZE,
                );
                tracing::info!(
                    "📊 {} blocks: {}",
                    entry.id,
                    blocks
                        .iter()
                        .map(|b| b.to_string())
                        .collect::<Vec<_>>()
                        .join(" ")
                );
                ModelResult::Ok { blocks }
            }
            Err(ModelError::Unavailable(reason)) => {
                tracing::warn!("⚠️  Model {} unavailable, skipped", entry.id);
                ModelResult::Unavailable { reason }
            }
            Err(e) => {
                tracing::error!("❌ Prediction failed for {}: {}", entry.id, e);
                ModelResult::Error {
                    message: e.to_string(),
                }
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_model_outcome(&entry.id, result.outcome_label());
        }

        ModelReport {
            model: entry.id.clone(),
            result,
        }
    }

    async fn invoke(&self, entry: &RosterEntry, features: &FeatureVector) -> Result<Vec<f32>, ModelError> {
        let model = match &entry.handle {
            ModelHandle::Loaded(model) => model,
            ModelHandle::Unavailable { reason } => {
                return Err(ModelError::Unavailable(reason.clone()))
            }
        };

        let call = model.predict_probabilities(features);
        let probabilities = match self.model_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ModelError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX)))??,
            None => call.await?,
        };

        validate_probabilities(probabilities)
    }
}

/// A usable output holds one finite, non-negative score per pocket.
fn validate_probabilities(probabilities: Vec<f32>) -> Result<Vec<f32>, ModelError> {
    if probabilities.len() != POCKETS {
        return Err(ModelError::InvalidOutput(format!(
            "expected {} scores, got {}",
            POCKETS,
            probabilities.len()
        )));
    }
    if let Some(bad) = probabilities.iter().find(|p| !p.is_finite() || **p < 0.0) {
        return Err(ModelError::InvalidOutput(format!("score {} is not a probability", bad)));
    }
    Ok(probabilities)
}
