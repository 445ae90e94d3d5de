use anyhow::Result;
use async_trait::async_trait;

use super::features::FeatureVector;

/// A trained classifier scoring every pocket as the next outcome.
///
/// Index `i` of the returned vector is the score for pocket `i`. Scores do
/// not need to sum to one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProbabilityModel: Send + Sync {
    async fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f32>>;
}
