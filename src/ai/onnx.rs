use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, CowArray};
use ort::{Environment, GraphOptimizationLevel, LoggingLevel, Session, SessionBuilder, Value};
use std::path::Path;
use std::sync::Arc;

use super::features::FeatureVector;
use super::model::ProbabilityModel;
use crate::wheel::topology::POCKETS;

/// Shared ONNX Runtime environment, created once per process.
pub fn build_environment() -> Result<Arc<Environment>> {
    let environment = Environment::builder()
        .with_name("roulette-block-predictor")
        .with_log_level(LoggingLevel::Warning)
        .build()?
        .into_arc();
    Ok(environment)
}

/// Classifier exported to ONNX (sklearn, LightGBM and CatBoost exporters
/// all produce `[label, probabilities]` outputs).
pub struct OnnxClassifier {
    session: Arc<Session>,
    probabilities_output: usize,
}

impl OnnxClassifier {
    pub fn load(
        environment: &Arc<Environment>,
        path: impl AsRef<Path>,
        probabilities_output: usize,
    ) -> Result<Self> {
        let path = path.as_ref();
        let session = SessionBuilder::new(environment)?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(1)?
            .with_model_from_file(path)
            .with_context(|| format!("failed to load ONNX model {}", path.display()))?;

        if probabilities_output >= session.outputs.len() {
            return Err(anyhow!(
                "model {} has {} outputs, probabilities expected at index {}",
                path.display(),
                session.outputs.len(),
                probabilities_output
            ));
        }

        Ok(Self {
            session: Arc::new(session),
            probabilities_output,
        })
    }

    fn infer(session: &Session, probabilities_output: usize, features: Vec<f32>) -> Result<Vec<f32>> {
        let input = CowArray::from(Array2::from_shape_vec((1, features.len()), features)?).into_dyn();
        let tensor = Value::from_array(session.allocator(), &input)?;

        let outputs = session.run(vec![tensor])?;
        let output = outputs
            .get(probabilities_output)
            .ok_or_else(|| anyhow!("missing output {}", probabilities_output))?;

        let extracted = output.try_extract::<f32>()?;
        let probabilities: Vec<f32> = extracted.view().iter().copied().take(POCKETS).collect();
        Ok(probabilities)
    }
}

#[async_trait]
impl ProbabilityModel for OnnxClassifier {
    async fn predict_probabilities(&self, features: &FeatureVector) -> Result<Vec<f32>> {
        let session = self.session.clone();
        let probabilities_output = self.probabilities_output;
        let features = features.as_slice().to_vec();
        run_blocking(move || Self::infer(&session, probabilities_output, features)).await
    }
}

/// Runs CPU-bound inference on the blocking pool.
pub(crate) async fn run_blocking<F>(work: F) -> Result<Vec<f32>>
where
    F: FnOnce() -> Result<Vec<f32>> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .context("inference task did not complete")?
}
