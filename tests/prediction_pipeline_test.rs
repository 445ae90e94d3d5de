use anyhow::{anyhow, Result};
use async_trait::async_trait;
use roulette_block_predictor::ai::{
    consensus, ConsensusAggregator, EncodingScheme, FeatureEncoder, FeatureVector, ModelRoster,
    ProbabilityModel,
};
use roulette_block_predictor::prediction::{ModelResult, PredictionOrchestrator, Segment};
use roulette_block_predictor::wheel::{BlockScorer, WheelTopology, POCKETS};
use roulette_block_predictor::PredictionError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Puts all mass on the given pockets, equally.
struct FixedModel {
    pockets: Vec<usize>,
    calls: AtomicUsize,
}

impl FixedModel {
    fn new(pockets: &[usize]) -> Arc<Self> {
        Arc::new(Self {
            pockets: pockets.to_vec(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ProbabilityModel for FixedModel {
    async fn predict_probabilities(&self, _features: &FeatureVector) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut probabilities = vec![0.0; POCKETS];
        for &pocket in &self.pockets {
            probabilities[pocket] = 1.0 / self.pockets.len() as f32;
        }
        Ok(probabilities)
    }
}

struct BrokenModel;

#[async_trait]
impl ProbabilityModel for BrokenModel {
    async fn predict_probabilities(&self, _features: &FeatureVector) -> Result<Vec<f32>> {
        Err(anyhow!("predict_proba raised ValueError"))
    }
}

fn orchestrator(roster: ModelRoster, min_votes: usize, max_output: usize) -> PredictionOrchestrator {
    let wheel = Arc::new(WheelTopology::european());
    PredictionOrchestrator::new(
        wheel.clone(),
        FeatureEncoder::new(EncodingScheme::DirectIdentity, wheel),
        Arc::new(roster),
        ConsensusAggregator::new(min_votes, max_output),
    )
}

#[tokio::test]
async fn four_models_agreeing_on_17_reach_consensus() {
    let roster = ModelRoster::new()
        .with_model("logistic_regression", FixedModel::new(&[17]))
        .with_model("random_forest", FixedModel::new(&[17, 34]))
        .with_model("lightgbm", FixedModel::new(&[25, 17]))
        .with_model("catboost", FixedModel::new(&[17, 6]));

    let response = orchestrator(roster, 4, 10)
        .predict(&[3, 26, 0, 32, 15])
        .await
        .unwrap();

    assert!(response.consensus_predictions.contains(&17));
    let seventeen = response
        .consensus_votes
        .iter()
        .find(|entry| entry.number == 17)
        .unwrap();
    assert_eq!(seventeen.votes, 4);
}

#[tokio::test]
async fn three_of_four_is_not_enough() {
    let roster = ModelRoster::new()
        .with_model("logistic_regression", FixedModel::new(&[17]))
        .with_model("random_forest", FixedModel::new(&[17]))
        .with_model("lightgbm", FixedModel::new(&[17]))
        .with_model("catboost", FixedModel::new(&[0]));

    let response = orchestrator(roster, 4, 10)
        .predict(&[1, 1, 1, 1, 1])
        .await
        .unwrap();

    assert!(!response.consensus_predictions.contains(&17));
}

#[tokio::test]
async fn unavailable_model_does_not_lower_quorum() {
    let roster = ModelRoster::new()
        .with_unavailable("logistic_regression", "bucket unreachable")
        .with_model("random_forest", FixedModel::new(&[9]))
        .with_model("lightgbm", FixedModel::new(&[9]))
        .with_model("catboost", FixedModel::new(&[9]));

    let response = orchestrator(roster, 4, 10)
        .predict(&[9, 22, 18, 29, 7])
        .await
        .unwrap();

    assert!(response.consensus_predictions.is_empty());
    assert!(matches!(
        response.result_for("logistic_regression"),
        Some(ModelResult::Unavailable { .. })
    ));
    for entry in &response.consensus_votes {
        assert!(entry.votes <= 3);
    }
}

#[tokio::test]
async fn failing_model_is_reported_and_others_still_answer() {
    let healthy = FixedModel::new(&[0]);
    let roster = ModelRoster::new()
        .with_model("lightgbm", Arc::new(BrokenModel))
        .with_model("catboost", healthy.clone());

    let response = orchestrator(roster, 1, 5)
        .predict(&[0, 0, 0, 0, 0])
        .await
        .unwrap();

    match response.result_for("lightgbm") {
        Some(ModelResult::Error { message }) => assert!(message.contains("ValueError")),
        other => panic!("unexpected result {:?}", other),
    }
    let blocks = response.result_for("catboost").unwrap().blocks().unwrap();
    assert_eq!(blocks[0], Segment(vec![0, 32, 15, 19, 4]));
    assert_eq!(response.consensus_predictions.len(), 5);
    assert_eq!(healthy.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_window_is_rejected_before_any_model_runs() {
    let model = FixedModel::new(&[1]);
    let service = orchestrator(ModelRoster::new().with_model("lightgbm", model.clone()), 1, 5);

    assert_eq!(
        service.predict(&[1, 2, 3, 4, 5, 6]).await.unwrap_err(),
        PredictionError::InvalidWindow(6)
    );
    assert_eq!(
        service.predict(&[]).await.unwrap_err(),
        PredictionError::InvalidWindow(0)
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn out_of_range_values_are_tolerated() {
    let service = orchestrator(
        ModelRoster::new().with_model("lightgbm", FixedModel::new(&[5])),
        1,
        5,
    );
    let response = service.predict(&[37, -4, 99, 5, 10]).await.unwrap();
    assert!(response.result_for("lightgbm").unwrap().blocks().is_some());
}

#[test]
fn single_pocket_mass_selects_the_window_starting_at_zero() {
    let wheel = WheelTopology::european();
    let mut probabilities = vec![0.0; POCKETS];
    probabilities[0] = 1.0;

    let top = BlockScorer::new(&wheel).top_segments(&probabilities, 1, 5);
    assert_eq!(top, vec![Segment(vec![0, 32, 15, 19, 4])]);
}

#[test]
fn consensus_output_is_bounded_distinct_and_ordered() {
    let results = vec![
        ModelResult::Ok {
            blocks: vec![Segment(vec![1, 2, 3, 4, 5]), Segment(vec![3, 4, 5, 6, 7])],
        },
        ModelResult::Ok {
            blocks: vec![Segment(vec![5, 6, 7, 8, 9])],
        },
        ModelResult::Error {
            message: "boom".to_string(),
        },
    ];

    let numbers = consensus(&results, 1, 6);
    assert_eq!(numbers, vec![5, 6, 7, 1, 2, 3]);

    let mut deduped = numbers.clone();
    deduped.dedup();
    assert_eq!(deduped, numbers);
}
