use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Prometheus collectors for the prediction service, on a private registry.
#[derive(Clone)]
pub struct PredictionMetrics {
    registry: Registry,
    requests: IntCounter,
    rejected: IntCounter,
    model_outcomes: IntCounterVec,
    request_duration: Histogram,
    consensus_size: Histogram,
}

impl PredictionMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests = IntCounter::new("predictor_requests_total", "Prediction requests accepted")?;
        let rejected = IntCounter::new(
            "predictor_rejected_requests_total",
            "Prediction requests rejected as malformed",
        )?;
        let model_outcomes = IntCounterVec::new(
            Opts::new(
                "predictor_model_outcomes_total",
                "Per-model results by outcome",
            ),
            &["model", "outcome"],
        )?;
        let request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "predictor_request_duration_seconds",
                "Time spent producing a prediction",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        )?;
        let consensus_size = Histogram::with_opts(
            HistogramOpts::new(
                "predictor_consensus_size",
                "Numbers returned in the consensus list",
            )
            .buckets(vec![0.0, 1.0, 2.0, 4.0, 6.0, 8.0, 10.0, 15.0, 20.0]),
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(rejected.clone()))?;
        registry.register(Box::new(model_outcomes.clone()))?;
        registry.register(Box::new(request_duration.clone()))?;
        registry.register(Box::new(consensus_size.clone()))?;

        Ok(Self {
            registry,
            requests,
            rejected,
            model_outcomes,
            request_duration,
            consensus_size,
        })
    }

    pub fn record_request(&self) {
        self.requests.inc();
    }

    pub fn record_rejected(&self) {
        self.rejected.inc();
    }

    pub fn record_model_outcome(&self, model: &str, outcome: &str) {
        self.model_outcomes.with_label_values(&[model, outcome]).inc();
    }

    pub fn observe_request(&self, elapsed: Duration, consensus_len: usize) {
        self.request_duration.observe(elapsed.as_secs_f64());
        self.consensus_size.observe(consensus_len as f64);
    }

    pub fn requests_total(&self) -> u64 {
        self.requests.get()
    }

    pub fn rejected_total(&self) -> u64 {
        self.rejected.get()
    }

    pub fn model_outcome_total(&self, model: &str, outcome: &str) -> u64 {
        self.model_outcomes.with_label_values(&[model, outcome]).get()
    }

    /// Text exposition format, served on `/metrics`.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
