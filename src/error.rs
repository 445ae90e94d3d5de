use thiserror::Error;

/// Rejections surfaced to the caller. A request that fails here is never
/// partially processed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictionError {
    #[error("field \"last_5_numbers\" is required in the JSON payload")]
    MissingField,

    #[error("\"last_5_numbers\" must be a list of 5 numbers (got {0})")]
    InvalidWindow(usize),

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Failure of a single model for a single request. Contained by the
/// orchestrator and reported inline, never propagated.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model unavailable: {0}")]
    Unavailable(String),

    #[error("prediction timed out after {0} ms")]
    Timeout(u64),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("prediction failed: {0}")]
    Inference(#[from] anyhow::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("wheel sequence must hold {expected} pockets, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    #[error("pocket {0} is outside 0..=36")]
    OutOfRange(u8),

    #[error("pocket {0} appears more than once on the wheel")]
    Duplicate(u8),
}
