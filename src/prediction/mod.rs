pub mod orchestrator;
pub mod types;

pub use orchestrator::{PredictionOrchestrator, BLOCKS_PER_MODEL, BLOCK_SIZE};
pub use types::{
    ConsensusEntry, ModelReport, ModelResult, OutcomeWindow, PredictionResponse, Segment,
};
