//! Next-outcome roulette predictions served as blocks of adjacent pockets.
//!
//! Recent outcomes are encoded into a feature vector, scored by every model
//! in a fixed roster, turned into the best-scoring wheel segments per model
//! and merged into a cross-model consensus list.

pub mod ai;
pub mod api;
pub mod core;
pub mod error;
pub mod prediction;
pub mod wheel;

pub use error::{ModelError, PredictionError, TopologyError};
pub use prediction::{PredictionOrchestrator, PredictionResponse};
