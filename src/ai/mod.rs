pub mod consensus;
pub mod features;
pub mod model;
pub mod onnx;
pub mod roster;

pub use consensus::{consensus, tally, ConsensusAggregator};
pub use features::{EncodingScheme, FeatureEncoder, FeatureVector, FEATURE_LEN};
pub use model::ProbabilityModel;
pub use onnx::OnnxClassifier;
pub use roster::{ModelHandle, ModelRoster, RosterEntry};
