pub mod blocks;
pub mod topology;

pub use blocks::{BlockScorer, ScoredSegment};
pub use topology::{WheelTopology, EUROPEAN_SEQUENCE, POCKETS};
