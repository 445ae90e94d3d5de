
use super::topology::{WheelTopology, POCKETS};
use crate::prediction::types::Segment;

/// A candidate span with its aggregate probability mass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSegment {
    pub start: usize,
    pub numbers: Vec<u8>,
    pub score: f32,
}

/// Ranks every circular span of the wheel by summed probability.
#[derive(Debug, Clone)]
pub struct BlockScorer<'a> {
    wheel: &'a WheelTopology,
}

impl<'a> BlockScorer<'a> {
    pub fn new(wheel: &'a WheelTopology) -> Self {
        Self { wheel }
    }

    /// All 37 spans of `size` pockets, best first. Equal scores keep scan
    /// order, so the earlier start index wins.
    pub fn rank(&self, probabilities: &[f32], size: usize) -> Vec<ScoredSegment> {
        let size = size.min(POCKETS);

        let mut candidates: Vec<ScoredSegment> = (0..POCKETS)
            .map(|start| {
                let numbers = self.wheel.span(start, size);
                let score = numbers
                    .iter()
                    .filter_map(|&n| probabilities.get(n as usize))
                    .sum();
                ScoredSegment {
                    start,
                    numbers,
                    score,
                }
            })
            .collect();

        // sort_by is stable
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates
    }

    /// The `count` best spans as plain pocket lists. Overlapping spans are
    /// all kept.
    pub fn top_segments(&self, probabilities: &[f32], count: usize, size: usize) -> Vec<Segment> {
        self.rank(probabilities, size)
            .into_iter()
            .take(count)
            .map(|candidate| Segment(candidate.numbers))
            .collect()
    }
}
