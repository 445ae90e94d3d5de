//! Cross-model vote over the pockets covered by each model's top blocks.

use std::collections::{BTreeMap, BTreeSet};

use crate::prediction::types::{ConsensusEntry, ModelResult, Segment};

/// `min_votes` is an absolute quorum against the whole configured roster.
/// Failed or unavailable models cast no vote and do not lower it, so a
/// deployment with fewer healthy models than `min_votes` yields an empty
/// consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusAggregator {
    min_votes: usize,
    max_output: usize,
}

impl ConsensusAggregator {
    pub fn new(min_votes: usize, max_output: usize) -> Self {
        Self {
            min_votes,
            max_output,
        }
    }

    pub fn min_votes(&self) -> usize {
        self.min_votes
    }

    pub fn max_output(&self) -> usize {
        self.max_output
    }

    /// Numbers reaching quorum, ordered by votes desc then number asc.
    pub fn aggregate<'a, I>(&self, results: I) -> Vec<ConsensusEntry>
    where
        I: IntoIterator<Item = &'a ModelResult>,
    {
        let mut entries: Vec<ConsensusEntry> = tally(results)
            .into_iter()
            .filter(|entry| entry.votes >= self.min_votes)
            .collect();

        entries.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.number.cmp(&b.number)));
        entries.truncate(self.max_output);
        entries
    }
}

/// Vote count per number: how many models cover it at least once. Results
/// that are not `Ok` are skipped.
pub fn tally<'a, I>(results: I) -> Vec<ConsensusEntry>
where
    I: IntoIterator<Item = &'a ModelResult>,
{
    let mut votes: BTreeMap<u8, usize> = BTreeMap::new();

    for blocks in results.into_iter().filter_map(ModelResult::blocks) {
        for number in distinct_numbers(blocks) {
            *votes.entry(number).or_insert(0) += 1;
        }
    }

    votes
        .into_iter()
        .map(|(number, votes)| ConsensusEntry { number, votes })
        .collect()
}

fn distinct_numbers(blocks: &[Segment]) -> BTreeSet<u8> {
    blocks
        .iter()
        .flat_map(|segment| segment.numbers().iter().copied())
        .collect()
}

/// Convenience form returning just the numbers.
pub fn consensus<'a, I>(results: I, min_votes: usize, max_output: usize) -> Vec<u8>
where
    I: IntoIterator<Item = &'a ModelResult>,
{
    ConsensusAggregator::new(min_votes, max_output)
        .aggregate(results)
        .into_iter()
        .map(|entry| entry.number)
        .collect()
}
