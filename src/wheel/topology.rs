use crate::error::TopologyError;

/// Number of pockets on a single-zero wheel.
pub const POCKETS: usize = 37;

/// Physical pocket order of the European / French wheel, clockwise from zero.
pub const EUROPEAN_SEQUENCE: [u8; POCKETS] = [
    0, 32, 15, 19, 4, 21, 2, 25, 17, 34, 6, 27, 13, 36, 11, 30, 8, 23, 10, 5, 24, 16, 33, 1, 20,
    14, 31, 9, 22, 18, 29, 7, 28, 12, 35, 3, 26,
];

const EUROPEAN_INDEX: [usize; POCKETS] = reverse_index(&EUROPEAN_SEQUENCE);

const fn reverse_index(sequence: &[u8; POCKETS]) -> [usize; POCKETS] {
    let mut index = [0usize; POCKETS];
    let mut position = 0;
    while position < POCKETS {
        index[sequence[position] as usize] = position;
        position += 1;
    }
    index
}

/// Circular pocket layout of the wheel plus its reverse index.
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelTopology {
    sequence: [u8; POCKETS],
    index: [usize; POCKETS],
}

impl WheelTopology {
    pub fn european() -> Self {
        Self {
            sequence: EUROPEAN_SEQUENCE,
            index: EUROPEAN_INDEX,
        }
    }

    /// Validates a custom layout: exactly 37 distinct pockets in `0..=36`.
    pub fn from_sequence(sequence: &[u8]) -> Result<Self, TopologyError> {
        if sequence.len() != POCKETS {
            return Err(TopologyError::WrongLength {
                expected: POCKETS,
                actual: sequence.len(),
            });
        }

        let mut seen = [false; POCKETS];
        let mut index = [0usize; POCKETS];
        let mut ordered = [0u8; POCKETS];

        for (position, &pocket) in sequence.iter().enumerate() {
            let slot = pocket as usize;
            if slot >= POCKETS {
                return Err(TopologyError::OutOfRange(pocket));
            }
            if seen[slot] {
                return Err(TopologyError::Duplicate(pocket));
            }
            seen[slot] = true;
            index[slot] = position;
            ordered[position] = pocket;
        }

        Ok(Self {
            sequence: ordered,
            index,
        })
    }

    pub fn sequence(&self) -> &[u8; POCKETS] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        POCKETS
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Pockets occupying `size` consecutive positions from `start`, wrapping
    /// past the last pocket back to zero.
    pub fn span(&self, start: usize, size: usize) -> Vec<u8> {
        (0..size)
            .map(|offset| self.sequence[(start + offset) % POCKETS])
            .collect()
    }

    /// Position of `number` on the wheel, if it is a pocket at all.
    pub fn position_of(&self, number: i64) -> Option<usize> {
        if (0..POCKETS as i64).contains(&number) {
            Some(self.index[number as usize])
        } else {
            None
        }
    }

    /// Start positions of every `size`-wide span that covers `number`,
    /// in ascending order.
    pub fn starts_containing(&self, number: i64, size: usize) -> Vec<usize> {
        let Some(position) = self.position_of(number) else {
            return Vec::new();
        };
        let size = size.min(POCKETS);

        let mut starts: Vec<usize> = (0..size)
            .map(|back| (position + POCKETS - back) % POCKETS)
            .collect();
        starts.sort_unstable();
        starts
    }
}

impl Default for WheelTopology {
    fn default() -> Self {
        Self::european()
    }
}
