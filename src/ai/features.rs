use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::prediction::types::{OutcomeWindow, WINDOW_SIZE};
use crate::wheel::topology::{WheelTopology, POCKETS};

/// Width of the wheel zones used by block-membership encoding.
pub const ZONE_SIZE: usize = 5;

/// Length of every encoded vector: one 37-wide slot per window position.
pub const FEATURE_LEN: usize = WINDOW_SIZE * POCKETS;

/// How a window is turned into model input.
///
/// Models are trained against exactly one scheme. Feeding a model vectors
/// from the other scheme yields garbage probabilities without any error, so
/// the scheme is fixed per deployment and reported with every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EncodingScheme {
    /// Bit `position * 37 + number`.
    #[default]
    DirectIdentity,
    /// Bit `position * 37 + start` for every zone start whose 5-pocket
    /// zone contains the number.
    BlockMembership,
}

impl fmt::Display for EncodingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodingScheme::DirectIdentity => write!(f, "direct_identity"),
            EncodingScheme::BlockMembership => write!(f, "block_membership"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f32>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices of the bits set to one.
    pub fn active_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    scheme: EncodingScheme,
    wheel: Arc<WheelTopology>,
}

impl FeatureEncoder {
    pub fn new(scheme: EncodingScheme, wheel: Arc<WheelTopology>) -> Self {
        Self { scheme, wheel }
    }

    pub fn scheme(&self) -> EncodingScheme {
        self.scheme
    }

    /// Pure function of the window. Out-of-range values leave their slot
    /// all zero.
    pub fn encode(&self, window: &OutcomeWindow) -> FeatureVector {
        let mut features = vec![0.0f32; FEATURE_LEN];

        for (position, &number) in window.outcomes().iter().enumerate() {
            let base = position * POCKETS;
            match self.scheme {
                EncodingScheme::DirectIdentity => {
                    if (0..POCKETS as i64).contains(&number) {
                        features[base + number as usize] = 1.0;
                    }
                }
                EncodingScheme::BlockMembership => {
                    for start in self.wheel.starts_containing(number, ZONE_SIZE) {
                        features[base + start] = 1.0;
                    }
                }
            }
        }

        FeatureVector(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoder(scheme: EncodingScheme) -> FeatureEncoder {
        FeatureEncoder::new(scheme, Arc::new(WheelTopology::european()))
    }

    #[test]
    fn test_direct_identity_bits() {
        let window = OutcomeWindow::new(&[0, 36, 17, 17, 5]).unwrap();
        let features = encoder(EncodingScheme::DirectIdentity).encode(&window);

        assert_eq!(features.len(), FEATURE_LEN);
        assert_eq!(
            features.active_indices(),
            vec![0, 37 + 36, 74 + 17, 111 + 17, 148 + 5]
        );
    }

    #[test]
    fn test_out_of_range_values_are_ignored() {
        let window = OutcomeWindow::new(&[37, -1, 3, 100, 36]).unwrap();
        for scheme in [EncodingScheme::DirectIdentity, EncodingScheme::BlockMembership] {
            let features = encoder(scheme).encode(&window);
            let active = features.active_indices();
            assert!(active.iter().all(|&i| (74..111).contains(&i) || i >= 148));
            assert!(!active.is_empty());
        }
    }

    #[test]
    fn test_block_membership_bits() {
        let wheel = WheelTopology::european();
        let window = OutcomeWindow::new(&[0, 32, 26, 9, 17]).unwrap();
        let features = encoder(EncodingScheme::BlockMembership).encode(&window);

        let active = features.active_indices();
        assert_eq!(active.len(), WINDOW_SIZE * ZONE_SIZE);

        // Zero sits at position 0: zones starting at 0, 33, 34, 35, 36
        assert_eq!(&active[..5], &[0, 33, 34, 35, 36]);

        for (position, &number) in window.outcomes().iter().enumerate() {
            for start in 0..POCKETS {
                let bit = features.as_slice()[position * POCKETS + start];
                let covered = wheel.span(start, ZONE_SIZE).contains(&(number as u8));
                assert_eq!(bit == 1.0, covered);
            }
        }
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let window = OutcomeWindow::new(&[4, 21, 2, 25, 17]).unwrap();
        for scheme in [EncodingScheme::DirectIdentity, EncodingScheme::BlockMembership] {
            let enc = encoder(scheme);
            assert_eq!(enc.encode(&window), enc.encode(&window));
        }
    }

    #[test]
    fn test_scheme_serde_names() {
        assert_eq!(
            serde_json::to_value(EncodingScheme::BlockMembership).unwrap(),
            "block_membership"
        );
        assert_eq!(EncodingScheme::default().to_string(), "direct_identity");
    }
}
