//! Calibration error taxonomy.

/// Reasons why no pixel-to-plot transform is available, or why a request
/// against the calibration state was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Fewer correspondences than a projective fit needs.
    InsufficientReferences { needed: usize, got: usize },
    /// The correspondences do not span both pixel and value spaces.
    DegenerateReferences,
    /// A reference or curve index past the end of its collection.
    IndexOutOfRange { index: usize, len: usize },
    /// A point was queried while the calibration is in an error state.
    NoValidTransform,
}

impl std::fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientReferences { needed, got } => {
                write!(
                    f,
                    "not enough reference points: need {}, got {}",
                    needed, got
                )
            }
            Self::DegenerateReferences => {
                write!(f, "reference points must span image and plot spaces")
            }
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for length {}", index, len)
            }
            Self::NoValidTransform => write!(f, "no valid calibration transform"),
        }
    }
}

impl std::error::Error for CalibrationError {}
