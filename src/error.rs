//! Error type for envelope parameter validation and phase layout.

use std::fmt;

/// The envelope segment a shape parameter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Attack,
    Decay,
    Release,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Attack => write!(f, "attack"),
            Segment::Decay => write!(f, "decay"),
            Segment::Release => write!(f, "release"),
        }
    }
}

/// Error type for envelope configuration.
///
/// Running past the end of an envelope is not an error: the generator keeps
/// returning 0.0 once every phase has been played.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    /// A shape parameter was zero, negative or not finite
    InvalidShape { segment: Segment, value: f64 },
    /// A duration or sustain parameter was not finite
    InvalidParameter { name: &'static str, value: f64 },
    /// The phases need more units than the total length provides
    DegenerateLayout { required: usize, available: usize },
    /// The total length cannot hold even the minimal envelope
    LengthTooShort { total_units: usize, minimum: usize },
}

impl fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeError::InvalidShape { segment, value } => {
                write!(f, "invalid {} shape: {} (must be > 0)", segment, value)
            }
            EnvelopeError::InvalidParameter { name, value } => {
                write!(f, "invalid {} value: {}", name, value)
            }
            EnvelopeError::DegenerateLayout {
                required,
                available,
            } => write!(
                f,
                "envelope phases need {} units but only {} are available",
                required, available
            ),
            EnvelopeError::LengthTooShort {
                total_units,
                minimum,
            } => write!(
                f,
                "total length of {} units is shorter than the minimum of {}",
                total_units, minimum
            ),
        }
    }
}

impl std::error::Error for EnvelopeError {}
