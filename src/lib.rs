//! Envelope curve - ADSR coefficient generation and preview rendering.
//!
//! This library provides a sample-accurate ADSR envelope generator with
//! independently shaped attack, decay and release segments, plus a renderer
//! that plots the same envelope across the columns of a drawing surface.

pub mod envelopes;
pub mod error;
#[cfg(feature = "preview")]
pub mod preview;
mod signal;

// Re-export commonly used types at the crate root
pub use envelopes::{
    CoefficientGenerator, Curve, EnvelopeParameters, OverflowPolicy, PhaseLayout, Stage,
    SustainMode, Timebase,
};
pub use error::{EnvelopeError, Segment};
pub use signal::Signal;
#[cfg(feature = "preview")]
pub use preview::{Canvas, EnvelopePreview, Point, PreviewStyle, Rgb, TextCanvas};
