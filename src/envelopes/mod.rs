//! ADSR envelope parameters, phase layout and the coefficient generator.
//!
//! The pieces build on each other:
//! - [`EnvelopeParameters`] stores UI-facing durations, sustain and shapes
//! - [`PhaseLayout`] turns them into unit counts for a given total length
//! - [`CoefficientGenerator`] walks the layout one unit at a time
//! - [`Curve`] shapes the attack, decay and release ramps

mod curve;
mod generator;
mod layout;
mod params;

pub use curve::{Curve, progress};
pub use generator::{CoefficientGenerator, Stage, SustainMode};
pub use layout::{MIN_TOTAL_UNITS, OverflowPolicy, PhaseLayout, TAIL_UNITS, Timebase};
pub use params::{EnvelopeParameters, SUSTAIN_FLOOR_DB};
