//! Envelope preview rendering.
//!
//! The windowing system stays outside this crate: anything that implements
//! [`Canvas`] can host a preview. [`TextCanvas`] is a ready-made character
//! grid for terminals and tests.

mod canvas;
mod renderer;
mod text;

pub use canvas::{Canvas, Point, PreviewStyle, Rgb};
pub use renderer::EnvelopePreview;
pub use text::TextCanvas;
