//! Drawing surface abstraction for the envelope preview.

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const LIGHT_GREEN: Rgb = Rgb::new(144, 238, 144);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A point in canvas coordinates: x to the right, y downward from the top edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Colors and stroke used to paint a preview.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewStyle {
    pub background: Rgb,
    pub stroke: Rgb,
    pub stroke_width: f32,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            background: Rgb::BLACK,
            stroke: Rgb::LIGHT_GREEN,
            stroke_width: 2.5,
        }
    }
}

/// The surface a preview is painted on.
///
/// Implement this for whatever the host GUI draws with. The preview only
/// needs the surface size, a background fill and one stroked path.
pub trait Canvas {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Fills the whole surface.
    fn fill_background(&mut self, color: Rgb);

    /// Strokes an open path through `points`.
    fn stroke_path(&mut self, points: &[Point], color: Rgb, width: f32);
}
