//! Plots an envelope across the columns of a canvas.

use tracing::debug;

use super::{Canvas, Point, PreviewStyle};
use crate::envelopes::{CoefficientGenerator, EnvelopeParameters, OverflowPolicy, Timebase};
use crate::error::EnvelopeError;

/// Paints the shape of an ADSR envelope.
///
/// The preview owns its own generator, scaled so the whole envelope fits the
/// canvas width. It never shares state with an envelope running on the audio
/// path; feed both from the same [`EnvelopeParameters`] instead.
///
/// # Examples
///
/// ```
/// use envelope_curve::{EnvelopeParameters, EnvelopePreview, TextCanvas};
///
/// let mut preview = EnvelopePreview::new(EnvelopeParameters::new(4.0, 2.0, -24.0, 4.0));
/// let mut canvas = TextCanvas::new(60, 12);
/// preview.paint(&mut canvas)?;
/// println!("{}", canvas);
/// # Ok::<(), envelope_curve::EnvelopeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EnvelopePreview {
    generator: CoefficientGenerator,
    style: PreviewStyle,
}

impl EnvelopePreview {
    /// Creates a preview of `params` with the default style.
    pub fn new(params: EnvelopeParameters) -> Self {
        let generator = CoefficientGenerator::new(params)
            .with_timebase(Timebase::FitToLength)
            .with_overflow_policy(OverflowPolicy::Shrink);
        Self {
            generator,
            style: PreviewStyle::default(),
        }
    }

    /// Sets the colors and stroke width, builder style.
    pub fn with_style(mut self, style: PreviewStyle) -> Self {
        self.style = style;
        self
    }

    /// The colors and stroke width used by [`paint`](Self::paint).
    pub fn style(&self) -> &PreviewStyle {
        &self.style
    }

    /// The plotted parameters.
    pub fn parameters(&self) -> &EnvelopeParameters {
        self.generator.parameters()
    }

    /// Mutable access to the plotted parameters; the next paint picks them up.
    pub fn parameters_mut(&mut self) -> &mut EnvelopeParameters {
        self.generator.parameters_mut()
    }

    /// Computes the plotted path for a `width` x `height` surface.
    ///
    /// The path starts at the bottom-left corner and has one point per
    /// column; column `i` plots the coefficient of unit `i - 1`, with
    /// coefficient 1 at the top edge and 0 at the bottom.
    ///
    /// # Errors
    ///
    /// Fails when the parameters are invalid or the width is too small to
    /// hold an envelope.
    pub fn curve_points(&mut self, width: u32, height: u32) -> Result<Vec<Point>, EnvelopeError> {
        self.generator.recompute_layout(width as usize)?;

        let height = height as f32;
        let mut points = Vec::with_capacity(width as usize);
        points.push(Point::new(0.0, height));
        for column in 1..width {
            let coefficient = self.generator.next_coefficient() as f32;
            points.push(Point::new(column as f32, height * (1.0 - coefficient)));
        }

        Ok(points)
    }

    /// Clears the canvas and strokes the envelope across its full size.
    pub fn paint<C: Canvas>(&mut self, canvas: &mut C) -> Result<(), EnvelopeError> {
        let (width, height) = canvas.size();
        let points = self.curve_points(width, height)?;
        debug!(width, height, points = points.len(), "painting envelope preview");

        canvas.fill_background(self.style.background);
        canvas.stroke_path(&points, self.style.stroke, self.style.stroke_width);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::Rgb;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[derive(Default)]
    struct RecordingCanvas {
        background: Option<Rgb>,
        strokes: Vec<(Vec<Point>, Rgb, f32)>,
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> (u32, u32) {
            (40, 10)
        }

        fn fill_background(&mut self, color: Rgb) {
            self.background = Some(color);
        }

        fn stroke_path(&mut self, points: &[Point], color: Rgb, width: f32) {
            self.strokes.push((points.to_vec(), color, width));
        }
    }

    #[test]
    fn test_one_point_per_column() {
        let mut preview = EnvelopePreview::new(EnvelopeParameters::default());
        let points = preview.curve_points(120, 50).unwrap();
        assert_eq!(points.len(), 120);
        assert_eq!(points[0], Point::new(0.0, 50.0));
        for (i, point) in points.iter().enumerate() {
            assert_eq!(point.x, i as f32);
            assert!(point.y >= 0.0 && point.y <= 50.0);
        }
    }

    #[test]
    fn test_curve_shape() {
        // 40 columns: 2 units per step, so attack 8, release 8, sustain 22
        let mut preview = EnvelopePreview::new(EnvelopeParameters::new(4.0, 0.0, 0.0, 4.0));
        let points = preview.curve_points(40, 10).unwrap();

        assert!(approx_eq(points[1].y, 10.0));
        assert!(approx_eq(points[5].y, 5.0));
        assert!(approx_eq(points[9].y, 0.0));
        assert!(approx_eq(points[20].y, 0.0));
        assert!(approx_eq(points[35].y, 5.0));
        assert!(approx_eq(points[39].y, 10.0));
    }

    #[test]
    fn test_repaint_is_stable() {
        let mut preview = EnvelopePreview::new(EnvelopeParameters::default());
        let first = preview.curve_points(80, 20).unwrap();
        let second = preview.curve_points(80, 20).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_parameter_change_shows_on_next_paint() {
        let mut preview = EnvelopePreview::new(EnvelopeParameters::new(4.0, 0.0, 0.0, 4.0));
        let before = preview.curve_points(40, 10).unwrap();
        preview.parameters_mut().set_attack_shape(0.25);
        let after = preview.curve_points(40, 10).unwrap();

        // Slow-start attack sits lower mid-ramp
        assert!(after[5].y > before[5].y);
        assert_eq!(preview.parameters().attack_shape(), 0.25);
    }

    #[test]
    fn test_paint_uses_style() {
        let style = PreviewStyle {
            background: Rgb::new(10, 20, 30),
            stroke: Rgb::new(200, 100, 0),
            stroke_width: 1.0,
        };
        let mut preview = EnvelopePreview::new(EnvelopeParameters::default()).with_style(style);
        let mut canvas = RecordingCanvas::default();
        preview.paint(&mut canvas).unwrap();

        assert_eq!(canvas.background, Some(Rgb::new(10, 20, 30)));
        assert_eq!(canvas.strokes.len(), 1);
        let (points, color, width) = &canvas.strokes[0];
        assert_eq!(points.len(), 40);
        assert_eq!(*color, Rgb::new(200, 100, 0));
        assert_eq!(*width, 1.0);
    }

    #[test]
    fn test_narrow_canvas_is_an_error() {
        let mut preview = EnvelopePreview::new(EnvelopeParameters::default());
        assert!(matches!(
            preview.curve_points(3, 10),
            Err(EnvelopeError::LengthTooShort { .. })
        ));
    }

    #[test]
    fn test_oversized_envelope_still_fits() {
        let mut preview = EnvelopePreview::new(EnvelopeParameters::new(100.0, 100.0, -48.0, 100.0));
        let points = preview.curve_points(60, 10).unwrap();
        assert!(approx_eq(points[59].y, 10.0));
    }

    #[test]
    fn test_invalid_shape_is_an_error() {
        let mut preview =
            EnvelopePreview::new(EnvelopeParameters::default().with_release_shape(0.0));
        let mut canvas = RecordingCanvas::default();
        assert!(preview.paint(&mut canvas).is_err());
        assert!(canvas.strokes.is_empty());
    }
}
