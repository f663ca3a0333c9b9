//! A character-grid canvas for terminals and tests.

use std::fmt;

use super::{Canvas, Point, Rgb};

const EMPTY: char = ' ';
const INK: char = '*';

/// Rasterizes strokes onto a grid of characters, one cell per pixel.
///
/// Colors and stroke width are ignored; every stroked cell becomes `*`.
///
/// # Examples
///
/// ```
/// use envelope_curve::{Canvas, Point, Rgb, TextCanvas};
///
/// let mut canvas = TextCanvas::new(4, 2);
/// canvas.stroke_path(&[Point::new(0.0, 1.0), Point::new(3.0, 1.0)], Rgb::BLACK, 1.0);
/// assert_eq!(canvas.to_string(), "    \n****");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCanvas {
    width: u32,
    height: u32,
    cells: Vec<char>,
}

impl TextCanvas {
    /// Creates an empty grid of `width` columns and `height` rows.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![EMPTY; width as usize * height as usize],
        }
    }

    /// Returns true if the cell at `column`, `row` has been stroked.
    pub fn is_inked(&self, column: u32, row: u32) -> bool {
        self.index(column, row)
            .is_some_and(|index| self.cells[index] == INK)
    }

    /// The rows of the grid, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells
            .chunks(self.width.max(1) as usize)
            .map(|row| row.iter().collect())
    }

    fn index(&self, column: u32, row: u32) -> Option<usize> {
        (column < self.width && row < self.height)
            .then(|| row as usize * self.width as usize + column as usize)
    }

    // Keeps segment lengths bounded by the grid size
    fn clamp_to_grid(&self, point: Point) -> Point {
        let max_x = self.width.saturating_sub(1) as f32;
        let max_y = self.height.saturating_sub(1) as f32;
        Point::new(clamp_coordinate(point.x, max_x), clamp_coordinate(point.y, max_y))
    }

    fn plot(&mut self, point: Point) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let column = point.x.round().clamp(0.0, (self.width - 1) as f32) as u32;
        let row = point.y.round().clamp(0.0, (self.height - 1) as f32) as u32;
        if let Some(index) = self.index(column, row) {
            self.cells[index] = INK;
        }
    }
}

// NaN lands on the origin edge
fn clamp_coordinate(value: f32, max: f32) -> f32 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, max) }
}

impl Canvas for TextCanvas {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_background(&mut self, _color: Rgb) {
        self.cells.fill(EMPTY);
    }

    fn stroke_path(&mut self, points: &[Point], _color: Rgb, _width: f32) {
        if let [only] = points {
            self.plot(*only);
        }

        for segment in points.windows(2) {
            let (from, to) = (self.clamp_to_grid(segment[0]), self.clamp_to_grid(segment[1]));
            let steps = (to.x - from.x).abs().max((to.y - from.y).abs()).ceil().max(1.0);
            let steps = steps as u32;
            for step in 0..=steps {
                let t = step as f32 / steps as f32;
                self.plot(Point::new(
                    from.x + (to.x - from.x) * t,
                    from.y + (to.y - from.y) * t,
                ));
            }
        }
    }
}

impl fmt::Display for TextCanvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", row)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EnvelopeParameters, EnvelopePreview};

    #[test]
    fn test_new_canvas_is_empty() {
        let canvas = TextCanvas::new(3, 2);
        assert_eq!(canvas.size(), (3, 2));
        assert_eq!(canvas.to_string(), "   \n   ");
    }

    #[test]
    fn test_diagonal_stroke() {
        let mut canvas = TextCanvas::new(3, 3);
        canvas.stroke_path(
            &[Point::new(0.0, 0.0), Point::new(2.0, 2.0)],
            Rgb::LIGHT_GREEN,
            1.0,
        );
        assert_eq!(canvas.to_string(), "*  \n * \n  *");
    }

    #[test]
    fn test_points_outside_are_clamped() {
        let mut canvas = TextCanvas::new(2, 2);
        canvas.stroke_path(&[Point::new(5.0, 5.0)], Rgb::BLACK, 1.0);
        assert!(canvas.is_inked(1, 1));
    }

    #[test]
    fn test_far_off_points_draw_along_the_edge() {
        let mut canvas = TextCanvas::new(4, 3);
        canvas.stroke_path(
            &[Point::new(0.0, 2.0), Point::new(f32::INFINITY, 2.0)],
            Rgb::BLACK,
            1.0,
        );
        assert_eq!(canvas.to_string(), "    \n    \n****");

        let mut canvas = TextCanvas::new(4, 3);
        canvas.stroke_path(
            &[Point::new(0.0, 0.0), Point::new(1.0e30, f32::NEG_INFINITY)],
            Rgb::BLACK,
            1.0,
        );
        assert_eq!(canvas.to_string(), "****\n    \n    ");
    }

    #[test]
    fn test_nan_point_does_not_hang() {
        let mut canvas = TextCanvas::new(3, 2);
        canvas.stroke_path(
            &[Point::new(f32::NAN, f32::NAN), Point::new(2.0, 1.0)],
            Rgb::BLACK,
            1.0,
        );
        assert!(canvas.is_inked(0, 0));
        assert!(canvas.is_inked(2, 1));
    }

    #[test]
    fn test_background_clears() {
        let mut canvas = TextCanvas::new(2, 1);
        canvas.stroke_path(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)], Rgb::BLACK, 1.0);
        canvas.fill_background(Rgb::BLACK);
        assert_eq!(canvas.to_string(), "  ");
    }

    #[test]
    fn test_zero_sized_canvas() {
        let mut canvas = TextCanvas::new(0, 0);
        canvas.stroke_path(&[Point::new(0.0, 0.0)], Rgb::BLACK, 1.0);
        assert_eq!(canvas.to_string(), "");
    }

    #[test]
    fn test_painted_envelope() {
        let mut preview = EnvelopePreview::new(EnvelopeParameters::new(4.0, 0.0, 0.0, 4.0));
        let mut canvas = TextCanvas::new(40, 10);
        preview.paint(&mut canvas).unwrap();

        // Starts and ends on the bottom row, sustains on the top row
        assert!(canvas.is_inked(0, 9));
        assert!(canvas.is_inked(20, 0));
        assert!(canvas.is_inked(39, 9));
        assert!(!canvas.is_inked(20, 9));
    }
}
