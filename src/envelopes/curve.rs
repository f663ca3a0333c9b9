//! Interpolation curves for envelope segments.
//!
//! A segment's shape parameter picks one of two logarithmic interpolations of
//! the segment's progress ratio. Values below 1.0 give a slow start that
//! accelerates toward the end, values of 1.0 and above give a fast start that
//! decelerates. A shape of exactly 1.0 is linear.

/// Interpolation curve for one envelope segment.
///
/// All curves map a normalized progress value [0, 1] to a normalized output
/// value [0, 1], with `apply(0.0) == 0.0` and `apply(1.0) == 1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Curve {
    /// Constant rate of change
    ///
    /// For curves built directly. [`Curve::from_shape`] never returns it; a
    /// shape of 1.0 gives the equivalent `Logarithmic(1.0)`.
    #[default]
    Linear,

    /// Slow start, fast finish: `p^k`
    ///
    /// This is the `exp(ln(p) * k)` form. Shapes below 1.0 map to
    /// `Exponential(1.0 / shape)`.
    Exponential(f64),

    /// Fast start, slow finish: `1 - (1 - p)^k`
    ///
    /// One minus the `exp(ln(1 - p) * k)` form. Shapes of 1.0 and above map to
    /// `Logarithmic(shape)`.
    Logarithmic(f64),
}

impl Curve {
    /// Builds the curve selected by a segment shape parameter.
    ///
    /// The shape must be strictly positive; see
    /// [`EnvelopeParameters::validate`](super::EnvelopeParameters::validate).
    ///
    /// # Examples
    ///
    /// ```
    /// use envelope_curve::Curve;
    ///
    /// assert_eq!(Curve::from_shape(0.5), Curve::Exponential(2.0));
    /// assert_eq!(Curve::from_shape(3.0), Curve::Logarithmic(3.0));
    /// ```
    pub fn from_shape(shape: f64) -> Self {
        if shape < 1.0 {
            Curve::Exponential(1.0 / shape)
        } else {
            Curve::Logarithmic(shape)
        }
    }

    /// Apply the curve to a normalized progress value.
    ///
    /// # Arguments
    ///
    /// * `t` - Progress through the segment, clamped to [0, 1]
    ///
    /// # Examples
    ///
    /// ```
    /// use envelope_curve::Curve;
    ///
    /// let slow = Curve::Exponential(2.0);
    /// assert!((slow.apply(0.5) - 0.25).abs() < 1e-12);
    ///
    /// let fast = Curve::Logarithmic(2.0);
    /// assert!((fast.apply(0.5) - 0.75).abs() < 1e-12);
    /// ```
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Curve::Linear => t,
            Curve::Exponential(k) => slow_start(t, *k),
            Curve::Logarithmic(k) => 1.0 - decelerating(t, *k),
        }
    }

    /// Apply the curve to `elapsed` units out of a segment of `length` units.
    ///
    /// A zero-length segment counts as already complete.
    pub fn apply_units(&self, elapsed: usize, length: usize) -> f64 {
        self.apply(progress(elapsed, length))
    }
}

/// Progress ratio `elapsed / length`, with an empty segment treated as finished.
pub fn progress(elapsed: usize, length: usize) -> f64 {
    if length == 0 {
        1.0
    } else {
        elapsed as f64 / length as f64
    }
}

// exp(ln(p) * k); ln(0) is the limit case and resolves to 0
fn slow_start(p: f64, k: f64) -> f64 {
    if p <= 0.0 { 0.0 } else { (p.ln() * k).exp() }
}

// exp(ln(1 - p) * k); the end of the interval resolves to 0
fn decelerating(p: f64, k: f64) -> f64 {
    if p >= 1.0 {
        0.0
    } else {
        ((1.0 - p).ln() * k).exp()
    }
}
