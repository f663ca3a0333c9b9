//! Pull-based sample source trait.

/// Anything that produces one value per call, in strictly increasing order.
///
/// Envelope generators implement this so the same object can drive an audio
/// gain stage (one call per sample) or a preview (one call per pixel column).
/// There is no random access: the only way forward is the next call.
///
/// # Examples
///
/// ```
/// use envelope_curve::Signal;
///
/// struct Ramp(f64);
///
/// impl Signal for Ramp {
///     fn next_sample(&mut self) -> f64 {
///         self.0 += 0.25;
///         self.0
///     }
/// }
///
/// let mut ramp = Ramp(0.0);
/// let mut buffer = [0.0; 4];
/// ramp.process(&mut buffer);
/// assert_eq!(buffer, [0.25, 0.5, 0.75, 1.0]);
/// ```
pub trait Signal {
    /// Produces the next value and advances the source by one unit.
    fn next_sample(&mut self) -> f64;

    /// Fills `buffer` with consecutive values.
    ///
    /// Default implementation calls `next_sample()` for each element.
    fn process(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample();
        }
    }

    /// Collects the next `count` values into a new vector.
    fn take_samples(&mut self, count: usize) -> Vec<f64> {
        let mut buffer = vec![0.0; count];
        self.process(&mut buffer);
        buffer
    }
}

/// A constant value is a signal that never changes.
impl Signal for f64 {
    fn next_sample(&mut self) -> f64 {
        *self
    }

    fn process(&mut self, buffer: &mut [f64]) {
        buffer.fill(*self);
    }
}
