//! Storage for the envelope's UI-facing parameters.

use super::Curve;
use crate::error::{EnvelopeError, Segment};

/// Offset of the sustain parameter's dB-like scale: -96 is silence, 0 is full level.
pub const SUSTAIN_FLOOR_DB: f64 = 96.0;

/// Durations, sustain and segment shapes as produced by UI controls.
///
/// Durations are abstract steps (roughly 0 to 100 on a knob); how many units
/// a step spans is decided by the [`Timebase`](super::Timebase) when a
/// [`PhaseLayout`](super::PhaseLayout) is computed. Sustain is a dB-like
/// offset in [-96, 0].
///
/// Setters store whatever they are given. Call [`validate`](Self::validate)
/// (the generator does so before every layout) to reject values the curves
/// cannot handle.
///
/// # Examples
///
/// ```
/// use envelope_curve::EnvelopeParameters;
///
/// let mut params = EnvelopeParameters::default();
/// params.set_attack(20.0);
/// params.set_sustain(-48.0);
/// assert_eq!(params.sustain_level(), 0.5);
/// assert!(params.validate().is_ok());
///
/// params.set_decay_shape(0.0);
/// assert!(params.validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeParameters {
    attack: f64,
    decay: f64,
    sustain: f64,
    release: f64,
    attack_shape: f64,
    decay_shape: f64,
    release_shape: f64,
}

impl Default for EnvelopeParameters {
    fn default() -> Self {
        Self {
            attack: 5.0,
            decay: 5.0,
            sustain: -12.0,
            release: 5.0,
            attack_shape: 1.0,
            decay_shape: 1.0,
            release_shape: 1.0,
        }
    }
}

impl EnvelopeParameters {
    /// Creates parameters with linear segments.
    ///
    /// # Arguments
    ///
    /// * `attack` - Attack duration in steps
    /// * `decay` - Decay duration in steps
    /// * `sustain` - Sustain level as a dB-like offset in [-96, 0]
    /// * `release` - Release duration in steps
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
            ..Self::default()
        }
    }

    /// Sets the attack shape, builder style.
    pub fn with_attack_shape(mut self, shape: f64) -> Self {
        self.attack_shape = shape;
        self
    }

    /// Sets the decay shape, builder style.
    pub fn with_decay_shape(mut self, shape: f64) -> Self {
        self.decay_shape = shape;
        self
    }

    /// Sets the release shape, builder style.
    pub fn with_release_shape(mut self, shape: f64) -> Self {
        self.release_shape = shape;
        self
    }

    /// Sets the attack duration in steps.
    pub fn set_attack(&mut self, attack: f64) {
        self.attack = attack;
    }

    /// Sets the decay duration in steps.
    pub fn set_decay(&mut self, decay: f64) {
        self.decay = decay;
    }

    /// Sets the sustain level as a dB-like offset, -96 (silent) to 0 (full).
    pub fn set_sustain(&mut self, sustain: f64) {
        self.sustain = sustain;
    }

    /// Sets the release duration in steps.
    pub fn set_release(&mut self, release: f64) {
        self.release = release;
    }

    /// Sets the attack shape. Below 1.0 starts slow, 1.0 and above starts fast.
    pub fn set_attack_shape(&mut self, shape: f64) {
        self.attack_shape = shape;
    }

    /// Sets the decay shape.
    pub fn set_decay_shape(&mut self, shape: f64) {
        self.decay_shape = shape;
    }

    /// Sets the release shape.
    pub fn set_release_shape(&mut self, shape: f64) {
        self.release_shape = shape;
    }

    /// Attack duration in steps.
    pub fn attack(&self) -> f64 {
        self.attack
    }

    /// Decay duration in steps.
    pub fn decay(&self) -> f64 {
        self.decay
    }

    /// Sustain as the raw dB-like offset; see [`sustain_level`](Self::sustain_level).
    pub fn sustain(&self) -> f64 {
        self.sustain
    }

    /// Release duration in steps.
    pub fn release(&self) -> f64 {
        self.release
    }

    /// Attack shape factor.
    pub fn attack_shape(&self) -> f64 {
        self.attack_shape
    }

    /// Decay shape factor.
    pub fn decay_shape(&self) -> f64 {
        self.decay_shape
    }

    /// Release shape factor.
    pub fn release_shape(&self) -> f64 {
        self.release_shape
    }

    /// Level held during the sustain phase, `(96 + sustain) / 96` clamped to [0, 1].
    pub fn sustain_level(&self) -> f64 {
        ((SUSTAIN_FLOOR_DB + self.sustain) / SUSTAIN_FLOOR_DB).clamp(0.0, 1.0)
    }

    /// Curve for the attack segment.
    pub fn attack_curve(&self) -> Curve {
        Curve::from_shape(self.attack_shape)
    }

    /// Curve for the decay segment.
    pub fn decay_curve(&self) -> Curve {
        Curve::from_shape(self.decay_shape)
    }

    /// Curve for the release segment.
    pub fn release_curve(&self) -> Curve {
        Curve::from_shape(self.release_shape)
    }

    /// Checks that every value can be turned into a layout and curves.
    ///
    /// Shapes must be finite and strictly positive (the slow-start curve
    /// divides by the shape). Durations and sustain must be finite; negative
    /// durations are allowed and behave like zero.
    pub fn validate(&self) -> Result<(), EnvelopeError> {
        for (name, value) in [
            ("attack", self.attack),
            ("decay", self.decay),
            ("sustain", self.sustain),
            ("release", self.release),
        ] {
            if !value.is_finite() {
                return Err(EnvelopeError::InvalidParameter { name, value });
            }
        }

        for (segment, value) in [
            (Segment::Attack, self.attack_shape),
            (Segment::Decay, self.decay_shape),
            (Segment::Release, self.release_shape),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EnvelopeError::InvalidShape { segment, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_store_values() {
        let mut params = EnvelopeParameters::default();
        params.set_attack(12.5);
        params.set_decay(3.0);
        params.set_sustain(-6.0);
        params.set_release(40.0);
        params.set_attack_shape(0.25);
        params.set_decay_shape(2.0);
        params.set_release_shape(4.0);

        assert_eq!(params.attack(), 12.5);
        assert_eq!(params.decay(), 3.0);
        assert_eq!(params.sustain(), -6.0);
        assert_eq!(params.release(), 40.0);
        assert_eq!(params.attack_shape(), 0.25);
        assert_eq!(params.decay_shape(), 2.0);
        assert_eq!(params.release_shape(), 4.0);
    }

    #[test]
    fn test_setters_accept_invalid_values() {
        let mut params = EnvelopeParameters::default();
        params.set_release_shape(-1.0);
        assert_eq!(params.release_shape(), -1.0);
    }

    #[test]
    fn test_sustain_level() {
        assert_eq!(EnvelopeParameters::new(0.0, 0.0, 0.0, 0.0).sustain_level(), 1.0);
        assert_eq!(EnvelopeParameters::new(0.0, 0.0, -96.0, 0.0).sustain_level(), 0.0);
        assert_eq!(EnvelopeParameters::new(0.0, 0.0, -24.0, 0.0).sustain_level(), 0.75);
    }

    #[test]
    fn test_sustain_level_clamping() {
        assert_eq!(EnvelopeParameters::new(0.0, 0.0, 12.0, 0.0).sustain_level(), 1.0);
        assert_eq!(EnvelopeParameters::new(0.0, 0.0, -200.0, 0.0).sustain_level(), 0.0);
    }

    #[test]
    fn test_validate_rejects_zero_shape() {
        let params = EnvelopeParameters::default().with_attack_shape(0.0);
        assert_eq!(
            params.validate(),
            Err(EnvelopeError::InvalidShape {
                segment: Segment::Attack,
                value: 0.0
            })
        );
    }

    #[test]
    fn test_validate_rejects_negative_and_nan_shapes() {
        let params = EnvelopeParameters::default().with_release_shape(-0.5);
        assert!(matches!(
            params.validate(),
            Err(EnvelopeError::InvalidShape {
                segment: Segment::Release,
                ..
            })
        ));

        let params = EnvelopeParameters::default().with_decay_shape(f64::NAN);
        assert!(matches!(
            params.validate(),
            Err(EnvelopeError::InvalidShape {
                segment: Segment::Decay,
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_non_finite_duration() {
        let params = EnvelopeParameters::new(f64::INFINITY, 0.0, 0.0, 0.0);
        assert!(matches!(
            params.validate(),
            Err(EnvelopeError::InvalidParameter { name: "attack", .. })
        ));
    }

    #[test]
    fn test_curves_follow_shapes() {
        let params = EnvelopeParameters::default()
            .with_attack_shape(0.5)
            .with_decay_shape(2.0)
            .with_release_shape(1.0);
        assert_eq!(params.attack_curve(), Curve::Exponential(2.0));
        assert_eq!(params.decay_curve(), Curve::Logarithmic(2.0));
        assert_eq!(params.release_curve(), Curve::Logarithmic(1.0));
    }
}
