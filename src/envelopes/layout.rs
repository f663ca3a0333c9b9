//! Phase boundaries derived from envelope parameters and a total length.

use tracing::{debug, warn};

use super::EnvelopeParameters;
use crate::error::EnvelopeError;

/// Units reserved after the release ramp so the curve terminates at zero.
pub const TAIL_UNITS: usize = 2;

/// Smallest total length that holds one attack unit, one release unit and the tail.
pub const MIN_TOTAL_UNITS: usize = 2 + TAIL_UNITS;

// FitToLength splits the length into 4 sections of 5 parameter steps each
const SECTIONS: usize = 4;
const STEPS_PER_SECTION: f64 = 5.0;

/// How parameter steps translate into generator units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Timebase {
    /// Steps scale with the total length: one step spans `(total / 4) / 5`
    /// units. This is the preview scaling, where a full-width plot always
    /// shows the whole envelope.
    #[default]
    FitToLength,

    /// Every step spans a fixed number of units regardless of total length.
    UnitsPerStep(f64),
}

impl Timebase {
    /// A fixed timebase for audio use, where a unit is one sample.
    ///
    /// # Examples
    ///
    /// ```
    /// use envelope_curve::Timebase;
    ///
    /// // 10ms per step at 48kHz
    /// let timebase = Timebase::from_sample_rate(48000.0, 0.01);
    /// assert_eq!(timebase.units_per_step(123), 480.0);
    /// ```
    pub fn from_sample_rate(sample_rate: f64, seconds_per_step: f64) -> Self {
        Timebase::UnitsPerStep(sample_rate * seconds_per_step)
    }

    /// Number of units one parameter step spans for a given total length.
    pub fn units_per_step(&self, total_units: usize) -> f64 {
        self.scale(1.0, total_units)
    }

    /// Converts a duration in parameter steps into fractional units.
    ///
    /// With [`FitToLength`](Self::FitToLength) the duration is multiplied by
    /// the section size before dividing by the steps per section, so a
    /// duration whose exact size is a whole number of units stays whole.
    ///
    /// # Examples
    ///
    /// ```
    /// use envelope_curve::Timebase;
    ///
    /// // 164 units: sections of 41, so 15 steps are 15 * 41 / 5 = 123 units
    /// assert_eq!(Timebase::FitToLength.scale(15.0, 164), 123.0);
    /// ```
    pub fn scale(&self, steps: f64, total_units: usize) -> f64 {
        match self {
            Timebase::FitToLength => steps * (total_units / SECTIONS) as f64 / STEPS_PER_SECTION,
            Timebase::UnitsPerStep(units) => steps * units.max(0.0),
        }
    }
}

/// What to do when attack, decay and release do not fit in the total length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Drop the sustain phase and shrink attack, decay and release
    /// proportionally. Attack and release keep at least one unit.
    #[default]
    Shrink,

    /// Fail with [`EnvelopeError::DegenerateLayout`].
    Reject,
}

/// Unit counts for each phase of one generation run.
///
/// The phases plus [`TAIL_UNITS`] always add up to `total_units`: sustain
/// absorbs whatever attack, decay and release leave over, and is never
/// negative.
///
/// # Examples
///
/// ```
/// use envelope_curve::{EnvelopeParameters, OverflowPolicy, PhaseLayout, Timebase};
///
/// let params = EnvelopeParameters::new(5.0, 3.0, -12.0, 4.0);
/// let layout = PhaseLayout::compute(
///     &params,
///     100,
///     Timebase::UnitsPerStep(1.0),
///     OverflowPolicy::Reject,
/// )
/// .unwrap();
///
/// assert_eq!(layout.attack_units(), 5);
/// assert_eq!(layout.decay_units(), 3);
/// assert_eq!(layout.release_units(), 4);
/// assert_eq!(layout.sustain_units(), 100 - (5 + 3 + 4 + 2));
/// assert_eq!(layout.sustain_level(), 0.875);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseLayout {
    attack_units: usize,
    decay_units: usize,
    sustain_units: usize,
    release_units: usize,
    total_units: usize,
    sustain_level: f64,
}

impl PhaseLayout {
    /// Computes the layout for a run of `total_units` units.
    ///
    /// Attack and release always span at least one unit; decay may be empty.
    ///
    /// # Errors
    ///
    /// * Invalid parameters, see [`EnvelopeParameters::validate`]
    /// * [`EnvelopeError::LengthTooShort`] when `total_units < MIN_TOTAL_UNITS`
    /// * [`EnvelopeError::DegenerateLayout`] when the phases overflow and the
    ///   policy is [`OverflowPolicy::Reject`]
    pub fn compute(
        params: &EnvelopeParameters,
        total_units: usize,
        timebase: Timebase,
        policy: OverflowPolicy,
    ) -> Result<Self, EnvelopeError> {
        check_inputs(params, total_units)?;

        let (mut attack_units, mut decay_units, mut release_units) =
            scaled_units(params, total_units, timebase);

        let available = total_units - TAIL_UNITS;
        let required = attack_units
            .saturating_add(decay_units)
            .saturating_add(release_units);

        if required > available {
            match policy {
                OverflowPolicy::Reject => {
                    return Err(EnvelopeError::DegenerateLayout {
                        required,
                        available,
                    });
                }
                OverflowPolicy::Shrink => {
                    warn!(
                        required,
                        available, "envelope phases overflow total length, shrinking"
                    );
                    (attack_units, decay_units, release_units) =
                        shrink_to_fit(attack_units, decay_units, release_units, available);
                }
            }
        }

        Ok(Self::from_units(
            params,
            attack_units,
            decay_units,
            release_units,
            total_units,
        ))
    }

    /// Computes the layout for a run whose sustain lasts until it is released.
    ///
    /// Attack, decay and release keep their scaled lengths and are never
    /// shrunk. `total_units` still sets the [`Timebase::FitToLength`] scale and
    /// must be at least [`MIN_TOTAL_UNITS`]; when the phases need more room,
    /// the layout's total grows to hold them and the sustain length is 0.
    ///
    /// # Errors
    ///
    /// * Invalid parameters, see [`EnvelopeParameters::validate`]
    /// * [`EnvelopeError::LengthTooShort`] when `total_units < MIN_TOTAL_UNITS`
    ///
    /// # Examples
    ///
    /// ```
    /// use envelope_curve::{EnvelopeParameters, PhaseLayout, Timebase};
    ///
    /// let params = EnvelopeParameters::new(5.0, 0.0, 0.0, 30.0);
    /// let layout = PhaseLayout::compute_held(&params, 10, Timebase::UnitsPerStep(1.0))?;
    ///
    /// assert_eq!(layout.release_units(), 30);
    /// assert_eq!(layout.sustain_units(), 0);
    /// assert_eq!(layout.total_units(), 5 + 30 + 2);
    /// # Ok::<(), envelope_curve::EnvelopeError>(())
    /// ```
    pub fn compute_held(
        params: &EnvelopeParameters,
        total_units: usize,
        timebase: Timebase,
    ) -> Result<Self, EnvelopeError> {
        check_inputs(params, total_units)?;

        let (attack_units, decay_units, release_units) =
            scaled_units(params, total_units, timebase);
        let needed = attack_units
            .saturating_add(decay_units)
            .saturating_add(release_units)
            .saturating_add(TAIL_UNITS);

        Ok(Self::from_units(
            params,
            attack_units,
            decay_units,
            release_units,
            total_units.max(needed),
        ))
    }

    fn from_units(
        params: &EnvelopeParameters,
        attack_units: usize,
        decay_units: usize,
        release_units: usize,
        total_units: usize,
    ) -> Self {
        let phase_units = attack_units
            .saturating_add(decay_units)
            .saturating_add(release_units);
        let sustain_units = total_units
            .saturating_sub(TAIL_UNITS)
            .saturating_sub(phase_units);
        let layout = Self {
            attack_units,
            decay_units,
            sustain_units,
            release_units,
            total_units,
            sustain_level: params.sustain_level(),
        };

        debug!(
            total_units,
            attack = layout.attack_units,
            decay = layout.decay_units,
            sustain = layout.sustain_units,
            release = layout.release_units,
            "computed envelope layout"
        );

        layout
    }

    /// Units in the attack ramp, at least 1.
    pub fn attack_units(&self) -> usize {
        self.attack_units
    }

    /// Units in the decay ramp; may be 0.
    pub fn decay_units(&self) -> usize {
        self.decay_units
    }

    /// Units the sustain plateau lasts in a timed run.
    pub fn sustain_units(&self) -> usize {
        self.sustain_units
    }

    /// Units in the release ramp, at least 1.
    pub fn release_units(&self) -> usize {
        self.release_units
    }

    /// The total length this layout was computed for.
    pub fn total_units(&self) -> usize {
        self.total_units
    }

    /// Level held during the sustain phase, in [0, 1].
    pub fn sustain_level(&self) -> f64 {
        self.sustain_level
    }

    /// Last unit index of the attack phase.
    pub fn attack_end(&self) -> usize {
        self.attack_units
    }

    /// Last unit index of the decay phase.
    pub fn decay_end(&self) -> usize {
        self.attack_end() + self.decay_units
    }

    /// Last unit index of the sustain phase.
    pub fn sustain_end(&self) -> usize {
        self.decay_end() + self.sustain_units
    }

    /// Last unit index of the release phase, where the coefficient reaches 0.
    pub fn release_end(&self) -> usize {
        self.sustain_end() + self.release_units
    }

    /// Number of coefficients a timed run produces before the trailing zeros:
    /// unit 0 through [`release_end`](Self::release_end) inclusive.
    pub fn active_units(&self) -> usize {
        self.release_end() + 1
    }
}

fn check_inputs(params: &EnvelopeParameters, total_units: usize) -> Result<(), EnvelopeError> {
    params.validate()?;

    if total_units < MIN_TOTAL_UNITS {
        return Err(EnvelopeError::LengthTooShort {
            total_units,
            minimum: MIN_TOTAL_UNITS,
        });
    }
    Ok(())
}

fn scaled_units(
    params: &EnvelopeParameters,
    total_units: usize,
    timebase: Timebase,
) -> (usize, usize, usize) {
    (
        ramp_units(timebase.scale(params.attack(), total_units)),
        plain_units(timebase.scale(params.decay(), total_units)),
        ramp_units(timebase.scale(params.release(), total_units)),
    )
}

// Ramps never collapse: anything up to half a unit still gets one unit
fn ramp_units(scaled: f64) -> usize {
    if scaled > 0.5 { scaled.ceil() as usize } else { 1 }
}

fn plain_units(scaled: f64) -> usize {
    if scaled > 0.0 { scaled.trunc() as usize } else { 0 }
}

fn shrink_to_fit(
    attack: usize,
    decay: usize,
    release: usize,
    available: usize,
) -> (usize, usize, usize) {
    let required = attack as u128 + decay as u128 + release as u128;
    let scale = |units: usize| (units as u128 * available as u128 / required) as usize;
    let mut attack = scale(attack).max(1);
    let mut decay = scale(decay);
    let mut release = scale(release).max(1);

    // The one-unit floors can push the sum back over
    while attack + decay + release > available {
        if decay > 0 {
            decay -= 1;
        } else if attack >= release && attack > 1 {
            attack -= 1;
        } else if release > 1 {
            release -= 1;
        } else {
            break;
        }
    }

    (attack, decay, release)
}
