//! Sample-accurate ADSR coefficient generator.

use tracing::trace;

use super::{Curve, EnvelopeParameters, OverflowPolicy, PhaseLayout, Timebase};
use crate::Signal;
use crate::error::EnvelopeError;

/// Stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// No layout yet, or reset; outputs 0
    Idle,
    /// Ramping from 0 to 1
    Attack,
    /// Ramping from 1 to the sustain level
    Decay,
    /// Holding the sustain level
    Sustain,
    /// Ramping from the level at release down to 0
    Release,
    /// Every phase has played; outputs 0 forever
    Done,
}

/// How the sustain phase ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SustainMode {
    /// Sustain lasts `sustain_units` and release follows on schedule.
    /// This is what a preview plot wants.
    #[default]
    Timed,

    /// Sustain holds until [`CoefficientGenerator::trigger_release`] is called,
    /// like a held note.
    Held,
}

/// Stateful ADSR envelope evaluator.
///
/// Each call to [`next_coefficient`](Self::next_coefficient) returns the
/// amplitude multiplier for the next unit (a pixel column in a preview, a
/// sample in an audio callback) and advances by one unit. With a layout of
/// `A`, `D`, `S`, `R` units and `t` units elapsed, a timed run produces:
///
/// - **Attack** (`t <= A`): `attack_curve(t / A)`, from 0 up to exactly 1
/// - **Decay** (`t <= A+D`): `1 - decay_curve(t' / D) * (1 - sustain)`
/// - **Sustain** (`t <= A+D+S`): the sustain level
/// - **Release** (`t <= A+D+S+R`): `at_release * (1 - release_curve(t'' / R))`,
///   reaching exactly 0 on its last unit
/// - afterwards 0, without advancing
///
/// The level at release is the last attack, decay or sustain value, so an
/// early [`trigger_release`](Self::trigger_release) ramps down from wherever
/// the envelope was.
///
/// A generator owns all of its state. Give the audio path and a preview
/// their own instances.
///
/// # Examples
///
/// ```
/// use envelope_curve::{CoefficientGenerator, EnvelopeParameters, Timebase};
///
/// // 5 units of attack and release, no decay, full sustain level
/// let params = EnvelopeParameters::new(5.0, 0.0, 0.0, 5.0);
/// let mut env = CoefficientGenerator::new(params).with_timebase(Timebase::UnitsPerStep(1.0));
/// env.recompute_layout(12)?;
///
/// let curve: Vec<f64> = (0..12).map(|_| env.next_coefficient()).collect();
/// assert_eq!(curve[0], 0.0);
/// assert!((curve[5] - 1.0).abs() < 1e-12);
/// assert_eq!(curve[10], 0.0);
/// assert_eq!(curve[11], 0.0);
/// # Ok::<(), envelope_curve::EnvelopeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CoefficientGenerator {
    params: EnvelopeParameters,
    timebase: Timebase,
    overflow_policy: OverflowPolicy,
    sustain_mode: SustainMode,

    // Snapshot taken by recompute_layout
    layout: Option<PhaseLayout>,
    attack_curve: Curve,
    decay_curve: Curve,
    release_curve: Curve,

    stage: Stage,
    stage_position: usize, // units elapsed within the current stage
    units_elapsed: usize,
    value_at_release: f64,
}

impl CoefficientGenerator {
    /// Creates an idle generator. Call [`recompute_layout`](Self::recompute_layout)
    /// before pulling coefficients.
    pub fn new(params: EnvelopeParameters) -> Self {
        Self {
            params,
            timebase: Timebase::default(),
            overflow_policy: OverflowPolicy::default(),
            sustain_mode: SustainMode::default(),
            layout: None,
            attack_curve: params.attack_curve(),
            decay_curve: params.decay_curve(),
            release_curve: params.release_curve(),
            stage: Stage::Idle,
            stage_position: 0,
            units_elapsed: 0,
            value_at_release: 0.0,
        }
    }

    /// Sets how parameter steps map to units.
    ///
    /// # Examples
    ///
    /// ```
    /// use envelope_curve::{CoefficientGenerator, EnvelopeParameters, Timebase};
    ///
    /// let env = CoefficientGenerator::new(EnvelopeParameters::default())
    ///     .with_timebase(Timebase::from_sample_rate(44100.0, 0.01));
    /// ```
    pub fn with_timebase(mut self, timebase: Timebase) -> Self {
        self.timebase = timebase;
        self
    }

    /// Sets what happens when the phases overflow the total length.
    pub fn with_overflow_policy(mut self, policy: OverflowPolicy) -> Self {
        self.overflow_policy = policy;
        self
    }

    /// Sets whether sustain ends on schedule or waits for a release trigger.
    ///
    /// In [`SustainMode::Held`] the overflow policy does not apply: attack,
    /// decay and release keep their full lengths whatever total is passed to
    /// [`recompute_layout`](Self::recompute_layout). See
    /// [`PhaseLayout::compute_held`].
    pub fn with_sustain_mode(mut self, mode: SustainMode) -> Self {
        self.sustain_mode = mode;
        self
    }

    /// Derives the phase layout for a run of `total_units` and restarts the
    /// envelope from the first attack unit.
    ///
    /// Parameter changes take effect here, not mid-run. Calling this twice
    /// with the same inputs reproduces the same coefficient sequence.
    ///
    /// # Errors
    ///
    /// See [`PhaseLayout::compute`], or [`PhaseLayout::compute_held`] in
    /// [`SustainMode::Held`]. On error the generator keeps its previous layout
    /// and position.
    pub fn recompute_layout(&mut self, total_units: usize) -> Result<&PhaseLayout, EnvelopeError> {
        let layout = match self.sustain_mode {
            SustainMode::Timed => PhaseLayout::compute(
                &self.params,
                total_units,
                self.timebase,
                self.overflow_policy,
            )?,
            SustainMode::Held => {
                PhaseLayout::compute_held(&self.params, total_units, self.timebase)?
            }
        };

        self.attack_curve = self.params.attack_curve();
        self.decay_curve = self.params.decay_curve();
        self.release_curve = self.params.release_curve();
        self.start();

        Ok(self.layout.insert(layout))
    }

    /// Restarts the envelope from the first attack unit with the current layout.
    ///
    /// Has no effect before a layout has been computed.
    pub fn trigger(&mut self) {
        if self.layout.is_some() {
            self.start();
        }
    }

    /// Starts the release ramp from the current level.
    ///
    /// Only meaningful during attack, decay or sustain; ignored otherwise.
    pub fn trigger_release(&mut self) {
        if matches!(self.stage, Stage::Attack | Stage::Decay | Stage::Sustain) {
            self.enter(Stage::Release);
        }
    }

    /// Returns to idle. The layout is kept, so [`trigger`](Self::trigger) can
    /// start a new run.
    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.stage_position = 0;
        self.units_elapsed = 0;
        self.value_at_release = 0.0;
    }

    /// Produces the coefficient for the next unit, in [0, 1].
    pub fn next_coefficient(&mut self) -> f64 {
        let Some(layout) = self.layout else {
            return 0.0;
        };
        let sustain_level = layout.sustain_level();

        loop {
            match self.stage {
                Stage::Idle | Stage::Done => return 0.0,

                Stage::Attack => {
                    if self.stage_position <= layout.attack_units() {
                        let level = self
                            .attack_curve
                            .apply_units(self.stage_position, layout.attack_units());
                        return self.emit_latched(level);
                    }
                    self.enter(Stage::Decay);
                }

                Stage::Decay => {
                    if self.stage_position <= layout.decay_units() {
                        let curved = self
                            .decay_curve
                            .apply_units(self.stage_position, layout.decay_units());
                        return self.emit_latched(1.0 - curved * (1.0 - sustain_level));
                    }
                    self.enter(Stage::Sustain);
                }

                Stage::Sustain => {
                    if self.sustain_mode == SustainMode::Held
                        || self.stage_position <= layout.sustain_units()
                    {
                        return self.emit_latched(sustain_level);
                    }
                    self.enter(Stage::Release);
                }

                Stage::Release => {
                    if self.stage_position <= layout.release_units() {
                        let curved = self
                            .release_curve
                            .apply_units(self.stage_position, layout.release_units());
                        return self.emit(self.value_at_release * (1.0 - curved));
                    }
                    self.enter(Stage::Done);
                }
            }
        }
    }

    /// The stage the next coefficient will come from.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Returns true from the first attack unit until release completes.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Idle | Stage::Done)
    }

    /// Units produced since the run started. Stops advancing once the run is done.
    pub fn units_elapsed(&self) -> usize {
        self.units_elapsed
    }

    /// The level the release ramp starts from (or would start from now).
    pub fn value_at_release(&self) -> f64 {
        self.value_at_release
    }

    /// The layout of the current run, if one has been computed.
    pub fn layout(&self) -> Option<&PhaseLayout> {
        self.layout.as_ref()
    }

    /// The parameters the next layout will be computed from.
    pub fn parameters(&self) -> &EnvelopeParameters {
        &self.params
    }

    /// Mutable access to the parameters. Changes apply at the next
    /// [`recompute_layout`](Self::recompute_layout).
    pub fn parameters_mut(&mut self) -> &mut EnvelopeParameters {
        &mut self.params
    }

    /// Replaces the parameters. Like [`parameters_mut`](Self::parameters_mut),
    /// the change applies at the next layout.
    pub fn set_parameters(&mut self, params: EnvelopeParameters) {
        self.params = params;
    }

    /// How parameter steps map to units.
    pub fn timebase(&self) -> Timebase {
        self.timebase
    }

    /// Whether sustain is timed or held until release.
    pub fn sustain_mode(&self) -> SustainMode {
        self.sustain_mode
    }

    fn start(&mut self) {
        self.stage = Stage::Attack;
        self.stage_position = 0;
        self.units_elapsed = 0;
        self.value_at_release = 0.0;
    }

    fn enter(&mut self, stage: Stage) {
        trace!(
            from = ?self.stage,
            to = ?stage,
            units_elapsed = self.units_elapsed,
            "envelope stage change"
        );
        self.stage = stage;
        // Later stages count from 1: their unit 0 is the previous stage's last unit
        self.stage_position = 1;
    }

    fn emit_latched(&mut self, level: f64) -> f64 {
        self.value_at_release = level;
        self.emit(level)
    }

    fn emit(&mut self, level: f64) -> f64 {
        self.stage_position += 1;
        self.units_elapsed += 1;
        level
    }
}

impl Signal for CoefficientGenerator {
    fn next_sample(&mut self) -> f64 {
        self.next_coefficient()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn unit_generator(params: EnvelopeParameters) -> CoefficientGenerator {
        CoefficientGenerator::new(params).with_timebase(Timebase::UnitsPerStep(1.0))
    }

    #[test]
    fn test_idle_outputs_zero() {
        let mut env = CoefficientGenerator::new(EnvelopeParameters::default());
        assert_eq!(env.stage(), Stage::Idle);
        assert!(!env.is_active());
        assert_eq!(env.next_coefficient(), 0.0);
        assert_eq!(env.units_elapsed(), 0);
    }

    #[test]
    fn test_trigger_without_layout_stays_idle() {
        let mut env = CoefficientGenerator::new(EnvelopeParameters::default());
        env.trigger();
        assert_eq!(env.stage(), Stage::Idle);
    }

    #[test]
    fn test_recompute_starts_attack() {
        let mut env = unit_generator(EnvelopeParameters::new(4.0, 2.0, -48.0, 4.0));
        let layout = *env.recompute_layout(20).unwrap();
        assert_eq!(layout.attack_units(), 4);
        assert_eq!(env.stage(), Stage::Attack);
        assert!(env.is_active());
        assert_eq!(env.units_elapsed(), 0);
    }

    #[test]
    fn test_linear_scenario_sequence() {
        let mut env = unit_generator(EnvelopeParameters::new(5.0, 0.0, 0.0, 5.0));
        env.recompute_layout(12).unwrap();

        let expected = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 0.8, 0.6, 0.4, 0.2, 0.0, 0.0];
        for (i, want) in expected.iter().enumerate() {
            let got = env.next_coefficient();
            assert!(approx_eq(got, *want), "unit {}: got {}, want {}", i, got, want);
        }
        assert_eq!(env.stage(), Stage::Done);
        assert_eq!(env.units_elapsed(), 11);
    }

    #[test]
    fn test_stage_progression() {
        let mut env = unit_generator(EnvelopeParameters::new(2.0, 2.0, -48.0, 2.0));
        env.recompute_layout(10).unwrap();
        // A=2, D=2, R=2, S=10-8=2

        let mut stages = Vec::new();
        for _ in 0..11 {
            env.next_coefficient();
            stages.push(env.stage());
        }
        assert_eq!(
            stages,
            vec![
                Stage::Attack,
                Stage::Attack,
                Stage::Attack,
                Stage::Decay,
                Stage::Decay,
                Stage::Sustain,
                Stage::Sustain,
                Stage::Release,
                Stage::Release,
                Stage::Done,
                Stage::Done,
            ]
        );
    }

    #[test]
    fn test_decay_reaches_sustain_level() {
        let mut env = unit_generator(EnvelopeParameters::new(2.0, 4.0, -48.0, 2.0));
        env.recompute_layout(20).unwrap();

        let values = env.take_samples(7);
        assert!(approx_eq(values[2], 1.0));
        assert!(approx_eq(values[3], 0.875));
        assert!(approx_eq(values[6], 0.5));
        assert_eq!(env.stage(), Stage::Decay);

        assert!(approx_eq(env.next_coefficient(), 0.5));
        assert_eq!(env.stage(), Stage::Sustain);
    }

    #[test]
    fn test_value_at_release_tracks_live_level() {
        let mut env = unit_generator(EnvelopeParameters::new(4.0, 0.0, -24.0, 4.0));
        env.recompute_layout(20).unwrap();

        env.next_coefficient();
        let level = env.next_coefficient();
        assert!(approx_eq(env.value_at_release(), level));
    }

    #[test]
    fn test_release_starts_from_sustain_level() {
        let mut env = unit_generator(EnvelopeParameters::new(1.0, 1.0, -48.0, 2.0));
        env.recompute_layout(8).unwrap();
        // A=1, D=1, R=2, S=2: units 0..=1 attack, 2 decay, 3..=4 sustain
        let values = env.take_samples(8);
        assert!(approx_eq(values[4], 0.5));
        assert!(approx_eq(values[5], 0.25));
        assert!(approx_eq(values[6], 0.0));
        assert_eq!(values[7], 0.0);
    }

    #[test]
    fn test_held_sustain_waits_for_release() {
        let mut env = unit_generator(EnvelopeParameters::new(2.0, 2.0, -48.0, 4.0))
            .with_sustain_mode(SustainMode::Held);
        env.recompute_layout(12).unwrap();

        for _ in 0..100 {
            env.next_coefficient();
        }
        assert_eq!(env.stage(), Stage::Sustain);
        assert!(approx_eq(env.next_coefficient(), 0.5));

        env.trigger_release();
        assert_eq!(env.stage(), Stage::Release);
        let release = env.take_samples(5);
        assert!(approx_eq(release[0], 0.375));
        assert!(approx_eq(release[3], 0.0));
        assert_eq!(release[4], 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn test_held_mode_keeps_full_release() {
        // 30 release steps would overflow 10 units if they had to fit
        let mut env = unit_generator(EnvelopeParameters::new(2.0, 0.0, 0.0, 30.0))
            .with_sustain_mode(SustainMode::Held);
        let layout = *env.recompute_layout(10).unwrap();
        assert_eq!(layout.release_units(), 30);

        env.take_samples(10);
        env.trigger_release();
        let release = env.take_samples(31);
        assert!(approx_eq(release[14], 0.5));
        assert!(approx_eq(release[29], 0.0));
        assert_eq!(release[30], 0.0);
        assert_eq!(env.stage(), Stage::Done);
    }

    #[test]
    fn test_curves_follow_parameters_before_first_layout() {
        let params = EnvelopeParameters::default()
            .with_attack_shape(0.5)
            .with_release_shape(3.0);
        let env = CoefficientGenerator::new(params);
        assert_eq!(env.attack_curve, Curve::Exponential(2.0));
        assert_eq!(env.decay_curve, Curve::Logarithmic(1.0));
        assert_eq!(env.release_curve, Curve::Logarithmic(3.0));
    }

    #[test]
    fn test_early_release_during_attack() {
        let mut env = unit_generator(EnvelopeParameters::new(10.0, 0.0, 0.0, 4.0));
        env.recompute_layout(40).unwrap();

        env.take_samples(5);
        let level = env.value_at_release();
        assert!(approx_eq(level, 0.4));

        env.trigger_release();
        let first = env.next_coefficient();
        assert!(approx_eq(first, level * 0.75));
    }

    #[test]
    fn test_release_trigger_ignored_when_not_playing() {
        let mut env = unit_generator(EnvelopeParameters::default());
        env.trigger_release();
        assert_eq!(env.stage(), Stage::Idle);

        env.recompute_layout(100).unwrap();
        while env.is_active() {
            env.next_coefficient();
        }
        env.trigger_release();
        assert_eq!(env.stage(), Stage::Done);
    }

    #[test]
    fn test_retrigger_restarts() {
        let mut env = unit_generator(EnvelopeParameters::new(4.0, 1.0, -12.0, 4.0));
        env.recompute_layout(30).unwrap();
        let first_run = env.take_samples(30);

        env.trigger();
        assert_eq!(env.units_elapsed(), 0);
        assert_eq!(env.take_samples(30), first_run);
    }

    #[test]
    fn test_reset_goes_idle() {
        let mut env = unit_generator(EnvelopeParameters::default());
        env.recompute_layout(50).unwrap();
        env.take_samples(3);

        env.reset();
        assert_eq!(env.stage(), Stage::Idle);
        assert_eq!(env.next_coefficient(), 0.0);
        assert!(env.layout().is_some());

        env.trigger();
        assert_eq!(env.stage(), Stage::Attack);
    }

    #[test]
    fn test_failed_recompute_keeps_state() {
        let mut env = unit_generator(EnvelopeParameters::new(2.0, 0.0, 0.0, 2.0));
        env.recompute_layout(10).unwrap();
        env.take_samples(2);

        env.parameters_mut().set_attack_shape(0.0);
        let err = env.recompute_layout(10).unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidShape { .. }));
        assert_eq!(env.units_elapsed(), 2);
        assert_eq!(env.layout().map(|l| l.total_units()), Some(10));
    }

    #[test]
    fn test_parameter_changes_apply_on_recompute() {
        let mut env = unit_generator(EnvelopeParameters::new(4.0, 0.0, 0.0, 4.0));
        env.recompute_layout(20).unwrap();
        env.parameters_mut().set_attack_shape(0.5);

        // Still linear until recomputed
        env.next_coefficient();
        assert!(approx_eq(env.next_coefficient(), 0.25));

        env.recompute_layout(20).unwrap();
        env.next_coefficient();
        assert!(approx_eq(env.next_coefficient(), 0.0625));
    }

    #[test]
    fn test_process_buffer() {
        let mut env = CoefficientGenerator::new(EnvelopeParameters::default());
        env.recompute_layout(200).unwrap();

        let mut buffer = vec![0.0; 200];
        env.process(&mut buffer);
        for sample in buffer {
            assert!((0.0..=1.0).contains(&sample));
        }
    }

    #[test]
    fn test_can_move_to_audio_thread() {
        fn assert_send<T: Send + Clone>() {}
        assert_send::<CoefficientGenerator>();
    }
}
