//! Interactive envelope playback.
//!
//! Press and hold SPACE to play a tone shaped by the envelope. It moves
//! through attack and decay and holds the sustain level while SPACE is down.
//! Releasing SPACE starts the release ramp from wherever the envelope is.
//! Press Q or ESC to quit.

mod common;

use anyhow::{Result, anyhow};
use common::{
    DemoAudio, KeyAction, TerminalGuard, init_logging, is_quit_key, run_key_loop, start_audio,
};
use crossterm::{
    ExecutableCommand,
    event::{KeyCode, KeyEventKind},
    terminal::{Clear, ClearType},
};
use envelope_curve::envelopes::MIN_TOTAL_UNITS;
use envelope_curve::{
    CoefficientGenerator, EnvelopeParameters, Signal, Stage, SustainMode, Timebase,
};
use std::f64::consts::TAU;
use std::io::{Write, stdout};
use std::sync::{Arc, Mutex};

// One parameter step is 10ms of audio
const SECONDS_PER_STEP: f64 = 0.01;
const VOLUME: f64 = 0.3;

struct Sine {
    phase: f64,
    increment: f64,
}

impl Sine {
    fn new(frequency: f64, sample_rate: f64) -> Self {
        Self {
            phase: 0.0,
            increment: frequency / sample_rate,
        }
    }
}

impl Signal for Sine {
    fn next_sample(&mut self) -> f64 {
        let sample = (self.phase * TAU).sin();
        self.phase = (self.phase + self.increment).fract();
        sample
    }
}

struct Voice {
    oscillator: Sine,
    envelope: CoefficientGenerator,
    space_pressed: bool,
}

impl Voice {
    fn new(params: EnvelopeParameters, sample_rate: f64) -> Result<Self> {
        let mut envelope = CoefficientGenerator::new(params)
            .with_timebase(Timebase::from_sample_rate(sample_rate, SECONDS_PER_STEP))
            .with_sustain_mode(SustainMode::Held);
        // Held layouts keep every phase at full length, so the minimum total will do
        envelope.recompute_layout(MIN_TOTAL_UNITS)?;
        envelope.reset();

        Ok(Self {
            oscillator: Sine::new(440.0, sample_rate),
            envelope,
            space_pressed: false,
        })
    }

    fn handle_key(&mut self, kind: KeyEventKind) {
        match kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if !self.space_pressed {
                    self.space_pressed = true;
                    self.envelope.trigger();
                }
            }
            KeyEventKind::Release => {
                self.space_pressed = false;
                self.envelope.trigger_release();
            }
        }
    }
}

impl DemoAudio for Voice {
    fn next_sample(&mut self) -> f64 {
        self.oscillator.next_sample() * self.envelope.next_coefficient() * VOLUME
    }
}

fn draw_ui(stage: Stage) -> Result<()> {
    let mut stdout = stdout();
    stdout.execute(Clear(ClearType::All))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;
    write!(
        stdout,
        "Envelope: {:<8} | HOLD SPACE=play  RELEASE=stop  Q=quit",
        format!("{:?}", stage)
    )?;
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let params = EnvelopeParameters::new(5.0, 10.0, -24.0, 30.0)
        .with_attack_shape(0.5)
        .with_decay_shape(2.0)
        .with_release_shape(3.0);

    // The voice needs the device rate, which is only known once the stream is
    // open; start silent and swap the real voice in.
    let voice = Arc::new(Mutex::new(None::<Voice>));
    let (_stream, sample_rate) = start_audio(Arc::new(Mutex::new(Slot(voice.clone()))))?;
    *voice.lock().map_err(|_| anyhow!("voice lock poisoned"))? =
        Some(Voice::new(params, sample_rate)?);

    {
        let _terminal = TerminalGuard::enter(true)?;
        draw_ui(Stage::Idle)?;

        run_key_loop(|key_event| {
            if is_quit_key(key_event.code) && key_event.kind == KeyEventKind::Press {
                return Ok(KeyAction::Exit);
            }

            let mut guard = voice.lock().map_err(|_| anyhow!("voice lock poisoned"))?;
            let Some(active) = guard.as_mut() else {
                return Ok(KeyAction::Continue);
            };
            if key_event.code == KeyCode::Char(' ') {
                active.handle_key(key_event.kind);
            }
            let stage = active.envelope.stage();
            drop(guard);

            draw_ui(stage)?;
            Ok(KeyAction::Continue)
        })?;
    }

    println!("Goodbye!");
    Ok(())
}

/// Plays silence until a voice is installed.
struct Slot(Arc<Mutex<Option<Voice>>>);

impl DemoAudio for Slot {
    fn next_sample(&mut self) -> f64 {
        match self.0.lock() {
            Ok(mut voice) => voice.as_mut().map_or(0.0, DemoAudio::next_sample),
            Err(_) => 0.0,
        }
    }
}
