//! Interactive envelope preview.
//!
//! Draws the envelope shape across the whole terminal and redraws it as the
//! parameters change.
//!
//!   a / A   attack  -/+        1 / !   attack shape  -/+
//!   d / D   decay   -/+        2 / @   decay shape   -/+
//!   s / S   sustain -/+ (dB)   3 / #   release shape -/+
//!   r / R   release -/+
//!
//! Press Q or ESC to quit.

mod common;

use anyhow::Result;
use common::{KeyAction, TerminalGuard, init_logging, is_quit_key, run_key_loop};
use crossterm::{
    ExecutableCommand,
    event::{KeyCode, KeyEventKind},
    terminal::{self, Clear, ClearType},
};
use envelope_curve::{EnvelopeParameters, EnvelopePreview, TextCanvas};
use std::io::{Write, stdout};

const STEP: f64 = 1.0;
const SUSTAIN_STEP_DB: f64 = 3.0;
const SHAPE_FACTOR: f64 = 1.25;

fn adjust(params: &mut EnvelopeParameters, code: KeyCode) -> bool {
    match code {
        KeyCode::Char('a') => params.set_attack((params.attack() - STEP).max(0.0)),
        KeyCode::Char('A') => params.set_attack(params.attack() + STEP),
        KeyCode::Char('d') => params.set_decay((params.decay() - STEP).max(0.0)),
        KeyCode::Char('D') => params.set_decay(params.decay() + STEP),
        KeyCode::Char('s') => params.set_sustain((params.sustain() - SUSTAIN_STEP_DB).max(-96.0)),
        KeyCode::Char('S') => params.set_sustain((params.sustain() + SUSTAIN_STEP_DB).min(0.0)),
        KeyCode::Char('r') => params.set_release((params.release() - STEP).max(0.0)),
        KeyCode::Char('R') => params.set_release(params.release() + STEP),
        KeyCode::Char('1') => params.set_attack_shape(params.attack_shape() / SHAPE_FACTOR),
        KeyCode::Char('!') => params.set_attack_shape(params.attack_shape() * SHAPE_FACTOR),
        KeyCode::Char('2') => params.set_decay_shape(params.decay_shape() / SHAPE_FACTOR),
        KeyCode::Char('@') => params.set_decay_shape(params.decay_shape() * SHAPE_FACTOR),
        KeyCode::Char('3') => params.set_release_shape(params.release_shape() / SHAPE_FACTOR),
        KeyCode::Char('#') => params.set_release_shape(params.release_shape() * SHAPE_FACTOR),
        _ => return false,
    }
    true
}

fn draw(preview: &mut EnvelopePreview) -> Result<()> {
    let (columns, rows) = terminal::size()?;
    // Top row is the status line
    let mut canvas = TextCanvas::new(columns as u32, rows.saturating_sub(1) as u32);

    let mut stdout = stdout();
    stdout.execute(Clear(ClearType::All))?;
    stdout.execute(crossterm::cursor::MoveTo(0, 0))?;

    let p = *preview.parameters();
    write!(
        stdout,
        "A {:.0}  D {:.0}  S {:.0} dB  R {:.0}  shapes {:.2}/{:.2}/{:.2}  Q=quit",
        p.attack(),
        p.decay(),
        p.sustain(),
        p.release(),
        p.attack_shape(),
        p.decay_shape(),
        p.release_shape(),
    )?;

    match preview.paint(&mut canvas) {
        Ok(()) => {
            for (i, row) in canvas.rows().enumerate() {
                stdout.execute(crossterm::cursor::MoveTo(0, i as u16 + 1))?;
                write!(stdout, "{}", row)?;
            }
        }
        Err(err) => {
            stdout.execute(crossterm::cursor::MoveTo(0, 2))?;
            write!(stdout, "cannot draw envelope: {}", err)?;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    init_logging();

    let mut preview = EnvelopePreview::new(EnvelopeParameters::new(6.0, 4.0, -12.0, 8.0));
    {
        let _terminal = TerminalGuard::enter(false)?;
        draw(&mut preview)?;

        run_key_loop(|key_event| {
            if !matches!(key_event.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                return Ok(KeyAction::Continue);
            }
            if is_quit_key(key_event.code) {
                return Ok(KeyAction::Exit);
            }
            if adjust(preview.parameters_mut(), key_event.code) {
                draw(&mut preview)?;
            }
            Ok(KeyAction::Continue)
        })?;
    }

    println!("Goodbye!");
    Ok(())
}
