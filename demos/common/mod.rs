//! Shared terminal and audio plumbing for the demos.

// Not every demo uses every helper
#![allow(dead_code)]

use anyhow::Result;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, StreamConfig};
use crossterm::{
    ExecutableCommand,
    event::{
        self, Event, KeyCode, KeyEvent, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use std::io::stdout;
use std::panic;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::Level;

/// Something the audio callback can pull mono samples from.
pub trait DemoAudio: Send + 'static {
    fn next_sample(&mut self) -> f64;
}

/// Whether the event loop keeps going.
pub enum KeyAction {
    Continue,
    Exit,
}

/// Logs go to stderr so they don't fight with the alternate screen.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_max_level(Level::WARN)
        .with_writer(std::io::stderr)
        .init();
}

/// Raw mode plus alternate screen, restored on drop or panic.
pub struct TerminalGuard {
    key_release_events: bool,
}

impl TerminalGuard {
    /// Enters the alternate screen. With `key_release_events`, the terminal is
    /// asked to report key releases too (needed for hold-to-play).
    pub fn enter(key_release_events: bool) -> Result<Self> {
        // Keyboard enhancements must be pushed before the alternate screen
        if key_release_events {
            stdout().execute(PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
            ))?;
        }
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;
        stdout().execute(crossterm::cursor::Hide)?;

        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal(key_release_events);
            original_hook(panic_info);
        }));

        Ok(Self { key_release_events })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(self.key_release_events);
    }
}

fn restore_terminal(key_release_events: bool) {
    if key_release_events {
        let _ = stdout().execute(PopKeyboardEnhancementFlags);
    }
    let _ = stdout().execute(crossterm::cursor::Show);
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Polls key events until the handler asks to exit.
pub fn run_key_loop<K>(mut handler: K) -> Result<()>
where
    K: FnMut(&KeyEvent) -> Result<KeyAction>,
{
    loop {
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(key_event) = event::read()?
        {
            if let KeyAction::Exit = handler(&key_event)? {
                return Ok(());
            }
        }
    }
}

/// Opens the default output device and streams samples from `source`.
///
/// Returns the stream (keep it alive while playing) and the device sample rate.
pub fn start_audio<S: DemoAudio>(source: Arc<Mutex<S>>) -> Result<(cpal::Stream, f64)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f64;

    let stream = match config.sample_format() {
        SampleFormat::F32 => build_stream::<f32, S>(&device, &config.into(), source)?,
        SampleFormat::I16 => build_stream::<i16, S>(&device, &config.into(), source)?,
        SampleFormat::U16 => build_stream::<u16, S>(&device, &config.into(), source)?,
        sample_format => {
            return Err(anyhow::anyhow!(
                "Unsupported sample format: {}",
                sample_format
            ));
        }
    };
    stream.play()?;

    Ok((stream, sample_rate))
}

fn build_stream<T, S>(
    device: &cpal::Device,
    config: &StreamConfig,
    source: Arc<Mutex<S>>,
) -> Result<cpal::Stream>
where
    T: Sample + FromSample<f64> + cpal::SizedSample,
    S: DemoAudio,
{
    let channels = config.channels as usize;

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            let Ok(mut source) = source.lock() else {
                return;
            };
            for frame in data.chunks_mut(channels) {
                let value: T = T::from_sample(source.next_sample());
                frame.fill(value);
            }
        },
        |err| tracing::error!("audio stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Q and Escape quit every demo.
pub fn is_quit_key(code: KeyCode) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
}
