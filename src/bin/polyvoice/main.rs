//! polyvoice - terminal keyboard synthesizer
//!
//! Run with: cargo run
//!
//! The home row plays notes (a = C4 up to k = C5, with the w/e/t/y/u row for
//! sharps). `1`..`4` switch the waveform for all oscillators, `9` starts and
//! `0` stops a recording, `p` plays it back, `q` or Esc quits.
//!
//! Key events cross to the audio callback as `EngineMessage`s over an rtrb
//! ring; the callback drains them and renders, so the engine itself is only
//! ever touched from the audio thread.

use std::io::Write as _;
use std::time::{Duration, Instant};

use color_eyre::eyre::{eyre, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossterm::event::{poll, read, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use polyvoice::notify::Notifier;
use polyvoice::synth::{EngineConfig, EngineMessage, SynthEngine};
use polyvoice::voices;

/// How long a key press sustains before the note is released.
const NOTE_HOLD: Duration = Duration::from_millis(250);

/// Prints engine notifications without breaking raw-mode line discipline.
struct TermNotifier;

impl Notifier for TermNotifier {
    fn emit(&mut self, message: &str) {
        print!("{}\r\n", message);
        let _ = std::io::stdout().flush();
    }
}

fn key_to_note(c: char) -> Option<u8> {
    // Piano-style layout starting at middle C
    let note = match c {
        'a' => 60,
        'w' => 61,
        's' => 62,
        'e' => 63,
        'd' => 64,
        'f' => 65,
        't' => 66,
        'g' => 67,
        'y' => 68,
        'h' => 69,
        'u' => 70,
        'j' => 71,
        'k' => 72,
        _ => return None,
    };
    Some(note)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let (mut tx, mut rx) = rtrb::RingBuffer::<EngineMessage>::new(256);

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default audio output device"))?;
    let supported = device
        .default_output_config()
        .wrap_err("querying default output config")?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(eyre!(
            "demo only supports f32 output, device offers {:?}",
            supported.sample_format()
        ));
    }
    let channels = supported.channels() as usize;

    let config = EngineConfig {
        sample_rate: supported.sample_rate().0 as f32,
        num_voices: 8,
        num_oscillators: 2,
    };
    let factory = voices::basic(config.sample_rate, config.num_oscillators);
    let mut engine = SynthEngine::new(config, &factory, TermNotifier)
        .wrap_err("building synth engine")?;

    let mut mono = vec![0.0f32; polyvoice::MAX_BLOCK_SIZE];
    let stream = device.build_output_stream(
        &supported.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            engine.drain(&mut rx);
            for frames in data.chunks_mut(channels * 512) {
                let frame_count = frames.len() / channels;
                let mono = &mut mono[..frame_count];
                engine.render(mono);
                for (frame, &sample) in frames.chunks_mut(channels).zip(mono.iter()) {
                    frame.fill(sample);
                }
            }
        },
        |err| eprintln!("audio stream error: {err}\r"),
        None,
    )?;
    stream.play()?;

    println!("polyvoice demo - a..k play notes, 1-4 waveform, 9/0 record, p play, q quit");
    enable_raw_mode()?;
    let result = run_key_loop(&mut tx);
    disable_raw_mode()?;
    result
}

fn run_key_loop(tx: &mut rtrb::Producer<EngineMessage>) -> color_eyre::Result<()> {
    let mut pending_off: Vec<(Instant, u8)> = Vec::new();

    loop {
        // Release notes whose hold time elapsed
        let now = Instant::now();
        pending_off.retain(|&(due, key)| {
            if now >= due {
                let _ = tx.push(EngineMessage::NoteOff { key });
                false
            } else {
                true
            }
        });

        if !poll(Duration::from_millis(10))? {
            continue;
        }
        let Event::Key(key_event) = read()? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        match key_event.code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(()),
            KeyCode::Char(c @ '1'..='4') => {
                let code = c as u8 - b'1';
                for osc in 0..2 {
                    let _ = tx.push(EngineMessage::UpdateWaveform { osc, code });
                }
            }
            KeyCode::Char('9') => {
                let _ = tx.push(EngineMessage::StartRecording);
            }
            KeyCode::Char('0') => {
                let _ = tx.push(EngineMessage::StopRecording);
            }
            KeyCode::Char('p') => {
                let _ = tx.push(EngineMessage::PlayRecording);
            }
            KeyCode::Char(c) => {
                if let Some(key) = key_to_note(c) {
                    // Full ring just drops the note, same as an exhausted pool
                    let _ = tx.push(EngineMessage::NoteOn { key });
                    pending_off.push((Instant::now() + NOTE_HOLD, key));
                }
            }
            _ => {}
        }
    }
}
