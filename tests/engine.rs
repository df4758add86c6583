//! End-to-end engine behavior through the public API only.
//!
//! The scenario tests use a scripted voice that emits a constant 1.0 while
//! active, so mixdown sums are exact; the final test runs the shipped
//! `BasicVoice` to cover the whole stack.

use std::sync::{Arc, Mutex};

use polyvoice::notify::{Diagnostic, Notifier};
use polyvoice::synth::{
    EngineConfig, EnvelopePreset, Stage, SynthEngine, VoiceUnit, Waveform,
};
use polyvoice::voices;

/// Deterministic voice: renders 1.0 while active, releases after
/// `release_samples` rendered samples in the release stage.
struct ScriptedVoice {
    key: u8,
    active: bool,
    iteration: u64,
    stage: Stage,
    release_samples: u64,
    released_for: u64,
}

impl ScriptedVoice {
    fn new() -> Self {
        Self {
            key: 0,
            active: false,
            iteration: 0,
            stage: Stage::Idle,
            release_samples: 4,
            released_for: 0,
        }
    }
}

impl VoiceUnit for ScriptedVoice {
    fn key(&self) -> u8 {
        self.key
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn iteration(&self) -> u64 {
        self.iteration
    }

    fn stage(&self) -> Stage {
        self.stage
    }

    fn start(&mut self, key: u8) {
        self.key = key;
        self.iteration = 0;
        self.active = true;
        self.released_for = 0;
    }

    fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    fn set_envelope(&mut self, _osc: usize, _preset: EnvelopePreset) {}

    fn set_level(&mut self, _osc: usize, _level: f32) {}

    fn set_waveform(&mut self, _osc: usize, _waveform: Waveform) {}

    fn enable_oscillator(&mut self, _osc: usize, _enabled: bool) {}

    fn render(&mut self, out: &mut [f32]) {
        out.fill(1.0);
        self.iteration += out.len() as u64;
        if self.stage == Stage::Release {
            self.released_for += out.len() as u64;
            if self.released_for >= self.release_samples {
                self.active = false;
                self.stage = Stage::Idle;
            }
        }
    }
}

/// Notifier whose log is observable from outside the engine.
#[derive(Clone, Default)]
struct SharedNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    diagnostics: Arc<Mutex<Vec<Diagnostic>>>,
}

impl Notifier for SharedNotifier {
    fn emit(&mut self, message: &str) {
        self.messages.lock().unwrap().push(message.to_owned());
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.lock().unwrap().push(diagnostic);
    }
}

fn scripted_engine(
    num_voices: usize,
) -> (SynthEngine<ScriptedVoice, SharedNotifier>, SharedNotifier) {
    let notifier = SharedNotifier::default();
    let config = EngineConfig {
        sample_rate: 48_000.0,
        num_voices,
        num_oscillators: 2,
    };
    let engine = SynthEngine::new(config, &ScriptedVoice::new, notifier.clone()).unwrap();
    (engine, notifier)
}

#[test]
fn note_lifecycle_walkthrough() {
    // numOfVoices=4, numOfOscillators=2 reference scenario
    let (mut engine, _notifier) = scripted_engine(4);

    engine.note_on(60);
    assert_eq!(engine.active_voices(), 1);
    let voice = &engine.voices()[0];
    assert_eq!(voice.key(), 60);
    assert_eq!(voice.stage(), Stage::Attack);

    // Output is exactly 0.1 x the voice's samples
    let out = engine.next_block(10);
    assert_eq!(out.len(), 10);
    for &s in &out {
        assert!((s - 0.1).abs() < 1e-6);
    }

    // Release marks the stage but leaves the voice active...
    engine.note_off(60);
    assert_eq!(engine.voices()[0].stage(), Stage::Release);
    assert!(engine.voices()[0].is_active());

    // ...until the voice itself finishes releasing
    let _ = engine.next_block(16);
    assert_eq!(engine.active_voices(), 0);
}

#[test]
fn exhausted_pool_drops_the_note_and_reports() {
    let (mut engine, notifier) = scripted_engine(4);
    for key in [60, 62, 64, 65] {
        engine.note_on(key);
    }

    engine.note_on(67);

    assert_eq!(engine.active_voices(), 4);
    let keys: Vec<u8> = engine.voices().iter().map(|v| v.key()).collect();
    assert_eq!(keys, vec![60, 62, 64, 65]);
    assert_eq!(
        notifier.diagnostics.lock().unwrap().as_slice(),
        &[Diagnostic::PoolExhausted { key: 67 }]
    );
}

#[test]
fn mix_scales_with_active_voice_count() {
    let (mut engine, _notifier) = scripted_engine(4);

    let silent = engine.next_block(8);
    assert!(silent.iter().all(|&s| s == 0.0));

    engine.note_on(60);
    engine.note_on(64);
    engine.note_on(67);
    let out = engine.next_block(8);
    for &s in &out {
        assert!((s - 0.3).abs() < 1e-6);
    }
}

#[test]
fn recording_snapshots_the_offset_per_key() {
    let (mut engine, _notifier) = scripted_engine(8);
    engine.start_recording();

    engine.update_envelope(0, 30.0, 28.0, 0.7, 0.3, 1.0); // offset = 2
    engine.note_on(60);
    engine.update_envelope(0, 28.0, 31.0, 0.7, 0.3, 1.0); // offset = -3
    engine.note_on(64);
    engine.stop_recording();

    let playback = engine.play_recording().expect("playback preconditions hold");
    assert_eq!(playback.log, "(60,2),(64,-3)");
    assert_eq!(playback.decoded, vec![58, 67]);

    let rendered = playback.render();
    let (_banner, log) = rendered.split_once('|').unwrap();
    assert_eq!(log, "(60,2),(64,-3)");
}

#[test]
fn invalid_derived_offset_leaves_recording_offset_alone() {
    let (mut engine, notifier) = scripted_engine(2);
    engine.start_recording();
    engine.update_envelope(0, 30.0, 28.0, 0.7, 0.3, 1.0); // offset = 2

    engine.update_envelope(0, 100.0, 40.0, 0.7, 0.3, 1.0); // derived 60: rejected
    engine.note_on(60);
    engine.stop_recording();

    assert_eq!(engine.offset(), 2);
    assert_eq!(engine.play_recording().unwrap().log, "(60,2)");
    assert_eq!(
        notifier.diagnostics.lock().unwrap().as_slice(),
        &[Diagnostic::OffsetOutOfRange { derived: 60 }]
    );
}

#[test]
fn set_synth_data_round_trip() {
    let (mut engine, notifier) = scripted_engine(2);

    // Rejected: no recorded keys, no offset change, no voice activity
    engine.set_synth_data(59, 0);
    engine.set_synth_data(96, 0);
    engine.set_synth_data(60, 29);
    assert_eq!(engine.recorded_keys(), 0);
    assert_eq!(engine.active_voices(), 0);
    assert_eq!(notifier.diagnostics.lock().unwrap().len(), 3);

    // Accepted: records without allocating a voice
    engine.set_synth_data(72, 12);
    engine.set_synth_data(60, -5);
    assert_eq!(engine.recorded_keys(), 2);
    assert_eq!(engine.active_voices(), 0);
    assert_eq!(engine.offset(), -5);

    let playback = engine.play_recording().unwrap();
    assert_eq!(playback.log, "(72,12),(60,-5)");
    assert_eq!(playback.decoded, vec![60, 65]);
}

#[test]
fn play_recording_sentinels() {
    let (mut engine, _notifier) = scripted_engine(2);

    // Nothing recorded
    assert_eq!(engine.play_recording_log(), "");

    // Session still active
    engine.start_recording();
    engine.note_on(60);
    assert!(engine.play_recording().is_none());

    engine.stop_recording();
    assert!(engine.play_recording().is_some());
}

#[test]
fn over_recording_is_capped_and_playback_stays_well_formed() {
    let (mut engine, notifier) = scripted_engine(8);
    engine.start_recording();

    for i in 0..200u32 {
        let key = 60 + (i % 8) as u8;
        engine.note_on(key);
        engine.note_off(key);
        let _ = engine.next_block(8); // let voices release so the pool never exhausts
    }
    engine.stop_recording();

    assert_eq!(engine.recorded_keys(), 128);
    assert!(notifier
        .diagnostics
        .lock()
        .unwrap()
        .iter()
        .any(|d| matches!(d, Diagnostic::RecordingFull { .. })));

    let playback = engine.play_recording().unwrap();
    assert_eq!(playback.decoded.len(), 128);
    assert!(!playback.log.ends_with(','));
}

#[test]
fn basic_voice_stack_renders_audio_end_to_end() {
    let notifier = SharedNotifier::default();
    let config = EngineConfig {
        sample_rate: 48_000.0,
        num_voices: 4,
        num_oscillators: 2,
    };
    let factory = voices::basic(config.sample_rate, config.num_oscillators);
    let mut engine = SynthEngine::new(config, &factory, notifier).unwrap();

    engine.update_envelope(0, 0.001, 0.01, 0.8, 0.05, 1.0);
    engine.update_envelope(1, 0.001, 0.01, 0.8, 0.05, 1.0);
    engine.update_waveform(0, Waveform::Saw.code());
    engine.note_on(60);
    engine.note_on(67);

    let out = engine.next_block(512);
    assert!(out.iter().any(|&s| s.abs() > 0.0));

    engine.note_off(60);
    engine.note_off(67);
    // 50 ms release at 48 kHz is 2400 samples; render past it
    let mut tail = vec![0.0f32; 4096];
    engine.render(&mut tail);
    assert_eq!(engine.active_voices(), 0);

    let silent = engine.next_block(64);
    assert!(silent.iter().all(|&s| s == 0.0));
}
