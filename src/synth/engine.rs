use std::fmt;

use crate::notify::{Diagnostic, Notifier};
use crate::synth::message::{EngineMessage, MessageReceiver};
use crate::synth::mixer;
use crate::synth::params::{derived_offset, ParamBank};
use crate::synth::pool::VoicePool;
use crate::synth::recorder::{offset_in_range, Playback, Recorder, KEY_MAX, KEY_MIN, OFFSET_MAX};
use crate::synth::voice::{EnvelopePreset, VoiceFactory, VoiceUnit, Waveform};
use crate::MAX_BLOCK_SIZE;

/// Construction parameters, fixed for the engine's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Output sample rate in Hz. Must be positive.
    pub sample_rate: f32,
    /// Size of the voice pool. Fixed for the process lifetime.
    pub num_voices: usize,
    /// Number of oscillator slots a preset broadcast addresses.
    pub num_oscillators: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            num_voices: 8,
            num_oscillators: 4,
        }
    }
}

impl EngineConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate > 0.0) {
            return Err(ConfigError::InvalidSampleRate(self.sample_rate));
        }
        if self.num_voices == 0 {
            return Err(ConfigError::ZeroVoices);
        }
        if self.num_oscillators == 0 {
            return Err(ConfigError::ZeroOscillators);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    InvalidSampleRate(f32),
    ZeroVoices,
    ZeroOscillators,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSampleRate(rate) => {
                write!(f, "sample rate must be positive, got {}", rate)
            }
            ConfigError::ZeroVoices => write!(f, "voice pool needs at least one voice"),
            ConfigError::ZeroOscillators => write!(f, "need at least one oscillator slot"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The orchestration facade: voice pool, parameter bank, recorder, and the
/// global transposition offset behind one interface.
///
/// All operations assume a single logical thread: the engine performs no
/// locking, and correctness depends on the host serializing calls (the
/// supported cross-thread path is an `rtrb` ring drained via
/// [`drain`](SynthEngine::drain) on the audio thread). No operation blocks,
/// panics on bad input, or propagates a fatal error; recoverable problems go
/// through the injected [`Notifier`].
///
/// # Global offset ownership
///
/// The offset lives here, nowhere else, and has exactly two producers:
/// [`update_envelope`](SynthEngine::update_envelope) (derived from attack and
/// decay, applied only when in range) and
/// [`set_synth_data`](SynthEngine::set_synth_data) (explicit, validated).
/// Recorded keys snapshot it at capture time; playback decodes against those
/// snapshots, so later offset changes never alter recorded history.
pub struct SynthEngine<V: VoiceUnit, N: Notifier> {
    config: EngineConfig,
    pool: VoicePool<V>,
    params: ParamBank,
    recorder: Recorder,
    notifier: N,
    offset: i32,
    scratch: Vec<f32>,
}

impl<V: VoiceUnit, N: Notifier> SynthEngine<V, N> {
    pub fn new<F>(config: EngineConfig, factory: &F, notifier: N) -> Result<Self, ConfigError>
    where
        F: VoiceFactory<Voice = V>,
    {
        config.validate()?;
        Ok(Self {
            config,
            pool: VoicePool::new(factory, config.num_voices),
            params: ParamBank::new(),
            recorder: Recorder::new(),
            notifier,
            offset: OFFSET_MAX,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        })
    }

    /// Dispatch a note to the first free voice.
    ///
    /// The voice inherits the full current preset tables and enters attack.
    /// With no free voice the note is dropped and reported; pool state is
    /// untouched. During a recording session the key is captured with the
    /// current offset snapshot.
    pub fn note_on(&mut self, key: u8) {
        match self.pool.note_on(key, &self.params) {
            Ok(_) => {
                if self.recorder.is_recording() && !self.recorder.add_key(key, self.offset) {
                    self.notifier.report(Diagnostic::RecordingFull { key });
                }
            }
            Err(exhausted) => {
                self.notifier
                    .report(Diagnostic::PoolExhausted { key: exhausted.key });
            }
        }
    }

    /// Release every active voice holding `key`. No match is a no-op.
    pub fn note_off(&mut self, key: u8) {
        self.pool.note_off(key);
    }

    /// Mix all active voices into `out` at the fixed per-voice attenuation.
    ///
    /// This is the render-callback entry point: non-blocking, allocation
    /// free, bounded by voices × samples. Requests longer than
    /// [`MAX_BLOCK_SIZE`] are processed in chunks.
    pub fn render(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            mixer::mix_active(self.pool.voices_mut(), chunk, &mut self.scratch);
        }
    }

    /// Allocating convenience for hosts that want an owned buffer per render
    /// period. Prefer [`render`](SynthEngine::render) inside audio callbacks.
    pub fn next_block(&mut self, len: usize) -> Vec<f32> {
        let mut out = vec![0.0; len];
        self.render(&mut out);
        out
    }

    /// Store level `osc` and broadcast it to currently active voices.
    pub fn update_level(&mut self, osc: usize, value: f32) {
        self.params.set_level(osc, value);
        self.params.broadcast_level(osc, self.pool.voices_mut());
    }

    /// Store envelope preset `osc`, broadcast it to active voices, and derive
    /// the global offset from attack and decay.
    ///
    /// The store and broadcast happen unconditionally. Only the offset is
    /// gated: a derived value outside the valid range is reported and the
    /// current offset stays as it was.
    pub fn update_envelope(
        &mut self,
        osc: usize,
        attack: f32,
        decay: f32,
        sustain: f32,
        release: f32,
        amplitude: f32,
    ) {
        let preset = EnvelopePreset {
            attack,
            decay,
            sustain,
            release,
            amplitude,
        };
        self.params.set_envelope(osc, preset);
        self.params.broadcast_envelope(osc, self.pool.voices_mut());

        let derived = derived_offset(attack, decay);
        if offset_in_range(derived) {
            self.offset = derived;
        } else {
            self.notifier
                .report(Diagnostic::OffsetOutOfRange { derived });
        }
    }

    /// Store and broadcast a waveform to every voice, active or not.
    /// Unknown codes are rejected fail-closed.
    pub fn update_waveform(&mut self, osc: usize, code: u8) {
        match Waveform::from_code(code) {
            Some(waveform) => {
                self.params.set_waveform(osc, waveform);
                self.params.broadcast_waveform(osc, self.pool.voices_mut());
            }
            None => {
                self.notifier
                    .report(Diagnostic::InvalidWaveformCode { code });
            }
        }
    }

    /// Store and broadcast an oscillator enable flag to every voice, active
    /// or not.
    pub fn enable_oscillator(&mut self, osc: usize, enabled: bool) {
        self.params.set_enabled(osc, enabled);
        self.params.broadcast_enabled(osc, self.pool.voices_mut());
    }

    pub fn start_recording(&mut self) {
        self.recorder.start(&mut self.notifier);
    }

    pub fn stop_recording(&mut self) {
        self.recorder.stop(&mut self.notifier);
    }

    /// Decode the recorded song. `None` when any playback precondition
    /// fails; see [`Recorder::playback`].
    pub fn play_recording(&self) -> Option<Playback> {
        self.recorder.playback(self.offset)
    }

    /// String form of [`play_recording`](SynthEngine::play_recording), with
    /// the empty string as the failure sentinel.
    pub fn play_recording_log(&self) -> String {
        self.play_recording()
            .map(|playback| playback.render())
            .unwrap_or_default()
    }

    /// Programmatic capture path, distinct from interactive note-on: sets
    /// the global offset and appends a key to the recording, but never
    /// allocates or activates a voice.
    ///
    /// Both arguments are validated; on failure nothing changes and the
    /// rejection is reported.
    pub fn set_synth_data(&mut self, key: u8, offset: i32) {
        if !(KEY_MIN..=KEY_MAX).contains(&key) || !offset_in_range(offset) {
            self.notifier
                .report(Diagnostic::SynthDataRejected { key, offset });
            return;
        }
        self.offset = offset;
        if !self.recorder.add_key(key, offset) {
            self.notifier.report(Diagnostic::RecordingFull { key });
        }
    }

    /// Apply every pending control message. Call at the top of the render
    /// period, before [`render`](SynthEngine::render).
    pub fn drain<M: MessageReceiver>(&mut self, rx: &mut M) {
        while let Some(message) = rx.pop() {
            match message {
                EngineMessage::NoteOn { key } => self.note_on(key),
                EngineMessage::NoteOff { key } => self.note_off(key),
                EngineMessage::UpdateLevel { osc, value } => self.update_level(osc, value),
                EngineMessage::UpdateEnvelope {
                    osc,
                    attack,
                    decay,
                    sustain,
                    release,
                    amplitude,
                } => self.update_envelope(osc, attack, decay, sustain, release, amplitude),
                EngineMessage::UpdateWaveform { osc, code } => self.update_waveform(osc, code),
                EngineMessage::EnableOscillator { osc, enabled } => {
                    self.enable_oscillator(osc, enabled)
                }
                EngineMessage::StartRecording => self.start_recording(),
                EngineMessage::StopRecording => self.stop_recording(),
                EngineMessage::PlayRecording => {
                    let rendered = self.play_recording_log();
                    if !rendered.is_empty() {
                        self.notifier.emit(&rendered);
                    }
                }
                EngineMessage::SetSynthData { key, offset } => self.set_synth_data(key, offset),
            }
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    /// Current global transposition offset.
    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn voices(&self) -> &[V] {
        self.pool.voices()
    }

    pub fn active_voices(&self) -> usize {
        self.pool.active_count()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn recorded_keys(&self) -> usize {
        self.recorder.len()
    }

    pub fn params(&self) -> &ParamBank {
        &self.params
    }
}
