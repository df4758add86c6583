//! Preset storage and the asymmetric broadcast rules.
//!
//! Envelope and level presets are per-note dynamic state: idle voices have no
//! use for them, so updates reach **active voices only** and idle voices
//! inherit the full current tables lazily when the pool activates them
//! ([`ParamBank::push_all`]). Waveform and enable flags are static
//! configuration that must be consistent pool-wide at all times, so those
//! updates reach **every voice, active or not**.

use std::collections::BTreeMap;

use crate::synth::voice::{EnvelopePreset, VoiceUnit, Waveform};

/// Derive the global transposition offset from an envelope update.
///
/// Attack and decay are truncated to 8-bit unsigned values and subtracted.
/// Timbre parameters feeding a pitch-transposition scalar is an existing
/// contract of the recording format, not an incidental coupling; callers
/// validate the result against the recorder's offset range before applying
/// it.
pub fn derived_offset(attack: f32, decay: f32) -> i32 {
    attack as u8 as i32 - decay as u8 as i32
}

/// Current per-oscillator presets, keyed by oscillator index.
///
/// The maps are unbounded in the index but practically sized to the engine's
/// oscillator count; `BTreeMap` keeps broadcast order deterministic.
#[derive(Debug, Default)]
pub struct ParamBank {
    envelopes: BTreeMap<usize, EnvelopePreset>,
    levels: BTreeMap<usize, f32>,
    waveforms: BTreeMap<usize, Waveform>,
    enabled: BTreeMap<usize, bool>,
}

impl ParamBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_envelope(&mut self, osc: usize, preset: EnvelopePreset) {
        self.envelopes.insert(osc, preset);
    }

    pub fn envelope(&self, osc: usize) -> Option<EnvelopePreset> {
        self.envelopes.get(&osc).copied()
    }

    pub fn set_level(&mut self, osc: usize, level: f32) {
        self.levels.insert(osc, level);
    }

    pub fn level(&self, osc: usize) -> Option<f32> {
        self.levels.get(&osc).copied()
    }

    pub fn set_waveform(&mut self, osc: usize, waveform: Waveform) {
        self.waveforms.insert(osc, waveform);
    }

    pub fn waveform(&self, osc: usize) -> Option<Waveform> {
        self.waveforms.get(&osc).copied()
    }

    pub fn set_enabled(&mut self, osc: usize, enabled: bool) {
        self.enabled.insert(osc, enabled);
    }

    pub fn is_enabled(&self, osc: usize) -> Option<bool> {
        self.enabled.get(&osc).copied()
    }

    /// Send envelope preset `osc` to active voices only.
    pub fn broadcast_envelope<V: VoiceUnit>(&self, osc: usize, voices: &mut [V]) {
        if let Some(preset) = self.envelope(osc) {
            for voice in voices.iter_mut().filter(|v| v.is_active()) {
                voice.set_envelope(osc, preset);
            }
        }
    }

    /// Send level `osc` to active voices only.
    pub fn broadcast_level<V: VoiceUnit>(&self, osc: usize, voices: &mut [V]) {
        if let Some(level) = self.level(osc) {
            for voice in voices.iter_mut().filter(|v| v.is_active()) {
                voice.set_level(osc, level);
            }
        }
    }

    /// Send waveform `osc` to every voice, active or not.
    pub fn broadcast_waveform<V: VoiceUnit>(&self, osc: usize, voices: &mut [V]) {
        if let Some(waveform) = self.waveform(osc) {
            for voice in voices.iter_mut() {
                voice.set_waveform(osc, waveform);
            }
        }
    }

    /// Send the enable flag for `osc` to every voice, active or not.
    pub fn broadcast_enabled<V: VoiceUnit>(&self, osc: usize, voices: &mut [V]) {
        if let Some(enabled) = self.is_enabled(osc) {
            for voice in voices.iter_mut() {
                voice.enable_oscillator(osc, enabled);
            }
        }
    }

    /// Push the entire envelope and level tables to one voice.
    ///
    /// This is the note-on inheritance step: a freshly activated voice missed
    /// every active-only broadcast while it was idle. Waveform and enable
    /// state needs no push here, those reached it while idle.
    pub fn push_all<V: VoiceUnit>(&self, voice: &mut V) {
        for (&osc, &preset) in &self.envelopes {
            voice.set_envelope(osc, preset);
        }
        for (&osc, &level) in &self.levels {
            voice.set_level(osc, level);
        }
    }
}
