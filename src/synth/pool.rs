use std::fmt;

use crate::synth::params::ParamBank;
use crate::synth::voice::{Stage, VoiceFactory, VoiceUnit};

/// `note_on` found no inactive voice. The note is dropped; pool state is
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolExhausted {
    pub key: u8,
}

impl fmt::Display for PoolExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "voice pool exhausted, note {} dropped", self.key)
    }
}

impl std::error::Error for PoolExhausted {}

/// Fixed arena of voices, allocated first-free-slot in index order.
///
/// The pool is sized once at construction and never grows or shrinks. Voices
/// are owned by value, 1:1 by index, with no external aliasing; "destroying"
/// a voice only happens when the pool itself is dropped.
pub struct VoicePool<V> {
    voices: Vec<V>,
}

impl<V: VoiceUnit> VoicePool<V> {
    pub fn new<F>(factory: &F, num_voices: usize) -> Self
    where
        F: VoiceFactory<Voice = V>,
    {
        let voices = (0..num_voices).map(|_| factory.create_voice()).collect();
        Self { voices }
    }

    /// Allocate the first inactive voice for `key` and activate it.
    ///
    /// The scan runs in index order, so the tie-break between free slots is
    /// stable and deterministic. The chosen voice is started, receives the
    /// full current preset tables (it may have been idle through any number
    /// of parameter updates), and enters the attack stage.
    pub fn note_on(&mut self, key: u8, params: &ParamBank) -> Result<usize, PoolExhausted> {
        let idx = self
            .voices
            .iter()
            .position(|v| !v.is_active())
            .ok_or(PoolExhausted { key })?;

        let voice = &mut self.voices[idx];
        voice.start(key);
        params.push_all(voice);
        voice.set_stage(Stage::Attack);
        Ok(idx)
    }

    /// Move every active voice holding `key` into its release stage.
    ///
    /// The voice keeps its active flag until its own release completes; this
    /// layer never deactivates voices. No matching voice is a no-op.
    pub fn note_off(&mut self, key: u8) {
        for voice in &mut self.voices {
            if voice.is_active() && voice.key() == key {
                voice.set_stage(Stage::Release);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn voices(&self) -> &[V] {
        &self.voices
    }

    pub fn voices_mut(&mut self) -> &mut [V] {
        &mut self.voices
    }
}
