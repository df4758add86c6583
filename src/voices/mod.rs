//! Reference voice implementations.
//!
//! The orchestration layer only knows the `VoiceUnit` trait; hosts are
//! expected to bring their own voices. [`BasicVoice`] is the batteries
//! included option: a stack of oscillator lanes with per-lane envelopes,
//! enough to run the engine end to end without any external collaborator.

pub mod basic;

pub use basic::BasicVoice;

/// Factory producing [`BasicVoice`]s for a pool.
///
/// ```no_run
/// use polyvoice::notify::NullNotifier;
/// use polyvoice::synth::{EngineConfig, SynthEngine};
/// use polyvoice::voices;
///
/// let config = EngineConfig::default();
/// let factory = voices::basic(config.sample_rate, config.num_oscillators);
/// let mut engine = SynthEngine::new(config, &factory, NullNotifier).unwrap();
/// engine.note_on(60);
/// ```
pub fn basic(sample_rate: f32, num_oscillators: usize) -> impl Fn() -> BasicVoice + Send {
    move || BasicVoice::new(sample_rate, num_oscillators)
}
