//! Allocation-free DSP primitives for the reference voice.
//!
//! These components are realtime-safe and carry no host dependency, so they
//! can be embedded directly inside voice structs. The orchestration layer in
//! [`crate::synth`] never calls them itself; it only sees voices through the
//! `VoiceUnit` trait.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// Phase-accumulator oscillator waveforms.
pub mod oscillator;

pub use envelope::Stage;
pub use oscillator::Waveform;
