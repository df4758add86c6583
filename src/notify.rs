//! Host-facing status and diagnostic sinks.
//!
//! The engine never talks to a host runtime directly. User-facing messages
//! (recording started, playback output) and non-fatal diagnostics (rejected
//! parameters, dropped notes) both flow through an injected [`Notifier`], so
//! the orchestration core stays unit-testable in isolation. Delivery is
//! fire-and-forget: no return value, no retry, no guarantee the host shows
//! anything.

use std::fmt;

/// Sink for user-facing messages and non-fatal diagnostics.
pub trait Notifier: Send {
    /// Emit a status message intended for the user.
    fn emit(&mut self, message: &str);

    /// Report a recoverable problem. Diagnostics never abort the operation
    /// that raised them; at most the offending value is ignored.
    ///
    /// The default implementation renders the diagnostic through [`emit`].
    /// Note that this allocates, so hosts with a realtime-sensitive sink
    /// should override it.
    ///
    /// [`emit`]: Notifier::emit
    fn report(&mut self, diagnostic: Diagnostic) {
        self.emit(&diagnostic.to_string());
    }
}

/// A recoverable condition raised by an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnostic {
    /// `note_on` found no free voice; the note was dropped.
    PoolExhausted { key: u8 },
    /// An envelope update derived a transposition offset outside the valid
    /// range; the global offset was left unchanged.
    OffsetOutOfRange { derived: i32 },
    /// `set_synth_data` arguments failed validation; nothing was recorded.
    SynthDataRejected { key: u8, offset: i32 },
    /// A waveform code had no matching waveform; the update was ignored.
    InvalidWaveformCode { code: u8 },
    /// The recording buffer is full; the key was not captured.
    RecordingFull { key: u8 },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::PoolExhausted { key } => {
                write!(f, "voice pool exhausted: note {} dropped", key)
            }
            Diagnostic::OffsetOutOfRange { derived } => {
                write!(
                    f,
                    "invalid offset value: {}. It should be between -27 and 28.",
                    derived
                )
            }
            Diagnostic::SynthDataRejected { key, offset } => {
                write!(
                    f,
                    "invalid synth data (key {}, offset {}): key must be 60..=95 and offset -27..=28",
                    key, offset
                )
            }
            Diagnostic::InvalidWaveformCode { code } => {
                write!(f, "unknown waveform code {}", code)
            }
            Diagnostic::RecordingFull { key } => {
                write!(f, "recording buffer full: key {} not captured", key)
            }
        }
    }
}

/// Notifier that discards everything. Useful for offline rendering and
/// benchmarks.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn emit(&mut self, _message: &str) {}

    fn report(&mut self, _diagnostic: Diagnostic) {}
}

#[cfg(test)]
pub(crate) struct MemoryNotifier {
    pub(crate) messages: Vec<String>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

#[cfg(test)]
impl MemoryNotifier {
    pub(crate) fn new() -> Self {
        Self {
            messages: Vec::new(),
            diagnostics: Vec::new(),
        }
    }
}

#[cfg(test)]
impl Notifier for MemoryNotifier {
    fn emit(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }
}
