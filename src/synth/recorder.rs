//! Note recording and playback.
//!
//! While a session is active, every dispatched note is captured as a
//! `(key, offset)` pair, where `offset` is a *snapshot* of the global
//! transposition offset at the moment of capture — later offset changes never
//! rewrite history. Playback decodes each key against its own snapshot and
//! renders a human-readable event log behind a fixed decorative banner.

use crate::notify::Notifier;

/// Hard capacity of the recording buffer, enforced uniformly: capture is
/// refused past this count whether or not a session is active.
pub const MAX_RECORDED_KEYS: usize = 128;

/// Valid range of the global transposition offset.
pub const OFFSET_MIN: i32 = -27;
pub const OFFSET_MAX: i32 = 28;

/// Valid key range for programmatically injected notes (`set_synth_data`).
pub const KEY_MIN: u8 = 60;
pub const KEY_MAX: u8 = 95;

const START_MESSAGE: &str = "Recording started! Press keys to record your song \
and/or change the envelope if you need. Press 'Stop Recording' when you are done.";
const STOP_MESSAGE: &str = "Your beautiful song is ready to be played again!";

const PLAYBACK_BANNER: &str = "****ski-Bi dibby dib yo da dub dub yo dab dub dub \
ski-Bi dibby dib yo da dub dub yo dab dub dub*****";

pub fn offset_in_range(offset: i32) -> bool {
    (OFFSET_MIN..=OFFSET_MAX).contains(&offset)
}

/// One captured note event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedKey {
    pub key: u8,
    /// Global offset as it was at capture time.
    pub offset: i32,
}

/// Result of a successful playback request.
///
/// `decoded` holds the per-key `key - offset` bytes (each key decoded against
/// its own captured offset, not the live global one). `log` is the
/// comma-separated `(key,offset)` event list with no trailing comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub decoded: Vec<u8>,
    pub log: String,
}

impl Playback {
    /// The string handed to hosts: banner, `|` separator, event log. Hosts
    /// split on the `|` to show the banner and extract the log.
    pub fn render(&self) -> String {
        format!("{}|{}", PLAYBACK_BANNER, self.log)
    }
}

/// Fixed-capacity recorder for `(key, offset)` pairs.
///
/// Playback order is capture order. The recorded count is the sequence
/// length; there is no separate counter to fall out of sync.
#[derive(Debug, Default)]
pub struct Recorder {
    keys: Vec<RecordedKey>,
    recording: bool,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            keys: Vec::with_capacity(MAX_RECORDED_KEYS),
            recording: false,
        }
    }

    /// Begin a session: clears any previous capture and announces the start.
    /// No-op if a session is already active.
    pub fn start<N: Notifier>(&mut self, notifier: &mut N) {
        if self.recording {
            return;
        }
        self.keys.clear();
        self.recording = true;
        notifier.emit(START_MESSAGE);
    }

    /// End the session and announce completion. No-op if not recording.
    pub fn stop<N: Notifier>(&mut self, notifier: &mut N) {
        if !self.recording {
            return;
        }
        self.recording = false;
        notifier.emit(STOP_MESSAGE);
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[RecordedKey] {
        &self.keys
    }

    /// Append a key with the offset snapshot. Returns `false` (and captures
    /// nothing) once the hard capacity is reached.
    pub fn add_key(&mut self, key: u8, offset: i32) -> bool {
        if self.keys.len() >= MAX_RECORDED_KEYS {
            return false;
        }
        self.keys.push(RecordedKey { key, offset });
        true
    }

    /// Decode the recorded sequence for playback.
    ///
    /// Returns `None` unless every precondition holds: no session active, at
    /// least one key captured, and the *current* global offset within the
    /// valid range.
    pub fn playback(&self, global_offset: i32) -> Option<Playback> {
        if self.recording || self.keys.is_empty() || !offset_in_range(global_offset) {
            return None;
        }

        let mut decoded = Vec::with_capacity(self.keys.len());
        let mut log = String::new();
        for (i, recorded) in self.keys.iter().enumerate() {
            decoded.push((recorded.key as i32 - recorded.offset) as u8);
            if i > 0 {
                log.push(',');
            }
            log.push_str(&format!("({},{})", recorded.key, recorded.offset));
        }

        Some(Playback { decoded, log })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::MemoryNotifier;

    #[test]
    fn start_clears_previous_capture() {
        let mut notifier = MemoryNotifier::new();
        let mut recorder = Recorder::new();

        recorder.start(&mut notifier);
        recorder.add_key(60, 2);
        recorder.add_key(64, 2);
        recorder.stop(&mut notifier);

        recorder.start(&mut notifier);
        assert!(recorder.is_empty());
        assert!(recorder.is_recording());
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut notifier = MemoryNotifier::new();
        let mut recorder = Recorder::new();

        recorder.stop(&mut notifier); // not recording: no message
        assert!(notifier.messages.is_empty());

        recorder.start(&mut notifier);
        recorder.start(&mut notifier);
        assert_eq!(notifier.messages.len(), 1);

        recorder.stop(&mut notifier);
        recorder.stop(&mut notifier);
        assert_eq!(notifier.messages.len(), 2);
    }

    #[test]
    fn captured_offset_is_a_snapshot() {
        let mut notifier = MemoryNotifier::new();
        let mut recorder = Recorder::new();
        recorder.start(&mut notifier);

        recorder.add_key(60, 2);
        recorder.add_key(64, -3); // offset changed between captures

        recorder.stop(&mut notifier);
        let playback = recorder.playback(10).unwrap();
        assert_eq!(recorder.keys()[0], RecordedKey { key: 60, offset: 2 });
        assert_eq!(recorder.keys()[1], RecordedKey { key: 64, offset: -3 });
        // Decoding uses each snapshot, never the live offset (10 here)
        assert_eq!(playback.decoded, vec![58, 67]);
    }

    #[test]
    fn cap_holds_during_active_recording() {
        let mut notifier = MemoryNotifier::new();
        let mut recorder = Recorder::new();
        recorder.start(&mut notifier);

        for i in 0..200u32 {
            recorder.add_key(60 + (i % 12) as u8, 0);
        }

        assert_eq!(recorder.len(), MAX_RECORDED_KEYS);
        assert!(!recorder.add_key(60, 0));

        // Later playback of the capped sequence is well-formed
        recorder.stop(&mut notifier);
        let playback = recorder.playback(0).unwrap();
        assert_eq!(playback.decoded.len(), MAX_RECORDED_KEYS);
    }

    #[test]
    fn cap_holds_when_not_recording() {
        let mut recorder = Recorder::new();
        for _ in 0..MAX_RECORDED_KEYS {
            assert!(recorder.add_key(61, 1));
        }
        assert!(!recorder.add_key(61, 1));
        assert_eq!(recorder.len(), MAX_RECORDED_KEYS);
    }

    #[test]
    fn playback_requires_recorded_keys() {
        let recorder = Recorder::new();
        assert_eq!(recorder.playback(0), None);
    }

    #[test]
    fn playback_refused_while_recording() {
        let mut notifier = MemoryNotifier::new();
        let mut recorder = Recorder::new();
        recorder.start(&mut notifier);
        recorder.add_key(60, 0);

        assert_eq!(recorder.playback(0), None);

        recorder.stop(&mut notifier);
        assert!(recorder.playback(0).is_some());
    }

    #[test]
    fn playback_refused_for_out_of_range_offset() {
        let mut recorder = Recorder::new();
        recorder.add_key(60, 0);

        assert_eq!(recorder.playback(29), None);
        assert_eq!(recorder.playback(-28), None);
        assert!(recorder.playback(28).is_some());
        assert!(recorder.playback(-27).is_some());
    }

    #[test]
    fn log_has_no_trailing_comma() {
        let mut recorder = Recorder::new();
        recorder.add_key(60, 2);
        recorder.add_key(64, -3);

        let playback = recorder.playback(0).unwrap();
        assert_eq!(playback.log, "(60,2),(64,-3)");
    }

    #[test]
    fn playback_surfaces_decoded_bytes() {
        // The decoded song bytes are part of the result, not dead state
        let mut recorder = Recorder::new();
        recorder.add_key(72, 12);
        recorder.add_key(60, -5);

        let playback = recorder.playback(0).unwrap();
        assert_eq!(playback.decoded, vec![60, 65]);
    }

    #[test]
    fn render_keeps_banner_pipe_log_shape() {
        let mut recorder = Recorder::new();
        recorder.add_key(60, 2);

        let rendered = recorder.playback(0).unwrap().render();
        let (banner, log) = rendered.split_once('|').unwrap();
        assert!(banner.starts_with("****"));
        assert!(banner.ends_with("*****"));
        assert_eq!(log, "(60,2)");
    }
}
