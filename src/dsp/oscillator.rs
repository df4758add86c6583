use std::f32::consts::TAU;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Waveform selection for an oscillator slot.
///
/// The wire codes (0..=3, in declaration order) match what the host's
/// waveform selector sends; [`Waveform::from_code`] is the validated boundary
/// conversion, so an out-of-range integer is rejected instead of being
/// reinterpreted.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    pub fn from_code(code: u8) -> Option<Waveform> {
        match code {
            0 => Some(Waveform::Sine),
            1 => Some(Waveform::Saw),
            2 => Some(Waveform::Square),
            3 => Some(Waveform::Triangle),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Waveform::Sine => 0,
            Waveform::Saw => 1,
            Waveform::Square => 2,
            Waveform::Triangle => 3,
        }
    }
}

/// Convert a MIDI note number to frequency in Hz. A4 = 440 Hz = note 69.
#[inline]
pub fn midi_note_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}

/// Naive phase-accumulator oscillator.
///
/// Not band-limited; the saw and square alias at high frequencies, which is
/// acceptable for a reference voice.
pub struct Oscillator {
    waveform: Waveform,
    phase: f32, // 0.0 ..< 1.0
}

impl Oscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Advance one sample at the given frequency and return the output in
    /// [-1.0, 1.0].
    pub fn next_sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let out = match self.waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Saw => 2.0 * self.phase - 1.0,
            Waveform::Square => {
                if self.phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => 4.0 * (self.phase - 0.5).abs() - 1.0,
        };

        self.phase += frequency / sample_rate;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    #[test]
    fn waveform_codes_round_trip_and_reject_unknown() {
        for code in 0..=3u8 {
            assert_eq!(Waveform::from_code(code).map(Waveform::code), Some(code));
        }
        assert_eq!(Waveform::from_code(4), None);
        assert_eq!(Waveform::from_code(255), None);
    }

    #[test]
    fn square_alternates_half_cycles() {
        // 100 Hz at 1 kHz: 10 samples per cycle, 5 high then 5 low
        let mut osc = Oscillator::new(Waveform::Square);
        let samples: Vec<f32> = (0..10).map(|_| osc.next_sample(100.0, SAMPLE_RATE)).collect();

        assert!(samples[..5].iter().all(|&s| s == 1.0));
        assert!(samples[5..].iter().all(|&s| s == -1.0));
    }

    #[test]
    fn output_stays_in_range() {
        for waveform in [Waveform::Sine, Waveform::Saw, Waveform::Square, Waveform::Triangle] {
            let mut osc = Oscillator::new(waveform);
            for _ in 0..1_000 {
                let s = osc.next_sample(237.0, SAMPLE_RATE);
                assert!((-1.0..=1.0).contains(&s), "{:?} out of range: {}", waveform, s);
            }
        }
    }

    #[test]
    fn a4_is_440() {
        assert!((midi_note_to_freq(69) - 440.0).abs() < 1e-3);
        assert!((midi_note_to_freq(60) - 261.63).abs() < 0.1);
    }
}
