use crate::MIN_TIME;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Linear ADSR envelope
====================

    Level
      1.0 ┐     ╱╲
          │    ╱  ╲___________
      S   │   ╱               ╲
          │  ╱                 ╲
      0.0 └─╱───────────────────╲──→ Time
          Attack Decay  Sustain  Release

Straight-line ramps throughout. Each stage converts its duration into a
per-sample increment:

    increment = target_change / (time_seconds * sample_rate)

Release is special: the starting level and total sample count are snapshotted
at note-off, then interpolated linearly so the envelope lands exactly on 0.0.
Snapshotting from the *current* level (not the sustain level) means a note
released mid-attack fades from wherever it was, without a click.

The output is additionally scaled by a peak amplitude, so the shape math
stays in 0..1 while presets can trim individual oscillators.
*/

/// Stage of the envelope state machine.
///
/// Also used at the orchestration boundary as the externally visible stage of
/// a voice; [`Stage::from_code`] is the validated conversion for hosts that
/// speak integers.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Gate low, envelope inactive, level = 0.
    Idle,
    /// Gate just went high, ramping up to 1.0.
    Attack,
    /// Reached peak, ramping down to the sustain level.
    Decay,
    /// Holding at the sustain level while the gate is high.
    Sustain,
    /// Gate went low, ramping down to 0.
    Release,
}

impl Stage {
    /// Validated conversion from a wire code. Unknown codes map to `None`
    /// rather than being reinterpreted.
    pub fn from_code(code: u8) -> Option<Stage> {
        match code {
            0 => Some(Stage::Idle),
            1 => Some(Stage::Attack),
            2 => Some(Stage::Decay),
            3 => Some(Stage::Sustain),
            4 => Some(Stage::Release),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Stage::Idle => 0,
            Stage::Attack => 1,
            Stage::Decay => 2,
            Stage::Sustain => 3,
            Stage::Release => 4,
        }
    }
}

pub struct Envelope {
    // Shape parameters
    attack_time: f32,   // seconds to ramp 0 → 1
    decay_time: f32,    // seconds to ramp 1 → sustain
    sustain_level: f32, // level to hold (0.0 - 1.0)
    release_time: f32,  // seconds to ramp current → 0
    amplitude: f32,     // peak output scale

    // Runtime state
    stage: Stage,
    level: f32,
    decay_start_level: f32,

    // Release bookkeeping, snapshotted at note-off
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl Envelope {
    pub fn new() -> Self {
        Self::adsr(0.01, 0.1, 0.7, 0.3, 1.0)
    }

    pub fn adsr(attack: f32, decay: f32, sustain: f32, release: f32, amplitude: f32) -> Self {
        Self {
            attack_time: attack.max(MIN_TIME),
            decay_time: decay.max(MIN_TIME),
            sustain_level: sustain.clamp(0.0, 1.0),
            release_time: release.max(MIN_TIME),
            amplitude: amplitude.max(0.0),

            stage: Stage::Idle,
            level: 0.0,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    /// Replace the shape parameters. Takes effect immediately; an envelope
    /// mid-flight continues from its current level with the new timings.
    pub fn set_adsr(&mut self, attack: f32, decay: f32, sustain: f32, release: f32, amplitude: f32) {
        self.attack_time = attack.max(MIN_TIME);
        self.decay_time = decay.max(MIN_TIME);
        self.sustain_level = sustain.clamp(0.0, 1.0);
        self.release_time = release.max(MIN_TIME);
        self.amplitude = amplitude.max(0.0);
    }

    /// Gate high: restart the attack from zero for a clean retrigger.
    pub fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = Stage::Attack;
        self.release_elapsed_samples = 0;
    }

    /// Gate low: start the release from the current level.
    pub fn note_off(&mut self, sample_rate: f32) {
        if matches!(self.stage, Stage::Idle) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = if self.release_time <= MIN_TIME {
            1
        } else {
            (self.release_time * sample_rate).round().max(1.0) as u32
        };
        self.release_elapsed_samples = 0;
        self.stage = Stage::Release;
    }

    /// Advance one sample and return the scaled output level.
    pub fn next_sample(&mut self, sample_rate: f32) -> f32 {
        match self.stage {
            Stage::Idle => {
                self.level = 0.0;
            }

            Stage::Attack => {
                let increment = 1.0 / (self.attack_time * sample_rate);
                self.level += increment;

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = Stage::Decay;
                }
            }

            Stage::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                let decrement = total_drop / (self.decay_time * sample_rate);
                self.level -= decrement;

                if self.level <= target {
                    self.level = target;
                    self.stage = Stage::Sustain;
                }
            }

            Stage::Sustain => {
                self.level = self.sustain_level;
            }

            Stage::Release => {
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = Stage::Idle;
                }
            }
        }

        debug_assert!((0.0..=1.0).contains(&self.level));
        self.level * self.amplitude
    }

    /// True while the envelope is producing output.
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Idle)
    }

    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.level = 0.0;
        self.decay_start_level = 0.0;
        self.release_start_level = 0.0;
        self.release_elapsed_samples = 0;
    }

    /// Unscaled shape level (0.0 to 1.0).
    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
