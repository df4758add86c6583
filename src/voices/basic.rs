use crate::dsp::envelope::{Envelope, Stage};
use crate::dsp::oscillator::{midi_note_to_freq, Oscillator, Waveform};
use crate::synth::voice::{EnvelopePreset, VoiceUnit};

/// Per-oscillator gain applied before any preset arrives.
pub const DEFAULT_LEVEL: f32 = 0.25;

/// One oscillator slot: waveform, gain, and its own envelope.
struct OscLane {
    enabled: bool,
    level: f32,
    oscillator: Oscillator,
    envelope: Envelope,
}

impl OscLane {
    fn new() -> Self {
        Self {
            enabled: true,
            level: DEFAULT_LEVEL,
            oscillator: Oscillator::new(Waveform::Sine),
            envelope: Envelope::new(),
        }
    }
}

/// Self-contained `VoiceUnit`: a fixed stack of oscillator lanes summed per
/// sample, each shaped by its own ADSR.
///
/// The voice deactivates itself once it has been released and every lane's
/// envelope has gone idle; the pool only ever moves it *into* attack or
/// release.
pub struct BasicVoice {
    sample_rate: f32,
    key: u8,
    active: bool,
    iteration: u64,
    stage: Stage,
    lanes: Vec<OscLane>,
}

impl BasicVoice {
    pub fn new(sample_rate: f32, num_oscillators: usize) -> Self {
        Self {
            sample_rate,
            key: 0,
            active: false,
            iteration: 0,
            stage: Stage::Idle,
            lanes: (0..num_oscillators).map(|_| OscLane::new()).collect(),
        }
    }

    pub fn num_oscillators(&self) -> usize {
        self.lanes.len()
    }

    fn lane_mut(&mut self, osc: usize) -> Option<&mut OscLane> {
        self.lanes.get_mut(osc)
    }
}

impl VoiceUnit for BasicVoice {
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
        for lane in &mut self.lanes {
            lane.oscillator.reset();
            lane.envelope.reset();
        }
    }

    fn set_stage(&mut self, stage: Stage) {
        match stage {
            Stage::Attack => {
                for lane in &mut self.lanes {
                    lane.envelope.note_on();
                }
            }
            Stage::Release => {
                for lane in &mut self.lanes {
                    lane.envelope.note_off(self.sample_rate);
                }
            }
            Stage::Idle => {
                for lane in &mut self.lanes {
                    lane.envelope.reset();
                }
                self.active = false;
            }
            // Decay and sustain are reached by the envelopes on their own;
            // an external transition just records the stage.
            Stage::Decay | Stage::Sustain => {}
        }
        self.stage = stage;
    }

    fn set_envelope(&mut self, osc: usize, preset: EnvelopePreset) {
        if let Some(lane) = self.lane_mut(osc) {
            lane.envelope.set_adsr(
                preset.attack,
                preset.decay,
                preset.sustain,
                preset.release,
                preset.amplitude,
            );
        }
    }

    fn set_level(&mut self, osc: usize, level: f32) {
        if let Some(lane) = self.lane_mut(osc) {
            lane.level = level;
        }
    }

    fn set_waveform(&mut self, osc: usize, waveform: Waveform) {
        if let Some(lane) = self.lane_mut(osc) {
            lane.oscillator.set_waveform(waveform);
        }
    }

    fn enable_oscillator(&mut self, osc: usize, enabled: bool) {
        if let Some(lane) = self.lane_mut(osc) {
            lane.enabled = enabled;
        }
    }

    fn render(&mut self, out: &mut [f32]) {
        if !self.active {
            out.fill(0.0);
            return;
        }

        let frequency = midi_note_to_freq(self.key);
        for sample in out.iter_mut() {
            let mut acc = 0.0;
            for lane in &mut self.lanes {
                let gain = lane.envelope.next_sample(self.sample_rate);
                if lane.enabled {
                    acc += lane.oscillator.next_sample(frequency, self.sample_rate)
                        * gain
                        * lane.level;
                }
            }
            *sample = acc;
        }
        self.iteration += out.len() as u64;

        if self.stage == Stage::Release && self.lanes.iter().all(|l| !l.envelope.is_active()) {
            self.active = false;
            self.stage = Stage::Idle;
        } else if self.stage != Stage::Release {
            // Mirror the first lane's envelope so the externally visible
            // stage follows attack → decay → sustain.
            if let Some(lane) = self.lanes.first() {
                if lane.envelope.is_active() {
                    self.stage = lane.envelope.stage();
                }
            }
        }
    }
}
