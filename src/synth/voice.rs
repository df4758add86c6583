#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use crate::dsp::envelope::Stage;
pub use crate::dsp::oscillator::Waveform;

/// Envelope shape for one oscillator slot.
///
/// Times are in seconds, `sustain` and `amplitude` are linear gains. Presets
/// are stored per oscillator index by the parameter bank and pushed to voices
/// under the broadcast rules described in [`crate::synth::params`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopePreset {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub amplitude: f32,
}

/// Capability interface the orchestration layer requires from a voice.
///
/// The pool owns voices by value, one per slot, for the lifetime of the
/// engine. A voice is *activated* by [`start`] and moves through envelope
/// stages via [`set_stage`]; deactivation is the voice's own responsibility
/// once its release completes — the pool never clears the active flag
/// directly.
///
/// [`start`]: VoiceUnit::start
/// [`set_stage`]: VoiceUnit::set_stage
pub trait VoiceUnit: Send {
    /// The key (MIDI note number) this voice was last started with.
    fn key(&self) -> u8;

    /// True from [`start`](VoiceUnit::start) until the voice finishes its
    /// release.
    fn is_active(&self) -> bool;

    /// Samples rendered since the voice was last started.
    fn iteration(&self) -> u64;

    fn stage(&self) -> Stage;

    /// Claim this voice for a note: set the key, reset the iteration
    /// counter, and mark it active. The caller follows up with the current
    /// preset tables and an `Attack` stage transition.
    fn start(&mut self, key: u8);

    fn set_stage(&mut self, stage: Stage);

    fn set_envelope(&mut self, osc: usize, preset: EnvelopePreset);

    fn set_level(&mut self, osc: usize, level: f32);

    fn set_waveform(&mut self, osc: usize, waveform: Waveform);

    fn enable_oscillator(&mut self, osc: usize, enabled: bool);

    /// Fill `out` with the voice's next samples. Must not block or allocate;
    /// called from the render path.
    fn render(&mut self, out: &mut [f32]);
}

/// Factory the pool uses to populate its fixed arena at construction.
///
/// Configure the sound once, then every slot gets an identical voice. Any
/// `Fn() -> V` closure qualifies.
pub trait VoiceFactory: Send {
    type Voice: VoiceUnit;

    fn create_voice(&self) -> Self::Voice;
}

impl<F, V> VoiceFactory for F
where
    F: Fn() -> V + Send,
    V: VoiceUnit,
{
    type Voice = V;

    fn create_voice(&self) -> Self::Voice {
        self()
    }
}

/// Call-recording voice double shared by the orchestration unit tests.
#[cfg(test)]
pub(crate) struct FakeVoice {
    pub(crate) key: u8,
    pub(crate) active: bool,
    pub(crate) iteration: u64,
    pub(crate) stage: Stage,
    pub(crate) started: Vec<u8>,
    pub(crate) envelopes: Vec<(usize, EnvelopePreset)>,
    pub(crate) levels: Vec<(usize, f32)>,
    pub(crate) waveforms: Vec<(usize, Waveform)>,
    pub(crate) enables: Vec<(usize, bool)>,
    /// Constant sample value produced by `render` while active.
    pub(crate) output: f32,
}

#[cfg(test)]
impl FakeVoice {
    pub(crate) fn new() -> Self {
        Self {
            key: 0,
            active: false,
            iteration: 0,
            stage: Stage::Idle,
            started: Vec::new(),
            envelopes: Vec::new(),
            levels: Vec::new(),
            waveforms: Vec::new(),
            enables: Vec::new(),
            output: 1.0,
        }
    }
}

#[cfg(test)]
impl VoiceUnit for FakeVoice {
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
        self.started.push(key);
    }

    fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    fn set_envelope(&mut self, osc: usize, preset: EnvelopePreset) {
        self.envelopes.push((osc, preset));
    }

    fn set_level(&mut self, osc: usize, level: f32) {
        self.levels.push((osc, level));
    }

    fn set_waveform(&mut self, osc: usize, waveform: Waveform) {
        self.waveforms.push((osc, waveform));
    }

    fn enable_oscillator(&mut self, osc: usize, enabled: bool) {
        self.enables.push((osc, enabled));
    }

    fn render(&mut self, out: &mut [f32]) {
        out.fill(self.output);
        self.iteration += out.len() as u64;
    }
}
