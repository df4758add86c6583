#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Control message for the engine, one variant per external operation.
///
/// Hosts that run the engine inside an audio callback push these from the UI
/// thread and let the callback drain them; hosts with their own serialization
/// can call the engine methods directly instead.
#[derive(Debug, Copy, Clone)]
pub enum EngineMessage {
    NoteOn {
        key: u8,
    },
    NoteOff {
        key: u8,
    },
    UpdateLevel {
        osc: usize,
        value: f32,
    },
    UpdateEnvelope {
        osc: usize,
        attack: f32,
        decay: f32,
        sustain: f32,
        release: f32,
        amplitude: f32,
    },
    UpdateWaveform {
        osc: usize,
        code: u8,
    },
    EnableOscillator {
        osc: usize,
        enabled: bool,
    },
    StartRecording,
    StopRecording,
    /// Render the recorded song; the result string goes out through the
    /// notifier.
    PlayRecording,
    SetSynthData {
        key: u8,
        offset: i32,
    },
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<EngineMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        Consumer::pop(self).ok()
    }
}

impl MessageReceiver for std::collections::VecDeque<EngineMessage> {
    fn pop(&mut self) -> Option<EngineMessage> {
        self.pop_front()
    }
}
