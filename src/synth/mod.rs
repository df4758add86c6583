// Purpose: voice allocation, parameter fan-out, mixdown, and note recording.
// This layer orchestrates VoiceUnit implementations; it generates no audio
// of its own and talks to the host only through the injected Notifier.

pub mod engine;
pub mod message;
pub mod mixer;
pub mod params;
pub mod pool;
pub mod recorder;
pub mod voice;

pub use engine::{ConfigError, EngineConfig, SynthEngine};
pub use message::{EngineMessage, MessageReceiver};
pub use params::ParamBank;
pub use pool::{PoolExhausted, VoicePool};
pub use recorder::{
    Playback, RecordedKey, Recorder, KEY_MAX, KEY_MIN, MAX_RECORDED_KEYS, OFFSET_MAX, OFFSET_MIN,
};
pub use voice::{EnvelopePreset, Stage, VoiceFactory, VoiceUnit, Waveform};
