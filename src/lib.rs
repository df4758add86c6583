pub mod dsp;
pub mod notify; // Status and diagnostic sinks injected by the host
pub mod synth; // Voice pool, parameter broadcast, recording
pub mod voices; // Reference voice built on the dsp primitives

/// Largest buffer a single render pass fills; longer requests are chunked.
pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
