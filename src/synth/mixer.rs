//! Active-voice mixdown for the render callback.
//!
//! Voices are summed at a fixed per-voice attenuation with no dynamic gain
//! compensation and no limiting. Many voices summing constructively can push
//! the output past the nominal ±1.0 range; that headroom trade-off is
//! deliberate and belongs to the host to resolve, not to this layer.

use crate::synth::voice::VoiceUnit;

/// Fixed gain applied to every voice before summing.
pub const VOICE_ATTENUATION: f32 = 0.1;

/// Render every active voice into `scratch` and accumulate the attenuated
/// result into `out`.
///
/// `out` is zero-filled first, so zero active voices yields silence. The
/// caller provides `scratch` (at least `out.len()` long) so the render path
/// performs no allocation; cost is bounded by voices × samples.
pub fn mix_active<V: VoiceUnit>(voices: &mut [V], out: &mut [f32], scratch: &mut [f32]) {
    debug_assert!(scratch.len() >= out.len());

    out.fill(0.0);
    for voice in voices.iter_mut().filter(|v| v.is_active()) {
        let scratch = &mut scratch[..out.len()];
        scratch.fill(0.0);
        voice.render(scratch);
        accumulate(out, scratch, VOICE_ATTENUATION);
    }
}

/// out[i] += src[i] * gain
#[inline]
pub fn accumulate(out: &mut [f32], src: &[f32], gain: f32) {
    debug_assert_eq!(out.len(), src.len());

    for (o, &s) in out.iter_mut().zip(src.iter()) {
        *o += s * gain;
    }
}
