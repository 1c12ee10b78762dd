//! Signal-quality probe over raw PCM payloads.

use stream_router::SignalProbe;

/// Interprets a payload as 16-bit little-endian PCM and yields the peak
/// amplitude normalized to `0.0..=1.0`. A payload shorter than one sample
/// carries no indicator; a trailing odd byte is ignored.
pub struct PeakLevelProbe;

impl SignalProbe for PeakLevelProbe {
    fn level(&self, payload: &[u8]) -> Option<f32> {
        if payload.len() < 2 {
            return None;
        }

        let peak = payload
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .map(|sample| (sample as i32).unsigned_abs())
            .max()
            .unwrap_or(0);

        Some(peak as f32 / i16::MIN.unsigned_abs() as f32)
    }
}
