//! Pure band math over a byte spectrum.
//!
//! Everything here operates on the 0-255 byte bins produced by the
//! analyser and degrades to zero on empty or short input instead of
//! panicking. The bin ranges assume the fixed 128-bin spectrum of the
//! 256-point transform and are not parameterized by transform size.

use std::ops::Range;

use super::types::FrequencyBands;

/// Number of frequency bins the analyser produces (half the transform size).
pub const SPECTRUM_BINS: usize = 128;

/// Low-end bins averaged into the bass value.
const BASS_BINS: Range<usize> = 0..8;
/// High-mid bins averaged into the treble value.
const TREBLE_BINS: Range<usize> = 32..64;

fn band_average(spectrum: &[u8], bins: Range<usize>) -> f32 {
    let lo = bins.start.min(spectrum.len());
    let hi = bins.end.min(spectrum.len());
    if hi <= lo {
        return 0.0;
    }
    let sum: u32 = spectrum[lo..hi].iter().map(|&b| u32::from(b)).sum();
    sum as f32 / (hi - lo) as f32 / 255.0
}

/// Average energy of the bass bins `[0, 8)`, normalized to `[0, 1]`.
pub fn extract_bass(spectrum: &[u8]) -> f32 {
    band_average(spectrum, BASS_BINS)
}

/// Average energy of the treble bins `[32, 64)`, normalized to `[0, 1]`.
pub fn extract_treble(spectrum: &[u8]) -> f32 {
    band_average(spectrum, TREBLE_BINS)
}

/// Average energy across every bin, normalized to `[0, 1]`.
pub fn calculate_intensity(spectrum: &[u8]) -> f32 {
    band_average(spectrum, 0..spectrum.len())
}

/// One combined snapshot; the only function the engine calls per tick.
pub fn extract_frequency_bands(spectrum: &[u8]) -> FrequencyBands {
    FrequencyBands {
        bass: extract_bass(spectrum),
        treble: extract_treble(spectrum),
        intensity: calculate_intensity(spectrum),
    }
}
