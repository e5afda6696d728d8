//! The audio playback engine.
//!
//! [`AudioPlayer`] owns a dedicated player thread driving a `rodio` sink,
//! a lazily opened output stream and a fixed-size spectrum analyser. The
//! submodules split the engine the usual way: command/state types, pure
//! band math, sink construction and track decoding, the analyser, and the
//! player thread itself.

mod analyzer;
mod bands;
mod player;
mod sink;
mod thread;
mod types;

pub use bands::{
    SPECTRUM_BINS, calculate_intensity, extract_bass, extract_frequency_bands, extract_treble,
};
pub use player::AudioPlayer;
pub use types::{DEFAULT_VOLUME, FrequencyBands, PlaybackHandle, PlaybackInfo, SpectrumHandle};

#[cfg(test)]
mod tests;
