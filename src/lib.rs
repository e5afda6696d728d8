//! resona — an embeddable audio playback engine with live spectrum analysis.
//!
//! The crate plays locally stored audio tracks through [`rodio`] and keeps a
//! continuously updated frequency snapshot (bass, treble, overall intensity)
//! alongside the usual transport state, so a UI can drive both playback
//! controls and a visualizer from one handle.
//!
//! The central type is [`AudioPlayer`]: it owns a dedicated player thread,
//! exposes imperative actions (`play`, `pause`, `next_track`, `seek`, ...)
//! and publishes a [`PlaybackInfo`] snapshot consumers can poll. The audio
//! output device is opened lazily on the first `play()`, and every playback
//! failure (missing device, unreadable file, decode error) is logged and
//! absorbed into a stopped state instead of surfacing as an error.
//!
//! ```no_run
//! use resona::{AudioPlayer, config::Settings, library::scan};
//!
//! let settings = Settings::load().unwrap_or_default();
//! let tracks = scan(std::path::Path::new("Music"), &settings.library);
//! let player = AudioPlayer::new(tracks, settings.audio);
//!
//! player.play();
//! player.set_volume(0.5);
//! if let Some(spectrum) = player.frequency_data() {
//!     // feed the 128 byte-scaled bins to a visualizer
//!     let _ = spectrum.len();
//! }
//! player.close();
//! ```

pub mod audio;
pub mod config;
mod error;
pub mod library;

pub use audio::{AudioPlayer, FrequencyBands, PlaybackHandle, PlaybackInfo, SPECTRUM_BINS};
pub use error::PlayerError;
pub use library::{Track, format_duration, scan};
