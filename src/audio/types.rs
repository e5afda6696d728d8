//! Audio-related small types and handles.
//!
//! This module defines the command enum driving the player thread, the
//! playback snapshot shared with consumers, and the handle aliases.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::bands::SPECTRUM_BINS;

/// Documented starting volume used when no configuration overrides it.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// Normalized per-band energy snapshot, each component in `[0.0, 1.0]`.
/// All zero whenever playback is not active.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrequencyBands {
    pub bass: f32,
    pub treble: f32,
    pub intensity: f32,
}

#[derive(Debug)]
pub(crate) enum PlayerCmd {
    /// Start or resume playback of the current track.
    Play,
    /// Pause playback, keeping the current position.
    Pause,
    /// Pause if playing, play otherwise.
    Toggle,
    /// Jump to the track with the given id, restarting from the top.
    SetTrack(String),
    /// Advance to the next track, wrapping at the end of the list.
    Next,
    /// Retreat to the previous track, wrapping at the start of the list.
    Prev,
    /// Move the playhead to the given position in seconds.
    Seek(f64),
    /// Set the stored volume level.
    SetVolume(f32),
    /// Flip the mute flag without touching the stored volume.
    ToggleMute,
    /// Tear down the audio pipeline and exit the player thread.
    Quit,
}

/// Runtime playback information shared with consumers.
#[derive(Debug, Clone)]
pub struct PlaybackInfo {
    /// Current track index in the supplied list; `None` only when the
    /// list is empty.
    pub index: Option<usize>,
    /// Whether playback is currently active. This is the only transport
    /// bit: "paused" is simply not playing with `elapsed > 0`.
    pub playing: bool,
    /// Playhead position for the current track, clamped to `[0, duration]`.
    pub elapsed: Duration,
    /// Authoritative track length from the decoded media; zero until a
    /// track has been loaded.
    pub duration: Duration,
    /// Stored volume, always in `[0.0, 1.0]`.
    pub volume: f32,
    /// Mute flag, independent of `volume`. Effective output level is
    /// `if muted { 0.0 } else { volume }`.
    pub muted: bool,
    /// Latest derived frequency snapshot.
    pub bands: FrequencyBands,
}

impl Default for PlaybackInfo {
    fn default() -> Self {
        Self {
            index: None,
            playing: false,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
            volume: DEFAULT_VOLUME,
            muted: false,
            bands: FrequencyBands::default(),
        }
    }
}

pub type PlaybackHandle = Arc<Mutex<PlaybackInfo>>;

/// Latest raw byte spectrum; `None` until the audio graph has been opened.
pub type SpectrumHandle = Arc<Mutex<Option<[u8; SPECTRUM_BINS]>>>;
