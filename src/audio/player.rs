use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use crate::config::AudioSettings;
use crate::library::Track;

use super::bands::SPECTRUM_BINS;
use super::thread::{clamp_volume, spawn_player_thread};
use super::types::{PlaybackHandle, PlaybackInfo, PlayerCmd, SpectrumHandle};

/// Owning handle for one playback engine instance.
///
/// Construction spawns the player thread; the audio device itself is not
/// touched until the first [`play`](AudioPlayer::play). All actions are
/// fire-and-forget and never fail toward the caller: playback errors are
/// logged by the engine and absorbed into a stopped state. Dispose with
/// [`close`](AudioPlayer::close), or let `Drop` do it.
pub struct AudioPlayer {
    tx: Sender<PlayerCmd>,
    tracks: Vec<Track>,
    playback: PlaybackHandle,
    spectrum: SpectrumHandle,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    /// Build an engine over an ordered track list. With a non-empty list
    /// the first track is current; an empty list makes every transport and
    /// navigation action a no-op.
    pub fn new(tracks: Vec<Track>, settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<PlayerCmd>();

        let initial = PlaybackInfo {
            index: (!tracks.is_empty()).then_some(0),
            volume: clamp_volume(settings.default_volume),
            ..PlaybackInfo::default()
        };
        let playback: PlaybackHandle = Arc::new(Mutex::new(initial));
        let spectrum: SpectrumHandle = Arc::new(Mutex::new(None));

        let join = spawn_player_thread(
            tracks.clone(),
            rx,
            playback.clone(),
            spectrum.clone(),
            settings,
        );

        Self {
            tx,
            tracks,
            playback,
            spectrum,
            join: Mutex::new(Some(join)),
        }
    }

    /// Start or resume playback of the current track.
    pub fn play(&self) {
        self.send(PlayerCmd::Play);
    }

    /// Pause playback, keeping the playhead position. Idempotent.
    pub fn pause(&self) {
        self.send(PlayerCmd::Pause);
    }

    /// Pause if playing, play otherwise.
    pub fn toggle(&self) {
        self.send(PlayerCmd::Toggle);
    }

    /// Jump to the track with the given id. Unknown ids are ignored; the
    /// currently active id rewinds to the top of the track.
    pub fn set_track(&self, id: &str) {
        self.send(PlayerCmd::SetTrack(id.to_string()));
    }

    /// Advance to the next track, wrapping at the end of the list.
    pub fn next_track(&self) {
        self.send(PlayerCmd::Next);
    }

    /// Retreat to the previous track, wrapping at the start of the list.
    pub fn prev_track(&self) {
        self.send(PlayerCmd::Prev);
    }

    /// Move the playhead to `seconds`, clamped to `[0, duration]`.
    pub fn seek(&self, seconds: f64) {
        self.send(PlayerCmd::Seek(seconds));
    }

    /// Set the volume, clamped to `[0, 1]`. A positive value un-mutes.
    pub fn set_volume(&self, volume: f32) {
        self.send(PlayerCmd::SetVolume(volume));
    }

    /// Flip the mute flag; the stored volume is untouched, so un-muting
    /// restores the exact pre-mute level.
    pub fn toggle_mute(&self) {
        self.send(PlayerCmd::ToggleMute);
    }

    /// Snapshot of the current playback state.
    pub fn state(&self) -> PlaybackInfo {
        self.playback
            .lock()
            .map(|info| info.clone())
            .unwrap_or_default()
    }

    /// Shared handle consumers can poll without going through the facade.
    pub fn playback_handle(&self) -> PlaybackHandle {
        self.playback.clone()
    }

    /// One-shot copy of the latest raw byte spectrum, or `None` while the
    /// audio graph has not been opened yet.
    pub fn frequency_data(&self) -> Option<[u8; SPECTRUM_BINS]> {
        self.spectrum.lock().ok().and_then(|bins| *bins)
    }

    /// The track list this engine was built over.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// The record currently selected by the engine, if any.
    pub fn current_track(&self) -> Option<&Track> {
        self.state().index.and_then(|i| self.tracks.get(i))
    }

    /// Tear the engine down: stops playback, closes the output stream and
    /// joins the player thread. Safe to call more than once.
    pub fn close(&self) {
        let _ = self.tx.send(PlayerCmd::Quit);
        if let Ok(mut join) = self.join.lock() {
            if let Some(handle) = join.take() {
                let _ = handle.join();
            }
        }
    }

    fn send(&self, cmd: PlayerCmd) {
        if self.tx.send(cmd).is_err() {
            log::debug!("player thread is gone; command dropped");
        }
    }
}

impl Drop for AudioPlayer {
    fn drop(&mut self) {
        self.close();
    }
}
