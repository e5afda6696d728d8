use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::Sink;

use crate::config::AudioSettings;
use crate::library::Track;

use super::analyzer::{AnalysisBuffer, AudioGraph};
use super::bands::{SPECTRUM_BINS, extract_frequency_bands};
use super::sink::{create_sink_at, decode_analysis_buffer};
use super::types::{FrequencyBands, PlaybackHandle, PlaybackInfo, PlayerCmd, SpectrumHandle};

// Consecutive silent analysis ticks tolerated before the diagnostic fires
// (about two seconds at the default tick interval).
const SILENT_TICK_LIMIT: u32 = 120;

pub(super) fn spawn_player_thread(
    tracks: Vec<Track>,
    rx: Receiver<PlayerCmd>,
    playback_info: PlaybackHandle,
    spectrum: SpectrumHandle,
    settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let tick = Duration::from_millis(settings.tick_ms.max(1));
        let mut engine = Engine::new(tracks, playback_info, spectrum, settings.default_volume);

        loop {
            match rx.recv_timeout(tick) {
                Ok(cmd) => {
                    if !engine.handle(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => engine.tick(),
                Err(RecvTimeoutError::Disconnected) => {
                    // Facade gone without an explicit quit; tear down anyway.
                    engine.handle(PlayerCmd::Quit);
                    break;
                }
            }
        }
    })
}

/// Clamp a requested volume into `[0.0, 1.0]`; non-finite input becomes 0.
pub(crate) fn clamp_volume(v: f32) -> f32 {
    if !v.is_finite() {
        return 0.0;
    }
    v.clamp(0.0, 1.0)
}

/// The level actually applied to the output: mute wins, volume is kept.
pub(crate) fn effective_volume(volume: f32, muted: bool) -> f32 {
    if muted { 0.0 } else { volume }
}

/// Resolve a volume request against the mute flag: the stored volume is
/// clamped, and a positive result un-mutes.
pub(crate) fn apply_volume_change(requested: f32, muted: bool) -> (f32, bool) {
    let volume = clamp_volume(requested);
    (volume, if volume > 0.0 { false } else { muted })
}

/// Next track index with wraparound; `None` on an empty list.
pub(crate) fn next_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) => (i + 1) % len,
        None => 0,
    })
}

/// Previous track index with wraparound; `None` on an empty list.
pub(crate) fn prev_index(current: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    Some(match current {
        Some(i) => (i + len - 1) % len,
        None => len - 1,
    })
}

/// Clamp a seek request in seconds to `[0, duration]`. NaN, negative and
/// infinite requests clamp like any other out-of-range value.
pub(crate) fn clamp_seek(seconds: f64, duration: Duration) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds)
        .map(|t| t.min(duration))
        .unwrap_or(duration)
}

/// All mutable playback state, owned by the player thread.
///
/// The graph (output stream + analyser) opens lazily on the first play
/// request and every open/decode failure degrades to a logged, stopped
/// state: nothing here panics or propagates errors to consumers.
pub(crate) struct Engine {
    tracks: Vec<Track>,
    info: PlaybackHandle,
    spectrum: SpectrumHandle,

    graph: Option<AudioGraph>,
    sink: Option<Sink>,
    loaded: Option<AnalysisBuffer>,

    index: Option<usize>,
    playing: bool,
    // Playhead accounting: accumulated elapsed while paused, plus the wall
    // clock since the last resume while playing.
    started_at: Option<Instant>,
    accumulated: Duration,
    duration: Duration,

    volume: f32,
    muted: bool,

    silent_ticks: u32,
    silence_reported: bool,
}

impl Engine {
    pub(crate) fn new(
        tracks: Vec<Track>,
        info: PlaybackHandle,
        spectrum: SpectrumHandle,
        initial_volume: f32,
    ) -> Self {
        let index = (!tracks.is_empty()).then_some(0);
        Self {
            tracks,
            info,
            spectrum,
            graph: None,
            sink: None,
            loaded: None,
            index,
            playing: false,
            started_at: None,
            accumulated: Duration::ZERO,
            duration: Duration::ZERO,
            volume: clamp_volume(initial_volume),
            muted: false,
            silent_ticks: 0,
            silence_reported: false,
        }
    }

    /// Process one command. Returns `false` when the thread should exit.
    pub(crate) fn handle(&mut self, cmd: PlayerCmd) -> bool {
        match cmd {
            PlayerCmd::Play => self.play(),
            PlayerCmd::Pause => self.pause(),
            PlayerCmd::Toggle => {
                if self.playing {
                    self.pause();
                } else {
                    self.play();
                }
            }
            PlayerCmd::SetTrack(id) => self.set_track(&id),
            PlayerCmd::Next => self.next_track(),
            PlayerCmd::Prev => self.prev_track(),
            PlayerCmd::Seek(seconds) => self.seek(seconds),
            PlayerCmd::SetVolume(v) => self.set_volume(v),
            PlayerCmd::ToggleMute => self.toggle_mute(),
            PlayerCmd::Quit => {
                self.shutdown();
                return false;
            }
        }
        true
    }

    /// One timeout tick: auto-advance, playhead refresh, spectrum refresh.
    /// Runs analysis only while playing, so the "bands are zero when idle"
    /// contract holds without ever racing the transport.
    pub(crate) fn tick(&mut self) {
        if self.playing && self.sink.as_ref().is_some_and(|s| s.empty()) {
            self.on_track_ended();
        }
        if !self.playing {
            return;
        }

        let mut now =
            self.accumulated + self.started_at.map_or(Duration::ZERO, |s| s.elapsed());
        if self.duration > Duration::ZERO && now > self.duration {
            now = self.duration;
        }

        let bands = match (self.graph.as_mut(), self.loaded.as_ref()) {
            (Some(graph), Some(pcm)) => {
                let bytes = graph.analyze_at(pcm, now);
                if let Ok(mut spectrum) = self.spectrum.lock() {
                    *spectrum = Some(bytes);
                }
                Some(extract_frequency_bands(&bytes))
            }
            _ => None,
        };

        match bands {
            Some(bands) => {
                self.watch_for_silence(bands);
                self.publish(|info| {
                    info.elapsed = now;
                    info.bands = bands;
                });
            }
            None => self.publish(|info| info.elapsed = now),
        }
    }

    fn play(&mut self) {
        let Some(i) = self.index else {
            log::debug!("play ignored: no tracks");
            return;
        };
        if self.playing {
            return;
        }

        // The graph opens lazily here: this is the step platform policy can
        // refuse, and a later retry (another play) may well succeed.
        if self.graph.is_none() {
            match AudioGraph::open() {
                Ok(graph) => {
                    self.graph = Some(graph);
                    if let Ok(mut spectrum) = self.spectrum.lock() {
                        *spectrum = Some([0; SPECTRUM_BINS]);
                    }
                }
                Err(e) => {
                    log::warn!("cannot start playback: {e}");
                    return;
                }
            }
        }

        if self.loaded.is_none() {
            match decode_analysis_buffer(&self.tracks[i]) {
                Ok(pcm) => {
                    self.duration = pcm.duration();
                    self.loaded = Some(pcm);
                }
                Err(e) => {
                    log::warn!("cannot load {:?}: {e}", self.tracks[i].title);
                    return;
                }
            }
        }

        if self.sink.is_none() {
            let Some(graph) = self.graph.as_ref() else {
                return;
            };
            match create_sink_at(&graph.stream, &self.tracks[i], self.accumulated) {
                Ok(sink) => self.sink = Some(sink),
                Err(e) => {
                    log::warn!("cannot start playback: {e}");
                    return;
                }
            }
        }

        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(effective_volume(self.volume, self.muted));
            sink.play();
        }
        self.playing = true;
        self.started_at = Some(Instant::now());
        self.silent_ticks = 0;
        self.silence_reported = false;

        let duration = self.duration;
        self.publish(|info| {
            info.playing = true;
            info.duration = duration;
        });
    }

    fn pause(&mut self) {
        if !self.playing {
            return;
        }
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
        if self.duration > Duration::ZERO && self.accumulated > self.duration {
            self.accumulated = self.duration;
        }
        self.playing = false;

        let elapsed = self.accumulated;
        self.publish(|info| {
            info.playing = false;
            info.elapsed = elapsed;
            info.bands = FrequencyBands::default();
        });
    }

    fn set_track(&mut self, id: &str) {
        let Some(pos) = self.tracks.iter().position(|t| t.id == id) else {
            log::debug!("set_track ignored: unknown id {id:?}");
            return;
        };
        if Some(pos) == self.index {
            // Same track: rewind without changing the index.
            self.restart_current();
        } else {
            self.change_track(pos, self.playing);
        }
    }

    fn next_track(&mut self) {
        if let Some(next) = next_index(self.index, self.tracks.len()) {
            self.change_track(next, self.playing);
        }
    }

    fn prev_track(&mut self) {
        if let Some(prev) = prev_index(self.index, self.tracks.len()) {
            self.change_track(prev, self.playing);
        }
    }

    fn seek(&mut self, seconds: f64) {
        let target = clamp_seek(seconds, self.duration);
        self.accumulated = target;

        if self.sink.is_some() {
            // Scrubbing rebuilds the pipeline and skips into the file,
            // preserving the transport state.
            let Some(i) = self.index else {
                return;
            };
            let Some(graph) = self.graph.as_ref() else {
                return;
            };
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            match create_sink_at(&graph.stream, &self.tracks[i], target) {
                Ok(sink) => {
                    sink.set_volume(effective_volume(self.volume, self.muted));
                    if self.playing {
                        sink.play();
                        self.started_at = Some(Instant::now());
                    } else {
                        self.started_at = None;
                    }
                    self.sink = Some(sink);
                }
                Err(e) => {
                    log::warn!("seek failed, stopping: {e}");
                    self.playing = false;
                    self.started_at = None;
                    self.publish(|info| {
                        info.playing = false;
                        info.bands = FrequencyBands::default();
                    });
                }
            }
        }

        let elapsed = self.accumulated;
        self.publish(|info| info.elapsed = elapsed);
    }

    fn set_volume(&mut self, requested: f32) {
        let (volume, muted) = apply_volume_change(requested, self.muted);
        self.volume = volume;
        self.muted = muted;
        self.apply_output_level();
        self.publish(|info| {
            info.volume = volume;
            info.muted = muted;
        });
    }

    fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.apply_output_level();
        let muted = self.muted;
        self.publish(|info| info.muted = muted);
    }

    /// Swap the current track. Any active sink is stopped first; when
    /// `resume` is set, playback restarts through the normal play path so a
    /// failed resume falls back to a stopped state instead of propagating.
    fn change_track(&mut self, new_index: usize, resume: bool) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.index = Some(new_index);
        self.loaded = None;
        self.duration = Duration::ZERO;
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.playing = false;

        self.publish(|info| {
            info.index = Some(new_index);
            info.playing = false;
            info.elapsed = Duration::ZERO;
            info.duration = Duration::ZERO;
            info.bands = FrequencyBands::default();
        });

        if resume {
            self.play();
        }
    }

    /// Rewind the current track to the top, keeping index and loaded media.
    fn restart_current(&mut self) {
        let was_playing = self.playing;
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.accumulated = Duration::ZERO;
        self.started_at = None;
        self.playing = false;

        self.publish(|info| {
            info.playing = false;
            info.elapsed = Duration::ZERO;
            info.bands = FrequencyBands::default();
        });

        if was_playing {
            self.play();
        }
    }

    /// Natural end of media: advance without wraparound, or stop with the
    /// playhead reset when the last track finishes.
    fn on_track_ended(&mut self) {
        let Some(i) = self.index else {
            return;
        };
        if i + 1 < self.tracks.len() {
            self.change_track(i + 1, true);
        } else {
            if let Some(sink) = self.sink.take() {
                sink.stop();
            }
            self.playing = false;
            self.started_at = None;
            self.accumulated = Duration::ZERO;
            self.publish(|info| {
                info.playing = false;
                info.elapsed = Duration::ZERO;
                info.bands = FrequencyBands::default();
            });
        }
    }

    fn apply_output_level(&self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(effective_volume(self.volume, self.muted));
        }
    }

    /// The analog of a tainted/disconnected analyser: audibly playing but
    /// the spectrum never moves. Reported once per playback start.
    fn watch_for_silence(&mut self, bands: FrequencyBands) {
        if bands.intensity == 0.0 {
            self.silent_ticks = self.silent_ticks.saturating_add(1);
            if self.silent_ticks > SILENT_TICK_LIMIT && !self.silence_reported {
                log::warn!("spectrum silent while playing; analysis may be degraded");
                self.silence_reported = true;
            }
        } else {
            self.silent_ticks = 0;
        }
    }

    /// Full teardown, in order: the command loop has already stopped
    /// polling; stop and detach the pipeline, release the decoded track,
    /// close the output stream.
    fn shutdown(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.loaded = None;
        self.graph = None;
        self.playing = false;
        self.started_at = None;

        self.publish(|info| {
            info.playing = false;
            info.bands = FrequencyBands::default();
        });
    }

    fn publish<F: FnOnce(&mut PlaybackInfo)>(&self, f: F) {
        if let Ok(mut info) = self.info.lock() {
            f(&mut info);
        }
    }
}
