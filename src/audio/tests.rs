use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::AudioSettings;
use crate::library::Track;

use super::analyzer::{AnalysisBuffer, FFT_SIZE, SpectrumAnalyzer};
use super::bands::{
    SPECTRUM_BINS, calculate_intensity, extract_bass, extract_frequency_bands, extract_treble,
};
use super::player::AudioPlayer;
use super::thread::{
    Engine, apply_volume_change, clamp_seek, clamp_volume, effective_volume, next_index,
    prev_index,
};
use super::types::{
    DEFAULT_VOLUME, FrequencyBands, PlaybackHandle, PlaybackInfo, PlayerCmd, SpectrumHandle,
};

fn t(id: &str) -> Track {
    Track {
        id: id.into(),
        path: PathBuf::from(format!("/nonexistent/{id}.mp3")),
        title: id.into(),
        artist: None,
        album: None,
        duration: None,
        artwork: None,
        description: None,
        display: id.into(),
    }
}

/// An engine driven directly, without the player thread, so commands apply
/// synchronously and assertions are deterministic.
fn engine_with(tracks: Vec<Track>) -> (Engine, PlaybackHandle, SpectrumHandle) {
    let info: PlaybackHandle = Arc::new(Mutex::new(PlaybackInfo {
        index: (!tracks.is_empty()).then_some(0),
        ..PlaybackInfo::default()
    }));
    let spectrum: SpectrumHandle = Arc::new(Mutex::new(None));
    let engine = Engine::new(tracks, info.clone(), spectrum.clone(), DEFAULT_VOLUME);
    (engine, info, spectrum)
}

fn snapshot(info: &PlaybackHandle) -> PlaybackInfo {
    info.lock().unwrap().clone()
}

// --- pure helpers ---

#[test]
fn clamp_volume_bounds_and_defaults() {
    assert_eq!(clamp_volume(1.5), 1.0);
    assert_eq!(clamp_volume(-0.5), 0.0);
    assert_eq!(clamp_volume(0.25), 0.25);
    assert_eq!(clamp_volume(f32::NAN), 0.0);
    assert_eq!(clamp_volume(f32::INFINITY), 0.0);
}

#[test]
fn effective_volume_mute_wins_but_keeps_volume() {
    assert_eq!(effective_volume(0.8, false), 0.8);
    assert_eq!(effective_volume(0.8, true), 0.0);
}

#[test]
fn positive_volume_change_unmutes() {
    assert_eq!(apply_volume_change(0.4, true), (0.4, false));
    assert_eq!(apply_volume_change(0.0, true), (0.0, true));
    assert_eq!(apply_volume_change(-1.0, true), (0.0, true));
    assert_eq!(apply_volume_change(2.0, true), (1.0, false));
}

#[test]
fn index_navigation_wraps_both_ways() {
    assert_eq!(next_index(Some(0), 3), Some(1));
    assert_eq!(next_index(Some(2), 3), Some(0));
    assert_eq!(prev_index(Some(0), 3), Some(2));
    assert_eq!(prev_index(Some(1), 3), Some(0));
    assert_eq!(next_index(None, 3), Some(0));
    assert_eq!(next_index(Some(0), 0), None);
    assert_eq!(prev_index(Some(0), 0), None);
}

#[test]
fn clamp_seek_handles_degenerate_input() {
    let dur = Duration::from_secs(100);
    assert_eq!(clamp_seek(50.0, dur), Duration::from_secs(50));
    assert_eq!(clamp_seek(150.0, dur), dur);
    assert_eq!(clamp_seek(-5.0, dur), Duration::ZERO);
    assert_eq!(clamp_seek(f64::NAN, dur), Duration::ZERO);
    assert_eq!(clamp_seek(f64::INFINITY, dur), dur);
    assert_eq!(clamp_seek(10.0, Duration::ZERO), Duration::ZERO);
}

// --- band math ---

#[test]
fn empty_spectrum_yields_zero_bands() {
    assert_eq!(extract_bass(&[]), 0.0);
    assert_eq!(extract_treble(&[]), 0.0);
    assert_eq!(calculate_intensity(&[]), 0.0);
    assert_eq!(extract_frequency_bands(&[]), FrequencyBands::default());
}

#[test]
fn band_extraction_averages_fixed_ranges() {
    let mut spectrum = [0u8; SPECTRUM_BINS];
    spectrum[0..8].fill(200);
    spectrum[32..64].fill(100);

    let bands = extract_frequency_bands(&spectrum);
    assert!((bands.bass - 200.0 / 255.0).abs() < 1e-6);
    assert!((bands.treble - 100.0 / 255.0).abs() < 1e-6);
    assert!(bands.bass > bands.treble);

    let expected_intensity = (8.0 * 200.0 + 32.0 * 100.0) / SPECTRUM_BINS as f32 / 255.0;
    assert!((bands.intensity - expected_intensity).abs() < 1e-6);
}

#[test]
fn band_extraction_degrades_on_short_input() {
    // Only four bass bins available: average what exists.
    assert!((extract_bass(&[255, 255, 255, 255]) - 1.0).abs() < 1e-6);
    // Nothing reaches the treble range.
    assert_eq!(extract_treble(&[128; 16]), 0.0);
}

#[test]
fn full_scale_spectrum_saturates_at_one() {
    let spectrum = [255u8; SPECTRUM_BINS];
    let bands = extract_frequency_bands(&spectrum);
    assert!((bands.bass - 1.0).abs() < 1e-6);
    assert!((bands.treble - 1.0).abs() < 1e-6);
    assert!((bands.intensity - 1.0).abs() < 1e-6);
}

// --- analyser ---

#[test]
fn analyzer_is_silent_for_silence() {
    let mut analyzer = SpectrumAnalyzer::new();
    let bytes = analyzer.analyze(&[0.0; FFT_SIZE]);
    assert!(bytes.iter().all(|&b| b == 0));
}

#[test]
fn analyzer_concentrates_dc_energy_in_low_bins() {
    let mut analyzer = SpectrumAnalyzer::new();
    let bytes = analyzer.analyze(&[1.0; FFT_SIZE]);
    assert_eq!(bytes[0], 255);
    // Far from DC the windowed spectrum is numerically empty.
    assert_eq!(bytes[64], 0);
    assert_eq!(bytes[100], 0);
}

#[test]
fn analyzer_zero_pads_short_input() {
    let mut analyzer = SpectrumAnalyzer::new();
    let bytes = analyzer.analyze(&[0.5; 10]);
    assert_eq!(bytes.len(), SPECTRUM_BINS);
}

#[test]
fn analysis_buffer_duration_is_frames_over_rate() {
    let pcm = AnalysisBuffer::new(vec![0.0; 44_100], 44_100);
    assert_eq!(pcm.duration(), Duration::from_secs(1));

    let pcm = AnalysisBuffer::new(Vec::new(), 44_100);
    assert_eq!(pcm.duration(), Duration::ZERO);
}

#[test]
fn analysis_buffer_window_zero_pads_past_end() {
    let pcm = AnalysisBuffer::new(vec![0.5; 100], 44_100);
    let mut out = [1.0f32; FFT_SIZE];
    pcm.window_at(Duration::ZERO, &mut out);
    assert_eq!(out[0], 0.5);
    assert_eq!(out[99], 0.5);
    assert_eq!(out[100], 0.0);
    assert_eq!(out[FFT_SIZE - 1], 0.0);
}

// --- engine semantics (driven synchronously, no audio device needed) ---

#[test]
fn set_volume_clamps_and_publishes() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    engine.handle(PlayerCmd::SetVolume(1.5));
    assert_eq!(snapshot(&info).volume, 1.0);

    engine.handle(PlayerCmd::SetVolume(-0.5));
    assert_eq!(snapshot(&info).volume, 0.0);

    engine.handle(PlayerCmd::SetVolume(f32::NAN));
    assert_eq!(snapshot(&info).volume, 0.0);
}

#[test]
fn positive_volume_while_muted_unmutes() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    engine.handle(PlayerCmd::ToggleMute);
    assert!(snapshot(&info).muted);

    engine.handle(PlayerCmd::SetVolume(0.4));
    let state = snapshot(&info);
    assert!(!state.muted);
    assert_eq!(state.volume, 0.4);
}

#[test]
fn mute_round_trip_preserves_volume() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    engine.handle(PlayerCmd::SetVolume(0.3));
    engine.handle(PlayerCmd::ToggleMute);
    let muted = snapshot(&info);
    assert!(muted.muted);
    assert_eq!(muted.volume, 0.3);

    engine.handle(PlayerCmd::ToggleMute);
    let unmuted = snapshot(&info);
    assert!(!unmuted.muted);
    assert_eq!(unmuted.volume, 0.3);
}

#[test]
fn next_wraps_around_the_list() {
    let (mut engine, info, _) = engine_with(vec![t("a"), t("b"), t("c")]);

    engine.handle(PlayerCmd::Next);
    assert_eq!(snapshot(&info).index, Some(1));
    engine.handle(PlayerCmd::Next);
    assert_eq!(snapshot(&info).index, Some(2));
    engine.handle(PlayerCmd::Next);
    assert_eq!(snapshot(&info).index, Some(0));
}

#[test]
fn prev_from_first_wraps_to_last() {
    let (mut engine, info, _) = engine_with(vec![t("a"), t("b"), t("c")]);

    engine.handle(PlayerCmd::Prev);
    assert_eq!(snapshot(&info).index, Some(2));
}

#[test]
fn empty_list_makes_everything_a_no_op() {
    let (mut engine, info, spectrum) = engine_with(Vec::new());

    engine.handle(PlayerCmd::Play);
    engine.handle(PlayerCmd::Next);
    engine.handle(PlayerCmd::Prev);
    engine.handle(PlayerCmd::Toggle);
    engine.handle(PlayerCmd::Seek(10.0));
    engine.tick();

    let state = snapshot(&info);
    assert_eq!(state.index, None);
    assert!(!state.playing);
    assert_eq!(state.elapsed, Duration::ZERO);
    // No play ever succeeded, so the graph was never opened.
    assert!(spectrum.lock().unwrap().is_none());
}

#[test]
fn set_track_with_unknown_id_is_ignored() {
    let (mut engine, info, _) = engine_with(vec![t("a"), t("b")]);

    engine.handle(PlayerCmd::SetTrack("zzz".into()));
    assert_eq!(snapshot(&info).index, Some(0));
}

#[test]
fn set_track_moves_index_and_same_id_keeps_it() {
    let (mut engine, info, _) = engine_with(vec![t("a"), t("b"), t("c")]);

    engine.handle(PlayerCmd::SetTrack("b".into()));
    assert_eq!(snapshot(&info).index, Some(1));

    engine.handle(PlayerCmd::SetTrack("b".into()));
    let state = snapshot(&info);
    assert_eq!(state.index, Some(1));
    assert_eq!(state.elapsed, Duration::ZERO);
    assert!(!state.playing);
}

#[test]
fn pause_when_already_paused_changes_nothing() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    let before = snapshot(&info);
    engine.handle(PlayerCmd::Pause);
    let after = snapshot(&info);

    assert_eq!(before.playing, after.playing);
    assert_eq!(before.elapsed, after.elapsed);
    assert_eq!(before.index, after.index);
}

#[test]
fn play_failure_leaves_engine_stopped_without_panicking() {
    // The track path does not exist, so even with a working output device
    // the load step fails; either way the engine must absorb it.
    let (mut engine, info, _) = engine_with(vec![t("missing")]);

    engine.handle(PlayerCmd::Play);
    let state = snapshot(&info);
    assert!(!state.playing);
    assert_eq!(state.bands, FrequencyBands::default());

    // Retry is allowed and equally harmless.
    engine.handle(PlayerCmd::Toggle);
    assert!(!snapshot(&info).playing);
}

#[test]
fn seek_with_no_loaded_media_clamps_to_zero() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    engine.handle(PlayerCmd::Seek(42.0));
    assert_eq!(snapshot(&info).elapsed, Duration::ZERO);

    engine.handle(PlayerCmd::Seek(-3.0));
    assert_eq!(snapshot(&info).elapsed, Duration::ZERO);
}

#[test]
fn bands_stay_zero_while_not_playing() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    for _ in 0..5 {
        engine.tick();
    }
    assert_eq!(snapshot(&info).bands, FrequencyBands::default());
}

#[test]
fn quit_tears_down_once_and_reports_stopped() {
    let (mut engine, info, _) = engine_with(vec![t("a")]);

    assert!(!engine.handle(PlayerCmd::Quit));
    let state = snapshot(&info);
    assert!(!state.playing);
    assert_eq!(state.bands, FrequencyBands::default());
}

// --- facade ---

#[test]
fn facade_initial_state_with_tracks() {
    let player = AudioPlayer::new(vec![t("a"), t("b")], AudioSettings::default());

    let state = player.state();
    assert_eq!(state.index, Some(0));
    assert!(!state.playing);
    assert_eq!(state.elapsed, Duration::ZERO);
    assert_eq!(state.duration, Duration::ZERO);
    assert_eq!(state.volume, DEFAULT_VOLUME);
    assert!(!state.muted);
    assert_eq!(state.bands, FrequencyBands::default());

    assert_eq!(player.tracks().len(), 2);
    assert_eq!(player.current_track().map(|t| t.id.as_str()), Some("a"));
    // Graph not opened yet, so there is no spectrum to read.
    assert!(player.frequency_data().is_none());

    player.close();
}

#[test]
fn facade_initial_state_with_empty_list() {
    let player = AudioPlayer::new(Vec::new(), AudioSettings::default());

    let state = player.state();
    assert_eq!(state.index, None);
    assert!(player.current_track().is_none());

    player.close();
    // A second close is a safe no-op.
    player.close();
}

#[test]
fn facade_clamps_configured_default_volume() {
    let settings = AudioSettings {
        default_volume: 3.0,
        ..AudioSettings::default()
    };
    let player = AudioPlayer::new(vec![t("a")], settings);
    assert_eq!(player.state().volume, 1.0);
    player.close();
}
