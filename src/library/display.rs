//! Presentation helpers for tracks and playback times.

/// Format a duration in seconds as `M:SS`.
///
/// Minutes are not zero-padded and may exceed 59 (`3661.0` -> `"61:01"`).
/// Fails safe: NaN, negative or infinite input formats as `"0:00"`.
pub fn format_duration(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Build a display string for a track, preferring "Artist - Title" and
/// falling back to the bare title when no usable artist is present.
pub fn make_display(title: &str, artist: Option<&str>) -> String {
    match artist.map(str::trim).filter(|a| !a.is_empty()) {
        Some(a) => format!("{} - {}", a, title.trim()),
        None => title.trim().to_string(),
    }
}
