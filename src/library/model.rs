use std::path::PathBuf;
use std::time::Duration;

/// One playable audio item. Immutable content record: the engine only ever
/// holds index references into the caller-supplied list.
#[derive(Clone)]
pub struct Track {
    /// Unique, stable key. The scanner derives it from the file path;
    /// callers building their own lists may use any unique string.
    pub id: String,
    /// Locally readable media file.
    pub path: PathBuf,
    pub title: String,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Tagged duration, informational only. The engine publishes the
    /// authoritative duration once the media is decoded.
    pub duration: Option<Duration>,
    /// Sidecar artwork image, if one was found next to the file.
    pub artwork: Option<PathBuf>,
    /// Free-form notes (comment tag).
    pub description: Option<String>,
    /// Precomposed display string ("Artist - Title").
    pub display: String,
}
