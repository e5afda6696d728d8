use std::path::{Path, PathBuf};
use std::time::Duration;

use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::display::make_display;
use super::model::Track;

pub(super) fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

/// Stable track key: the file path itself. Unique within one scan and
/// unchanged across rescans as long as the file does not move.
fn track_id(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Look for cover art next to the audio file: `<stem>.jpg`/`<stem>.png`
/// first, then the usual album-level names.
fn find_artwork(path: &Path) -> Option<PathBuf> {
    let dir = path.parent()?;
    let stem = path.file_stem().and_then(|s| s.to_str())?;

    let candidates = [
        format!("{stem}.jpg"),
        format!("{stem}.png"),
        "cover.jpg".to_string(),
        "cover.png".to_string(),
        "folder.jpg".to_string(),
    ];
    candidates
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Walk `dir` and build an ordered track list.
///
/// Honors the extension, hidden-file, recursion and depth rules from
/// `settings`; reads tags via lofty where possible and falls back to the
/// file stem for the title. The result is sorted by display string,
/// case-insensitive, so scans are reproducible.
pub fn scan(dir: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(Result::ok)
    {
        let path = entry.path();
        if path.is_file()
            && (settings.include_hidden || !is_hidden(path))
            && is_audio_file(path, settings)
        {
            let default_title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("UNKNOWN")
                .to_string();

            let mut title = default_title;
            let mut artist: Option<String> = None;
            let mut album: Option<String> = None;
            let mut duration: Option<Duration> = None;
            let mut description: Option<String> = None;

            if let Ok(tagged) = lofty::read_from_path(path) {
                duration = Some(tagged.properties().duration());

                if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
                    if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                        if !v.trim().is_empty() {
                            title = v.to_string();
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                        let v = v.trim();
                        if !v.is_empty() {
                            artist = Some(v.to_string());
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                        let v = v.trim();
                        if !v.is_empty() {
                            album = Some(v.to_string());
                        }
                    }
                    if let Some(v) = tag.get_string(&ItemKey::Comment) {
                        let v = v.trim();
                        if !v.is_empty() {
                            description = Some(v.to_string());
                        }
                    }
                }
            }

            let display = make_display(&title, artist.as_deref());

            tracks.push(Track {
                id: track_id(path),
                path: path.to_path_buf(),
                title,
                artist,
                album,
                duration,
                artwork: find_artwork(path),
                description,
                display,
            });
        }
    }

    tracks.sort_by(|a, b| a.display.to_lowercase().cmp(&b.display.to_lowercase()));
    tracks
}
