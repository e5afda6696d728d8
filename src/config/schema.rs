use serde::Deserialize;

/// Top-level settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/resona/config.toml` or
/// `~/.config/resona/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `RESONA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub library: LibrarySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio: AudioSettings::default(),
            library: LibrarySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Starting volume, in `[0.0, 1.0]`. Out-of-range values are clamped
    /// when the player is constructed.
    pub default_volume: f32,
    /// Engine tick interval in milliseconds. Bounds how often elapsed time
    /// and the frequency snapshot refresh while playing.
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 0.7,
            tick_ms: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "flac".into(), "wav".into(), "ogg".into()],
            follow_links: true,
            include_hidden: true,
            recursive: true,
            max_depth: None,
        }
    }
}
