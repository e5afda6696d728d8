//! Engine error types.
//!
//! The player never propagates these across the consumer boundary; they are
//! logged at the failure site and folded into a stopped transport state.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlayerError {
    /// No usable audio output device, or the platform refused to open one.
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// The track file could not be opened.
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The track file could not be decoded.
    #[error("failed to decode {path:?}: {source}")]
    Decode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },
}
