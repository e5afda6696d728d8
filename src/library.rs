//! Track records and the directory scanner that produces them.
//!
//! The engine consumes an ordered `Vec<Track>` supplied by the caller;
//! `scan` is the convenience producer for the common "point it at a folder"
//! case. Display helpers live here too since they are presentation concerns
//! of track data, not playback.

mod display;
mod model;
mod scan;

pub use display::{format_duration, make_display};
pub use model::Track;
pub use scan::scan;
