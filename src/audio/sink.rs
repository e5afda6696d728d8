//! Utilities for creating `rodio` sinks and decoding tracks for analysis.
//!
//! The helpers here encapsulate opening/decoding a file, preparing a
//! paused `Sink` at the requested start position, and producing the mono
//! analysis buffer the spectrum analyser windows at the playhead.

use std::fs::File;
use std::io::BufReader;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::PlayerError;
use crate::library::Track;

use super::analyzer::AnalysisBuffer;

fn open_decoder(track: &Track) -> Result<Decoder<BufReader<File>>, PlayerError> {
    let file = File::open(&track.path).map_err(|e| PlayerError::Open {
        path: track.path.clone(),
        source: e,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|e| PlayerError::Decode {
        path: track.path.clone(),
        source: e,
    })
}

/// Create a paused `Sink` for `track` that starts playback at `start_at`.
///
/// `skip_duration` is our seeking primitive; even `Duration::ZERO` is fine.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    track: &Track,
    start_at: Duration,
) -> Result<Sink, PlayerError> {
    let source = open_decoder(track)?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

/// Decode `track` in full into a mono buffer for the analyser.
///
/// Interleaved channel frames are averaged down to one sample per frame.
/// The buffer also yields the authoritative duration (decoded frames over
/// sample rate), which is more reliable than container metadata.
pub(super) fn decode_analysis_buffer(track: &Track) -> Result<AnalysisBuffer, PlayerError> {
    let decoder = open_decoder(track)?;

    let channels = usize::from(decoder.channels()).max(1);
    let sample_rate = u32::from(decoder.sample_rate());

    let mut mono: Vec<f32> = Vec::new();
    let mut acc = 0.0f32;
    let mut filled = 0usize;
    for sample in decoder {
        acc += sample;
        filled += 1;
        if filled == channels {
            mono.push(acc / channels as f32);
            acc = 0.0;
            filled = 0;
        }
    }
    // A trailing partial frame still contributes what it has.
    if filled > 0 {
        mono.push(acc / filled as f32);
    }

    Ok(AnalysisBuffer::new(mono, sample_rate))
}
