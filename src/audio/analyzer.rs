//! The audio graph: output stream plus spectrum analysis.
//!
//! Opened lazily on the first play request, since opening the output
//! device is the step that can fail on headless or locked-down hosts.
//! Analysis runs a fixed 256-point FFT over a window of the track's own
//! decoded samples at the playhead and scales magnitudes to the 0-255
//! byte range expected by the band math.

use std::sync::Arc;
use std::time::Duration;

use num_complex::Complex;
use rodio::{OutputStream, OutputStreamBuilder};
use rustfft::{Fft, FftPlanner};

use crate::error::PlayerError;

use super::bands::SPECTRUM_BINS;

/// Transform size. Half of it lands in the byte spectrum.
pub(super) const FFT_SIZE: usize = SPECTRUM_BINS * 2;

// Magnitudes are mapped onto this decibel range before byte scaling,
// matching the common analyser convention the band ranges were tuned for.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Fully decoded mono samples for the current track, indexed by playhead
/// position. Kept separate from the playback pipeline so seeks and mixer
/// buffering cannot skew what the analyser sees.
pub(super) struct AnalysisBuffer {
    mono: Vec<f32>,
    sample_rate: u32,
    duration: Duration,
}

impl AnalysisBuffer {
    pub(super) fn new(mono: Vec<f32>, sample_rate: u32) -> Self {
        let sample_rate = sample_rate.max(1);
        let duration = Duration::from_secs_f64(mono.len() as f64 / f64::from(sample_rate));
        Self {
            mono,
            sample_rate,
            duration,
        }
    }

    /// Authoritative track length: decoded frames over sample rate.
    pub(super) fn duration(&self) -> Duration {
        self.duration
    }

    /// Copy the `FFT_SIZE` samples starting at `at` into `out`,
    /// zero-padding past the end of the track.
    pub(super) fn window_at(&self, at: Duration, out: &mut [f32; FFT_SIZE]) {
        let start = (at.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = self.mono.get(start + k).copied().unwrap_or(0.0);
        }
    }
}

/// Fixed-size FFT with preallocated buffers and a reusable byte spectrum.
pub(super) struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    bytes: [u8; SPECTRUM_BINS],
}

impl SpectrumAnalyzer {
    pub(super) fn new() -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(FFT_SIZE);

        // Precomputed Hann window.
        let window: Vec<f32> = (0..FFT_SIZE)
            .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / FFT_SIZE as f32).cos()))
            .collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            bytes: [0; SPECTRUM_BINS],
        }
    }

    /// Run one transform over `samples` (zero-padded or truncated to the
    /// transform size) and return the byte spectrum.
    pub(super) fn analyze(&mut self, samples: &[f32]) -> [u8; SPECTRUM_BINS] {
        for i in 0..FFT_SIZE {
            let s = samples.get(i).copied().unwrap_or(0.0);
            self.buffer[i] = Complex::new(s * self.window[i], 0.0);
        }

        self.fft.process(&mut self.buffer);

        let norm = 1.0 / FFT_SIZE as f32;
        for (i, out) in self.bytes.iter_mut().enumerate() {
            let mag = self.buffer[i].norm() * norm;
            let db = 20.0 * (mag + 1e-10).log10();
            let scaled = (db - MIN_DB) / (MAX_DB - MIN_DB);
            *out = (scaled.clamp(0.0, 1.0) * 255.0) as u8;
        }
        self.bytes
    }
}

/// Output stream plus analyser, built at most once per engine instance.
pub(super) struct AudioGraph {
    pub(super) stream: OutputStream,
    analyzer: SpectrumAnalyzer,
}

impl AudioGraph {
    pub(super) fn open() -> Result<Self, PlayerError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| PlayerError::Device(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for an embedded engine.
        stream.log_on_drop(false);

        Ok(Self {
            stream,
            analyzer: SpectrumAnalyzer::new(),
        })
    }

    /// Byte spectrum of the decoded track at playhead position `at`.
    pub(super) fn analyze_at(&mut self, pcm: &AnalysisBuffer, at: Duration) -> [u8; SPECTRUM_BINS] {
        let mut window = [0.0f32; FFT_SIZE];
        pcm.window_at(at, &mut window);
        self.analyzer.analyze(&window)
    }
}
