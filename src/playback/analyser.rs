//! Real-time frequency analyser
//!
//! Follows the Web Audio `AnalyserNode` byte frequency convention: Blackman
//! window, magnitude normalized by the transform size, exponential smoothing
//! across frames, then a decibel range mapped onto `0..=255`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

/// Transform size
pub const FFT_SIZE: usize = 256;

/// Number of frequency bins produced per frame
pub const BIN_COUNT: usize = FFT_SIZE / 2;

/// Weight of the previous frame when smoothing
pub const SMOOTHING: f32 = 0.8;

/// Decibel value mapped to 0
pub const MIN_DECIBELS: f32 = -100.0;

/// Decibel value mapped to 255
pub const MAX_DECIBELS: f32 = -30.0;

struct AnalyserState {
    ring: Vec<f32>,
    write: usize,
    smoothed: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

/// Frequency analyser fed with rendered output blocks
pub struct Analyser {
    state: Mutex<AnalyserState>,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl std::fmt::Debug for Analyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyser")
            .field("fft_size", &FFT_SIZE)
            .finish_non_exhaustive()
    }
}

impl Default for Analyser {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyser {
    /// Create an analyser with an empty (silent) input window
    #[must_use]
    pub fn new() -> Self {
        let fft = FftPlanner::<f32>::new().plan_fft_forward(FFT_SIZE);

        Self {
            state: Mutex::new(AnalyserState {
                ring: vec![0.0; FFT_SIZE],
                write: 0,
                smoothed: vec![0.0; BIN_COUNT],
                scratch: vec![Complex::new(0.0, 0.0); FFT_SIZE],
            }),
            fft,
            window: blackman_window(FFT_SIZE),
        }
    }

    fn state(&self) -> MutexGuard<'_, AnalyserState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of bins written by [`Analyser::get_byte_frequency_data`]
    #[must_use]
    pub const fn bin_count(&self) -> usize {
        BIN_COUNT
    }

    /// Append mono samples to the input window
    pub fn push(&self, samples: &[f32]) {
        let mut state = self.state();
        for &sample in samples {
            let idx = state.write;
            state.ring[idx] = sample;
            state.write = (idx + 1) % FFT_SIZE;
        }
    }

    /// Append the first channel of an interleaved block
    pub fn push_interleaved(&self, data: &[f32], channels: usize) {
        let channels = channels.max(1);
        let mut state = self.state();
        for frame in data.chunks(channels) {
            let idx = state.write;
            state.ring[idx] = frame[0];
            state.write = (idx + 1) % FFT_SIZE;
        }
    }

    /// Compute the current frequency magnitudes into `out`
    ///
    /// Writes at most [`BIN_COUNT`] values.
    pub fn get_byte_frequency_data(&self, out: &mut [u8]) {
        let mut guard = self.state();
        let state = &mut *guard;

        // Oldest sample first
        for i in 0..FFT_SIZE {
            let sample = state.ring[(state.write + i) % FFT_SIZE];
            state.scratch[i] = Complex::new(sample * self.window[i], 0.0);
        }

        self.fft.process(&mut state.scratch);

        #[allow(clippy::cast_precision_loss)]
        let scale = 1.0 / FFT_SIZE as f32;
        let range = MAX_DECIBELS - MIN_DECIBELS;

        for (bin, slot) in out.iter_mut().take(BIN_COUNT).enumerate() {
            let magnitude = state.scratch[bin].norm() * scale;
            let smoothed = SMOOTHING.mul_add(state.smoothed[bin], (1.0 - SMOOTHING) * magnitude);
            state.smoothed[bin] = smoothed;

            let db = 20.0 * smoothed.log10();
            let scaled = 255.0 * (db - MIN_DECIBELS) / range;

            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let byte = if scaled.is_finite() {
                scaled.clamp(0.0, 255.0) as u8
            } else {
                0
            };
            *slot = byte;
        }
    }

    #[cfg(test)]
    pub(crate) fn byte_frequency_data(&self) -> Vec<u8> {
        let mut out = vec![0u8; BIN_COUNT];
        self.get_byte_frequency_data(&mut out);
        out
    }
}

/// Blackman window of `size` points
#[allow(clippy::cast_precision_loss)]
fn blackman_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n;
            0.08f32.mul_add((2.0 * x).cos(), 0.5f32.mul_add(-x.cos(), 0.42))
        })
        .collect()
}
