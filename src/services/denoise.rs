//! Bundled denoiser: a windowed RMS noise gate.
//!
//! The processor treats denoising as an external collaborator behind the
//! [`Denoiser`](super::Denoiser) trait; this implementation attenuates
//! windows whose RMS sits near the buffer's noise floor and passes louder
//! windows through untouched. The output always has the input's shape.

use super::Denoiser;
use crate::error::Error;

/// Window length over which RMS is measured, in samples at 44.1 kHz (~10 ms).
const WINDOW_SAMPLES: usize = 441;

/// Windows below `floor * GATE_RATIO` are attenuated.
const GATE_RATIO: f32 = 1.5;

/// Gain applied to gated windows. Non-zero so speech onsets straddling a
/// window boundary are softened rather than chopped.
const GATE_GAIN: f32 = 0.1;

pub struct NoiseGate;

impl NoiseGate {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self::new()
    }
}

impl Denoiser for NoiseGate {
    fn denoise(&self, samples: &[f32]) -> Result<Vec<f32>, Error> {
        if samples.is_empty() {
            return Err(Error::Validation("cannot denoise an empty buffer".into()));
        }

        let window_rms: Vec<f32> = samples
            .chunks(WINDOW_SAMPLES)
            .map(|window| {
                let energy: f32 =
                    window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32;
                energy.sqrt()
            })
            .collect();

        // Noise floor: the quietest decile of windows.
        let mut sorted = window_rms.clone();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let floor = sorted[sorted.len() / 10];
        let gate = floor * GATE_RATIO;

        let mut output = Vec::with_capacity(samples.len());
        for (window, rms) in samples.chunks(WINDOW_SAMPLES).zip(window_rms) {
            let gain = if rms <= gate { GATE_GAIN } else { 1.0 };
            output.extend(window.iter().map(|s| s * gain));
        }
        Ok(output)
    }
}
