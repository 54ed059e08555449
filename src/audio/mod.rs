//! Real-time audio capture and voice-activity-detection pipeline.
//!
//! Microphone audio is captured in fixed-duration buffers via CPAL,
//! normalized to 44.1 kHz mono, and classified as speech or silence by an
//! adaptive energy threshold that retunes itself after every buffer.

/// Sample rate every captured buffer is normalized to.
pub const SAMPLE_RATE: u32 = 44_100;

/// Captured channel count after downmixing.
pub const CHANNELS: u32 = 1;

/// Length of one capture segment in seconds.
pub const CAPTURE_SECS: u64 = 10;

mod capture;
mod energy;
mod resample;
#[cfg(test)]
mod tests;
mod vad;

pub use capture::{AudioSource, CaptureSource};
pub use energy::{loudness, pre_emphasis_energy, LOUDNESS_SCALE, PRE_EMPHASIS};
pub use vad::{
    AdaptiveThreshold, ADAPT_FACTOR, ENERGY_DECAY, ENERGY_GROWTH, INITIAL_ENERGY_THRESHOLD,
    INITIAL_VOLUME_BASELINE,
};

/// One captured microphone segment: mono f32 samples at a fixed rate.
///
/// Buffers are immutable once captured and move producer -> queue ->
/// consumer, so no two threads ever hold the same samples.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration of the segment in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
