//! Adaptive speech/silence thresholding.
//!
//! Two scalars drive the voice-activity decision: a running volume
//! baseline (exponential moving average of buffer loudness) and a running
//! energy threshold that tightens while speech keeps clearing it and
//! relaxes quickly during silence. Both are stored as f32 bits inside
//! atomics so the recorder and processor threads get visibility-safe
//! reads without a lock around the scalars themselves.
//!
//! Writer discipline: the recorder loop is the only writer of the volume
//! baseline, the processor loop is the only writer of the energy
//! threshold. Each scalar has exactly one writer; everyone else only
//! reads.

use super::energy::loudness;
use super::AudioBuffer;
use std::sync::atomic::{AtomicU32, Ordering};

/// Starting value for the energy threshold. Tuned value, pinned by tests.
pub const INITIAL_ENERGY_THRESHOLD: f32 = 0.1;

/// Multiplier applied while energy stays above the threshold.
pub const ENERGY_DECAY: f32 = 0.99;

/// Multiplier applied while energy stays at or below the threshold.
pub const ENERGY_GROWTH: f32 = 1.5;

/// Smoothing factor for the volume baseline: new = 0.9*old + 0.1*current.
pub const ADAPT_FACTOR: f32 = 0.9;

/// Starting value for the volume baseline.
pub const INITIAL_VOLUME_BASELINE: f32 = 0.02;

/// Shared adaptive VAD state.
///
/// The asymmetry between [`ENERGY_DECAY`] and [`ENERGY_GROWTH`] keeps the
/// control loop from running away in either direction: a loud room only
/// tightens the threshold 1% per buffer, while silence relaxes it 50% per
/// buffer so the system becomes permissive again quickly.
#[derive(Debug)]
pub struct AdaptiveThreshold {
    volume_baseline_bits: AtomicU32,
    energy_threshold_bits: AtomicU32,
}

impl AdaptiveThreshold {
    pub fn new() -> Self {
        Self {
            volume_baseline_bits: AtomicU32::new(INITIAL_VOLUME_BASELINE.to_bits()),
            energy_threshold_bits: AtomicU32::new(INITIAL_ENERGY_THRESHOLD.to_bits()),
        }
    }

    pub fn volume_baseline(&self) -> f32 {
        f32::from_bits(self.volume_baseline_bits.load(Ordering::Relaxed))
    }

    pub fn energy_threshold(&self) -> f32 {
        f32::from_bits(self.energy_threshold_bits.load(Ordering::Relaxed))
    }

    /// Whether the buffer's loudness clears the current volume baseline.
    pub fn is_speech(&self, buffer: &AudioBuffer) -> bool {
        loudness(buffer.samples()) > self.volume_baseline()
    }

    /// Fold the buffer's loudness into the baseline. Recorder-loop only.
    pub fn update_volume(&self, buffer: &AudioBuffer) {
        let current = loudness(buffer.samples());
        let updated = ADAPT_FACTOR * self.volume_baseline() + (1.0 - ADAPT_FACTOR) * current;
        self.volume_baseline_bits
            .store(updated.to_bits(), Ordering::Relaxed);
    }

    /// Retune the energy threshold after one buffer. Processor-loop only.
    ///
    /// Returns the adjusted threshold so the caller compares against the
    /// post-update value, matching the order the silence gate expects.
    pub fn update_energy_threshold(&self, energy: f32) -> f32 {
        let factor = if energy > self.energy_threshold() {
            ENERGY_DECAY
        } else {
            ENERGY_GROWTH
        };
        let updated = self.energy_threshold() * factor;
        self.energy_threshold_bits
            .store(updated.to_bits(), Ordering::Relaxed);
        updated
    }
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self::new()
    }
}
