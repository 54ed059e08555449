//! Energy and loudness estimation for captured buffers.
//!
//! Energy uses a first-order pre-emphasis filter that boosts high
//! frequencies before summing squared magnitudes, which makes speech stand
//! out against low-frequency room noise. Loudness is a plain scaled L2
//! norm used for the recorder-side speech gate.

/// Pre-emphasis coefficient. Tuned value, pinned by tests.
pub const PRE_EMPHASIS: f32 = 0.97;

/// Fixed multiplier applied to the L2 norm when computing loudness.
pub const LOUDNESS_SCALE: f32 = 10.0;

/// Sum of squared pre-emphasized samples: `y[0] = x[0]`,
/// `y[i] = x[i] - 0.97 * x[i-1]`, energy = sum of `y[i]^2`.
///
/// An empty buffer short-circuits to 0.0. Capture produces fixed-length
/// buffers so that case never arises in normal flow, but the contract
/// rejects it explicitly rather than indexing out of range.
pub fn pre_emphasis_energy(samples: &[f32]) -> f32 {
    let Some(&first) = samples.first() else {
        return 0.0;
    };
    let mut energy = first * first;
    for pair in samples.windows(2) {
        let emphasized = pair[1] - PRE_EMPHASIS * pair[0];
        energy += emphasized * emphasized;
    }
    energy
}

/// L2 norm of the buffer scaled by [`LOUDNESS_SCALE`].
pub fn loudness(samples: &[f32]) -> f32 {
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    sum_sq.sqrt() * LOUDNESS_SCALE
}
