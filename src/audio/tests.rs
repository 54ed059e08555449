use super::capture::downmix_into;
use super::resample::{
    design_low_pass, fir_tap_count, linear_resample, low_pass_fir, resample_to_capture_rate,
};
use super::{
    loudness, pre_emphasis_energy, AdaptiveThreshold, AudioBuffer, ADAPT_FACTOR, ENERGY_DECAY,
    ENERGY_GROWTH, INITIAL_ENERGY_THRESHOLD, INITIAL_VOLUME_BASELINE, LOUDNESS_SCALE,
    PRE_EMPHASIS, SAMPLE_RATE,
};

fn buffer(samples: Vec<f32>) -> AudioBuffer {
    AudioBuffer::new(samples, SAMPLE_RATE)
}

#[test]
fn tuned_constants_are_pinned() {
    assert_eq!(PRE_EMPHASIS, 0.97);
    assert_eq!(LOUDNESS_SCALE, 10.0);
    assert_eq!(INITIAL_ENERGY_THRESHOLD, 0.1);
    assert_eq!(ENERGY_DECAY, 0.99);
    assert_eq!(ENERGY_GROWTH, 1.5);
    assert_eq!(ADAPT_FACTOR, 0.9);
    assert_eq!(INITIAL_VOLUME_BASELINE, 0.02);
    assert_eq!(SAMPLE_RATE, 44_100);
}

#[test]
fn pre_emphasis_energy_matches_hand_computation() {
    // y = [0.5, 1.0 - 0.97*0.5, 0.25 - 0.97*1.0] = [0.5, 0.515, -0.72]
    let samples = [0.5f32, 1.0, 0.25];
    let expected = 0.5f32 * 0.5 + 0.515 * 0.515 + 0.72 * 0.72;
    let energy = pre_emphasis_energy(&samples);
    assert!((energy - expected).abs() < 1e-6, "got {energy}");
}

#[test]
fn pre_emphasis_energy_rejects_empty_input() {
    assert_eq!(pre_emphasis_energy(&[]), 0.0);
}

#[test]
fn pre_emphasis_energy_is_non_negative() {
    let samples: Vec<f32> = (0..500).map(|i| ((i as f32) * 0.13).sin() - 0.5).collect();
    assert!(pre_emphasis_energy(&samples) >= 0.0);
}

#[test]
fn loudness_is_scaled_l2_norm() {
    // ||[3, 4]|| = 5, scaled by 10.
    let value = loudness(&[3.0, 4.0]);
    assert!((value - 50.0).abs() < 1e-4, "got {value}");
}

#[test]
fn threshold_decays_under_loud_input() {
    let vad = AdaptiveThreshold::new();
    let updated = vad.update_energy_threshold(0.5);
    assert!((updated - INITIAL_ENERGY_THRESHOLD * ENERGY_DECAY).abs() < 1e-7);
    assert!((vad.energy_threshold() - updated).abs() < 1e-7);
}

#[test]
fn threshold_grows_under_quiet_input() {
    let vad = AdaptiveThreshold::new();
    let updated = vad.update_energy_threshold(0.05);
    assert!((updated - 0.15).abs() < 1e-6, "got {updated}");
}

#[test]
fn threshold_stays_positive_under_sustained_silence_then_noise() {
    let vad = AdaptiveThreshold::new();
    for _ in 0..200 {
        vad.update_energy_threshold(0.0);
    }
    assert!(vad.energy_threshold() > 0.0);
    for _ in 0..10_000 {
        vad.update_energy_threshold(f32::MAX);
    }
    assert!(vad.energy_threshold() > 0.0);
}

#[test]
fn threshold_is_monotone_while_input_stays_on_one_side() {
    let vad = AdaptiveThreshold::new();
    let mut previous = vad.energy_threshold();
    // Loud input: threshold never increases.
    for _ in 0..20 {
        let next = vad.update_energy_threshold(10.0);
        assert!(next <= previous);
        previous = next;
    }
    // Quiet input: threshold never decreases.
    for _ in 0..20 {
        let next = vad.update_energy_threshold(0.0);
        assert!(next >= previous);
        previous = next;
    }
}

#[test]
fn volume_baseline_converges_to_repeated_loudness() {
    let vad = AdaptiveThreshold::new();
    // A constant buffer with known loudness fed repeatedly should drive the
    // EMA to within epsilon of that loudness.
    let samples = vec![0.1f32; 100];
    let target = loudness(&samples);
    let buf = buffer(samples);
    for _ in 0..200 {
        vad.update_volume(&buf);
    }
    assert!(
        (vad.volume_baseline() - target).abs() < 1e-3,
        "baseline {} vs loudness {}",
        vad.volume_baseline(),
        target
    );
}

#[test]
fn volume_baseline_applies_adapt_factor_once_per_buffer() {
    let vad = AdaptiveThreshold::new();
    let samples = vec![0.2f32; 4];
    let current = loudness(&samples);
    let expected = ADAPT_FACTOR * INITIAL_VOLUME_BASELINE + (1.0 - ADAPT_FACTOR) * current;
    vad.update_volume(&buffer(samples));
    assert!((vad.volume_baseline() - expected).abs() < 1e-6);
}

#[test]
fn is_speech_compares_loudness_to_baseline() {
    let vad = AdaptiveThreshold::new();
    assert!(vad.is_speech(&buffer(vec![0.5; 100])));
    assert!(!vad.is_speech(&buffer(vec![0.0; 100])));
}

#[test]
fn downmix_averages_stereo_frames() {
    let mut out = Vec::new();
    downmix_into(&mut out, &[1.0f32, -1.0, 0.5, 0.5], 2, |s| s);
    assert_eq!(out, vec![0.0, 0.5]);
}

#[test]
fn downmix_preserves_mono() {
    let mut out = Vec::new();
    downmix_into(&mut out, &[0.1f32, 0.2, 0.3], 1, |s| s);
    assert_eq!(out, vec![0.1, 0.2, 0.3]);
}

#[test]
fn downmix_converts_int_samples() {
    let mut out = Vec::new();
    downmix_into(&mut out, &[16_384i16, -16_384], 2, |s| s as f32 / 32_768.0);
    assert_eq!(out, vec![0.0]);
}

#[test]
fn resample_passes_through_at_capture_rate() {
    let input = vec![0.1f32, 0.2, 0.3];
    assert_eq!(resample_to_capture_rate(&input, SAMPLE_RATE), input);
}

#[test]
fn resample_handles_empty_input() {
    assert!(resample_to_capture_rate(&[], 48_000).is_empty());
}

#[test]
fn resample_shrinks_when_downsampling() {
    let input: Vec<f32> = (0..4_800).map(|i| (i as f32 * 0.01).sin()).collect();
    let output = resample_to_capture_rate(&input, 48_000);
    let expected = (input.len() as f64 * f64::from(SAMPLE_RATE) / 48_000.0).round() as usize;
    let diff = (output.len() as isize - expected as isize).abs();
    assert!(diff <= 2, "expected ~{expected}, got {}", output.len());
}

#[test]
fn resample_grows_when_upsampling() {
    let input: Vec<f32> = (0..1_600).map(|i| (i as f32 * 0.05).cos()).collect();
    let output = resample_to_capture_rate(&input, 16_000);
    assert!(output.len() > input.len());
}

#[test]
fn linear_resample_halves_length() {
    let input = vec![0.0f32, 1.0, 2.0, 3.0];
    let output = linear_resample(&input, 0.5);
    assert_eq!(output.len(), 2);
}

#[test]
fn fir_tap_count_is_odd_and_bounded() {
    for rate in [48_000u32, 96_000, 192_000, 1_500_000] {
        let taps = fir_tap_count(rate);
        assert!(taps % 2 == 1);
        assert!(taps <= 129);
    }
}

#[test]
fn low_pass_preserves_length() {
    let input: Vec<f32> = (0..256).map(|i| (i as f32 * 0.3).sin()).collect();
    let output = low_pass_fir(&input, 96_000, fir_tap_count(96_000));
    assert_eq!(output.len(), input.len());
}

#[test]
fn low_pass_coefficients_are_normalized() {
    let coeffs = design_low_pass(0.25, 21);
    let sum: f32 = coeffs.iter().sum();
    assert!((sum - 1.0).abs() < 1e-4);
}

#[test]
fn audio_buffer_reports_duration() {
    let buf = AudioBuffer::new(vec![0.0; SAMPLE_RATE as usize], SAMPLE_RATE);
    assert!((buf.duration_secs() - 1.0).abs() < 1e-9);
    assert!(!buf.is_empty());
    assert_eq!(buf.len(), SAMPLE_RATE as usize);
}
