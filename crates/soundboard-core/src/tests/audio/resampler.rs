use crate::{SoundboardError, audio::Resampler};

// Test constants
const INPUT_SAMPLE_RATE: u32 = 44_100;
const OUTPUT_SAMPLE_RATE: u32 = 48_000;
const ONE_SECOND_INPUT_FRAMES: usize = INPUT_SAMPLE_RATE as usize;
const ONE_SECOND_OUTPUT_FRAMES: usize = OUTPUT_SAMPLE_RATE as usize;
const LENGTH_TOLERANCE: u64 = 100;
const TEST_SIGNAL_AMPLITUDE: f32 = 0.5;
const MAX_AMPLITUDE: f32 = 1.5;

/// WHAT: Resampler converts 44.1kHz mono to 48kHz
/// WHY: Bundled sounds are mastered at 44.1kHz but devices often run at 48kHz
#[test]
#[allow(clippy::unwrap_used)]
fn given_44k_mono_when_resampling_to_48k_then_output_length_approximately_correct() {
    // Given: Resampler configured for 44.1kHz -> 48kHz mono
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 1).unwrap();
    let input = vec![TEST_SIGNAL_AMPLITUDE; ONE_SECOND_INPUT_FRAMES];

    // When: Resampling one second
    let output = resampler.resample(&input).unwrap();

    // Then: Roughly one second at 48kHz, no NaN/Inf
    assert!(
        (output.len() as i64 - ONE_SECOND_OUTPUT_FRAMES as i64).unsigned_abs() < LENGTH_TOLERANCE,
        "Expected ~{} samples, got {}",
        ONE_SECOND_OUTPUT_FRAMES,
        output.len()
    );
    assert!(output.iter().all(|&s| s.is_finite()));
}

/// WHAT: Stereo output stays interleaved with an even sample count
/// WHY: The output mixer advances whole frames
#[test]
#[allow(clippy::unwrap_used)]
fn given_stereo_tone_when_resampling_then_frames_preserved() {
    // Given: A stereo tone
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 2).unwrap();
    let input: Vec<f32> = (0..ONE_SECOND_INPUT_FRAMES)
        .flat_map(|i| {
            let s = (i as f32 * 0.05).sin() * TEST_SIGNAL_AMPLITUDE;
            [s, -s]
        })
        .collect();

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: Whole frames of the expected length, bounded amplitude
    assert_eq!(output.len() % 2, 0);
    assert!(
        ((output.len() / 2) as i64 - ONE_SECOND_OUTPUT_FRAMES as i64).unsigned_abs()
            < LENGTH_TOLERANCE
    );
    assert!(
        output
            .iter()
            .all(|&s| s.is_finite() && s.abs() <= MAX_AMPLITUDE)
    );
}

/// WHAT: Empty samples return empty output
/// WHY: Edge case handling for zero-length recordings
#[test]
#[allow(clippy::unwrap_used)]
fn given_empty_samples_when_resampling_then_empty_output() {
    // Given: Resampler and empty input
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 1).unwrap();

    // When: Resampling empty data
    let output = resampler.resample(&[]).unwrap();

    // Then: Output is also empty
    assert!(output.is_empty());
}

/// WHAT: Zero channels is rejected
/// WHY: A malformed file must not reach rubato
#[test]
fn given_zero_channels_when_creating_resampler_then_resampling_error() {
    // When: Creating a zero-channel resampler
    let result = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 0);

    // Then: ResamplingError
    assert!(matches!(
        result,
        Err(SoundboardError::ResamplingError { .. })
    ));
}

/// WHAT: An impulse at the first input frame lands at the first output frame
/// WHY: Playing from position 0 must start on the clip's first sample
#[test]
#[allow(clippy::unwrap_used)]
fn given_impulse_at_start_when_resampling_then_onset_not_delayed() {
    // Given: A short clip with a single impulse at frame 0
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 1).unwrap();
    let mut input = vec![0.0f32; 4_410];
    input[0] = 1.0;

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: The peak sits on the first few output frames
    let (peak_at, peak) = output
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()))
        .unwrap();
    assert!(peak_at <= 2, "impulse landed at frame {}", peak_at);
    assert!(peak.abs() > 0.5);
}

/// WHAT: An impulse at the last input frame survives resampling
/// WHY: Short sound effects must not lose their tail
#[test]
#[allow(clippy::unwrap_used)]
fn given_impulse_at_end_when_resampling_then_tail_kept() {
    // Given: A short clip whose only non-zero sample is the last one
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 1).unwrap();
    let mut input = vec![0.0f32; 4_410];
    input[4_409] = 1.0;

    // When: Resampling
    let output = resampler.resample(&input).unwrap();

    // Then: The final output frames carry the impulse
    let tail_max = output[output.len() - 8..]
        .iter()
        .fold(0.0f32, |m, s| m.max(s.abs()));
    assert!(tail_max > 0.3, "tail peak was {}", tail_max);
}

/// WHAT: Resampling the same clip twice gives identical output
/// WHY: Each clip is resampled independently of the previous one
#[test]
#[allow(clippy::unwrap_used)]
fn given_reused_resampler_when_resampling_twice_then_same_output() {
    // Given: A resampler and a short tone
    let mut resampler = Resampler::new(INPUT_SAMPLE_RATE, OUTPUT_SAMPLE_RATE, 1).unwrap();
    let input: Vec<f32> = (0..2_000).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();

    // When: Resampling it twice
    let first = resampler.resample(&input).unwrap();
    let second = resampler.resample(&input).unwrap();

    // Then: No state leaks between calls
    assert_eq!(first, second);
}
