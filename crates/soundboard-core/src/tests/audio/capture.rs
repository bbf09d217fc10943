use crate::audio::capture::{MAX_RECORDING_SECS, max_buffer_samples, push_bounded};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const SAMPLE_RATE: u32 = 8_000;
const CHANNELS: usize = 2;

/// WHAT: Buffer cap scales with rate, channels and the maximum duration
/// WHY: Stereo devices must keep the same recording length as mono ones
#[test]
fn given_stereo_device_when_sizing_buffer_then_cap_covers_max_duration() {
    // Given/When: Cap for a stereo 48kHz device
    let cap = max_buffer_samples(48_000, 2);

    // Then: Five minutes of interleaved stereo
    assert_eq!(cap, 48_000 * 2 * MAX_RECORDING_SECS);
}

/// WHAT: Buffer respects its cap and drops the oldest samples
/// WHY: Prevents unbounded memory growth during long recordings
#[test]
fn given_buffer_at_max_capacity_when_adding_samples_then_oldest_discarded() {
    // Given: A buffer at capacity filled with 0.0
    let cap = max_buffer_samples(SAMPLE_RATE, CHANNELS);
    let mut buf = VecDeque::with_capacity(cap);
    buf.extend(std::iter::repeat_n(0.0f32, cap));

    // When: Adding 1024 new samples (value 1.0) beyond the limit
    push_bounded(&mut buf, &[1.0f32; 1024], cap);

    // Then: Buffer stays at the cap and newest samples are preserved
    assert_eq!(buf.len(), cap);
    assert!((buf[cap - 1] - 1.0).abs() < f32::EPSILON);
    assert!((buf[cap - 1024] - 1.0).abs() < f32::EPSILON);
    assert!(buf[cap - 1025].abs() < f32::EPSILON);
}

/// WHAT: Lock poison recovery preserves buffer data
/// WHY: Captured audio must not be lost when a callback panics
#[test]
#[allow(clippy::unwrap_used, clippy::panic)]
fn given_poisoned_mutex_when_recovering_then_data_preserved() {
    // Given: A mutex poisoned by a panic while holding the lock
    let buf = Arc::new(Mutex::new(VecDeque::from(vec![0.5f32; 100])));
    let buf_clone = Arc::clone(&buf);

    let _ = std::thread::spawn(move || {
        let _guard = buf_clone.lock().unwrap();
        panic!("intentional panic to poison mutex");
    })
    .join();

    // When: Recovering from the poisoned lock
    let recovered = buf.lock().unwrap_or_else(|e| e.into_inner());

    // Then: Original data is fully preserved
    assert_eq!(recovered.len(), 100);
    assert!(recovered.iter().all(|&s| (s - 0.5).abs() < f32::EPSILON));
}

/// WHAT: Capture from the default microphone produces samples
/// WHY: End-to-end check of the cpal input path
#[test]
#[cfg_attr(not(feature = "integration-tests"), ignore)]
#[allow(clippy::unwrap_used)]
fn given_default_microphone_when_capturing_then_samples_returned() {
    // Given: A running capture
    let mut capturer = crate::audio::AudioCapturer::start().unwrap();
    std::thread::sleep(std::time::Duration::from_millis(300));

    // When: Stopping it
    let audio = capturer.stop().unwrap();

    // Then: Format reported and some audio captured
    assert!(audio.sample_rate > 0);
    assert!(audio.channels > 0);
    assert!(!audio.samples.is_empty());
}
