use crate::{
    RecordingLocation, SoundSource, SoundboardError, WavEncoding,
    audio::{
        CapturedAudio, PcmBuffer,
        decoder::{decode, remap_channels},
        writer::write_wav,
    },
};

use std::path::PathBuf;

/// WHAT: Mono input is duplicated to every output channel
/// WHY: Mono recordings must be audible on both speakers
#[test]
fn given_mono_samples_when_remapping_to_stereo_then_duplicated() {
    // Given/When: Two mono frames mapped to stereo
    let out = remap_channels(&[0.25, -0.5], 1, 2);

    // Then: Each frame is duplicated
    assert_eq!(out, vec![0.25, 0.25, -0.5, -0.5]);
}

/// WHAT: Stereo input is averaged when the device is mono
/// WHY: Downmixing must not drop a channel
#[test]
fn given_stereo_samples_when_remapping_to_mono_then_averaged() {
    // Given/When: One stereo frame mapped to mono
    let out = remap_channels(&[0.5, 0.25], 2, 1);

    // Then: The average of both channels
    assert_eq!(out, vec![0.375]);
}

/// WHAT: A buffer already matching the device is returned untouched
/// WHY: Avoids needless resampling of recorded clips
#[test]
#[allow(clippy::unwrap_used)]
fn given_matching_format_when_conforming_then_samples_unchanged() {
    // Given: A 48kHz stereo buffer
    let pcm = PcmBuffer {
        samples: vec![0.1, 0.2, 0.3, 0.4],
        sample_rate: 48_000,
        channels: 2,
    };

    // When: Conforming to 48kHz stereo
    let out = pcm.clone().conform(48_000, 2).unwrap();

    // Then: Identical
    assert_eq!(out, pcm);
    assert_eq!(out.frames(), 2);
}

/// WHAT: A missing file is a LoadError naming the source
/// WHY: Asset failures are reported per clip
#[test]
fn given_missing_file_when_decoding_then_load_error() {
    // Given: A path that does not exist
    let source = SoundSource::Asset(PathBuf::from("/nonexistent/sound1.mp3"));

    // When: Decoding
    let result = decode(&source);

    // Then: LoadError with the path as identifier
    assert!(matches!(
        &result,
        Err(SoundboardError::LoadError { source_id, .. }) if source_id == "/nonexistent/sound1.mp3"
    ));
}

/// WHAT: A file that is not audio is a LoadError
/// WHY: Decoding failures must not panic or hang
#[test]
#[allow(clippy::unwrap_used)]
fn given_garbage_file_when_decoding_then_load_error() {
    // Given: A text file with an audio extension
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-audio.mp3");
    std::fs::write(&path, b"definitely not an mp3").unwrap();

    // When: Decoding
    let result = decode(&SoundSource::Asset(path));

    // Then: LoadError
    assert!(matches!(result, Err(SoundboardError::LoadError { .. })));
}

/// WHAT: A recorded WAV decodes back with its format and length
/// WHY: Play-back reads the files that finalize writes
#[test]
#[allow(clippy::unwrap_used)]
fn given_written_recording_when_decoding_then_format_and_length_match() {
    // Given: Half a second of 16-bit stereo written to disk
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("recording-1-test.wav");
    let frames = 22_050;
    let audio = CapturedAudio {
        samples: (0..frames * 2).map(|i| ((i as f32) * 0.01).sin() * 0.5).collect(),
        sample_rate: 44_100,
        channels: 2,
    };
    write_wav(&path, &audio, WavEncoding::Int16).unwrap();

    // When: Decoding it as a recorded source
    let pcm = decode(&SoundSource::Recorded(RecordingLocation::new(&path))).unwrap();

    // Then: Same rate, channel count and frame count, values close
    assert_eq!(pcm.sample_rate, 44_100);
    assert_eq!(pcm.channels, 2);
    assert_eq!(pcm.frames(), frames);
    assert!((pcm.samples[100] - audio.samples[100]).abs() < 0.001);
}
