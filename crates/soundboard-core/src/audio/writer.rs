//! WAV finalization for captured audio.

use crate::{CoreResult, SoundboardError, audio::CapturedAudio};

use std::{
    fs,
    panic::Location,
    path::{Path, PathBuf},
};

use error_location::ErrorLocation;
use tracing::{debug, instrument, warn};

/// Sample encoding for recorded files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavEncoding {
    /// 16-bit signed integer PCM.
    Int16,
    /// 32-bit IEEE float.
    Float32,
}

impl WavEncoding {
    /// Encoding for a configured bit depth, if supported.
    pub fn from_bits(bits: u16) -> Option<Self> {
        match bits {
            16 => Some(WavEncoding::Int16),
            32 => Some(WavEncoding::Float32),
            _ => None,
        }
    }

    fn spec(self, sample_rate: u32, channels: u16) -> hound::WavSpec {
        let (bits_per_sample, sample_format) = match self {
            WavEncoding::Int16 => (16, hound::SampleFormat::Int),
            WavEncoding::Float32 => (32, hound::SampleFormat::Float),
        };
        hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// In-progress path used while a file is being written.
fn partial_path(final_path: &Path) -> PathBuf {
    final_path.with_extension("recording.wav")
}

/// Write `audio` to `path` as a WAV file.
///
/// The file is written under a temporary name and renamed into place once
/// the header is finalized, so `path` never names a truncated file. The
/// temporary file is removed if any step fails.
#[track_caller]
#[instrument(skip(audio), fields(sample_count = audio.samples.len()))]
pub fn write_wav(path: &Path, audio: &CapturedAudio, encoding: WavEncoding) -> CoreResult<()> {
    let location = Location::caller();
    let wav_error = |reason: String| SoundboardError::DeviceError {
        reason,
        location: ErrorLocation::from(location),
    };

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)
            .map_err(|e| wav_error(format!("Failed to create {:?}: {}", dir, e)))?;
    }

    let tmp_path = partial_path(path);

    let written = write_partial(&tmp_path, audio, encoding).and_then(|()| {
        fs::rename(&tmp_path, path)
            .map_err(|e| format!("Failed to move recording into place: {}", e))
    });

    if let Err(reason) = written {
        if let Err(e) = fs::remove_file(&tmp_path) {
            warn!(path = ?tmp_path, error = %e, "Failed to remove partial recording");
        }
        return Err(wav_error(reason));
    }

    debug!(path = ?path, "Recording written");

    Ok(())
}

fn write_partial(
    tmp_path: &Path,
    audio: &CapturedAudio,
    encoding: WavEncoding,
) -> Result<(), String> {
    let spec = encoding.spec(audio.sample_rate, audio.channels.max(1));

    let mut writer = hound::WavWriter::create(tmp_path, spec)
        .map_err(|e| format!("Failed to create WAV file: {}", e))?;

    match encoding {
        WavEncoding::Int16 => {
            for &sample in &audio.samples {
                let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
                writer
                    .write_sample(value)
                    .map_err(|e| format!("Failed to write sample: {}", e))?;
            }
        }
        WavEncoding::Float32 => {
            for &sample in &audio.samples {
                writer
                    .write_sample(sample)
                    .map_err(|e| format!("Failed to write sample: {}", e))?;
            }
        }
    }

    writer
        .finalize()
        .map_err(|e| format!("Failed to finalize WAV file: {}", e))
}
