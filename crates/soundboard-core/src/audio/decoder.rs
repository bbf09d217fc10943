//! File decoding into device-ready PCM.

use crate::{
    CoreResult, SoundboardError,
    audio::{Resampler, SoundSource},
};

use std::{fs::File, io::ErrorKind, panic::Location};

use error_location::ErrorLocation;
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};
use tracing::{debug, instrument, warn};

/// Interleaved 32-bit float audio.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: usize,
}

impl PcmBuffer {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels
        }
    }

    /// Remap channels and resample so the buffer can be fed straight into a
    /// device running at `sample_rate` with `channels` outputs.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn conform(self, sample_rate: u32, channels: usize) -> CoreResult<PcmBuffer> {
        let remapped = remap_channels(&self.samples, self.channels, channels);

        let samples = if self.sample_rate == sample_rate || remapped.is_empty() {
            remapped
        } else {
            Resampler::new(self.sample_rate, sample_rate, channels)?.resample(&remapped)?
        };

        Ok(PcmBuffer {
            samples,
            sample_rate,
            channels,
        })
    }
}

/// Map interleaved audio from `from` channels to `to` channels.
///
/// Mono is copied to every output, anything going to mono is averaged,
/// otherwise output channel `c` takes input channel `c % from`.
pub(crate) fn remap_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let frames = samples.len() / from;
    let mut out = Vec::with_capacity(frames * to);

    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
        } else {
            for c in 0..to {
                out.push(frame[c % from]);
            }
        }
    }

    out
}

/// Decode every packet of the first audio track in `source`.
#[track_caller]
#[instrument(skip(source), fields(source = %source.id()))]
pub fn decode(source: &SoundSource) -> CoreResult<PcmBuffer> {
    let path = source.path();
    let location = Location::caller();
    let load_error = |reason: String| SoundboardError::LoadError {
        source_id: source.id(),
        reason,
        location: ErrorLocation::from(location),
    };

    let file = File::open(path).map_err(|e| load_error(format!("Failed to open file: {}", e)))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| load_error(format!("Failed to probe audio format: {}", e)))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| load_error("No audio tracks found".to_string()))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(44_100);
    let mut channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(2);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| load_error(format!("Unsupported codec: {}", e)))?;

    let mut samples = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(load_error(format!("Failed to read packet: {}", e))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let needs_buffer = sample_buf
                    .as_ref()
                    .is_none_or(|buf| buf.capacity() < decoded.capacity());
                if needs_buffer {
                    sample_buf = Some(SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
                }

                if let Some(buf) = sample_buf.as_mut() {
                    buf.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buf.samples());
                }
            }
            // Corrupt packets are skipped; the rest of the file is still playable.
            Err(SymphoniaError::DecodeError(e)) => {
                warn!(error = %e, "Skipping undecodable packet");
            }
            Err(e) => return Err(load_error(format!("Decoder error: {}", e))),
        }
    }

    debug!(
        sample_rate = sample_rate,
        channels = channels,
        sample_count = samples.len(),
        "Decoded sound"
    );

    Ok(PcmBuffer {
        samples,
        sample_rate,
        channels,
    })
}
