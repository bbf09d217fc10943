use crate::{CoreResult, SoundboardError};

use std::panic::Location;

use audioadapter_buffers::direct::InterleavedSlice;
use error_location::ErrorLocation;
use rubato::{Fft, FixedSync, Resampler as RubatoResampler};
use tracing::{debug, instrument};

/// Converts interleaved audio between sample rates.
pub struct Resampler {
    resampler: Fft<f32>,
    input_rate: u32,
    output_rate: u32,
    channels: usize,
    chunk_size: usize,
}

impl Resampler {
    #[track_caller]
    #[instrument]
    pub fn new(input_rate: u32, output_rate: u32, channels: usize) -> CoreResult<Self> {
        let requested_chunk = 1024;
        let sub_chunks = 2;

        if channels == 0 {
            return Err(SoundboardError::ResamplingError {
                reason: "Channel count must be at least 1".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        let resampler = Fft::<f32>::new(
            input_rate as usize,
            output_rate as usize,
            requested_chunk,
            sub_chunks,
            channels,
            FixedSync::Input,
        )
        .map_err(|e| SoundboardError::ResamplingError {
            reason: format!("Failed to create resampler: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        // rubato may round the chunk to fit the rate ratio.
        let chunk_size = resampler.input_frames_max();

        debug!(
            input_rate = input_rate,
            output_rate = output_rate,
            channels = channels,
            chunk_size = chunk_size,
            "Resampler initialized"
        );

        Ok(Self {
            resampler,
            input_rate,
            output_rate,
            channels,
            chunk_size,
        })
    }

    /// Resample interleaved `samples`, returning interleaved output at the
    /// target rate.
    ///
    /// Each call is independent: filter state is reset, the resampler's
    /// output delay is trimmed from the front and the tail is flushed with
    /// silence, so frame 0 of the input lands on frame 0 of the output.
    #[track_caller]
    #[instrument(skip(self, samples))]
    pub fn resample(&mut self, samples: &[f32]) -> CoreResult<Vec<f32>> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }

        self.resampler.reset();

        let input_frames = samples.len() / self.channels;
        let estimated_frames =
            (input_frames as f64 * self.output_rate as f64 / self.input_rate as f64) as usize;
        let delay = self.resampler.output_delay();
        let needed_frames = estimated_frames + delay;
        let chunk_len = self.chunk_size * self.channels;

        let mut output = Vec::with_capacity(needed_frames * self.channels);
        let mut offset = 0;

        while output.len() < needed_frames * self.channels {
            let end = (offset + chunk_len).min(samples.len());
            let mut input_chunk = samples[offset..end].to_vec();
            input_chunk.resize(chunk_len, 0.0);
            offset = end;

            let input_adapter = InterleavedSlice::new(&input_chunk, self.channels, self.chunk_size)
                .map_err(|e| SoundboardError::ResamplingError {
                    reason: format!("Failed to create input adapter: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            let output_frames = self.resampler.output_frames_max();
            let mut output_chunk = vec![0.0f32; output_frames * self.channels];

            let mut output_adapter =
                InterleavedSlice::new_mut(&mut output_chunk, self.channels, output_frames)
                    .map_err(|e| SoundboardError::ResamplingError {
                        reason: format!("Failed to create output adapter: {}", e),
                        location: ErrorLocation::from(Location::caller()),
                    })?;

            let (_input_frames, output_frames_written) = self
                .resampler
                .process_into_buffer(&input_adapter, &mut output_adapter, None)
                .map_err(|e| SoundboardError::ResamplingError {
                    reason: format!("Resampling failed: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })?;

            if output_frames_written == 0 && offset >= samples.len() {
                break;
            }

            output.extend_from_slice(&output_chunk[..output_frames_written * self.channels]);
        }

        output.drain(..(delay * self.channels).min(output.len()));
        output.truncate(estimated_frames * self.channels);

        debug!(
            input_len = samples.len(),
            output_len = output.len(),
            input_rate = self.input_rate,
            output_rate = self.output_rate,
            delay_frames = delay,
            "Resampled audio"
        );

        Ok(output)
    }
}
