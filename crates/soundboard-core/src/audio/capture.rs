use crate::{CoreResult, SoundboardError};

use std::{
    collections::VecDeque,
    panic::Location,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument};

/// Longest clip a slot keeps, in seconds. Older audio is dropped first.
pub(crate) const MAX_RECORDING_SECS: usize = 60 * 5;

/// Sample cap for a device running at `sample_rate` with `channels` inputs.
pub(crate) fn max_buffer_samples(sample_rate: u32, channels: usize) -> usize {
    sample_rate as usize * channels * MAX_RECORDING_SECS
}

/// Append `data` to `buf`, dropping the oldest samples beyond `cap`.
pub(crate) fn push_bounded(buf: &mut VecDeque<f32>, data: &[f32], cap: usize) {
    buf.extend(data.iter().copied());
    while buf.len() > cap {
        buf.pop_front();
    }
}

/// Captured audio handed back by [`AudioCapturer::stop`].
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// A live capture from the default input device.
///
/// The cpal stream lives on a dedicated thread for the duration of the
/// capture; samples flow back through a shared bounded buffer.
pub struct AudioCapturer {
    samples: Arc<Mutex<VecDeque<f32>>>,
    /// Signals the audio callback to stop writing. Set to `true` before
    /// the stream is dropped so no in-flight callback writes after the
    /// buffer is drained in `stop()`.
    shutdown: Arc<AtomicBool>,
    stop_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapturer {
    /// Open the default input device and begin capturing.
    #[track_caller]
    #[instrument]
    pub fn start() -> CoreResult<Self> {
        let samples = Arc::new(Mutex::new(VecDeque::new()));
        let shutdown = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<(u32, u16)>>();
        let (stop_tx, stop_rx) = mpsc::channel::<()>();

        let thread_samples = Arc::clone(&samples);
        let thread_shutdown = Arc::clone(&shutdown);
        let thread = thread::Builder::new()
            .name("soundboard-capture".to_string())
            .spawn(move || {
                let stream = match build_input_stream(thread_samples, thread_shutdown) {
                    Ok((stream, format)) => {
                        let _ = ready_tx.send(Ok(format));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let _ = stop_rx.recv();
                drop(stream);
            })
            .map_err(|e| SoundboardError::DeviceError {
                reason: format!("Failed to spawn capture thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (sample_rate, channels) =
            ready_rx
                .recv()
                .map_err(|e| SoundboardError::DeviceError {
                    reason: format!("Capture thread exited before reporting: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })??;

        info!(sample_rate, channels, "Audio capture started");

        Ok(Self {
            samples,
            shutdown,
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            sample_rate,
            channels,
        })
    }

    /// Stop the device and drain everything captured so far.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn stop(&mut self) -> CoreResult<CapturedAudio> {
        self.halt()?;

        let samples: Vec<f32> = self
            .samples
            .lock()
            .map_err(|e| SoundboardError::DeviceError {
                reason: format!("Failed to lock samples: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .drain(..)
            .collect();

        debug!(sample_count = samples.len(), "Captured audio samples");

        Ok(CapturedAudio {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
        })
    }

    #[track_caller]
    fn halt(&mut self) -> CoreResult<()> {
        self.shutdown.store(true, Ordering::Release);
        drop(self.stop_tx.take());

        if let Some(thread) = self.thread.take() {
            thread.join().map_err(|_| SoundboardError::DeviceError {
                reason: "Capture thread panicked".to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;
            info!("Audio capture stopped");
        }

        Ok(())
    }
}

impl Drop for AudioCapturer {
    fn drop(&mut self) {
        if let Err(e) = self.halt() {
            error!(error = ?e, "Failed to halt capture on drop");
        }
    }
}

fn build_input_stream(
    samples: Arc<Mutex<VecDeque<f32>>>,
    shutdown: Arc<AtomicBool>,
) -> CoreResult<(cpal::Stream, (u32, u16))> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or(SoundboardError::NoMicrophoneFound {
            location: ErrorLocation::from(Location::caller()),
        })?;

    let config = device
        .default_input_config()
        .map_err(|e| SoundboardError::DeviceError {
            reason: format!("Failed to get config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let sample_rate = config.sample_rate();
    let channels = config.channels();
    let cap = max_buffer_samples(sample_rate, usize::from(channels));

    debug!(
        device_id = ?device.id(),
        sample_rate = sample_rate,
        channels = channels,
        "Opening input device"
    );

    let stream = device
        .build_input_stream(
            &config.into(),
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                if shutdown.load(Ordering::Acquire) {
                    return;
                }
                // A poisoned buffer still holds valid audio.
                let mut buf = samples.lock().unwrap_or_else(|e| {
                    error!("Sample buffer lock poisoned, recovering: {}", e);
                    e.into_inner()
                });
                push_bounded(&mut buf, data, cap);
            },
            |err| {
                error!("Audio input stream error: {}", err);
            },
            None,
        )
        .map_err(|e| SoundboardError::DeviceError {
            reason: format!("Failed to build stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| SoundboardError::DeviceError {
        reason: format!("Failed to start stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok((stream, (sample_rate, channels)))
}
