//! Output device and voice mixing.

use crate::{CoreResult, SoundboardError, audio::PcmBuffer};

use std::{
    panic::Location,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
        mpsc,
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// One decoded sound with its own play cursor.
///
/// Samples are already conformed to the output device, so the cursor
/// advances in lockstep with the device buffer.
pub(crate) struct Voice {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: usize,
    cursor: AtomicUsize,
    volume: AtomicU32,
    playing: AtomicBool,
}

impl Voice {
    pub(crate) fn new(buffer: PcmBuffer) -> Self {
        Self {
            samples: buffer.samples,
            sample_rate: buffer.sample_rate,
            channels: buffer.channels.max(1),
            cursor: AtomicUsize::new(0),
            volume: AtomicU32::new(1.0_f32.to_bits()),
            playing: AtomicBool::new(false),
        }
    }

    pub(crate) fn seek(&self, position: Duration) {
        let frame = (position.as_secs_f64() * f64::from(self.sample_rate)) as usize;
        let index = frame.saturating_mul(self.channels).min(self.samples.len());
        self.cursor.store(index, Ordering::Release);
    }

    pub(crate) fn set_volume(&self, volume: f32) {
        self.volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Release);
    }

    pub(crate) fn position(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Add this voice into `out`. Returns `false` once the voice has run out.
    fn mix_into(&self, out: &mut [f32]) -> bool {
        if !self.is_playing() {
            return false;
        }

        let start = self.cursor.load(Ordering::Acquire).min(self.samples.len());
        let volume = f32::from_bits(self.volume.load(Ordering::Acquire));
        let n = (self.samples.len() - start).min(out.len());

        for (o, s) in out.iter_mut().zip(&self.samples[start..start + n]) {
            *o += s * volume;
        }

        self.cursor.store(start + n, Ordering::Release);

        if start + n >= self.samples.len() {
            self.playing.store(false, Ordering::Release);
            return false;
        }

        true
    }
}

/// The set of voices currently audible.
///
/// Starting a voice and rendering a buffer both hold the same lock, so a
/// restart can never be lost to a voice finishing at the same moment.
#[derive(Default)]
pub(crate) struct Mixer {
    voices: Mutex<Vec<Arc<Voice>>>,
}

impl Mixer {
    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Voice>>> {
        // A poisoned mixer still holds valid voices.
        self.voices.lock().unwrap_or_else(|e| {
            error!("Mixer lock poisoned, recovering: {}", e);
            e.into_inner()
        })
    }

    /// Play `voice` from its current cursor. A voice that is already
    /// audible is not added twice.
    pub(crate) fn start(&self, voice: &Arc<Voice>) {
        let mut voices = self.lock();
        voice.playing.store(true, Ordering::Release);
        if !voices.iter().any(|v| Arc::ptr_eq(v, voice)) {
            voices.push(Arc::clone(voice));
        }
    }

    /// Move the cursor of `voice` without racing the render callback.
    pub(crate) fn seek(&self, voice: &Voice, position: Duration) {
        let _voices = self.lock();
        voice.seek(position);
    }

    pub(crate) fn active_voices(&self) -> usize {
        self.lock().len()
    }

    /// Fill `out` with the sum of all playing voices.
    pub(crate) fn render(&self, out: &mut [f32]) {
        out.fill(0.0);
        let mut voices = self.lock();
        voices.retain(|voice| voice.mix_into(out));
        for sample in out.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }
}

/// The default output device, driven from its own thread.
///
/// The cpal stream is created, played and dropped on that thread; the
/// rest of the process only touches the shared [`Mixer`].
pub struct AudioOutput {
    mixer: Arc<Mixer>,
    sample_rate: u32,
    channels: usize,
    shutdown_tx: Option<mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl AudioOutput {
    #[track_caller]
    #[instrument]
    pub fn open() -> CoreResult<Self> {
        let mixer = Arc::new(Mixer::default());
        let (ready_tx, ready_rx) = mpsc::channel::<CoreResult<(u32, usize)>>();
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let thread_mixer = Arc::clone(&mixer);
        let thread = thread::Builder::new()
            .name("soundboard-output".to_string())
            .spawn(move || {
                let stream = match build_output_stream(thread_mixer) {
                    Ok((stream, format)) => {
                        let _ = ready_tx.send(Ok(format));
                        stream
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                // Returns on explicit shutdown or when AudioOutput is dropped.
                let _ = shutdown_rx.recv();
                drop(stream);
                debug!("Output stream closed");
            })
            .map_err(|e| SoundboardError::DeviceError {
                reason: format!("Failed to spawn output thread: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let (sample_rate, channels) =
            ready_rx
                .recv()
                .map_err(|e| SoundboardError::DeviceError {
                    reason: format!("Output thread exited before reporting: {}", e),
                    location: ErrorLocation::from(Location::caller()),
                })??;

        info!(sample_rate, channels, "Audio output started");

        Ok(Self {
            mixer,
            sample_rate,
            channels,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub(crate) fn mixer(&self) -> &Arc<Mixer> {
        &self.mixer
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

impl Drop for AudioOutput {
    fn drop(&mut self) {
        drop(self.shutdown_tx.take());
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            warn!("Output thread panicked during shutdown");
        }
    }
}

fn build_output_stream(mixer: Arc<Mixer>) -> CoreResult<(cpal::Stream, (u32, usize))> {
    let host = cpal::default_host();

    let device = host
        .default_output_device()
        .ok_or(SoundboardError::NoOutputDevice {
            location: ErrorLocation::from(Location::caller()),
        })?;

    let config = device
        .default_output_config()
        .map_err(|e| SoundboardError::DeviceError {
            reason: format!("Failed to get output config: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    let sample_rate = config.sample_rate();
    let channels = usize::from(config.channels());

    debug!(
        device_id = ?device.id(),
        sample_rate = sample_rate,
        channels = channels,
        "Opening output device"
    );

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                mixer.render(data);
            },
            |err| {
                error!("Audio output stream error: {}", err);
            },
            None,
        )
        .map_err(|e| SoundboardError::DeviceError {
            reason: format!("Failed to build output stream: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

    stream.play().map_err(|e| SoundboardError::PlaybackError {
        reason: format!("Failed to start output stream: {}", e),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok((stream, (sample_rate, channels)))
}
