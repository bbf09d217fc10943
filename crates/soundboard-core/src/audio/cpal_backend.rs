//! [`AudioBackend`] over the default cpal host.

use crate::{
    CoreResult, SoundboardError,
    audio::{
        AudioBackend, AudioCapturer, AudioOutput, PermissionStatus, RecordingHandle,
        RecordingLocation, SessionMode, SoundHandle, SoundSource, WavEncoding,
        decoder,
        output::{Mixer, Voice},
        writer,
    },
};

use std::{
    panic::Location,
    path::PathBuf,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use cpal::traits::HostTrait;
use error_location::ErrorLocation;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

/// Settings for [`CpalBackend`].
#[derive(Debug, Clone)]
pub struct CpalBackendOptions {
    /// Directory recorded clips are written to.
    pub output_dir: PathBuf,
    /// Answer given when microphone permission is requested.
    pub allow_microphone: bool,
    /// Sample encoding of recorded files.
    pub encoding: WavEncoding,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Desktop audio: one shared output stream plus on-demand captures.
pub struct CpalBackend {
    output: AudioOutput,
    options: CpalBackendOptions,
    permission: MicrophonePermission,
    session: Mutex<SessionMode>,
    microphone_in_use: Arc<AtomicBool>,
}

impl CpalBackend {
    /// Open the default output device.
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available.
    #[track_caller]
    #[instrument]
    pub fn new(options: CpalBackendOptions) -> CoreResult<Self> {
        let output = AudioOutput::open()?;

        info!(output_dir = ?options.output_dir, "CpalBackend initialized");

        Ok(Self {
            output,
            permission: MicrophonePermission::new(options.allow_microphone),
            options,
            session: Mutex::new(SessionMode::PlaybackOnly),
            microphone_in_use: Arc::new(AtomicBool::new(false)),
        })
    }

    fn recording_path(&self, slot: usize) -> PathBuf {
        self.options
            .output_dir
            .join(format!("recording-{}-{}.wav", slot, Uuid::new_v4()))
    }
}

impl AudioBackend for CpalBackend {
    type Sound = CpalSound;
    type Recording = CpalRecording;

    #[instrument(skip(self))]
    fn load_sound(&self, source: &SoundSource) -> CoreResult<CpalSound> {
        let pcm = decoder::decode(source)?
            .conform(self.output.sample_rate(), self.output.channels())?;

        debug!(source = %source.id(), frames = pcm.frames(), "Sound loaded");

        Ok(CpalSound {
            voice: Arc::new(Voice::new(pcm)),
            mixer: Arc::clone(self.output.mixer()),
        })
    }

    fn microphone_permission(&self) -> PermissionStatus {
        self.permission.status()
    }

    #[instrument(skip(self))]
    fn request_microphone_permission(&self) -> CoreResult<PermissionStatus> {
        Ok(self
            .permission
            .request(|| cpal::default_host().default_input_device().is_some()))
    }

    #[instrument(skip(self))]
    fn set_session_mode(&self, mode: SessionMode) -> CoreResult<()> {
        *lock(&self.session) = mode;
        debug!(mode = ?mode, "Audio session mode set");
        Ok(())
    }

    #[track_caller]
    #[instrument(skip(self))]
    fn begin_recording(&self, slot: usize) -> CoreResult<CpalRecording> {
        let location = Location::caller();
        let start_error = |reason: String| SoundboardError::RecordingStartError {
            slot,
            reason,
            location: ErrorLocation::from(location),
        };

        if *lock(&self.session) != SessionMode::RecordAndPlayback {
            return Err(start_error(
                "Audio session does not allow recording".to_string(),
            ));
        }

        let lease = MicrophoneLease::acquire(&self.microphone_in_use)
            .ok_or_else(|| start_error("Microphone already in use".to_string()))?;

        let capturer = AudioCapturer::start().map_err(|e| start_error(e.to_string()))?;

        Ok(CpalRecording {
            slot,
            capturer,
            path: self.recording_path(slot),
            encoding: self.options.encoding,
            _lease: lease,
        })
    }
}

/// A decoded sound bound to the shared output mixer.
pub struct CpalSound {
    voice: Arc<Voice>,
    mixer: Arc<Mixer>,
}

impl SoundHandle for CpalSound {
    fn set_position(&self, position: Duration) -> CoreResult<()> {
        self.mixer.seek(&self.voice, position);
        Ok(())
    }

    #[track_caller]
    fn set_volume(&self, volume: f32) -> CoreResult<()> {
        if !volume.is_finite() {
            return Err(SoundboardError::PlaybackError {
                reason: format!("Invalid volume {}", volume),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.voice.set_volume(volume);
        Ok(())
    }

    fn play(&self) -> CoreResult<()> {
        self.mixer.start(&self.voice);
        trace!(
            cursor = self.voice.position(),
            active_voices = self.mixer.active_voices(),
            "Voice started"
        );
        Ok(())
    }
}

/// The user's answer to the microphone prompt, asked at most once.
pub(crate) struct MicrophonePermission {
    status: Mutex<PermissionStatus>,
    allow: bool,
}

impl MicrophonePermission {
    pub(crate) fn new(allow: bool) -> Self {
        Self {
            status: Mutex::new(PermissionStatus::Undetermined),
            allow,
        }
    }

    pub(crate) fn status(&self) -> PermissionStatus {
        *lock(&self.status)
    }

    /// Resolve an undetermined permission; later calls return the stored
    /// answer without consulting `has_input`.
    pub(crate) fn request(&self, has_input: impl FnOnce() -> bool) -> PermissionStatus {
        let mut status = lock(&self.status);

        if *status == PermissionStatus::Undetermined {
            let has_input = has_input();
            *status = if self.allow && has_input {
                PermissionStatus::Granted
            } else {
                PermissionStatus::Denied
            };

            info!(
                permission = ?*status,
                allow_microphone = self.allow,
                has_input,
                "Microphone permission resolved"
            );
        }

        *status
    }
}

/// Exclusive claim on the microphone, released on drop.
pub(crate) struct MicrophoneLease(Arc<AtomicBool>);

impl MicrophoneLease {
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for MicrophoneLease {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A live capture that becomes a WAV file when finalized.
pub struct CpalRecording {
    slot: usize,
    capturer: AudioCapturer,
    path: PathBuf,
    encoding: WavEncoding,
    _lease: MicrophoneLease,
}

impl RecordingHandle for CpalRecording {
    #[track_caller]
    #[instrument(skip(self), fields(slot = self.slot))]
    fn stop_and_finalize(mut self) -> CoreResult<RecordingLocation> {
        let slot = self.slot;
        let location = Location::caller();
        let finalize_error = |e: SoundboardError| SoundboardError::RecordingFinalizeError {
            slot,
            reason: e.to_string(),
            location: ErrorLocation::from(location),
        };

        let audio = self.capturer.stop().map_err(finalize_error)?;

        if audio.samples.is_empty() {
            warn!(slot, "Recording captured no audio");
        }

        writer::write_wav(&self.path, &audio, self.encoding).map_err(finalize_error)?;

        Ok(RecordingLocation::new(self.path.clone()))
    }
}
