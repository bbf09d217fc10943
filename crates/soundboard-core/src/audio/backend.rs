//! Seam between the soundboard and the platform audio subsystem.
//!
//! [`crate::Soundboard`] only talks to audio through these traits, so the
//! same state machine drives the cpal backend and the in-memory fake used
//! by tests.

use crate::CoreResult;

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

/// Where a finished recording was written.
///
/// Opaque to callers; only valid for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordingLocation(PathBuf);

impl RecordingLocation {
    /// Wrap a path produced by a backend.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Filesystem path of the recorded file.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for RecordingLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Something a sound handle can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundSource {
    /// A bundled sound effect.
    Asset(PathBuf),
    /// A clip recorded earlier in this session.
    Recorded(RecordingLocation),
}

impl SoundSource {
    /// Path the backend should decode.
    pub fn path(&self) -> &Path {
        match self {
            SoundSource::Asset(path) => path,
            SoundSource::Recorded(location) => location.path(),
        }
    }

    /// Human-readable identifier used in logs and errors.
    pub fn id(&self) -> String {
        self.path().display().to_string()
    }
}

/// Microphone permission as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// The user has not been asked yet.
    Undetermined,
    /// Recording is allowed.
    Granted,
    /// The user declined.
    Denied,
}

/// Audio session configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// Playback only; capture is not allowed.
    PlaybackOnly,
    /// Capture allowed, playback continues even when the device is silenced.
    RecordAndPlayback,
}

/// A loaded, replayable sound.
pub trait SoundHandle: Send + Sync {
    /// Move the play cursor.
    fn set_position(&self, position: Duration) -> CoreResult<()>;

    /// Set playback gain in `0.0..=1.0`.
    fn set_volume(&self, volume: f32) -> CoreResult<()>;

    /// Start playing from the current position. Returns once the engine
    /// has accepted the request.
    fn play(&self) -> CoreResult<()>;
}

/// An in-progress capture.
pub trait RecordingHandle: Send {
    /// Stop capturing and write the result to durable storage.
    fn stop_and_finalize(self) -> CoreResult<RecordingLocation>;
}

/// The platform audio subsystem.
pub trait AudioBackend: Send + Sync + 'static {
    /// Handle type for loaded sounds.
    type Sound: SoundHandle + 'static;
    /// Handle type for active recordings.
    type Recording: RecordingHandle + 'static;

    /// Decode `source` into a playable handle.
    fn load_sound(&self, source: &SoundSource) -> CoreResult<Self::Sound>;

    /// Current microphone permission without prompting.
    fn microphone_permission(&self) -> PermissionStatus;

    /// Ask for microphone permission. Blocks until the user answers.
    fn request_microphone_permission(&self) -> CoreResult<PermissionStatus>;

    /// Reconfigure the audio session.
    fn set_session_mode(&self, mode: SessionMode) -> CoreResult<()>;

    /// Begin capturing for the given 1-based slot.
    fn begin_recording(&self, slot: usize) -> CoreResult<Self::Recording>;
}
