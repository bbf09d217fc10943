use error_location::ErrorLocation;
use thiserror::Error;

/// Soundboard errors with source location tracking.
#[derive(Error, Debug)]
pub enum SoundboardError {
    /// A sound asset or recorded file could not be opened or decoded.
    #[error("Failed to load sound {source_id}: {reason} {location}")]
    LoadError {
        /// Identifier of the sound that failed (usually its path).
        source_id: String,
        /// Description of the decode failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Microphone access was refused.
    #[error("Recording permission not granted {location}")]
    PermissionDenied {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The audio engine rejected a play, seek or volume request.
    #[error("Playback failed: {reason} {location}")]
    PlaybackError {
        /// Description of the playback failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Capture could not begin for a slot.
    #[error("Failed to start recording {slot}: {reason} {location}")]
    RecordingStartError {
        /// 1-based slot index.
        slot: usize,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Stopping or finalizing a capture failed.
    #[error("Failed to stop recording {slot}: {reason} {location}")]
    RecordingFinalizeError {
        /// 1-based slot index.
        slot: usize,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// No audio output device found.
    #[error("No output device found {location}")]
    NoOutputDevice {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio resampling failed.
    #[error("Resampling error: {reason} {location}")]
    ResamplingError {
        /// Description of the resampling error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Slot index outside `1..=slot_count`.
    #[error("No recording slot {slot} (board has {slot_count}) {location}")]
    InvalidSlot {
        /// Requested 1-based slot index.
        slot: usize,
        /// Number of slots on the board.
        slot_count: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Clip index outside `1..=clip_count`.
    #[error("No sound {index} (board has {clip_count}) {location}")]
    InvalidClip {
        /// Requested 1-based clip index.
        index: usize,
        /// Number of clips in the catalog.
        clip_count: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// `start` was issued on a slot that is already recording.
    #[error("Slot {slot} is already recording {location}")]
    AlreadyRecording {
        /// 1-based slot index.
        slot: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Another operation on the same slot has not finished yet.
    #[error("Slot {slot} is busy {location}")]
    SlotBusy {
        /// 1-based slot index.
        slot: usize,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

/// Result type alias using [`SoundboardError`].
pub type Result<T> = std::result::Result<T, SoundboardError>;
