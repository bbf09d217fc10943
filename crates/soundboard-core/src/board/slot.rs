use crate::{CoreResult, SoundboardError, audio::RecordingLocation};

use std::{mem, panic::Location};

use error_location::ErrorLocation;

/// Recording state of a slot, holding the active capture while recording.
pub enum SlotState<R> {
    /// Not recording.
    Idle,
    /// Capture in progress; the slot exclusively owns the handle.
    Recording(R),
}

/// Handle-free view of [`SlotState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    /// Not recording.
    Idle,
    /// Capture in progress.
    Recording,
}

/// One independent record/play-back unit.
pub struct RecordingSlot<R> {
    index: usize,
    state: SlotState<R>,
    last_recording: Option<RecordingLocation>,
}

impl<R> RecordingSlot<R> {
    /// An idle slot with no recording. `index` is 1-based.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            state: SlotState::Idle,
            last_recording: None,
        }
    }

    /// 1-based slot number.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Current state without the handle.
    pub fn status(&self) -> SlotStatus {
        match self.state {
            SlotState::Idle => SlotStatus::Idle,
            SlotState::Recording(_) => SlotStatus::Recording,
        }
    }

    /// Whether a capture is in progress.
    pub fn is_recording(&self) -> bool {
        matches!(self.state, SlotState::Recording(_))
    }

    /// Location of the most recent finished recording, if any.
    pub fn last_recording(&self) -> Option<&RecordingLocation> {
        self.last_recording.as_ref()
    }

    /// `Idle -> Recording`. Rejected if a capture is already active.
    #[track_caller]
    pub fn begin(&mut self, handle: R) -> CoreResult<()> {
        if self.is_recording() {
            return Err(SoundboardError::AlreadyRecording {
                slot: self.index,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        self.state = SlotState::Recording(handle);
        Ok(())
    }

    /// Return to `Idle`, handing back the active capture if there was one.
    pub fn take_active(&mut self) -> Option<R> {
        match mem::replace(&mut self.state, SlotState::Idle) {
            SlotState::Recording(handle) => Some(handle),
            SlotState::Idle => None,
        }
    }

    /// Record where the last finished capture was stored, replacing any
    /// previous one.
    pub fn complete(&mut self, location: RecordingLocation) {
        self.last_recording = Some(location);
    }
}
