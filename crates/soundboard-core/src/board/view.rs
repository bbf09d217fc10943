use crate::board::SlotStatus;

/// A "play clip" control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipButton {
    /// 1-based clip index.
    pub index: usize,
    /// Button caption, e.g. "Sound 1".
    pub label: String,
    /// Whether the clip decoded at startup.
    pub loaded: bool,
}

/// The controls belonging to one recording slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotRow {
    /// 1-based slot index.
    pub index: usize,
    /// Current recording state.
    pub status: SlotStatus,
    /// Caption of the start/stop toggle.
    pub record_label: String,
    /// Caption of the play-back control; `None` until a recording exists.
    pub playback_label: Option<String>,
}

/// Snapshot of everything the UI needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    /// One button per catalog clip.
    pub clips: Vec<ClipButton>,
    /// One row per recording slot.
    pub slots: Vec<SlotRow>,
}

impl SlotRow {
    pub(crate) fn new(index: usize, status: SlotStatus, has_recording: bool) -> Self {
        let record_label = match status {
            SlotStatus::Idle => format!("Start Recording {}", index),
            SlotStatus::Recording => format!("Stop Recording {}", index),
        };
        Self {
            index,
            status,
            record_label,
            playback_label: has_recording.then(|| format!("Play Recording {}", index)),
        }
    }
}

impl ClipButton {
    pub(crate) fn new(index: usize, loaded: bool) -> Self {
        Self {
            index,
            label: format!("Sound {}", index),
            loaded,
        }
    }
}

impl BoardView {
    /// Whether any play-back control is currently shown.
    pub fn has_playback_controls(&self) -> bool {
        self.slots.iter().any(|s| s.playback_label.is_some())
    }
}
