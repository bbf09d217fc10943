/// Commands sent from the input handler to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Play a catalog sound from the start.
    PlaySound {
        /// 1-based sound button index.
        index: usize,
    },
    /// Start recording if the slot is idle, stop it if recording.
    ToggleRecording {
        /// 1-based recording slot.
        slot: usize,
    },
    /// Play the last recording of a slot.
    PlayRecording {
        /// 1-based recording slot.
        slot: usize,
    },
    /// Redraw the board.
    Render,
    /// Print the key reference.
    Help,
    /// Request application shutdown.
    Shutdown,
}
