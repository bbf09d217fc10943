//! Draws the board to a terminal.

use crate::AppResult;

use std::io::{self, Stdout, Write};

use soundboard_core::{BoardView, SlotStatus};

/// Writes [`BoardView`] snapshots as plain text.
pub struct Renderer<W: Write> {
    out: W,
}

impl Renderer<Stdout> {
    /// Renderer drawing to the process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Draw one frame: a row of sound buttons, then one line per slot.
    ///
    /// Play-back controls only appear for slots that hold a recording.
    pub fn render(&mut self, view: &BoardView) -> AppResult<()> {
        writeln!(self.out)?;

        let buttons: Vec<String> = view
            .clips
            .iter()
            .map(|clip| {
                if clip.loaded {
                    format!("[{}] {}", clip.index, clip.label)
                } else {
                    format!("[{}] {} (unavailable)", clip.index, clip.label)
                }
            })
            .collect();
        writeln!(self.out, "{}", buttons.join("   "))?;

        for slot in &view.slots {
            let marker = match slot.status {
                SlotStatus::Recording => " *REC*",
                SlotStatus::Idle => "",
            };
            write!(self.out, "[r{}] {}{}", slot.index, slot.record_label, marker)?;

            if let Some(label) = &slot.playback_label {
                write!(self.out, "   [p{}] {}", slot.index, label)?;
            }
            writeln!(self.out)?;
        }

        write!(self.out, "> ")?;
        self.out.flush()?;

        Ok(())
    }

    /// Print the key reference.
    pub fn help(&mut self, clip_count: usize, slot_count: usize) -> AppResult<()> {
        writeln!(self.out)?;
        writeln!(self.out, "  1..{0} or s1..s{0}  play a sound", clip_count)?;
        writeln!(self.out, "  r1..r{}          start/stop recording", slot_count)?;
        writeln!(self.out, "  p1..p{}          play a recording", slot_count)?;
        writeln!(self.out, "  v or Enter      redraw the board")?;
        writeln!(self.out, "  ?               this help")?;
        writeln!(self.out, "  q               quit")?;
        self.out.flush()?;

        Ok(())
    }
}
