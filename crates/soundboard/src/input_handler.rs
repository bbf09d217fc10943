//! Terminal input handler.
//!
//! Reads commands from stdin one line at a time and forwards them to the
//! main application over an async channel.

use crate::{AppCommand, AppError, AppResult};

use std::{io::BufRead, panic::Location, time::Duration};

use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Turns typed lines into [`AppCommand`]s.
pub struct InputHandler {
    command_tx: mpsc::Sender<AppCommand>,
    clip_count: usize,
    slot_count: usize,
}

impl InputHandler {
    pub fn new(command_tx: mpsc::Sender<AppCommand>, clip_count: usize, slot_count: usize) -> Self {
        Self {
            command_tx,
            clip_count,
            slot_count,
        }
    }

    /// Run the input loop until stdin closes or shutdown is signalled.
    ///
    /// End of input is treated as a quit request.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let (line_tx, mut line_rx) = mpsc::channel::<String>(32);

        // Single persistent blocking task that forwards stdin lines.
        //
        // Shutdown: when line_rx is dropped (loop breaks), the next
        // line_tx.blocking_send() fails, breaking the blocking loop.
        let handle = tokio::task::spawn_blocking(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if line_tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Input handler shutting down");
                    break;
                }
                line = line_rx.recv() => {
                    let Some(line) = line else {
                        info!("Input closed");
                        self.send(AppCommand::Shutdown).await?;
                        break;
                    };

                    match parse_command(&line, self.clip_count, self.slot_count) {
                        Ok(cmd) => self.send(cmd).await?,
                        Err(e) => warn!(input = %line.trim(), error = %e, "Ignoring input"),
                    }
                }
            }
        }

        drop(line_rx);

        // The blocking task may be parked in a read; the runtime reclaims it on exit.
        match tokio::time::timeout(Duration::from_millis(200), handle).await {
            Ok(Ok(())) => debug!("Input forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Input forwarder task panicked"),
            Err(_) => debug!("Input forwarder still blocked on stdin, will be cleaned up on exit"),
        }

        Ok(())
    }

    async fn send(&self, cmd: AppCommand) -> AppResult<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", cmd, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Parse one input line.
///
/// Accepted forms (case-insensitive, surrounding whitespace ignored):
/// `1`..`N` or `s<i>` play sound, `r<i>` toggle recording, `p<i>` play
/// recording, `v` or an empty line redraw, `?`/`h` help, `q` quit.
#[track_caller]
pub fn parse_command(line: &str, clip_count: usize, slot_count: usize) -> AppResult<AppCommand> {
    let input = line.trim().to_ascii_lowercase();

    let location = Location::caller();
    let invalid = |reason: String| AppError::InputError {
        reason,
        location: ErrorLocation::from(location),
    };

    match input.as_str() {
        "" | "v" => return Ok(AppCommand::Render),
        "?" | "h" | "help" => return Ok(AppCommand::Help),
        "q" | "quit" | "exit" => return Ok(AppCommand::Shutdown),
        _ => {}
    }

    let (kind, number) = match input.find(|c: char| c.is_ascii_digit()) {
        Some(split) => input.split_at(split),
        None => return Err(invalid(format!("Unknown command '{}'", input))),
    };

    let index: usize = number
        .trim()
        .parse()
        .map_err(|_| invalid(format!("'{}' is not a number", number)))?;

    let in_range = |count: usize, what: &str| {
        if (1..=count).contains(&index) {
            Ok(index)
        } else {
            Err(invalid(format!("No {} {} (1..={})", what, index, count)))
        }
    };

    match kind.trim() {
        "" | "s" => Ok(AppCommand::PlaySound {
            index: in_range(clip_count, "sound")?,
        }),
        "r" => Ok(AppCommand::ToggleRecording {
            slot: in_range(slot_count, "slot")?,
        }),
        "p" => Ok(AppCommand::PlayRecording {
            slot: in_range(slot_count, "slot")?,
        }),
        other => Err(invalid(format!("Unknown command '{}'", other))),
    }
}
