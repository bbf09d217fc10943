use crate::{AppCommand, AppResult, Renderer};

use std::{io::Write, sync::Arc};

use soundboard_core::{AudioBackend, SlotStatus, Soundboard, SoundboardError};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument, warn};

/// Main application state.
///
/// Every board action runs on its own task so a slow decode or finalize
/// never holds up other buttons. Tasks that change what the board shows
/// ask for a redraw by sending [`AppCommand::Render`] back to the loop,
/// which owns the renderer.
pub struct App<B: AudioBackend, W: Write> {
    pub(crate) board: Arc<Soundboard<B>>,
    pub(crate) renderer: Renderer<W>,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
}

impl<B: AudioBackend, W: Write> App<B, W> {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Soundboard starting");
        self.render().await;

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut interrupt_armed = true;

        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    self.handle_command(cmd).await;
                }

                result = &mut ctrl_c, if interrupt_armed => {
                    match result {
                        Ok(()) => {
                            info!("Interrupt received, shutting down");
                            break;
                        }
                        Err(e) => {
                            warn!(error = ?e, "Failed to listen for Ctrl-C");
                            interrupt_armed = false;
                        }
                    }
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Soundboard shut down successfully");

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle_command(&mut self, cmd: AppCommand) {
        match cmd {
            AppCommand::PlaySound { index } => {
                let board = Arc::clone(&self.board);
                tokio::spawn(async move {
                    if let Err(e) = board.play_clip(index) {
                        error!(clip = index, error = ?e, "Failed to play sound");
                    }
                });
            }
            AppCommand::ToggleRecording { slot } => {
                let board = Arc::clone(&self.board);
                let command_tx = self.command_tx.clone();
                tokio::spawn(async move {
                    match board.toggle_recording(slot).await {
                        Ok(SlotStatus::Recording) => debug!(slot, "Slot is recording"),
                        Ok(SlotStatus::Idle) => debug!(slot, "Slot is idle"),
                        Err(SoundboardError::SlotBusy { .. }) => {
                            warn!(slot, "Slot busy, ignoring tap");
                        }
                        Err(e @ SoundboardError::RecordingFinalizeError { .. }) => {
                            error!(slot, error = ?e, "Failed to stop recording");
                        }
                        Err(e) => error!(slot, error = ?e, "Failed to start recording"),
                    }
                    request_render(&command_tx).await;
                });
            }
            AppCommand::PlayRecording { slot } => {
                let board = Arc::clone(&self.board);
                tokio::spawn(async move {
                    if let Err(e) = board.play_recording(slot).await {
                        error!(slot, error = ?e, "Failed to play recording");
                    }
                });
            }
            AppCommand::Render => self.render().await,
            AppCommand::Help => {
                let clips = self.board.catalog().len();
                let slots = self.board.slot_count();
                if let Err(e) = self.renderer.help(clips, slots) {
                    error!(error = ?e, "Failed to print help");
                }
            }
            AppCommand::Shutdown => {}
        }
    }

    async fn render(&mut self) {
        let view = self.board.view().await;
        if let Err(e) = self.renderer.render(&view) {
            error!(error = ?e, "Failed to render board");
        }
    }
}

async fn request_render(command_tx: &mpsc::Sender<AppCommand>) {
    if command_tx.send(AppCommand::Render).await.is_err() {
        debug!("Application loop gone, skipping redraw");
    }
}
