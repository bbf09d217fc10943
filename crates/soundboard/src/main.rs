//! Soundboard: a terminal soundboard with per-slot microphone recording.

mod app;
mod app_command;
mod config;
mod error;
mod input_handler;
mod renderer;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    input_handler::InputHandler,
    renderer::Renderer,
};

use crate::config::Config;

use std::{sync::Arc, time::Duration};

use soundboard_core::{CpalBackend, Soundboard};
use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "soundboard=debug,soundboard_core=debug";

/// Application entry point.
fn main() {
    // Logs go to stderr so they do not interleave with the board on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to create tokio runtime: {:?}", e);
            std::process::exit(1);
        }
    };

    let result = rt.block_on(run(config));

    // The stdin reader may still be parked in a blocking read.
    rt.shutdown_timeout(Duration::from_millis(500));

    if let Err(e) = result {
        error!("Soundboard failed to start: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> AppResult<()> {
    let backend = Arc::new(CpalBackend::new(config.backend_options()?)?);

    let board = Soundboard::new(backend, config.sound_sources(), config.recording.slots)
        .await?
        .with_recording_volume(config.playback.recording_volume);
    let board = Arc::new(board);

    let (command_tx, command_rx) = mpsc::channel(32);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let input_handler = InputHandler::new(
        command_tx.clone(),
        board.catalog().len(),
        board.slot_count(),
    );

    let app = App {
        board,
        renderer: Renderer::stdout(),
        command_tx,
        command_rx,
        shutdown_tx,
    };

    tokio::join!(
        async {
            if let Err(e) = input_handler.run(shutdown_rx).await {
                error!(error = ?e, "Input handler error");
            }
        },
        async {
            if let Err(e) = app.run().await {
                error!(error = ?e, "App error");
            }
        }
    );

    Ok(())
}
