//! Soundboard Core Library
//!
//! A fixed catalog of sound effects plus N independent record/play-back
//! slots, driven through a swappable [`AudioBackend`]. [`CpalBackend`]
//! plays through the default output device with cpal, decodes with
//! symphonia and writes recordings as WAV with hound.
//!
//! # Example
//!
//! ```no_run
//! use soundboard_core::{
//!     CoreResult, CpalBackend, CpalBackendOptions, SoundSource, Soundboard, WavEncoding,
//! };
//!
//! use std::{path::PathBuf, sync::Arc, time::Duration};
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let backend = Arc::new(CpalBackend::new(CpalBackendOptions {
//!         output_dir: PathBuf::from("recordings"),
//!         allow_microphone: true,
//!         encoding: WavEncoding::Int16,
//!     })?);
//!
//!     let sources = vec![SoundSource::Asset(PathBuf::from("sounds/sound1.mp3"))];
//!     let board = Soundboard::new(backend, sources, 3).await?;
//!
//!     board.play_clip(1)?;
//!
//!     board.start_recording(2).await?;
//!     tokio::time::sleep(Duration::from_secs(3)).await;
//!     let location = board.stop_recording(2).await?;
//!
//!     println!("Recorded to {:?}", location);
//!     board.play_recording(2).await?;
//!     Ok(())
//! }
//! ```

mod audio;
mod board;
mod error;

pub use {
    audio::{
        AudioBackend, CpalBackend, CpalBackendOptions, CpalRecording, CpalSound,
        PermissionStatus, RecordingHandle, RecordingLocation, SessionMode, SoundHandle,
        SoundSource, WavEncoding,
    },
    board::{
        BoardView, CatalogEntry, ClipButton, MAX_VOLUME, PlaybackCatalog, RecordingSlot,
        SlotRow, SlotState, SlotStatus, Soundboard,
    },
    error::Result as CoreResult,
    error::SoundboardError,
};
