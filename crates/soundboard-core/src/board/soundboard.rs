//! The controller that owns every clip and recording slot.

use crate::{
    CoreResult, SoundboardError,
    audio::{
        AudioBackend, PermissionStatus, RecordingHandle, RecordingLocation, SessionMode,
        SoundHandle, SoundSource,
    },
    board::{BoardView, ClipButton, PlaybackCatalog, RecordingSlot, SlotRow, SlotStatus},
};

use std::{panic::Location, sync::Arc};

use error_location::ErrorLocation;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, instrument, warn};

/// Volume used for recorded clips unless configured otherwise.
pub const MAX_VOLUME: f32 = 1.0;

type SlotGuard<'a, B> = MutexGuard<'a, RecordingSlot<<B as AudioBackend>::Recording>>;

/// Owns the playback catalog and the recording slots.
///
/// Every slot sits behind its own async mutex. Operations take it with
/// `try_lock` and hold it across the whole backend call chain, so a second
/// tap on a slot whose previous action has not finished is rejected with
/// [`SoundboardError::SlotBusy`] instead of racing it. Slots never share a
/// lock, so activity on one slot never delays another.
///
/// The audio session mode is shared by every slot. It is changed only
/// under the `captures` lock, which counts captures that are starting or
/// live; the session returns to playback-only when that count drops to
/// zero.
pub struct Soundboard<B: AudioBackend> {
    backend: Arc<B>,
    catalog: PlaybackCatalog<B::Sound>,
    slots: Vec<Mutex<RecordingSlot<B::Recording>>>,
    captures: Mutex<usize>,
    recording_volume: f32,
}

impl<B: AudioBackend> Soundboard<B> {
    /// Load the catalog and create `slot_count` idle slots.
    ///
    /// Clip load failures are logged and leave that clip unplayable; they
    /// do not fail construction.
    ///
    /// # Errors
    ///
    /// Returns error if the audio session cannot be put into playback mode.
    #[instrument(skip(backend, sources), fields(clip_count = sources.len()))]
    pub async fn new(
        backend: Arc<B>,
        sources: Vec<SoundSource>,
        slot_count: usize,
    ) -> CoreResult<Self> {
        backend.set_session_mode(SessionMode::PlaybackOnly)?;

        let catalog = PlaybackCatalog::load(&backend, sources).await;
        let slots = (1..=slot_count)
            .map(|index| Mutex::new(RecordingSlot::new(index)))
            .collect();

        info!(
            clips = catalog.len(),
            loaded = catalog.loaded_count(),
            slots = slot_count,
            "Soundboard ready"
        );

        Ok(Self {
            backend,
            catalog,
            slots,
            captures: Mutex::new(0),
            recording_volume: MAX_VOLUME,
        })
    }

    /// Volume applied when playing back recordings, clamped to `0.0..=1.0`.
    pub fn with_recording_volume(mut self, volume: f32) -> Self {
        self.recording_volume = volume.clamp(0.0, MAX_VOLUME);
        self
    }

    /// The bundled clips, in button order.
    pub fn catalog(&self) -> &PlaybackCatalog<B::Sound> {
        &self.catalog
    }

    /// Number of recording slots.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Play catalog clip `index` (1-based) from the start.
    #[instrument(skip(self))]
    pub fn play_clip(&self, index: usize) -> CoreResult<()> {
        self.catalog.play(index)?;
        debug!(clip = index, "Playing sound");
        Ok(())
    }

    /// `Idle -> Recording` for `slot`.
    ///
    /// # Errors
    ///
    /// `InvalidSlot`, `SlotBusy`, `AlreadyRecording`, `PermissionDenied`, or
    /// `RecordingStartError`. The slot is `Idle` after every error.
    #[instrument(skip(self))]
    pub async fn start_recording(&self, slot: usize) -> CoreResult<()> {
        let guard = self.lock_slot(slot)?;
        self.start_locked(slot, guard).await
    }

    /// `Recording -> Idle` for `slot`, returning where the clip was stored.
    ///
    /// Stopping an idle slot is a no-op that returns `Ok(None)`.
    ///
    /// # Errors
    ///
    /// `InvalidSlot`, `SlotBusy`, or `RecordingFinalizeError`. The slot is
    /// `Idle` after a finalize failure and keeps its previous recording.
    #[instrument(skip(self))]
    pub async fn stop_recording(&self, slot: usize) -> CoreResult<Option<RecordingLocation>> {
        let guard = self.lock_slot(slot)?;
        self.stop_locked(slot, guard).await
    }

    /// Start if idle, stop if recording. Returns the resulting status.
    #[instrument(skip(self))]
    pub async fn toggle_recording(&self, slot: usize) -> CoreResult<SlotStatus> {
        let guard = self.lock_slot(slot)?;
        if guard.is_recording() {
            self.stop_locked(slot, guard).await?;
            Ok(SlotStatus::Idle)
        } else {
            self.start_locked(slot, guard).await?;
            Ok(SlotStatus::Recording)
        }
    }

    /// Play the last recording of `slot` once, at the recording volume.
    ///
    /// A fresh handle is loaded every time, so overlapping play-backs of
    /// the same recording are allowed.
    #[instrument(skip(self))]
    pub async fn play_recording(&self, slot: usize) -> CoreResult<()> {
        let location = {
            let guard = self.lock_slot(slot)?;
            guard.last_recording().cloned()
        }
        .ok_or_else(|| SoundboardError::PlaybackError {
            reason: format!("Slot {} has no recording", slot),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let source = SoundSource::Recorded(location.clone());
        let sound = self
            .run_blocking(move |backend| backend.load_sound(&source))
            .await
            .map_err(|e| SoundboardError::PlaybackError {
                reason: e.to_string(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        sound.set_volume(self.recording_volume)?;
        sound.play()?;

        info!(slot, location = %location, "Playing recorded sound");

        Ok(())
    }

    /// Snapshot of the board for rendering.
    ///
    /// Waits for in-flight slot operations so every row shows a settled
    /// state.
    pub async fn view(&self) -> BoardView {
        let clips = self
            .catalog
            .entries()
            .iter()
            .enumerate()
            .map(|(i, entry)| ClipButton::new(i + 1, entry.is_loaded()))
            .collect();

        let mut slots = Vec::with_capacity(self.slots.len());
        for slot in &self.slots {
            let slot = slot.lock().await;
            slots.push(SlotRow::new(
                slot.index(),
                slot.status(),
                slot.last_recording().is_some(),
            ));
        }

        BoardView { clips, slots }
    }

    #[track_caller]
    fn lock_slot(&self, slot: usize) -> CoreResult<SlotGuard<'_, B>> {
        let mutex = slot
            .checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .ok_or(SoundboardError::InvalidSlot {
                slot,
                slot_count: self.slots.len(),
                location: ErrorLocation::from(Location::caller()),
            })?;

        mutex.try_lock().map_err(|_| SoundboardError::SlotBusy {
            slot,
            location: ErrorLocation::from(Location::caller()),
        })
    }

    async fn start_locked(&self, slot: usize, mut guard: SlotGuard<'_, B>) -> CoreResult<()> {
        if guard.is_recording() {
            return Err(SoundboardError::AlreadyRecording {
                slot,
                location: ErrorLocation::from(Location::caller()),
            });
        }

        self.ensure_microphone_permission().await?;
        self.enter_recording_session().await?;

        let handle = match self
            .run_blocking(move |backend| backend.begin_recording(slot))
            .await
        {
            Ok(handle) => handle,
            Err(e) => {
                self.leave_recording_session().await;
                return Err(e);
            }
        };

        guard.begin(handle)?;
        info!(slot, "Recording started");

        Ok(())
    }

    async fn stop_locked(
        &self,
        slot: usize,
        mut guard: SlotGuard<'_, B>,
    ) -> CoreResult<Option<RecordingLocation>> {
        // The slot is Idle from here on, whatever finalize does.
        let Some(handle) = guard.take_active() else {
            debug!(slot, "Stop requested on idle slot");
            return Ok(None);
        };

        let finalized = self
            .run_blocking(move |_| handle.stop_and_finalize())
            .await
            .map_err(|e| match e {
                e @ SoundboardError::RecordingFinalizeError { .. } => e,
                other => SoundboardError::RecordingFinalizeError {
                    slot,
                    reason: other.to_string(),
                    location: ErrorLocation::from(Location::caller()),
                },
            });

        self.leave_recording_session().await;

        let location = finalized?;
        guard.complete(location.clone());
        info!(slot, location = %location, "Recording stopped");

        Ok(Some(location))
    }

    async fn ensure_microphone_permission(&self) -> CoreResult<()> {
        let status = match self.backend.microphone_permission() {
            PermissionStatus::Granted => PermissionStatus::Granted,
            _ => {
                self.run_blocking(|backend| backend.request_microphone_permission())
                    .await?
            }
        };

        if status == PermissionStatus::Granted {
            Ok(())
        } else {
            Err(SoundboardError::PermissionDenied {
                location: ErrorLocation::from(Location::caller()),
            })
        }
    }

    async fn enter_recording_session(&self) -> CoreResult<()> {
        let mut captures = self.captures.lock().await;
        self.backend.set_session_mode(SessionMode::RecordAndPlayback)?;
        *captures += 1;
        Ok(())
    }

    async fn leave_recording_session(&self) {
        let mut captures = self.captures.lock().await;
        *captures = captures.saturating_sub(1);

        if *captures > 0 {
            debug!(captures = *captures, "Other captures live, keeping recording session");
            return;
        }

        if let Err(e) = self.backend.set_session_mode(SessionMode::PlaybackOnly) {
            warn!(error = ?e, "Failed to restore playback session");
        }
    }

    /// Run a backend call on the blocking pool.
    async fn run_blocking<T, F>(&self, f: F) -> CoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&B) -> CoreResult<T> + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        tokio::task::spawn_blocking(move || f(&backend))
            .await
            .map_err(|e| SoundboardError::DeviceError {
                reason: format!("Audio task failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
    }
}
