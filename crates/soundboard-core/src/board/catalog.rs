use crate::{
    CoreResult, SoundboardError,
    audio::{AudioBackend, SoundHandle, SoundSource},
};

use std::{panic::Location, sync::Arc, time::Duration};

use error_location::ErrorLocation;
use tokio::task::JoinSet;
use tracing::{error, info, instrument};

/// One bundled sound and the outcome of loading it.
pub struct CatalogEntry<S> {
    source: SoundSource,
    clip: Result<S, String>,
}

impl<S> CatalogEntry<S> {
    /// Where the clip was loaded from.
    pub fn source(&self) -> &SoundSource {
        &self.source
    }

    /// Whether the clip decoded and can be played.
    pub fn is_loaded(&self) -> bool {
        self.clip.is_ok()
    }
}

/// The fixed set of preloaded sound effects.
///
/// Built once at startup and never mutated afterwards. A clip that failed
/// to load keeps its slot so indices stay stable.
pub struct PlaybackCatalog<S> {
    entries: Vec<CatalogEntry<S>>,
}

impl<S: SoundHandle + 'static> PlaybackCatalog<S> {
    /// Load every source in parallel on the blocking pool.
    ///
    /// Failures are logged and recorded per clip; they never prevent the
    /// other clips from loading.
    #[instrument(skip(backend, sources), fields(clip_count = sources.len()))]
    pub async fn load<B>(backend: &Arc<B>, sources: Vec<SoundSource>) -> Self
    where
        B: AudioBackend<Sound = S>,
    {
        let mut tasks = JoinSet::new();

        for (i, source) in sources.iter().cloned().enumerate() {
            let backend = Arc::clone(backend);
            tasks.spawn_blocking(move || (i, backend.load_sound(&source)));
        }

        let mut outcomes: Vec<Option<Result<S, String>>> =
            std::iter::repeat_with(|| None).take(sources.len()).collect();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, Ok(sound))) => outcomes[i] = Some(Ok(sound)),
                Ok((i, Err(e))) => {
                    error!(clip = i + 1, error = ?e, "Failed to load sound");
                    outcomes[i] = Some(Err(e.to_string()));
                }
                Err(e) => error!(error = ?e, "Sound load task panicked"),
            }
        }

        let entries: Vec<CatalogEntry<S>> = sources
            .into_iter()
            .zip(outcomes)
            .map(|(source, outcome)| CatalogEntry {
                source,
                clip: outcome.unwrap_or_else(|| Err("Load task did not complete".to_string())),
            })
            .collect();

        let catalog = Self { entries };
        info!(
            loaded = catalog.loaded_count(),
            total = catalog.len(),
            "Playback catalog ready"
        );
        catalog
    }

    /// Restart clip `index` (1-based) from the beginning.
    ///
    /// Calling this on a clip that is already playing rewinds it; a single
    /// clip is never heard twice at once.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn play(&self, index: usize) -> CoreResult<()> {
        let entry = self.entry(index)?;

        let clip = entry
            .clip
            .as_ref()
            .map_err(|reason| SoundboardError::PlaybackError {
                reason: format!("Sound {} is not loaded: {}", index, reason),
                location: ErrorLocation::from(Location::caller()),
            })?;

        clip.set_position(Duration::ZERO)?;
        clip.play()
    }
}

impl<S> PlaybackCatalog<S> {
    /// Number of clips, loaded or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no clips at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of clips that decoded successfully.
    pub fn loaded_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_loaded()).count()
    }

    /// Whether clip `index` (1-based) is playable.
    pub fn is_loaded(&self, index: usize) -> bool {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .is_some_and(CatalogEntry::is_loaded)
    }

    /// All entries in button order.
    pub fn entries(&self) -> &[CatalogEntry<S>] {
        &self.entries
    }

    #[track_caller]
    fn entry(&self, index: usize) -> CoreResult<&CatalogEntry<S>> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .ok_or(SoundboardError::InvalidClip {
                index,
                clip_count: self.entries.len(),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}
