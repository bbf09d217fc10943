use crate::{
    PlaybackCatalog, SoundSource, SoundboardError,
    tests::fake_backend::{FakeBackend, FakeEvent, default_sources},
};

use std::{path::PathBuf, sync::Arc};

/// WHAT: Every source gets a catalog entry in order, even failures
/// WHY: Button indices must stay stable when a clip fails to load
#[tokio::test]
async fn given_failing_source_when_loading_then_entry_kept_in_order() {
    // Given: Three sources, the first of which fails
    let backend = Arc::new(FakeBackend::new().failing_load("sounds/sound1.mp3"));

    // When: Loading the catalog
    let catalog = PlaybackCatalog::load(&backend, default_sources()).await;

    // Then: Three entries, first unloaded, order preserved
    assert_eq!(catalog.len(), 3);
    assert_eq!(catalog.loaded_count(), 2);
    assert!(!catalog.is_loaded(1));
    assert!(catalog.is_loaded(2));
    assert!(catalog.is_loaded(3));
    assert_eq!(
        catalog.entries()[2].source(),
        &SoundSource::Asset(PathBuf::from("sounds/sound3.mp3"))
    );
}

/// WHAT: Each source is loaded exactly once
/// WHY: Clips are created once at startup and reused for every tap
#[tokio::test]
async fn given_sources_when_loading_then_each_loaded_once() {
    // Given: A fake backend
    let backend = Arc::new(FakeBackend::new());

    // When: Loading the catalog
    let _catalog = PlaybackCatalog::load(&backend, default_sources()).await;

    // Then: One load per source
    let loads = backend
        .events()
        .iter()
        .filter(|e| matches!(e, FakeEvent::Load(_)))
        .count();
    assert_eq!(loads, 3);
}

/// WHAT: Playing an index past the end is InvalidClip
/// WHY: Bounds are reported with the catalog size
#[tokio::test]
async fn given_empty_catalog_when_playing_then_invalid_clip() {
    // Given: A catalog with no sources
    let backend = Arc::new(FakeBackend::new());
    let catalog = PlaybackCatalog::load(&backend, Vec::new()).await;

    // When: Playing clip 1
    let result = catalog.play(1);

    // Then: InvalidClip with count 0
    assert!(catalog.is_empty());
    assert!(matches!(
        result,
        Err(SoundboardError::InvalidClip {
            index: 1,
            clip_count: 0,
            ..
        })
    ));
}
