use crate::{RecordingLocation, RecordingSlot, SlotStatus, SoundboardError};

/// WHAT: A new slot is idle with no recording
/// WHY: Slots start empty at app launch
#[test]
fn given_new_slot_when_inspecting_then_idle_without_recording() {
    // Given/When: A fresh slot 2
    let slot: RecordingSlot<u32> = RecordingSlot::new(2);

    // Then: Idle, no location, index preserved
    assert_eq!(slot.index(), 2);
    assert_eq!(slot.status(), SlotStatus::Idle);
    assert!(slot.last_recording().is_none());
}

/// WHAT: Beginning twice is rejected and keeps the first handle
/// WHY: A slot owns at most one active capture
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_slot_when_beginning_again_then_already_recording() {
    // Given: A slot recording with handle 7
    let mut slot = RecordingSlot::new(1);
    slot.begin(7u32).unwrap();

    // When: Beginning with another handle
    let result = slot.begin(8u32);

    // Then: Rejected, first handle still active
    assert!(matches!(
        result,
        Err(SoundboardError::AlreadyRecording { slot: 1, .. })
    ));
    assert_eq!(slot.take_active(), Some(7));
}

/// WHAT: Taking the active handle always leaves the slot idle
/// WHY: Stop must clear the handle even if finalize later fails
#[test]
#[allow(clippy::unwrap_used)]
fn given_recording_slot_when_taking_active_then_idle() {
    // Given: A recording slot
    let mut slot = RecordingSlot::new(3);
    slot.begin("capture").unwrap();

    // When: Taking the handle twice
    let first = slot.take_active();
    let second = slot.take_active();

    // Then: Handle returned once, slot idle
    assert_eq!(first, Some("capture"));
    assert_eq!(second, None);
    assert!(!slot.is_recording());
}

/// WHAT: Completing overwrites the previous location
/// WHY: Only the most recent recording is kept per slot
#[test]
fn given_completed_slot_when_completing_again_then_location_replaced() {
    // Given: A slot with one recording
    let mut slot: RecordingSlot<()> = RecordingSlot::new(1);
    slot.complete(RecordingLocation::new("/tmp/a.wav"));

    // When: A second recording completes
    slot.complete(RecordingLocation::new("/tmp/b.wav"));

    // Then: Only the second is kept
    assert_eq!(
        slot.last_recording(),
        Some(&RecordingLocation::new("/tmp/b.wav"))
    );
}
