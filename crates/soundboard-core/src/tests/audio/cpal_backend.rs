use crate::{
    PermissionStatus,
    audio::cpal_backend::{MicrophoneLease, MicrophonePermission},
};

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

/// WHAT: Only one lease on the microphone can be held at a time
/// WHY: A second slot must not open the microphone while another records
#[test]
fn given_held_lease_when_acquiring_again_then_refused() {
    // Given: A free microphone
    let in_use = Arc::new(AtomicBool::new(false));

    // When: Acquiring twice
    let first = MicrophoneLease::acquire(&in_use);
    let second = MicrophoneLease::acquire(&in_use);

    // Then: Only the first succeeds
    assert!(first.is_some());
    assert!(second.is_none());
    assert!(in_use.load(Ordering::Acquire));
}

/// WHAT: Dropping the lease frees the microphone
/// WHY: Finalizing or abandoning a recording releases the device
#[test]
fn given_dropped_lease_when_acquiring_then_granted() {
    // Given: A lease that is then dropped
    let in_use = Arc::new(AtomicBool::new(false));
    let lease = MicrophoneLease::acquire(&in_use);
    assert!(lease.is_some());
    drop(lease);

    // When: Acquiring again
    let again = MicrophoneLease::acquire(&in_use);

    // Then: The microphone is available
    assert!(again.is_some());
}

/// WHAT: Permission starts undetermined and is granted when allowed and a device exists
/// WHY: Recording requires a granted permission
#[test]
fn given_allowed_microphone_when_requesting_then_granted_and_remembered() {
    // Given: Permission allowed by configuration
    let permission = MicrophonePermission::new(true);
    assert_eq!(permission.status(), PermissionStatus::Undetermined);

    // When: Requesting with an input device present
    let answer = permission.request(|| true);

    // Then: Granted, and a later request does not ask again
    assert_eq!(answer, PermissionStatus::Granted);
    let mut asked = false;
    let again = permission.request(|| {
        asked = true;
        false
    });
    assert_eq!(again, PermissionStatus::Granted);
    assert!(!asked);
    assert_eq!(permission.status(), PermissionStatus::Granted);
}

/// WHAT: Permission is denied when disallowed or when no input device exists
/// WHY: Denial must be reported, and stays denied for the session
#[test]
fn given_disallowed_or_missing_device_when_requesting_then_denied_and_remembered() {
    // Given: One permission disallowed, one allowed without a device
    let disallowed = MicrophonePermission::new(false);
    let no_device = MicrophonePermission::new(true);

    // When: Requesting
    let first = disallowed.request(|| true);
    let second = no_device.request(|| false);

    // Then: Both denied, and the denial sticks even if a device appears
    assert_eq!(first, PermissionStatus::Denied);
    assert_eq!(second, PermissionStatus::Denied);
    assert_eq!(no_device.request(|| true), PermissionStatus::Denied);
}
