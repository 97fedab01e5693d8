//! Integration test: HandleRegistry
//!
//! Exercises the registry directly (no context, no backend): reference
//! counting, finalize-exactly-once, slot reuse across kinds and leak
//! tracking of user-owned kinds.

use std::panic::Location;
use std::sync::Arc;

use easel_core::{HandleRegistry, LeakTracker, LeakTracking, Payload, RefCount};
use easel_protocol::desc::{Access, BufferKind, SamplerDesc, Usage};
use easel_protocol::HandleKind;

fn make_registry() -> (HandleRegistry, Arc<LeakTracker>) {
    let leaks = Arc::new(LeakTracker::new(LeakTracking::Count));
    (HandleRegistry::new(leaks.clone()), leaks)
}

fn buffer_payload() -> Payload {
    Payload::Buffer {
        kind: BufferKind::Vertex,
        usage: Usage::Static,
        access: Access::empty(),
        size: 64,
    }
}

#[test]
fn test_last_unref_reported_exactly_once() {
    let (mut registry, leaks) = make_registry();
    let handle = registry.create(buffer_payload(), Location::caller());
    assert_eq!(registry.ref_count(handle), Some(1));

    for _ in 0..3 {
        registry.add_ref(handle);
    }
    assert_eq!(registry.ref_count(handle), Some(4));

    let finals: Vec<bool> = (0..4).map(|_| registry.unref(handle)).collect();
    assert_eq!(finals, vec![false, false, false, true]);

    let record = registry.destroy(handle);
    assert_eq!(record.kind(), HandleKind::Buffer);
    assert_eq!(registry.live_count(), 0);
    assert_eq!(leaks.live_count(), 0);
}

#[test]
#[should_panic(expected = "invalid or already freed handle")]
fn test_unref_after_destroy_is_rejected() {
    let (mut registry, _leaks) = make_registry();
    let handle = registry.create(buffer_payload(), Location::caller());
    assert!(registry.unref(handle));
    registry.destroy(handle);
    registry.unref(handle);
}

#[test]
#[should_panic(expected = "while still referenced")]
fn test_destroy_requires_zero_count() {
    let (mut registry, _leaks) = make_registry();
    let handle = registry.create(buffer_payload(), Location::caller());
    registry.destroy(handle);
}

#[test]
#[should_panic(expected = "released below zero")]
fn test_ref_count_cannot_go_negative() {
    let count = RefCount::new();
    assert!(count.release());
    count.release();
}

#[test]
fn test_freed_slot_is_reused_without_changing_live_kinds() {
    let (mut registry, _leaks) = make_registry();
    let program = registry.create(Payload::Program, Location::caller());
    let buffer = registry.create(buffer_payload(), Location::caller());

    assert!(registry.unref(buffer));
    registry.destroy(buffer);

    let timer = registry.create(Payload::Timer, Location::caller());
    assert_eq!(timer.index, buffer.index);
    assert_ne!(timer.generation, buffer.generation);

    assert_eq!(registry.kind(buffer), None);
    assert_eq!(registry.kind(timer), Some(HandleKind::Timer));
    assert_eq!(registry.kind(program), Some(HandleKind::Program));
}

#[test]
fn test_only_user_owned_kinds_are_tracked() {
    let (mut registry, leaks) = make_registry();
    let buffer = registry.create(buffer_payload(), Location::caller());
    let sampler = registry.create(
        Payload::Sampler {
            desc: SamplerDesc::default(),
        },
        Location::caller(),
    );
    let timer = registry.create(Payload::Timer, Location::caller());

    assert!(leaks.contains(buffer));
    assert!(!leaks.contains(sampler));
    assert!(!leaks.contains(timer));
    assert_eq!(leaks.live_count(), 1);
}

#[test]
fn test_counted_ref_becomes_free_command() {
    let (mut registry, _leaks) = make_registry();
    let program = registry.create(Payload::Program, Location::caller());

    let counted = registry.retain(program);
    assert_eq!(counted.handle(), program);
    assert_eq!(counted.kind(), HandleKind::Program);
    assert_eq!(registry.ref_count(program), Some(2));

    let command = counted.into_free_command();
    assert_eq!(command.name(), "program_free");
    assert!(command.is_destructive());
}

#[test]
#[should_panic(expected = "expected a texture handle, got a buffer handle")]
fn test_expect_kind_rejects_other_kinds() {
    let (mut registry, _leaks) = make_registry();
    let buffer = registry.create(buffer_payload(), Location::caller());
    registry.expect_kind(buffer, HandleKind::Texture);
}

#[test]
fn test_leak_tracking_off_records_nothing() {
    let leaks = Arc::new(LeakTracker::new(LeakTracking::Off));
    let mut registry = HandleRegistry::new(leaks.clone());
    let buffer = registry.create(buffer_payload(), Location::caller());

    assert!(!leaks.contains(buffer));
    assert!(registry.unref(buffer));
    registry.destroy(buffer);
    assert!(leaks.report().is_empty());
}

#[test]
fn test_origin_mode_captures_call_site() {
    let leaks = Arc::new(LeakTracker::new(LeakTracking::Origin));
    let mut registry = HandleRegistry::new(leaks.clone());
    registry.create(buffer_payload(), Location::caller());

    let report = leaks.report();
    assert_eq!(report.count(), 1);
    assert_eq!(report.count_of(HandleKind::Buffer), 1);
    let origin = report.leaks[0].origin.as_deref().unwrap_or_default();
    assert!(origin.contains("registry_test.rs"), "origin was {:?}", origin);
}
