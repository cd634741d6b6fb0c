//! Link registry integration tests
//!
//! Tests linking, lookup, and severing through an immediate sink.

use tether_engine::{Immediate, LinkConfig, LinkRegistry};
use tether_foundation::{EntityId, ErrorKind, KeywordId};

use crate::common::Fixture;

// =============================================================================
// Registration
// =============================================================================

#[test]
fn register_creates_and_tags_list_on_first_link() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();

    LinkRegistry::default()
        .register_link(&mut Immediate::new(&mut fx.world), a, fx.target, b, false)
        .unwrap();

    assert_eq!(fx.owners(b), vec![a]);
    assert!(fx.world.has(b, KeywordId::LINKED));
    // Registration alone does not attach a payload
    assert!(!fx.world.has(a, fx.target));
}

#[test]
fn register_in_resolved_list() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let registry = LinkRegistry::default();
    let mut sink = Immediate::new(&mut fx.world);

    let list = registry.prepare_for_linking(&mut sink, b).unwrap();
    registry
        .register_link_in(&mut sink, a, fx.target, list, true)
        .unwrap();
    assert_eq!(registry.resolve(&sink, b).unwrap(), list);

    let record = fx.world.link_list(b).unwrap().get(0).copied().unwrap();
    assert_eq!(record.owner, a);
    assert!(record.removable);
}

#[test]
fn list_consistency_over_many_owners() {
    let mut fx = Fixture::new();
    let b = fx.world.spawn();
    let owners: Vec<EntityId> = (0..5).map(|_| fx.world.spawn()).collect();
    let registry = LinkRegistry::default();
    let mut sink = Immediate::new(&mut fx.world);

    for &o in &owners {
        registry.register_link(&mut sink, o, fx.target, b, true).unwrap();
    }
    registry.unlink(&mut sink, owners[2], b).unwrap();

    let mut expected = owners.clone();
    expected.remove(2);
    assert_eq!(fx.owners(b), expected);
}

#[test]
fn resolve_missing_list() {
    let mut fx = Fixture::new();
    let b = fx.world.spawn();

    let err = LinkRegistry::default()
        .resolve(&Immediate::new(&mut fx.world), b)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::LinkListMissing(e) if e == b));
    assert!(err.to_string().contains("in resolve"));
}

#[test]
fn prepare_dead_entity_fails() {
    let mut fx = Fixture::new();
    let b = fx.world.spawn();
    fx.world.destroy(b).unwrap();

    let err = LinkRegistry::default()
        .prepare_for_linking(&mut Immediate::new(&mut fx.world), b)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::StaleEntity(e) if e == b));
    assert!(!fx.world.has_link_list(b));
}

// =============================================================================
// Round Trip
// =============================================================================

#[test]
fn round_trip_non_removable_resets() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let payload = fx.payload(b);
    let registry = LinkRegistry::default();
    let mut sink = Immediate::new(&mut fx.world);

    registry
        .add_link(&mut sink, a, fx.target, payload, b, false)
        .unwrap();
    registry.unlink(&mut sink, a, b).unwrap();

    assert_eq!(fx.target_of(a), Some(EntityId::null()));
}

#[test]
fn round_trip_removable_strips() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let payload = fx.payload(b);
    let registry = LinkRegistry::default();
    let mut sink = Immediate::new(&mut fx.world);

    registry
        .add_link(&mut sink, a, fx.target, payload, b, true)
        .unwrap();
    registry.unlink(&mut sink, a, b).unwrap();

    assert!(!fx.world.has(a, fx.target));
}

// =============================================================================
// Contract Violations
// =============================================================================

#[test]
fn checked_errors_name_entities_and_operation() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let registry = LinkRegistry::default();
    let mut sink = Immediate::new(&mut fx.world);
    registry.prepare_for_linking(&mut sink, b).unwrap();

    let err = registry.unlink(&mut sink, a, b).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains(&format!("{a:?}")), "{msg}");
    assert!(msg.contains(&format!("{b:?}")), "{msg}");
    assert!(msg.contains("unlink"), "{msg}");
}

#[test]
fn checked_unlink_with_dead_owner_still_clears_record() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let registry = LinkRegistry::default();
    registry
        .register_link(&mut Immediate::new(&mut fx.world), a, fx.target, b, true)
        .unwrap();
    fx.world.destroy(a).unwrap();

    let err = registry
        .unlink(&mut Immediate::new(&mut fx.world), a, b)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::OwnerNotFound { owner, linked } if owner == a && linked == b));
    assert!(fx.owners(b).is_empty());

    // Nothing is left for a second unlink to find
    let again = registry
        .unlink(&mut Immediate::new(&mut fx.world), a, b)
        .unwrap_err();
    assert!(matches!(again.kind, ErrorKind::LinkRecordNotFound { .. }));
}

#[test]
fn trusted_unlink_forgets_record_before_owner_effect() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let registry = LinkRegistry::new(LinkConfig::trusted());
    registry
        .register_link(&mut Immediate::new(&mut fx.world), a, fx.target, b, true)
        .unwrap();
    fx.world.destroy(a).unwrap();

    // The store rejects the owner effect, but the record is already gone
    let err = registry
        .unlink(&mut Immediate::new(&mut fx.world), a, b)
        .unwrap_err();

    assert!(!err.is_link_contract_violation());
    assert!(fx.owners(b).is_empty());
}

#[test]
fn checked_register_rejects_unknown_kind() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let unknown = fx.world.intern("unknown");

    let err = LinkRegistry::default()
        .register_link(&mut Immediate::new(&mut fx.world), a, unknown, b, false)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::UnknownComponent(k) if k == unknown));
    assert!(!fx.world.has_link_list(b));
}

// =============================================================================
// Failed Links Leave No Trace
// =============================================================================

#[test]
fn add_link_onto_present_payload_leaves_linked_untouched() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let c = fx.world.spawn();
    let payload = fx.payload(c);
    fx.world.add(a, fx.target, payload).unwrap();

    let payload = fx.payload(b);
    let err = LinkRegistry::default()
        .add_link(&mut Immediate::new(&mut fx.world), a, fx.target, payload, b, true)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::PayloadAlreadyPresent { .. }));
    assert!(!fx.world.has_link_list(b));
    assert!(!fx.world.has(b, KeywordId::LINKED));
    assert_eq!(fx.target_of(a), Some(c));
}

#[test]
fn set_link_onto_absent_payload_leaves_linked_untouched() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();

    let payload = fx.payload(b);
    let err = LinkRegistry::default()
        .set_link(&mut Immediate::new(&mut fx.world), a, fx.target, payload, b, true)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::PayloadAbsent { .. }));
    assert!(!fx.world.has_link_list(b));
    assert!(!fx.world.has(b, KeywordId::LINKED));
    assert!(!fx.world.has(a, fx.target));
}

#[test]
fn add_link_to_dead_linked_leaves_owner_untouched() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    fx.world.destroy(b).unwrap();

    let payload = fx.payload(b);
    let err = LinkRegistry::default()
        .add_link(&mut Immediate::new(&mut fx.world), a, fx.target, payload, b, true)
        .unwrap_err();

    assert!(matches!(err.kind, ErrorKind::StaleEntity(e) if e == b));
    assert!(!fx.world.has(a, fx.target));
}
