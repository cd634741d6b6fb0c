//! Integration tests for component payloads
//!
//! Tests add/set/remove semantics and schema defaults.

use tether_foundation::{EntityId, ErrorKind, KeywordId, Type, Value};
use tether_storage::{ComponentSchema, FieldSchema, World};

struct Kinds {
    health: KeywordId,
    current: KeywordId,
    max: KeywordId,
}

fn world_with_health() -> (World, Kinds) {
    let mut world = World::new();
    let kinds = Kinds {
        health: world.intern("health"),
        current: world.intern("current"),
        max: world.intern("max"),
    };
    world
        .register_component(
            ComponentSchema::new(kinds.health)
                .with_field(FieldSchema::required(kinds.current, Type::Int))
                .with_field(FieldSchema::optional(kinds.max, Type::Int, Value::Int(100))),
        )
        .unwrap();
    (world, kinds)
}

fn health(k: &Kinds, current: i64) -> Value {
    Value::record([(k.current, Value::Int(current))])
}

// =============================================================================
// Add / Set
// =============================================================================

#[test]
fn add_fails_when_present() {
    let (mut world, k) = world_with_health();
    let e = world.spawn();
    world.add(e, k.health, health(&k, 10)).unwrap();

    let err = world.add(e, k.health, health(&k, 20)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::PayloadAlreadyPresent { .. }));
    assert_eq!(world.get_field(e, k.health, k.current), Some(&Value::Int(10)));
}

#[test]
fn set_fails_when_absent() {
    let (mut world, k) = world_with_health();
    let e = world.spawn();

    let err = world.set(e, k.health, health(&k, 20)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::PayloadAbsent { .. }));
}

#[test]
fn set_overwrites() {
    let (mut world, k) = world_with_health();
    let e = world.spawn();
    world.add(e, k.health, health(&k, 10)).unwrap();
    world.set(e, k.health, health(&k, 3)).unwrap();

    assert_eq!(world.get_field(e, k.health, k.current), Some(&Value::Int(3)));
}

// =============================================================================
// Remove / Default
// =============================================================================

#[test]
fn remove_returns_previous_and_is_idempotent() {
    let (mut world, k) = world_with_health();
    let e = world.spawn();
    world.add(e, k.health, health(&k, 10)).unwrap();

    let previous = world.remove(e, k.health).unwrap();
    assert_eq!(previous.and_then(|v| v.field(k.current).cloned()), Some(Value::Int(10)));
    assert_eq!(world.remove(e, k.health).unwrap(), None);
}

#[test]
fn add_default_uses_declared_and_zero_values() {
    let (mut world, k) = world_with_health();
    let e = world.spawn();

    assert!(world.add_default(e, k.health).unwrap());
    assert_eq!(world.get_field(e, k.health, k.current), Some(&Value::Int(0)));
    assert_eq!(world.get_field(e, k.health, k.max), Some(&Value::Int(100)));
}

#[test]
fn unknown_component_is_rejected() {
    let (mut world, _) = world_with_health();
    let e = world.spawn();
    let unknown = world.intern("unknown");

    let err = world.add_default(e, unknown).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownComponent(_)));
}

#[test]
fn entity_ref_defaults_to_null() {
    let mut world = World::new();
    let target = world.intern("target");
    world
        .register_component(
            ComponentSchema::new(target)
                .with_field(FieldSchema::required(KeywordId::VALUE, Type::EntityRef)),
        )
        .unwrap();
    let e = world.spawn();
    world.add_default(e, target).unwrap();

    assert_eq!(
        world.get_field(e, target, KeywordId::VALUE),
        Some(&Value::EntityRef(EntityId::null()))
    );
}
