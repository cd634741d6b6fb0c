//! Deferred sink integration tests
//!
//! Tests that recorded operations match their immediate counterparts.

use tether_engine::{Deferred, Immediate, LinkRegistry};
use tether_foundation::KeywordId;
use tether_storage::CommandBuffer;

use crate::common::Fixture;

#[test]
fn two_deferred_links_match_two_immediate_links() {
    let mut immediate = Fixture::new();
    let mut deferred = Fixture::new();
    let registry = LinkRegistry::default();

    let ids: Vec<_> = (0..3).map(|_| immediate.world.spawn()).collect();
    let same: Vec<_> = (0..3).map(|_| deferred.world.spawn()).collect();
    assert_eq!(ids, same);
    let (a1, a2, b) = (ids[0], ids[1], ids[2]);

    for fx in [&mut immediate, &mut deferred] {
        fx.world.create_link_list(b, 1).unwrap();
        fx.world.add(b, KeywordId::LINKED, tether_foundation::Value::Bool(true)).unwrap();
    }

    {
        let p1 = immediate.payload(b);
        let p2 = immediate.payload(b);
        let mut sink = Immediate::new(&mut immediate.world);
        registry.add_link(&mut sink, a1, immediate.target, p1, b, false).unwrap();
        registry.add_link(&mut sink, a2, immediate.target, p2, b, true).unwrap();
    }

    let mut buffer = CommandBuffer::new();
    {
        let p1 = deferred.payload(b);
        let p2 = deferred.payload(b);
        let mut sink = Deferred::new(&mut deferred.world, &mut buffer);
        registry.add_link(&mut sink, a1, deferred.target, p1, b, false).unwrap();
        registry.add_link(&mut sink, a2, deferred.target, p2, b, true).unwrap();
    }
    assert!(deferred.owners(b).is_empty());
    assert_eq!(buffer.len(), 4);
    buffer.playback(&mut deferred.world).unwrap();

    assert_eq!(immediate.owners(b), deferred.owners(b));
    assert_eq!(
        immediate.world.link_list(b),
        deferred.world.link_list(b)
    );
    for a in [a1, a2] {
        assert_eq!(immediate.target_of(a), deferred.target_of(a));
    }
}

#[test]
fn deferred_add_conflict_surfaces_at_playback() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    fx.world.add_default(a, fx.target).unwrap();
    fx.world.create_link_list(b, 1).unwrap();
    let payload = fx.payload(b);

    let mut buffer = CommandBuffer::new();
    LinkRegistry::default()
        .add_link(&mut Deferred::new(&mut fx.world, &mut buffer), a, fx.target, payload, b, true)
        .unwrap();

    let err = buffer.playback(&mut fx.world).unwrap_err();
    assert!(matches!(
        err.kind,
        tether_foundation::ErrorKind::PayloadAlreadyPresent { .. }
    ));
}

#[test]
fn deferred_unlink_record_reverts_at_playback() {
    let mut fx = Fixture::new();
    let a = fx.world.spawn();
    let b = fx.world.spawn();
    let payload = fx.payload(b);
    let registry = LinkRegistry::default();
    registry
        .add_link(&mut Immediate::new(&mut fx.world), a, fx.target, payload, b, false)
        .unwrap();
    let record = fx.world.link_list(b).unwrap().get(0).copied().unwrap();

    let mut buffer = CommandBuffer::new();
    registry
        .unlink_record(&mut Deferred::new(&mut fx.world, &mut buffer), record)
        .unwrap();
    assert_eq!(fx.target_of(a), Some(b));
    // Only the owner side is touched
    assert_eq!(fx.owners(b), vec![a]);

    buffer.playback(&mut fx.world).unwrap();
    assert_eq!(fx.target_of(a), Some(tether_foundation::EntityId::null()));
}
