//! Property tests over random link sequences

use proptest::prelude::*;

use tether::engine::{
    Deferred, Immediate, LinkRegistry, MaintenancePass, TagLinkedEntities, TickExecutor,
};
use tether::foundation::{EntityId, KeywordId, Type, Value};
use tether::storage::{CommandBuffer, ComponentSchema, FieldSchema, World};

fn world_with_target() -> (World, KeywordId) {
    let mut world = World::new();
    let target = world.intern("target");
    world
        .register_component(
            ComponentSchema::new(target)
                .with_field(FieldSchema::required(KeywordId::VALUE, Type::EntityRef)),
        )
        .unwrap();
    (world, target)
}

fn payload(linked: EntityId) -> Value {
    Value::record([(KeywordId::VALUE, Value::EntityRef(linked))])
}

fn owners_of(world: &World, linked: EntityId) -> Vec<EntityId> {
    world
        .link_list(linked)
        .map(|list| list.iter().map(|r| r.owner).collect())
        .unwrap_or_default()
}

proptest! {
    #[test]
    fn list_tracks_linked_minus_unlinked(
        policies in prop::collection::vec(any::<bool>(), 1..12),
        unlink_mask in prop::collection::vec(any::<bool>(), 12),
    ) {
        let (mut world, target) = world_with_target();
        let linked = world.spawn();
        let owners: Vec<EntityId> = policies.iter().map(|_| world.spawn()).collect();
        let registry = LinkRegistry::default();
        let mut sink = Immediate::new(&mut world);

        for (&owner, &removable) in owners.iter().zip(&policies) {
            registry.add_link(&mut sink, owner, target, payload(linked), linked, removable).unwrap();
        }
        let mut remaining = Vec::new();
        for (i, &owner) in owners.iter().enumerate() {
            if unlink_mask[i] {
                registry.unlink(&mut sink, owner, linked).unwrap();
            } else {
                remaining.push(owner);
            }
        }

        prop_assert_eq!(owners_of(&world, linked), remaining);
        for (i, &owner) in owners.iter().enumerate() {
            if unlink_mask[i] {
                let expected = if policies[i] {
                    None
                } else {
                    Some(&Value::EntityRef(EntityId::null()))
                };
                prop_assert_eq!(world.get_field(owner, target, KeywordId::VALUE), expected);
            } else {
                prop_assert_eq!(
                    world.get_field(owner, target, KeywordId::VALUE),
                    Some(&Value::EntityRef(linked))
                );
            }
        }
    }

    #[test]
    fn sweep_reverts_surviving_owners(
        policies in prop::collection::vec(any::<bool>(), 1..12),
        doomed in prop::collection::vec(any::<bool>(), 12),
    ) {
        let (mut world, target) = world_with_target();
        let linked = world.spawn();
        let owners: Vec<EntityId> = policies.iter().map(|_| world.spawn()).collect();
        let registry = LinkRegistry::default();
        for (&owner, &removable) in owners.iter().zip(&policies) {
            registry
                .add_link(&mut Immediate::new(&mut world), owner, target, payload(linked), linked, removable)
                .unwrap();
        }
        let mut destroyed = 0;
        for (i, &owner) in owners.iter().enumerate() {
            if doomed[i] {
                world.destroy(owner).unwrap();
                destroyed += 1;
            }
        }

        world.destroy(linked).unwrap();
        let report = TickExecutor::new().tick(&mut world).unwrap();

        prop_assert_eq!(report.swept, 1);
        prop_assert_eq!(report.skipped, destroyed);
        prop_assert_eq!(report.reverted, owners.len() - destroyed);
        prop_assert!(!world.has_link_list(linked));
        prop_assert!(!world.is_pending(linked));
        for (i, &owner) in owners.iter().enumerate() {
            if doomed[i] {
                continue;
            }
            let expected = if policies[i] {
                None
            } else {
                Some(&Value::EntityRef(EntityId::null()))
            };
            prop_assert_eq!(world.get_field(owner, target, KeywordId::VALUE), expected);
        }
    }

    #[test]
    fn deferred_links_match_immediate(policies in prop::collection::vec(any::<bool>(), 1..8)) {
        let (mut immediate, target) = world_with_target();
        let linked = immediate.spawn();
        let owners: Vec<EntityId> = policies.iter().map(|_| immediate.spawn()).collect();
        immediate.create_link_list(linked, 1).unwrap();
        let mut deferred = immediate.clone();
        let registry = LinkRegistry::default();

        {
            let mut sink = Immediate::new(&mut immediate);
            for (&owner, &removable) in owners.iter().zip(&policies) {
                registry.add_link(&mut sink, owner, target, payload(linked), linked, removable).unwrap();
            }
        }
        let mut buffer = CommandBuffer::new();
        {
            let mut sink = Deferred::new(&mut deferred, &mut buffer);
            for (&owner, &removable) in owners.iter().zip(&policies) {
                registry.add_link(&mut sink, owner, target, payload(linked), linked, removable).unwrap();
            }
        }
        buffer.playback(&mut deferred).unwrap();

        prop_assert_eq!(immediate.link_list(linked), deferred.link_list(linked));
        for &owner in &owners {
            prop_assert_eq!(
                immediate.get(owner, target),
                deferred.get(owner, target)
            );
        }
    }

    #[test]
    fn tagging_is_idempotent(count in 0usize..10, tagged_mask in prop::collection::vec(any::<bool>(), 10)) {
        let mut world = World::new();
        let entities: Vec<EntityId> = (0..count).map(|_| world.spawn()).collect();
        for (i, &e) in entities.iter().enumerate() {
            world.create_link_list(e, 1).unwrap();
            if tagged_mask[i] {
                world.add(e, KeywordId::LINKED, Value::Bool(true)).unwrap();
            }
        }

        let mut pass = TagLinkedEntities;
        pass.run(&mut world).unwrap();
        let first: Vec<_> = world.query(&tether::storage::Query::new().with(KeywordId::LINKED));
        let second = pass.run(&mut world).unwrap();
        let again: Vec<_> = world.query(&tether::storage::Query::new().with(KeywordId::LINKED));

        prop_assert_eq!(second.entities, 0);
        prop_assert_eq!(&first, &again);
        prop_assert_eq!(first, entities);
    }
}
