//! Shared fixtures for engine tests.

use tether_foundation::{EntityId, KeywordId, Type, Value};
use tether_storage::{ComponentSchema, FieldSchema, World};

/// A world with a `:target` payload kind holding one entity reference.
pub struct Fixture {
    pub world: World,
    pub target: KeywordId,
    pub entity: KeywordId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut world = World::new();
        let target = world.intern("target");
        let entity = world.intern("entity");
        world
            .register_component(
                ComponentSchema::new(target)
                    .with_field(FieldSchema::required(entity, Type::EntityRef)),
            )
            .unwrap();
        Self {
            world,
            target,
            entity,
        }
    }

    /// A `:target` payload pointing at `e`.
    pub fn payload(&self, e: EntityId) -> Value {
        Value::record([(self.entity, Value::EntityRef(e))])
    }

    /// The entity `owner`'s `:target` points at, if it has one.
    pub fn target_of(&self, owner: EntityId) -> Option<EntityId> {
        self.world
            .get_field(owner, self.target, self.entity)
            .and_then(Value::as_entity)
    }

    /// Owners recorded in `linked`'s list, in order.
    pub fn owners(&self, linked: EntityId) -> Vec<EntityId> {
        self.world
            .link_list(linked)
            .map(|list| list.iter().map(|r| r.owner).collect())
            .unwrap_or_default()
    }
}
