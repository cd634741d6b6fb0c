//! Deferred structural mutations.
//!
//! A [`CommandBuffer`] records mutations during a pass and applies them in
//! recording order at a single playback point.

use std::collections::HashSet;

use tether_foundation::{EntityId, Error, KeywordId, Result, Value};

use crate::link::LinkRecord;
use crate::world::World;

/// One recorded mutation.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Add a component the entity lacks.
    AddComponent {
        /// Target entity.
        entity: EntityId,
        /// Component kind.
        component: KeywordId,
        /// Component value.
        value: Value,
    },
    /// Overwrite a component the entity has.
    SetComponent {
        /// Target entity.
        entity: EntityId,
        /// Component kind.
        component: KeywordId,
        /// Component value.
        value: Value,
    },
    /// Remove a component if present.
    RemoveComponent {
        /// Target entity.
        entity: EntityId,
        /// Component kind.
        component: KeywordId,
    },
    /// Add a component at its default value if absent.
    AddDefault {
        /// Target entity.
        entity: EntityId,
        /// Component kind.
        component: KeywordId,
    },
    /// Give an entity a link list.
    CreateLinkList {
        /// Linked entity.
        entity: EntityId,
        /// Capacity hint.
        capacity: usize,
    },
    /// Append a record to an entity's link list.
    AppendLink {
        /// Linked entity.
        linked: EntityId,
        /// Record to append.
        record: LinkRecord,
    },
    /// Destroy an entity.
    Destroy(EntityId),
}

impl Command {
    /// Applies this command to a world.
    ///
    /// # Errors
    ///
    /// Returns the world's error for the mutation.
    pub fn apply(self, world: &mut World) -> Result<()> {
        match self {
            Self::AddComponent {
                entity,
                component,
                value,
            } => world.add(entity, component, value),
            Self::SetComponent {
                entity,
                component,
                value,
            } => world.set(entity, component, value),
            Self::RemoveComponent { entity, component } => {
                world.remove(entity, component).map(|_| ())
            }
            Self::AddDefault { entity, component } => {
                world.add_default(entity, component).map(|_| ())
            }
            Self::CreateLinkList { entity, capacity } => {
                world.create_link_list(entity, capacity).map(|_| ())
            }
            Self::AppendLink { linked, record } => match world.link_list_mut(linked) {
                Some(list) => {
                    list.push(record);
                    Ok(())
                }
                None => Err(Error::link_list_missing(linked)),
            },
            Self::Destroy(entity) => world.destroy(entity),
        }
    }

    /// Short name of the command, for logs and error context.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddComponent { .. } => "add-component",
            Self::SetComponent { .. } => "set-component",
            Self::RemoveComponent { .. } => "remove-component",
            Self::AddDefault { .. } => "add-default",
            Self::CreateLinkList { .. } => "create-link-list",
            Self::AppendLink { .. } => "append-link",
            Self::Destroy(_) => "destroy",
        }
    }
}

/// Ordered batch of commands awaiting playback.
#[derive(Clone, Debug, Default)]
pub struct CommandBuffer {
    commands: Vec<Command>,
    /// Entities this batch gives a link list.
    prepared: HashSet<EntityId>,
}

impl CommandBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a command.
    pub fn record(&mut self, command: Command) {
        if let Command::CreateLinkList { entity, .. } = command {
            self.prepared.insert(entity);
        }
        self.commands.push(command);
    }

    /// Returns true if a recorded command creates `entity`'s link list.
    #[must_use]
    pub fn prepares_link_list(&self, entity: EntityId) -> bool {
        self.prepared.contains(&entity)
    }

    /// Recorded commands in order.
    #[must_use]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Number of recorded commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns true if nothing is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Applies every command in recording order, returning how many ran.
    ///
    /// # Errors
    ///
    /// Stops at the first failing command. Commands before it stay applied.
    pub fn playback(self, world: &mut World) -> Result<usize> {
        let total = self.commands.len();
        for command in self.commands {
            let name = command.name();
            command.apply(world).map_err(|e| e.in_operation(name))?;
        }
        Ok(total)
    }
}
