//! Effect sinks: where registry mutations go.
//!
//! Every registry operation is written once against [`EffectSink`]. An
//! [`Immediate`] sink applies each command to the world as it is submitted;
//! a [`Deferred`] sink records it for a later [`CommandBuffer::playback`].
//!
//! Link-list bookkeeping on unlink (removing a record by index) is not a
//! command. It goes through [`EffectSink::link_list_mut`] and happens at once
//! in both modes.

use tether_foundation::{EntityId, Result};
use tether_storage::{Command, CommandBuffer, LinkList, World};

/// Destination for the structural effects of registry operations.
pub trait EffectSink {
    /// Read access to the world, for contract checks and lookups.
    fn store(&self) -> &World;

    /// Returns true if `entity` has a link list, or will have one once
    /// submitted commands are applied.
    fn has_link_list(&self, entity: EntityId) -> bool {
        self.store().has_link_list(entity)
    }

    /// Mutable access to a link list that exists now.
    fn link_list_mut(&mut self, entity: EntityId) -> Option<&mut LinkList>;

    /// Applies or records a command.
    ///
    /// # Errors
    ///
    /// An immediate sink returns the world's error for the mutation.
    fn submit(&mut self, command: Command) -> Result<()>;

    /// Returns true if submitted commands are not yet visible in the store.
    fn is_deferred(&self) -> bool;
}

/// Applies every command at once.
#[derive(Debug)]
pub struct Immediate<'w> {
    world: &'w mut World,
}

impl<'w> Immediate<'w> {
    /// Creates a sink writing straight into `world`.
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }
}

impl EffectSink for Immediate<'_> {
    fn store(&self) -> &World {
        &*self.world
    }

    fn link_list_mut(&mut self, entity: EntityId) -> Option<&mut LinkList> {
        self.world.link_list_mut(entity)
    }

    fn submit(&mut self, command: Command) -> Result<()> {
        command.apply(self.world)
    }

    fn is_deferred(&self) -> bool {
        false
    }
}

/// Records commands into a buffer for later playback.
///
/// Holds the world explicitly so contract checks read the store the batch
/// will be applied to.
#[derive(Debug)]
pub struct Deferred<'w> {
    world: &'w mut World,
    buffer: &'w mut CommandBuffer,
}

impl<'w> Deferred<'w> {
    /// Creates a sink that checks against `world` and records into `buffer`.
    pub fn new(world: &'w mut World, buffer: &'w mut CommandBuffer) -> Self {
        Self { world, buffer }
    }

    /// Commands recorded so far.
    #[must_use]
    pub fn buffer(&self) -> &CommandBuffer {
        &*self.buffer
    }
}

impl EffectSink for Deferred<'_> {
    fn store(&self) -> &World {
        &*self.world
    }

    fn has_link_list(&self, entity: EntityId) -> bool {
        self.world.has_link_list(entity) || self.buffer.prepares_link_list(entity)
    }

    fn link_list_mut(&mut self, entity: EntityId) -> Option<&mut LinkList> {
        self.world.link_list_mut(entity)
    }

    fn submit(&mut self, command: Command) -> Result<()> {
        self.buffer.record(command);
        Ok(())
    }

    fn is_deferred(&self) -> bool {
        true
    }
}
