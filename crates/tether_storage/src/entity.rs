//! Entity lifecycle management with generational indices.
//!
//! Besides live and free, a slot can be pending cleanup: its entity was
//! destroyed while it still held a link list, so the slot stays reserved
//! until the list is swept and removed.

// Allow u64 to usize casts - we target 64-bit systems
#![allow(clippy::cast_possible_truncation)]

use std::collections::BTreeSet;

use tether_foundation::{EntityId, Error, ErrorKind, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Observable state of an entity handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityState {
    /// Allocated and not destroyed.
    Live,
    /// Destroyed, waiting for its link list to be swept.
    PendingCleanup,
    /// Freed, stale, or never allocated.
    Gone,
}

/// Allocates entity handles and tracks their generations.
///
/// Odd generations are occupied slots, even generations are free. A pending
/// slot keeps its odd generation until [`EntityStore::finalize`].
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntityStore {
    generations: Vec<u32>,
    free_list: Vec<u64>,
    /// Occupied slots whose entity has been destroyed.
    pending: BTreeSet<u64>,
    live_count: usize,
}

impl EntityStore {
    /// Creates a new empty entity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a live entity, reusing a freed slot when one is available.
    pub fn spawn(&mut self) -> EntityId {
        self.live_count += 1;

        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.generations[idx] += 1;
            EntityId::new(index, self.generations[idx])
        } else {
            let index = self.generations.len() as u64;
            self.generations.push(1);
            EntityId::new(index, 1)
        }
    }

    /// Returns the state of a handle.
    #[must_use]
    pub fn state(&self, id: EntityId) -> EntityState {
        match self.generations.get(id.index as usize) {
            Some(&generation) if generation == id.generation && generation % 2 == 1 => {
                if self.pending.contains(&id.index) {
                    EntityState::PendingCleanup
                } else {
                    EntityState::Live
                }
            }
            _ => EntityState::Gone,
        }
    }

    /// Checks whether an entity is live.
    ///
    /// Pending entities are not live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.state(id) == EntityState::Live
    }

    /// Checks whether an entity is pending cleanup.
    #[must_use]
    pub fn is_pending(&self, id: EntityId) -> bool {
        self.state(id) == EntityState::PendingCleanup
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// `PendingCleanup` for destroyed entities awaiting a sweep, `StaleEntity`
    /// for handles to an earlier occupant, `EntityNotFound` otherwise.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        match self.state(id) {
            EntityState::Live => Ok(()),
            EntityState::PendingCleanup => Err(Error::new(ErrorKind::PendingCleanup(id))),
            EntityState::Gone => match self.generations.get(id.index as usize) {
                Some(&generation) if generation != id.generation && id.generation % 2 == 1 => {
                    Err(Error::stale_entity(id))
                }
                _ => Err(Error::entity_not_found(id)),
            },
        }
    }

    /// Frees a live entity's slot immediately.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not live.
    pub fn destroy(&mut self, id: EntityId) -> Result<()> {
        self.validate(id)?;
        self.release(id);
        self.live_count -= 1;
        Ok(())
    }

    /// Marks a live entity as destroyed but keeps its slot reserved.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not live.
    pub fn mark_pending(&mut self, id: EntityId) -> Result<()> {
        self.validate(id)?;
        self.pending.insert(id.index);
        self.live_count -= 1;
        Ok(())
    }

    /// Frees the slot of a pending entity.
    ///
    /// Returns false if the entity was not pending.
    pub fn finalize(&mut self, id: EntityId) -> bool {
        if !self.is_pending(id) {
            return false;
        }
        self.pending.remove(&id.index);
        self.release(id);
        true
    }

    fn release(&mut self, id: EntityId) {
        let idx = id.index as usize;
        self.generations[idx] += 1;
        self.free_list.push(id.index);
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live_count
    }

    /// Returns true if there are no live entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_count == 0
    }

    /// Number of entities pending cleanup.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Iterates live entities in index order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.generations
            .iter()
            .enumerate()
            .filter(|(idx, generation)| {
                *generation % 2 == 1 && !self.pending.contains(&(*idx as u64))
            })
            .map(|(idx, generation)| EntityId::new(idx as u64, *generation))
    }

    /// Iterates pending entities in index order.
    pub fn iter_pending(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.pending
            .iter()
            .map(|&index| EntityId::new(index, self.generations[index as usize]))
    }
}
