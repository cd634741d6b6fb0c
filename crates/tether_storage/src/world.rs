//! World state management with cheap snapshots.
//!
//! The `World` is the unified interface to all storage systems. Each store
//! sits behind an `Arc`, so `clone()` is O(1) and mutation copies a store
//! only when a snapshot still shares it.

use std::collections::HashMap;
use std::sync::Arc;

use tether_foundation::{EntityId, Error, ErrorKind, Interner, KeywordId, Result, Value};

use crate::component::ComponentStore;
use crate::entity::{EntityState, EntityStore};
use crate::link::LinkList;
use crate::query::{Lifecycle, Query};
use crate::schema::ComponentSchema;

/// Entity-component store with per-entity link lists.
///
/// A link list is stored beside the components and reported as the
/// [`KeywordId::LINK_LIST`] component, so queries can select on it.
#[derive(Clone, Debug)]
pub struct World {
    /// Entity lifecycle management.
    entities: Arc<EntityStore>,
    /// Component data storage.
    components: Arc<ComponentStore>,
    /// Link lists keyed by the linked entity.
    links: Arc<HashMap<EntityId, LinkList>>,
    /// Component kind names.
    interner: Arc<Interner>,
    /// Current tick number.
    tick: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world.
    ///
    /// The link list marker and the participation tag are registered as tag
    /// schemas.
    #[must_use]
    pub fn new() -> Self {
        let mut components = ComponentStore::new();
        components.reserve_schema(ComponentSchema::tag(KeywordId::LINK_LIST));
        components.reserve_schema(ComponentSchema::tag(KeywordId::LINKED));

        Self {
            entities: Arc::new(EntityStore::new()),
            components: Arc::new(components),
            links: Arc::new(HashMap::new()),
            interner: Arc::new(Interner::new()),
            tick: 0,
        }
    }

    // --- Schema ---

    /// Registers a component schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is already registered.
    pub fn register_component(&mut self, schema: ComponentSchema) -> Result<()> {
        Arc::make_mut(&mut self.components).register_schema(schema)
    }

    /// Gets the schema of a component kind.
    #[must_use]
    pub fn schema(&self, component: KeywordId) -> Option<&ComponentSchema> {
        self.components.schema(component)
    }

    /// Read access to the keyword table.
    #[must_use]
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Write access to the keyword table.
    pub fn interner_mut(&mut self) -> &mut Interner {
        Arc::make_mut(&mut self.interner)
    }

    /// Interns a component kind or field name.
    pub fn intern(&mut self, name: &str) -> KeywordId {
        self.interner_mut().intern_keyword(name)
    }

    // --- Entities ---

    /// Spawns an entity with no components.
    pub fn spawn(&mut self) -> EntityId {
        Arc::make_mut(&mut self.entities).spawn()
    }

    /// Spawns an entity with initial components.
    ///
    /// # Errors
    ///
    /// Returns the first component's error; the entity is not kept.
    pub fn spawn_with(
        &mut self,
        components: impl IntoIterator<Item = (KeywordId, Value)>,
    ) -> Result<EntityId> {
        let id = self.spawn();
        for (component, value) in components {
            if let Err(err) = self.add(id, component, value) {
                self.destroy(id)?;
                return Err(err);
            }
        }
        Ok(id)
    }

    /// Destroys an entity.
    ///
    /// Every component is stripped, the participation tag included. An
    /// entity that carries a link list keeps it and becomes pending cleanup
    /// until the list is removed; other entities are freed at once.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not live.
    pub fn destroy(&mut self, id: EntityId) -> Result<()> {
        self.entities.validate(id)?;
        let components = Arc::make_mut(&mut self.components);
        components.remove_entity(id);

        if self.links.contains_key(&id) {
            components.add(id, KeywordId::LINK_LIST, Value::Bool(true))?;
            Arc::make_mut(&mut self.entities).mark_pending(id)
        } else {
            Arc::make_mut(&mut self.entities).destroy(id)
        }
    }

    /// Checks whether an entity is live.
    ///
    /// Entities pending cleanup do not exist.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.entities.exists(id)
    }

    /// Checks whether an entity is pending cleanup.
    #[must_use]
    pub fn is_pending(&self, id: EntityId) -> bool {
        self.entities.is_pending(id)
    }

    /// Lifecycle state of a handle.
    #[must_use]
    pub fn state(&self, id: EntityId) -> EntityState {
        self.entities.state(id)
    }

    /// Validates that an entity is live.
    ///
    /// # Errors
    ///
    /// Returns the store's reason the entity is not live.
    pub fn validate(&self, id: EntityId) -> Result<()> {
        self.entities.validate(id)
    }

    /// Iterates live entities.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter()
    }

    /// Iterates entities pending cleanup.
    pub fn pending_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter_pending()
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // --- Components ---

    /// Checks whether an entity has a component.
    ///
    /// Answers for [`KeywordId::LINK_LIST`] too, including on pending
    /// entities.
    #[must_use]
    pub fn has(&self, id: EntityId, component: KeywordId) -> bool {
        self.entities.state(id) != EntityState::Gone && self.components.has(id, component)
    }

    /// Gets a component value.
    #[must_use]
    pub fn get(&self, id: EntityId, component: KeywordId) -> Option<&Value> {
        if self.entities.state(id) == EntityState::Gone {
            return None;
        }
        self.components.get(id, component)
    }

    /// Gets one field of a record component.
    #[must_use]
    pub fn get_field(&self, id: EntityId, component: KeywordId, field: KeywordId) -> Option<&Value> {
        self.get(id, component)?.field(field)
    }

    /// Adds a component the entity does not have.
    ///
    /// # Errors
    ///
    /// `PayloadAlreadyPresent` if present; entity and validation errors.
    pub fn add(&mut self, id: EntityId, component: KeywordId, value: Value) -> Result<()> {
        self.check_writable(id, component)?;
        Arc::make_mut(&mut self.components).add(id, component, value)
    }

    /// Overwrites a component the entity has.
    ///
    /// # Errors
    ///
    /// `PayloadAbsent` if absent; entity and validation errors.
    pub fn set(&mut self, id: EntityId, component: KeywordId, value: Value) -> Result<()> {
        self.check_writable(id, component)?;
        Arc::make_mut(&mut self.components).set(id, component, value)
    }

    /// Removes a component, returning its previous value.
    ///
    /// Removing an absent component is a no-op.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not live.
    pub fn remove(&mut self, id: EntityId, component: KeywordId) -> Result<Option<Value>> {
        self.check_writable(id, component)?;
        if !self.components.has(id, component) {
            return Ok(None);
        }
        Ok(Arc::make_mut(&mut self.components).remove(id, component))
    }

    /// Adds a component at its schema default if the entity lacks it.
    ///
    /// Returns whether the component was added.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not live or the kind is unknown.
    pub fn add_default(&mut self, id: EntityId, component: KeywordId) -> Result<bool> {
        self.check_writable(id, component)?;
        Arc::make_mut(&mut self.components).add_default(id, component)
    }

    fn check_writable(&self, id: EntityId, component: KeywordId) -> Result<()> {
        self.entities.validate(id)?;
        if component == KeywordId::LINK_LIST {
            return Err(Error::new(ErrorKind::Internal(
                "link lists are managed with create_link_list and remove_link_list".to_string(),
            )));
        }
        Ok(())
    }

    // --- Link lists ---

    /// Checks whether an entity carries a link list.
    #[must_use]
    pub fn has_link_list(&self, id: EntityId) -> bool {
        self.links.contains_key(&id)
    }

    /// Gets an entity's link list.
    #[must_use]
    pub fn link_list(&self, id: EntityId) -> Option<&LinkList> {
        self.links.get(&id)
    }

    /// Gets an entity's link list for mutation.
    pub fn link_list_mut(&mut self, id: EntityId) -> Option<&mut LinkList> {
        if !self.links.contains_key(&id) {
            return None;
        }
        Arc::make_mut(&mut self.links).get_mut(&id)
    }

    /// Gives a live entity a link list, reusing an existing one.
    ///
    /// # Errors
    ///
    /// Fails if the entity is not live.
    pub fn create_link_list(&mut self, id: EntityId, capacity: usize) -> Result<&mut LinkList> {
        self.entities.validate(id)?;
        if !self.links.contains_key(&id) {
            Arc::make_mut(&mut self.components).add(id, KeywordId::LINK_LIST, Value::Bool(true))?;
        }
        Ok(Arc::make_mut(&mut self.links)
            .entry(id)
            .or_insert_with(|| LinkList::with_capacity(capacity)))
    }

    /// Removes an entity's link list.
    ///
    /// On an entity pending cleanup this completes its destruction.
    ///
    /// # Errors
    ///
    /// Fails if the handle is neither live nor pending.
    pub fn remove_link_list(&mut self, id: EntityId) -> Result<Option<LinkList>> {
        let state = self.entities.state(id);
        if state == EntityState::Gone {
            return Err(self
                .entities
                .validate(id)
                .err()
                .unwrap_or_else(|| Error::entity_not_found(id)));
        }
        if !self.links.contains_key(&id) {
            return Ok(None);
        }

        let list = Arc::make_mut(&mut self.links).remove(&id);
        let components = Arc::make_mut(&mut self.components);
        components.remove(id, KeywordId::LINK_LIST);
        if state == EntityState::PendingCleanup {
            components.remove_entity(id);
            Arc::make_mut(&mut self.entities).finalize(id);
        }
        Ok(list)
    }

    // --- Queries ---

    /// Returns the entities a query selects, in index order.
    #[must_use]
    pub fn query(&self, query: &Query) -> Vec<EntityId> {
        let candidates: Vec<EntityId> = match query.include().first() {
            Some(&first) => self.components.with_component(first).collect(),
            None => match query.state() {
                Lifecycle::Live => self.entities.iter().collect(),
                Lifecycle::Pending => self.entities.iter_pending().collect(),
                Lifecycle::Any => self
                    .entities
                    .iter()
                    .chain(self.entities.iter_pending())
                    .collect(),
            },
        };

        let mut matched: Vec<EntityId> = candidates
            .into_iter()
            .filter(|&id| {
                let state = self.entities.state(id);
                match self.components.archetype(id) {
                    Some(archetype) => query.matches(archetype, state),
                    None => query.include().is_empty() && query.state().admits(state),
                }
            })
            .collect();
        matched.sort_by_key(|id| id.index);
        matched
    }

    // --- Tick ---

    /// Current tick number.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances to the next tick.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }
}
