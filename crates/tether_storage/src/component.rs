//! Component storage with archetype tracking.
//!
//! Components are stored per kind, keyed by entity, and validated against
//! their registered schema. Archetypes record which kinds each entity has so
//! include/exclude selection does not scan every kind's table.

use std::collections::HashMap;

use tether_foundation::{EntityId, Error, ErrorKind, KeywordId, Result, Type, Value};

use crate::schema::ComponentSchema;

/// The set of component kinds an entity has.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Archetype {
    /// Component kinds, sorted for consistent identity.
    components: Vec<KeywordId>,
}

impl Archetype {
    /// Creates an empty archetype.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an archetype from a list of kinds.
    #[must_use]
    pub fn from_components(mut components: Vec<KeywordId>) -> Self {
        components.sort();
        components.dedup();
        Self { components }
    }

    /// Returns the kinds in this archetype.
    #[must_use]
    pub fn components(&self) -> &[KeywordId] {
        &self.components
    }

    /// Checks if this archetype contains a kind.
    #[must_use]
    pub fn contains(&self, component: KeywordId) -> bool {
        self.components.binary_search(&component).is_ok()
    }

    /// Adds a kind in place.
    pub fn insert(&mut self, component: KeywordId) {
        if let Err(pos) = self.components.binary_search(&component) {
            self.components.insert(pos, component);
        }
    }

    /// Removes a kind in place.
    pub fn remove(&mut self, component: KeywordId) {
        if let Ok(pos) = self.components.binary_search(&component) {
            self.components.remove(pos);
        }
    }

    /// True if every kind in `include` is present and none in `exclude` is.
    #[must_use]
    pub fn matches(&self, include: &[KeywordId], exclude: &[KeywordId]) -> bool {
        include.iter().all(|c| self.contains(*c)) && !exclude.iter().any(|c| self.contains(*c))
    }

    /// Returns true if the archetype has no kinds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// Stores all component data for entities.
///
/// Entity liveness is not checked here; [`crate::World`] validates handles
/// before delegating.
#[derive(Clone, Debug, Default)]
pub struct ComponentStore {
    schemas: HashMap<KeywordId, ComponentSchema>,
    /// Component data: kind -> entity -> value.
    data: HashMap<KeywordId, HashMap<EntityId, Value>>,
    archetypes: HashMap<EntityId, Archetype>,
}

impl ComponentStore {
    /// Creates a new empty component store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is already registered.
    pub fn register_schema(&mut self, schema: ComponentSchema) -> Result<()> {
        if self.schemas.contains_key(&schema.name) {
            return Err(Error::new(ErrorKind::Internal(format!(
                "component schema already registered: {:?}",
                schema.name
            ))));
        }
        self.schemas.insert(schema.name, schema);
        Ok(())
    }

    /// Registers a reserved schema, replacing any previous one.
    pub(crate) fn reserve_schema(&mut self, schema: ComponentSchema) {
        self.schemas.insert(schema.name, schema);
    }

    /// Gets the schema for a kind.
    #[must_use]
    pub fn schema(&self, component: KeywordId) -> Option<&ComponentSchema> {
        self.schemas.get(&component)
    }

    fn require_schema(&self, component: KeywordId) -> Result<&ComponentSchema> {
        self.schema(component)
            .ok_or_else(|| Error::new(ErrorKind::UnknownComponent(component)))
    }

    /// Adds a component the entity does not have yet.
    ///
    /// # Errors
    ///
    /// `PayloadAlreadyPresent` if the entity has the kind, `UnknownComponent`
    /// for unregistered kinds, or a validation error.
    pub fn add(&mut self, entity: EntityId, component: KeywordId, value: Value) -> Result<()> {
        let schema = self.require_schema(component)?;
        Self::validate_value(schema, &value)?;
        if self.has(entity, component) {
            return Err(Error::new(ErrorKind::PayloadAlreadyPresent { entity, component }));
        }
        self.insert(entity, component, value);
        Ok(())
    }

    /// Overwrites a component the entity already has.
    ///
    /// # Errors
    ///
    /// `PayloadAbsent` if the entity lacks the kind, `UnknownComponent` for
    /// unregistered kinds, or a validation error.
    pub fn set(&mut self, entity: EntityId, component: KeywordId, value: Value) -> Result<()> {
        let schema = self.require_schema(component)?;
        Self::validate_value(schema, &value)?;
        if !self.has(entity, component) {
            return Err(Error::new(ErrorKind::PayloadAbsent { entity, component }));
        }
        self.insert(entity, component, value);
        Ok(())
    }

    /// Adds the kind's default value if the entity lacks the kind.
    ///
    /// Returns whether the component was added; an existing value is left
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns an error for unregistered kinds.
    pub fn add_default(&mut self, entity: EntityId, component: KeywordId) -> Result<bool> {
        let default = self.require_schema(component)?.default_value();
        if self.has(entity, component) {
            return Ok(false);
        }
        self.insert(entity, component, default);
        Ok(true)
    }

    fn insert(&mut self, entity: EntityId, component: KeywordId, value: Value) {
        self.data.entry(component).or_default().insert(entity, value);
        self.archetypes.entry(entity).or_default().insert(component);
    }

    /// Gets a component value.
    #[must_use]
    pub fn get(&self, entity: EntityId, component: KeywordId) -> Option<&Value> {
        self.data.get(&component)?.get(&entity)
    }

    /// Checks if an entity has a component.
    #[must_use]
    pub fn has(&self, entity: EntityId, component: KeywordId) -> bool {
        self.data
            .get(&component)
            .is_some_and(|m| m.contains_key(&entity))
    }

    /// Removes a component, returning its value if it was present.
    pub fn remove(&mut self, entity: EntityId, component: KeywordId) -> Option<Value> {
        let value = self.data.get_mut(&component)?.remove(&entity);
        if value.is_some() {
            if let Some(archetype) = self.archetypes.get_mut(&entity) {
                archetype.remove(component);
                if archetype.is_empty() {
                    self.archetypes.remove(&entity);
                }
            }
        }
        value
    }

    /// Removes every component of an entity.
    pub fn remove_entity(&mut self, entity: EntityId) {
        if let Some(archetype) = self.archetypes.remove(&entity) {
            for component in archetype.components() {
                if let Some(table) = self.data.get_mut(component) {
                    table.remove(&entity);
                }
            }
        }
    }

    /// Gets the archetype of an entity.
    #[must_use]
    pub fn archetype(&self, entity: EntityId) -> Option<&Archetype> {
        self.archetypes.get(&entity)
    }

    /// Iterates entities that have a component.
    pub fn with_component(&self, component: KeywordId) -> impl Iterator<Item = EntityId> + '_ {
        self.data
            .get(&component)
            .into_iter()
            .flat_map(|m| m.keys().copied())
    }

    fn validate_value(schema: &ComponentSchema, value: &Value) -> Result<()> {
        if schema.is_tag {
            return match value {
                Value::Bool(true) => Ok(()),
                Value::Record(fields) if fields.is_empty() => Ok(()),
                _ => Err(Error::type_mismatch(Type::Bool, value.value_type())),
            };
        }

        let Value::Record(fields) = value else {
            return Err(Error::type_mismatch(Type::Record, value.value_type()));
        };

        for field in &schema.fields {
            match fields.get(&field.name) {
                Some(v) if !field.ty.accepts(&v.value_type()) => {
                    return Err(Error::type_mismatch(field.ty.clone(), v.value_type()));
                }
                None if field.required => {
                    return Err(Error::new(ErrorKind::AttributeNotFound {
                        component: schema.name,
                        attribute: field.name,
                    }));
                }
                _ => {}
            }
        }

        if let Some(extra) = fields.keys().find(|k| schema.field(**k).is_none()) {
            return Err(Error::new(ErrorKind::AttributeNotFound {
                component: schema.name,
                attribute: *extra,
            }));
        }
        Ok(())
    }
}
