//! Include/exclude component selection.

use tether_foundation::KeywordId;

use crate::component::Archetype;
use crate::entity::EntityState;

/// Which lifecycle states a query matches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Live entities only.
    #[default]
    Live,
    /// Entities pending cleanup only.
    Pending,
    /// Live and pending entities.
    Any,
}

impl Lifecycle {
    /// Returns true if an entity in `state` is selected.
    #[must_use]
    pub fn admits(self, state: EntityState) -> bool {
        matches!(
            (self, state),
            (Self::Live | Self::Any, EntityState::Live)
                | (Self::Pending | Self::Any, EntityState::PendingCleanup)
        )
    }
}

/// Selects entities by the component kinds they have and lack.
///
/// ```
/// use tether_foundation::KeywordId;
/// use tether_storage::Query;
///
/// let needs_tag = Query::new()
///     .with(KeywordId::LINK_LIST)
///     .without(KeywordId::LINKED);
/// assert_eq!(needs_tag.include(), &[KeywordId::LINK_LIST]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Query {
    include: Vec<KeywordId>,
    exclude: Vec<KeywordId>,
    state: Lifecycle,
}

impl Query {
    /// Creates a query matching every live entity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires a component kind.
    #[must_use]
    pub fn with(mut self, component: KeywordId) -> Self {
        self.include.push(component);
        self
    }

    /// Excludes a component kind.
    #[must_use]
    pub fn without(mut self, component: KeywordId) -> Self {
        self.exclude.push(component);
        self
    }

    /// Matches entities pending cleanup instead of live ones.
    #[must_use]
    pub fn pending(mut self) -> Self {
        self.state = Lifecycle::Pending;
        self
    }

    /// Sets the lifecycle filter.
    #[must_use]
    pub fn in_state(mut self, state: Lifecycle) -> Self {
        self.state = state;
        self
    }

    /// Required kinds.
    #[must_use]
    pub fn include(&self) -> &[KeywordId] {
        &self.include
    }

    /// Excluded kinds.
    #[must_use]
    pub fn exclude(&self) -> &[KeywordId] {
        &self.exclude
    }

    /// Lifecycle filter.
    #[must_use]
    pub fn state(&self) -> Lifecycle {
        self.state
    }

    /// Returns true if an entity with `archetype` in `state` is selected.
    #[must_use]
    pub fn matches(&self, archetype: &Archetype, state: EntityState) -> bool {
        self.state.admits(state) && archetype.matches(&self.include, &self.exclude)
    }
}
