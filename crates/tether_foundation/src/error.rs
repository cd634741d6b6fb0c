//! Error types for Tether.
//!
//! Uses `thiserror`. Link contract violations carry the entities involved in
//! their [`ErrorKind`]; the operation that detected them goes in the
//! [`ErrorContext`].

use std::fmt;

use thiserror::Error;

use crate::entity::EntityId;
use crate::intern::KeywordId;
use crate::types::Type;

/// The main error type for Tether operations.
#[derive(Debug, Error)]
#[error("{kind}{}", .context.as_ref().map(|c| format!(" {c}")).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Where the error was detected.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Attaches context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Records the operation that surfaced this error.
    ///
    /// The first operation recorded is kept as the origin; later ones are
    /// pushed as frames.
    #[must_use]
    pub fn in_operation(self, operation: &'static str) -> Self {
        let context = match self.context {
            Some(ctx) if ctx.operation.is_some() => ctx.with_frame(operation),
            Some(ctx) => ctx.with_operation(operation),
            None => ErrorContext::new().with_operation(operation),
        };
        Self {
            kind: self.kind,
            context: Some(context),
        }
    }

    /// Creates an entity not found error.
    #[must_use]
    pub fn entity_not_found(id: EntityId) -> Self {
        Self::new(ErrorKind::EntityNotFound(id))
    }

    /// Creates a stale entity reference error.
    #[must_use]
    pub fn stale_entity(id: EntityId) -> Self {
        Self::new(ErrorKind::StaleEntity(id))
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an owner not found error.
    #[must_use]
    pub fn owner_not_found(owner: EntityId, linked: EntityId) -> Self {
        Self::new(ErrorKind::OwnerNotFound { owner, linked })
    }

    /// Creates a missing link list error.
    #[must_use]
    pub fn link_list_missing(linked: EntityId) -> Self {
        Self::new(ErrorKind::LinkListMissing(linked))
    }

    /// Creates a link record not found error.
    #[must_use]
    pub fn link_record_not_found(owner: EntityId, linked: EntityId) -> Self {
        Self::new(ErrorKind::LinkRecordNotFound { owner, linked })
    }

    /// Returns true if this error is a violated link contract rather than a
    /// store failure.
    #[must_use]
    pub fn is_link_contract_violation(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::OwnerNotFound { .. }
                | ErrorKind::LinkListMissing(_)
                | ErrorKind::LinkRecordNotFound { .. }
                | ErrorKind::AmbiguousLink { .. }
                | ErrorKind::DuplicateLink { .. }
        )
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// Entity was never allocated or has been freed.
    #[error("entity not found: {0:?}")]
    EntityNotFound(EntityId),

    /// Entity handle refers to an earlier occupant of a reused slot.
    #[error("stale entity reference: {0:?}")]
    StaleEntity(EntityId),

    /// Entity was destroyed and is waiting for its link list to be swept.
    #[error("entity is pending cleanup: {0:?}")]
    PendingCleanup(EntityId),

    /// Component kind has no registered schema.
    #[error("unknown component: {0:?}")]
    UnknownComponent(KeywordId),

    /// Value does not fit the declared type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Required field missing, or field not declared by the schema.
    #[error("attribute {attribute:?} not valid on component {component:?}")]
    AttributeNotFound {
        /// The component being written.
        component: KeywordId,
        /// The offending field.
        attribute: KeywordId,
    },

    /// Add of a component the entity already has.
    #[error("component {component:?} already present on {entity:?}")]
    PayloadAlreadyPresent {
        /// The entity written to.
        entity: EntityId,
        /// The component kind.
        component: KeywordId,
    },

    /// Set of a component the entity does not have.
    #[error("component {component:?} absent on {entity:?}")]
    PayloadAbsent {
        /// The entity written to.
        entity: EntityId,
        /// The component kind.
        component: KeywordId,
    },

    /// Link operation referenced an owner that does not exist.
    #[error("link owner {owner:?} does not exist (linked entity {linked:?})")]
    OwnerNotFound {
        /// The missing owner.
        owner: EntityId,
        /// The linked entity of the attempted link.
        linked: EntityId,
    },

    /// Linked entity carries no link list.
    #[error("{0:?} has no link list")]
    LinkListMissing(EntityId),

    /// No record for the owner in the linked entity's list.
    #[error("{linked:?} has no link record for owner {owner:?}")]
    LinkRecordNotFound {
        /// The owner looked up.
        owner: EntityId,
        /// The linked entity searched.
        linked: EntityId,
    },

    /// Owner-only lookup matched several records under composite identity.
    #[error("{count} link records for owner {owner:?} on {linked:?}; a payload kind is required")]
    AmbiguousLink {
        /// The owner looked up.
        owner: EntityId,
        /// The linked entity searched.
        linked: EntityId,
        /// Number of matching records.
        count: usize,
    },

    /// Same owner and payload kind registered twice under composite identity.
    #[error("owner {owner:?} already linked to {linked:?} through {component:?}")]
    DuplicateLink {
        /// The owner.
        owner: EntityId,
        /// The linked entity.
        linked: EntityId,
        /// The payload kind.
        component: KeywordId,
    },

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

/// Where an error was detected.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation that detected the error.
    pub operation: Option<&'static str>,
    /// Operations the error propagated through, innermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the originating operation.
    #[must_use]
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        self.operation = Some(operation);
        self
    }

    /// Adds a propagation frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(operation) = self.operation {
            write!(f, "in {operation}")?;
        }
        for frame in &self.stack {
            write!(f, " via {frame}")?;
        }
        Ok(())
    }
}
