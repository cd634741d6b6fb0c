//! Dynamic payload values.

use std::fmt;
use std::sync::Arc;

use crate::collections::LtMap;
use crate::entity::EntityId;
use crate::intern::KeywordId;
use crate::types::Type;

/// Value stored in a component.
///
/// Tag components hold `Bool(true)`; data components hold a `Record` of
/// keyword fields. Cloning is O(1).
#[derive(Clone)]
pub enum Value {
    /// Absence of a value.
    Nil,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float.
    Float(f64),
    /// String.
    String(Arc<str>),
    /// Keyword.
    Keyword(KeywordId),
    /// Entity reference.
    EntityRef(EntityId),
    /// Record of keyword fields.
    Record(LtMap<KeywordId, Value>),
}

impl Value {
    /// Creates a record with no fields.
    #[must_use]
    pub fn empty_record() -> Self {
        Self::Record(LtMap::new())
    }

    /// Creates a record from field/value pairs.
    #[must_use]
    pub fn record(fields: impl IntoIterator<Item = (KeywordId, Value)>) -> Self {
        Self::Record(fields.into_iter().collect())
    }

    /// Returns the type of this value.
    #[must_use]
    pub fn value_type(&self) -> Type {
        match self {
            Self::Nil => Type::Nil,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::String(_) => Type::String,
            Self::Keyword(_) => Type::Keyword,
            Self::EntityRef(_) => Type::EntityRef,
            Self::Record(_) => Type::Record,
        }
    }

    /// Returns true if this value is nil.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Attempts to extract an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Attempts to extract an entity reference.
    #[must_use]
    pub const fn as_entity(&self) -> Option<EntityId> {
        match self {
            Self::EntityRef(id) => Some(*id),
            _ => None,
        }
    }

    /// Attempts to extract a record.
    #[must_use]
    pub const fn as_record(&self) -> Option<&LtMap<KeywordId, Value>> {
        match self {
            Self::Record(fields) => Some(fields),
            _ => None,
        }
    }

    /// Reads a field of a record value.
    #[must_use]
    pub fn field(&self, name: KeywordId) -> Option<&Value> {
        self.as_record()?.get(&name)
    }

    /// Returns a copy of this record with one field replaced.
    ///
    /// Non-record values are returned unchanged.
    #[must_use]
    pub fn with_field(&self, name: KeywordId, value: Value) -> Self {
        match self {
            Self::Record(fields) => Self::Record(fields.insert(name, value)),
            other => other.clone(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Keyword(a), Self::Keyword(b)) => a == b,
            (Self::EntityRef(a), Self::EntityRef(b)) => a == b,
            (Self::Record(a), Self::Record(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Keyword(id) => write!(f, ":{}", id.index()),
            Self::EntityRef(id) => write!(f, "{id:?}"),
            Self::Record(fields) => write!(f, "{fields:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<EntityId> for Value {
    fn from(id: EntityId) -> Self {
        Self::EntityRef(id)
    }
}
