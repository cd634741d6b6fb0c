//! Type descriptors for payload fields.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::entity::EntityId;
use crate::value::Value;

/// Type descriptor used by component schemas.
#[derive(Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Type {
    /// The nil type.
    Nil,
    /// Boolean.
    Bool,
    /// 64-bit signed integer.
    Int,
    /// 64-bit float.
    Float,
    /// String.
    String,
    /// Keyword.
    Keyword,
    /// Entity reference.
    EntityRef,
    /// Nested record of keyword fields.
    Record,
    /// Value or nil.
    Option(Box<Type>),
    /// Accepts any value.
    Any,
}

impl Type {
    /// Creates an optional type.
    #[must_use]
    pub fn option(inner: Type) -> Self {
        Self::Option(Box::new(inner))
    }

    /// Checks whether a value of type `value_type` fits a field of this type.
    ///
    /// `Float` also accepts `Int`.
    #[must_use]
    pub fn accepts(&self, value_type: &Type) -> bool {
        match (self, value_type) {
            (Self::Any, _)
            | (Self::Nil, Self::Nil)
            | (Self::Bool, Self::Bool)
            | (Self::Int | Self::Float, Self::Int)
            | (Self::Float, Self::Float)
            | (Self::String, Self::String)
            | (Self::Keyword, Self::Keyword)
            | (Self::EntityRef, Self::EntityRef)
            | (Self::Record, Self::Record) => true,
            (Self::Option(_), Self::Nil) => true,
            (Self::Option(inner), other) => inner.accepts(other),
            _ => false,
        }
    }

    /// The neutral value of this type.
    ///
    /// Fields without a declared default take this value when a payload is
    /// reset: zero, false, the empty string, the null entity, or nil.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            Self::Bool => Value::Bool(false),
            Self::Int => Value::Int(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String("".into()),
            Self::EntityRef => Value::EntityRef(EntityId::null()),
            Self::Record => Value::empty_record(),
            Self::Nil | Self::Keyword | Self::Option(_) | Self::Any => Value::Nil,
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => write!(f, "nil"),
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Keyword => write!(f, "keyword"),
            Self::EntityRef => write!(f, "entity-ref"),
            Self::Record => write!(f, "record"),
            Self::Option(t) => write!(f, "option<{t:?}>"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
