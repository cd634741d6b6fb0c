//! Core types, values, and errors for Tether.
//!
//! This crate provides:
//! - [`EntityId`] - Generational entity identifiers
//! - [`KeywordId`] / [`Interner`] - Interned component kind names
//! - [`Value`] - Dynamic payload values attached to entities
//! - [`Type`] - Field type descriptors for schema validation
//! - [`Error`] - Error types carrying entity and operation context
//! - [`LtMap`] - Persistent map used for payload records

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod entity;
pub mod error;
pub mod intern;
pub mod types;
pub mod value;

pub use collections::LtMap;
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind};
pub use intern::{Interner, KeywordId};
pub use types::Type;
pub use value::Value;

/// Result type alias using Tether's [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
