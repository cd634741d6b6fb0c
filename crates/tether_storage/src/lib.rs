//! Entity-component storage, link lists, and deferred commands for Tether.
//!
//! This crate provides:
//! - [`EntityStore`] - Generational entity allocation with a pending-cleanup state
//! - [`ComponentStore`] - Schema-validated component storage with archetypes
//! - [`LinkList`] / [`LinkRecord`] - The per-entity list of links pointing at owners
//! - [`Query`] - Include/exclude component selection
//! - [`CommandBuffer`] - Recorded mutations applied at a later playback point
//! - [`World`] - The store facade, cheap to snapshot

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod component;
pub mod entity;
pub mod link;
pub mod query;
pub mod schema;
pub mod world;

pub use command::{Command, CommandBuffer};
pub use component::{Archetype, ComponentStore};
pub use entity::{EntityState, EntityStore};
pub use link::{LinkIdentity, LinkKey, LinkList, LinkRecord};
pub use query::{Lifecycle, Query};
pub use schema::{ComponentSchema, FieldSchema};
pub use world::World;
