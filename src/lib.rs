//! Tether - Bidirectional link registry for entity-component worlds
//!
//! An owner entity carries a payload because of a linked entity. When the
//! link is severed, or the linked entity is destroyed, the payload is
//! stripped or reset. This crate re-exports all layers for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: tether_engine     — Link registry, effect sinks, maintenance passes
//! Layer 1: tether_storage    — Entity-component storage, link lists, commands
//! Layer 0: tether_foundation — Core types (Value, EntityId, Error)
//! ```

pub use tether_engine as engine;
pub use tether_foundation as foundation;
pub use tether_storage as storage;
