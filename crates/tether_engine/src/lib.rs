//! Link registry and lifecycle maintenance for Tether.
//!
//! This crate provides:
//! - [`LinkRegistry`] - Establishing and severing owner/linked-entity links
//! - [`EffectSink`] - Apply-now ([`Immediate`]) or record-for-later ([`Deferred`]) mutation
//! - [`LinkConfig`] - Contract validation and record identity settings
//! - [`TagLinkedEntities`] / [`UnlinkOnDestroy`] - The two maintenance passes
//! - [`TickExecutor`] - Runs the passes once per tick

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod lifecycle;
pub mod registry;
pub mod sink;
pub mod tick;

pub use config::{LinkConfig, ValidationMode};
pub use lifecycle::{MaintenancePass, PassReport, TagLinkedEntities, UnlinkOnDestroy};
pub use registry::{LinkListHandle, LinkRegistry};
pub use sink::{Deferred, EffectSink, Immediate};
pub use tick::{TickExecutor, TickReport};
