//! Integration tests for Layer 2: Engine
//!
//! Tests for the link registry, effect sinks, and maintenance passes.

mod common;
mod deferred;
mod registry;
