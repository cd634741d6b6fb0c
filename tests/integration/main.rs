//! Cross-layer integration tests
//!
//! Tests complete link lifecycles across storage and engine, plus property
//! tests over random link/unlink/destroy sequences.

mod properties;
