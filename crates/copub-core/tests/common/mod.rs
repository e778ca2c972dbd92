//! Shared helpers for copub-core integration tests

#[allow(dead_code)]
pub mod fake_source;
pub mod fixtures;
