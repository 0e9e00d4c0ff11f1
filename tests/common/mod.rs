//! Common test utilities for soundcomparisons integration tests

#[allow(dead_code)]
pub mod fixtures;
#[allow(dead_code)]
pub mod repo;

#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use repo::*;
