//! Test utilities
//!
//! Manual mock implementations and test fixtures for unit testing.
//!
//! Why manual mocks instead of mockall?
//! - The record store needs real staging and commit behavior, not canned returns
//! - Manual mocks are more explicit and easier to debug
//!
//! The router is generic over `RecordStore` and `LocationsClient`, so
//! transport tests run against these doubles through axum-test.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
