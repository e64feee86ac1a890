//! Adapters layer
//!
//! Implementations of port traits for external systems.

pub mod locations;
pub mod postgres;

pub use locations::HttpLocationsClient;
pub use postgres::{ensure_schema, PostgresStore};
