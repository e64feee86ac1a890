//! SeaORM entity models
//!
//! Table definitions for the records this service persists. `ensure_schema`
//! creates missing tables from these at startup.

pub mod cities;
pub mod countries;
pub mod groups;
pub mod roles;
pub mod user_roles;
pub mod users;
