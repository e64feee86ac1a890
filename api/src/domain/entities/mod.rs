//! Domain entities
//!
//! Pure domain models for the records this service persists.
//! These are separate from the SeaORM models in `adapters::postgres::entity`.

pub mod city;
pub mod country;
pub mod group;
pub mod record;
pub mod role;
pub mod user;

pub use city::{City, CITY_NAME_MAX_LEN};
pub use country::{Country, COUNTRY_NAME_MAX_LEN};
pub use group::Group;
pub use record::{normalize_name, Named, Record};
pub use role::{Role, UserRole};
pub use user::{Gender, User};
