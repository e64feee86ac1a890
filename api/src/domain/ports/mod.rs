//! Domain ports (traits)
//!
//! Port traits define interfaces that the domain layer requires.
//! Adapters provide concrete implementations of these traits.

pub mod locations;
pub mod repositories;

pub use locations::{CityRef, CountryRef, LocationsClient};
pub use repositories::{
    overlay_matching, ChangeSet, Lookup, RecordStore, Repository, StagedChange, TrackingMode,
};
