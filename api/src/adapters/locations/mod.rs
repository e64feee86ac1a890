//! Locations adapter
//!
//! HTTP client for the external Countries and Cities APIs.

pub mod client;

pub use client::HttpLocationsClient;
