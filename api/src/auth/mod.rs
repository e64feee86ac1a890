//! Inbound credential handling

pub mod bearer;

pub use bearer::BearerCredential;
