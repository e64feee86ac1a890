//! Dynamic ordering contract
//!
//! Requests name the property to order by as a string. Each response shape
//! declares a closed enum of orderable fields; names outside that allow-list
//! are ignored and the query keeps its default order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

impl Direction {
    pub fn from_descending(descending: bool) -> Self {
        if descending {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Requested ordering: `{ propertyName, descending }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSpec {
    pub property_name: String,
    pub descending: bool,
}

impl OrderSpec {
    pub fn new(property_name: impl Into<String>, descending: bool) -> Self {
        Self {
            property_name: property_name.into(),
            descending,
        }
    }

    pub fn direction(&self) -> Direction {
        Direction::from_descending(self.descending)
    }
}

/// Implemented by requests that carry dynamic ordering parameters
pub trait OrderRequest {
    fn order_spec(&self) -> OrderSpec;
}

/// Closed allow-list of orderable fields for a response shape `T`
pub trait OrderableField<T>: Sized + Copy + Send + Sync + 'static {
    /// Resolve a requested property name; unknown names yield `None`
    fn from_name(name: &str) -> Option<Self>;

    /// Ascending comparison of two rows by this field
    fn compare(self, a: &T, b: &T) -> Ordering;
}
