//! Country domain entity

use serde::Serialize;
use uuid::Uuid;

use super::record::{Named, Record};

/// Maximum length of a country name
pub const COUNTRY_NAME_MAX_LEN: usize = 125;

/// A country; owns many cities through `City::country_id`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Country {
    pub id: i32,
    pub guid: Uuid,
    pub country_name: String,
}

impl Country {
    /// A not-yet-staged country; identity is assigned by the repository
    pub fn new(country_name: impl Into<String>) -> Self {
        Self {
            id: 0,
            guid: Uuid::nil(),
            country_name: country_name.into(),
        }
    }
}

impl Record for Country {
    const ENTITY: &'static str = "Country";

    fn id(&self) -> i32 {
        self.id
    }

    fn guid(&self) -> Uuid {
        self.guid
    }

    fn assign_identity(&mut self, id: i32, guid: Uuid) {
        self.id = id;
        self.guid = guid;
    }

    fn lookup_name(&self) -> Option<&str> {
        Some(&self.country_name)
    }
}

impl Named for Country {}
