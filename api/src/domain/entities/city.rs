//! City domain entity

use serde::Serialize;
use uuid::Uuid;

use super::record::{Named, Record};

/// Maximum length of a city name
pub const CITY_NAME_MAX_LEN: usize = 175;

/// A city belonging to one country
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub id: i32,
    pub guid: Uuid,
    pub city_name: String,
    pub country_id: i32,
}

impl City {
    pub fn new(city_name: impl Into<String>, country_id: i32) -> Self {
        Self {
            id: 0,
            guid: Uuid::nil(),
            city_name: city_name.into(),
            country_id,
        }
    }
}

impl Record for City {
    const ENTITY: &'static str = "City";

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
        Some(&self.city_name)
    }

    fn parent_id(&self) -> Option<i32> {
        Some(self.country_id)
    }
}

impl Named for City {}
