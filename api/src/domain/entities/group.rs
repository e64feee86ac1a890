//! User group entity

use serde::Serialize;
use uuid::Uuid;

use super::record::Record;

/// A named set of users; each user belongs to at most one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub id: i32,
    pub guid: Uuid,
    pub title: String,
}

impl Group {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: 0,
            guid: Uuid::nil(),
            title: title.into(),
        }
    }
}

impl Record for Group {
    const ENTITY: &'static str = "Group";

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
        Some(&self.title)
    }
}
