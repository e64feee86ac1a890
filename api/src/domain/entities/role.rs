//! Roles and the user ↔ role link

use serde::Serialize;
use uuid::Uuid;

use super::record::Record;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Role {
    pub id: i32,
    pub guid: Uuid,
    pub name: String,
}

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            guid: Uuid::nil(),
            name: name.into(),
        }
    }
}

impl Record for Role {
    const ENTITY: &'static str = "Role";

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
        Some(&self.name)
    }
}

/// Grants one role to one user; owned by the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRole {
    pub id: i32,
    pub guid: Uuid,
    pub user_id: i32,
    pub role_id: i32,
}

impl UserRole {
    pub fn new(user_id: i32, role_id: i32) -> Self {
        Self {
            id: 0,
            guid: Uuid::nil(),
            user_id,
            role_id,
        }
    }
}

impl Record for UserRole {
    const ENTITY: &'static str = "UserRole";

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

    fn parent_id(&self) -> Option<i32> {
        Some(self.user_id)
    }
}
