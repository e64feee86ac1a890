//! User domain entity
//!
//! Users are read-only in this service apart from seeding; their country
//! and city are foreign ids owned by the Locations service and resolved
//! through enrichment. Group and roles live alongside users.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::Record;

/// User gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Woman,
    Man,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Woman => write!(f, "Woman"),
            Gender::Man => write!(f, "Man"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "woman" => Ok(Gender::Woman),
            "man" => Ok(Gender::Man),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i32,
    pub guid: Uuid,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub birth_date: Option<NaiveDate>,
    pub registration_date: NaiveDate,
    pub score: f64,
    pub is_active: bool,
    pub address: Option<String>,
    pub country_id: Option<i32>,
    pub city_id: Option<i32>,
    pub group_id: Option<i32>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Record for User {
    const ENTITY: &'static str = "User";

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
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_display() {
        assert_eq!(Gender::Woman.to_string(), "Woman");
        assert_eq!(Gender::Man.to_string(), "Man");
    }

    #[test]
    fn gender_from_str() {
        assert_eq!("woman".parse::<Gender>().unwrap(), Gender::Woman);
        assert_eq!("MAN".parse::<Gender>().unwrap(), Gender::Man);
        assert!("other".parse::<Gender>().is_err());
    }
}
