//! Test fixtures
//!
//! Factory functions for creating test data with sensible defaults.
//! Each fixture function creates a valid entity that can be customized.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::entities::{City, Country, Gender, Group, Role, User, UserRole};

use super::mocks::MemoryStore;

/// Create a committed country
pub fn test_country(id: i32, name: &str) -> Country {
    Country {
        id,
        guid: Uuid::from_u128(id as u128),
        country_name: name.to_string(),
    }
}

/// Create a committed city
pub fn test_city(id: i32, name: &str, country_id: i32) -> City {
    City {
        id,
        guid: Uuid::from_u128(1_000 + id as u128),
        city_name: name.to_string(),
        country_id,
    }
}

/// Create an active user registered on 2024-01-15
pub fn test_user(id: i32, user_name: &str) -> User {
    User {
        id,
        guid: Uuid::from_u128(2_000 + id as u128),
        user_name: user_name.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        gender: Gender::Woman,
        birth_date: None,
        registration_date: date(2024, 1, 15),
        score: 3.5,
        is_active: true,
        address: None,
        country_id: None,
        city_id: None,
        group_id: None,
    }
}

pub fn test_group(id: i32, title: &str) -> Group {
    Group {
        id,
        guid: Uuid::from_u128(3_000 + id as u128),
        title: title.to_string(),
    }
}

pub fn test_role(id: i32, name: &str) -> Role {
    Role {
        id,
        guid: Uuid::from_u128(4_000 + id as u128),
        name: name.to_string(),
    }
}

/// Grant role `role_id` to user `user_id`
pub fn test_user_role(id: i32, user_id: i32, role_id: i32) -> UserRole {
    UserRole {
        id,
        guid: Uuid::from_u128(5_000 + id as u128),
        user_id,
        role_id,
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Türkiye (Ankara, İzmir), Germany (Berlin), Iceland (no cities)
pub fn seeded_store() -> MemoryStore {
    MemoryStore::new()
        .with_country(test_country(1, "Türkiye"))
        .with_country(test_country(2, "Germany"))
        .with_country(test_country(3, "Iceland"))
        .with_city(test_city(1, "Ankara", 1))
        .with_city(test_city(2, "Berlin", 2))
        .with_city(test_city(3, "İzmir", 1))
}
