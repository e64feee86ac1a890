//! Database seeding
//!
//! Resets the location and user tables to a fixed sample data set. Each table
//! is cleared and refilled through its repository: children are emptied
//! before their parents, and parents are committed before their children.
//! Id sequences restart once a table is empty, so the sample ids are stable.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::command::RequestHandler;
use crate::domain::entities::{City, Country, Gender, Group, Record, Role, User, UserRole};
use crate::domain::ports::{RecordStore, Repository, TrackingMode};
use crate::error::{AppError, DomainError};

pub const SEED_SUCCESSFUL: &str = "Database seed successful.";

/// Replace all countries and cities with the sample set
#[derive(Debug, Clone, Default)]
pub struct LocationSeedRequest;

/// Replace all users, groups and roles with the sample set
#[derive(Debug, Clone, Default)]
pub struct UserSeedRequest;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    /// Rows deleted across all seeded tables
    pub removed: usize,
    /// Rows inserted across all seeded tables
    pub added: usize,
}

const TURKIYE_CITIES: &[&str] = &[
    "Adana", "Adıyaman", "Afyonkarahisar", "Ağrı", "Amasya", "Ankara", "Antalya", "Artvin",
    "Aydın", "Balıkesir", "Bilecik", "Bingöl", "Bitlis", "Bolu", "Burdur", "Bursa", "Çanakkale",
    "Çankırı", "Çorum", "Denizli", "Diyarbakır", "Edirne", "Elazığ", "Erzincan", "Erzurum",
    "Eskişehir", "Gaziantep", "Giresun", "Gümüşhane", "Hakkari", "Hatay", "Isparta", "Mersin",
    "İstanbul", "İzmir", "Kars", "Kastamonu", "Kayseri", "Kırklareli", "Kırşehir", "Kocaeli",
    "Konya", "Kütahya", "Malatya", "Manisa", "Kahramanmaraş", "Mardin", "Muğla", "Muş", "Nevşehir",
    "Niğde", "Ordu", "Rize", "Sakarya", "Samsun", "Siirt", "Sinop", "Sivas", "Tekirdağ", "Tokat",
    "Trabzon", "Tunceli", "Şanlıurfa", "Uşak", "Van", "Yozgat", "Zonguldak", "Aksaray", "Bayburt",
    "Karaman", "Kırıkkale", "Batman", "Şırnak", "Bartın", "Ardahan", "Iğdır", "Yalova", "Karabük",
    "Kilis", "Osmaniye", "Düzce",
];

const USA_CITIES: &[&str] = &[
    "New York", "Los Angeles", "Chicago", "Houston", "Phoenix", "Philadelphia", "San Antonio",
    "San Diego", "Dallas", "San Jose", "Austin", "Jacksonville", "Fort Worth", "Columbus",
    "Charlotte", "San Francisco", "Indianapolis", "Seattle", "Denver", "Washington", "Boston",
    "El Paso", "Nashville", "Detroit", "Oklahoma City", "Portland", "Las Vegas", "Memphis",
    "Louisville", "Baltimore", "Milwaukee", "Albuquerque", "Tucson", "Fresno", "Mesa",
    "Sacramento", "Atlanta", "Kansas City", "Colorado Springs", "Miami", "Raleigh", "Omaha",
    "Long Beach", "Virginia Beach", "Oakland", "Minneapolis", "Tulsa", "Arlington", "New Orleans",
];

const SAMPLE_LOCATIONS: &[(&str, &[&str])] = &[
    ("Türkiye", TURKIYE_CITIES),
    ("United States of America", USA_CITIES),
    ("China", &[]),
];

/// Delete every committed row; returns how many were removed
async fn clear<E, R>(repository: &R, cancel: &CancellationToken) -> Result<usize, DomainError>
where
    E: Record,
    R: Repository<E> + ?Sized,
{
    let rows = repository
        .query(TrackingMode::NoTracking)
        .materialize(cancel)
        .await?;
    for row in rows {
        repository.delete(row).await?;
    }
    let removed = repository.persist(cancel).await?;
    repository.restart_ids(cancel).await?;
    Ok(removed)
}

/// An active sample user living in city 1, registered today
fn sample_user(user_name: &str, first_name: &str, last_name: &str, group_id: i32) -> User {
    User {
        id: 0,
        guid: Uuid::nil(),
        user_name: user_name.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        gender: Gender::Woman,
        birth_date: None,
        registration_date: Utc::now().date_naive(),
        score: 0.0,
        is_active: true,
        address: None,
        country_id: None,
        city_id: Some(1),
        group_id: Some(group_id),
    }
}

pub struct SeedService<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> SeedService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<LocationSeedRequest> for SeedService<S> {
    type Output = SeedResponse;

    async fn handle(
        &self,
        _request: LocationSeedRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let countries = self.store.countries();
        let cities = self.store.cities();

        let removed = clear(&cities, cancel).await? + clear(&countries, cancel).await?;

        for (country_name, city_names) in SAMPLE_LOCATIONS {
            let country = countries.create(Country::new(*country_name)).await?;
            for city_name in city_names.iter() {
                cities.create(City::new(*city_name, country.id)).await?;
            }
        }
        let added = countries.persist(cancel).await? + cities.persist(cancel).await?;

        tracing::info!(removed, added, "Seeded locations");
        Ok(SeedResponse {
            message: SEED_SUCCESSFUL.to_string(),
            removed,
            added,
        })
    }
}

#[async_trait]
impl<S: RecordStore> RequestHandler<UserSeedRequest> for SeedService<S> {
    type Output = SeedResponse;

    async fn handle(
        &self,
        _request: UserSeedRequest,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, AppError> {
        let user_roles = self.store.user_roles();
        let users = self.store.users();
        let roles = self.store.roles();
        let groups = self.store.groups();

        let removed = clear(&user_roles, cancel).await?
            + clear(&users, cancel).await?
            + clear(&roles, cancel).await?
            + clear(&groups, cancel).await?;

        let admin_role = roles.create(Role::new("Admin")).await?;
        let user_role = roles.create(Role::new("User")).await?;
        let general = groups.create(Group::new("General")).await?;

        let admin = users
            .create(User {
                gender: Gender::Man,
                birth_date: NaiveDate::from_ymd_opt(1980, 8, 21),
                score: 3.8,
                address: Some("Çankaya".to_string()),
                country_id: Some(1),
                ..sample_user("admin", "Çağıl", "Alsaç", general.id)
            })
            .await?;
        let luna = users
            .create(User {
                birth_date: NaiveDate::from_ymd_opt(2004, 9, 13),
                score: 4.7,
                country_id: Some(2),
                ..sample_user("user", "Luna", "Leo", general.id)
            })
            .await?;

        user_roles
            .create(UserRole::new(admin.id, admin_role.id))
            .await?;
        user_roles.create(UserRole::new(luna.id, user_role.id)).await?;

        let added = roles.persist(cancel).await?
            + groups.persist(cancel).await?
            + users.persist(cancel).await?
            + user_roles.persist(cancel).await?;

        tracing::info!(removed, added, "Seeded users");
        Ok(SeedResponse {
            message: SEED_SUCCESSFUL.to_string(),
            removed,
            added,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{UserQueryRequest, UserService};
    use crate::test_utils::{seeded_store, test_user, MemoryStore, MockLocationsClient};
    use std::sync::Arc;

    #[tokio::test]
    async fn location_seed_replaces_rows_and_restarts_ids() {
        let store = seeded_store();
        let cancel = CancellationToken::new();

        let response = SeedService::new(store.clone())
            .handle(LocationSeedRequest, &cancel)
            .await
            .unwrap();

        assert_eq!(response.message, SEED_SUCCESSFUL);
        assert_eq!(response.removed, 6);
        assert_eq!(response.added, 3 + 81 + 49);

        let countries = store.countries.rows();
        assert_eq!(countries[0].id, 1);
        assert_eq!(countries[0].country_name, "Türkiye");
        assert_eq!(countries[2].country_name, "China");

        let cities = store.cities.rows();
        assert_eq!(cities[0].id, 1);
        assert_eq!(cities[0].city_name, "Adana");
        let usa = countries[1].id;
        assert_eq!(cities.iter().filter(|c| c.country_id == usa).count(), 49);
    }

    #[tokio::test]
    async fn location_seed_is_repeatable() {
        let store = MemoryStore::new();
        let service = SeedService::new(store.clone());
        let cancel = CancellationToken::new();

        service.handle(LocationSeedRequest, &cancel).await.unwrap();
        let first: Vec<(i32, String)> = store
            .countries
            .rows()
            .into_iter()
            .map(|c| (c.id, c.country_name))
            .collect();
        let again = service.handle(LocationSeedRequest, &cancel).await.unwrap();

        assert_eq!(again.removed, 133);
        let second: Vec<(i32, String)> = store
            .countries
            .rows()
            .into_iter()
            .map(|c| (c.id, c.country_name))
            .collect();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn user_seed_links_group_and_roles() {
        let store = MemoryStore::new().with_user(test_user(7, "stale"));
        let cancel = CancellationToken::new();

        let response = SeedService::new(store.clone())
            .handle(UserSeedRequest, &cancel)
            .await
            .unwrap();
        assert_eq!(response.removed, 1);
        assert_eq!(response.added, 2 + 1 + 2 + 2);

        let users = UserService::new(store, Arc::new(MockLocationsClient::new()), None, None)
            .handle(UserQueryRequest, &cancel)
            .await
            .unwrap()
            .materialize(&cancel)
            .await
            .unwrap();

        let mut summary: Vec<(&str, Option<&str>, Vec<&str>)> = users
            .iter()
            .map(|u| {
                let roles = u.roles.iter().map(String::as_str).collect();
                (u.user_name.as_str(), u.group.as_deref(), roles)
            })
            .collect();
        summary.sort();
        assert_eq!(
            summary,
            vec![
                ("admin", Some("General"), vec!["Admin"]),
                ("user", Some("General"), vec!["User"]),
            ]
        );
        assert_eq!(users.iter().find(|u| u.user_name == "admin").unwrap().id, 1);
    }

    #[tokio::test]
    async fn cancelled_seed_changes_nothing() {
        let store = seeded_store();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = SeedService::new(store.clone())
            .handle(LocationSeedRequest, &cancel)
            .await;

        assert!(matches!(
            result,
            Err(AppError::Domain(DomainError::Cancelled))
        ));
        assert_eq!(store.countries.rows().len(), 3);
    }
}
