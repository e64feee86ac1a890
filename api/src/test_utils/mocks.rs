//! Mock implementations of port traits
//!
//! These are in-memory implementations that can be configured for testing.
//! They store data in memory and allow tests to verify behavior.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::entities::{City, Country, Group, Record, Role, User, UserRole};
use crate::domain::ports::{
    ChangeSet, CityRef, CountryRef, LocationsClient, RecordStore, Repository,
    StagedChange, TrackingMode,
};
use crate::error::{DomainError, LocationsError};
use crate::query::{ensure_active, Query, RecordSource};

// ============================================================================
// In-Memory Record Store
// ============================================================================

/// Committed rows of one record type, shared by every unit of work
pub struct MemoryTable<E> {
    rows: Arc<RwLock<BTreeMap<i32, E>>>,
    next_id: Arc<AtomicI32>,
    loads: Arc<AtomicUsize>,
    failing: Arc<AtomicBool>,
}

impl<E> Clone for MemoryTable<E> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
            next_id: self.next_id.clone(),
            loads: self.loads.clone(),
            failing: self.failing.clone(),
        }
    }
}

impl<E> Default for MemoryTable<E> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI32::new(1)),
            loads: Arc::new(AtomicUsize::new(0)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl<E: Record> MemoryTable<E> {
    /// Insert a committed row directly, keeping the id sequence ahead of it
    pub fn seed(&self, record: E) {
        self.next_id.fetch_max(record.id() + 1, Ordering::SeqCst);
        self.rows.write().unwrap().insert(record.id(), record);
    }

    /// Committed rows in id order
    pub fn rows(&self) -> Vec<E> {
        self.rows.read().unwrap().values().cloned().collect()
    }

    /// Number of times a query has loaded this table
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Make every subsequent load and persist fail with a database fault
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DomainError::Database(format!(
                "{} table unavailable",
                E::ENTITY
            )))
        } else {
            Ok(())
        }
    }

    /// Apply staged changes to a copy of the rows, then swap it in
    fn commit(
        &self,
        changes: &[StagedChange<E>],
        cancel: &CancellationToken,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        let mut rows = self.rows.read().unwrap().clone();

        for change in changes {
            ensure_active(cancel)?;
            match change {
                StagedChange::Insert(record) => {
                    rows.insert(record.id(), record.clone());
                }
                StagedChange::Update(record) | StagedChange::Delete(record)
                    if !rows.contains_key(&record.id()) =>
                {
                    return Err(DomainError::NotFound(format!(
                        "{} {}",
                        E::ENTITY,
                        record.id()
                    )));
                }
                StagedChange::Update(record) => {
                    rows.insert(record.id(), record.clone());
                }
                StagedChange::Delete(record) => {
                    rows.remove(&record.id());
                }
            }
        }

        ensure_active(cancel)?;
        *self.rows.write().unwrap() = rows;
        Ok(())
    }
}

struct CommittedRows<E>(MemoryTable<E>);

#[async_trait]
impl<E: Record> RecordSource<E> for CommittedRows<E> {
    async fn load(&self, _cancel: &CancellationToken) -> Result<Vec<E>, DomainError> {
        self.0.loads.fetch_add(1, Ordering::SeqCst);
        self.0.check_available()?;
        Ok(self.0.rows())
    }
}

/// One unit of work over a `MemoryTable`
pub struct MemoryRepository<E> {
    table: MemoryTable<E>,
    changes: ChangeSet<E>,
}

impl<E: Record> MemoryRepository<E> {
    pub fn new(table: MemoryTable<E>) -> Self {
        Self {
            table,
            changes: ChangeSet::new(),
        }
    }
}

#[async_trait]
impl<E: Record> Repository<E> for MemoryRepository<E> {
    fn query(&self, mode: TrackingMode) -> Query<E> {
        let committed = CommittedRows(self.table.clone());
        match mode {
            TrackingMode::NoTracking => Query::from_source(committed),
            TrackingMode::Tracking => self.changes.tracked(committed),
        }
    }

    async fn create(&self, mut record: E) -> Result<E, DomainError> {
        let id = self.table.next_id.fetch_add(1, Ordering::SeqCst);
        record.assign_identity(id, Uuid::new_v4());
        self.changes
            .stage(StagedChange::Insert(record.clone()))
            .await;
        Ok(record)
    }

    async fn update(&self, record: E) -> Result<(), DomainError> {
        self.changes.stage(StagedChange::Update(record)).await;
        Ok(())
    }

    async fn delete(&self, record: E) -> Result<(), DomainError> {
        self.changes.stage(StagedChange::Delete(record)).await;
        Ok(())
    }

    async fn restart_ids(&self, cancel: &CancellationToken) -> Result<(), DomainError> {
        ensure_active(cancel)?;
        self.table.check_available()?;
        let highest = self.table.rows.read().unwrap().keys().max().copied();
        self.table
            .next_id
            .store(highest.unwrap_or(0) + 1, Ordering::SeqCst);
        Ok(())
    }

    async fn persist(&self, cancel: &CancellationToken) -> Result<usize, DomainError> {
        ensure_active(cancel)?;
        let changes = self.changes.take().await;
        let applied = changes.len();

        match self.table.commit(&changes, cancel) {
            Ok(()) => Ok(applied),
            Err(e) => {
                self.changes.restore(changes).await;
                Err(e)
            }
        }
    }
}

/// In-memory `RecordStore`
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub countries: MemoryTable<Country>,
    pub cities: MemoryTable<City>,
    pub users: MemoryTable<User>,
    pub groups: MemoryTable<Group>,
    pub roles: MemoryTable<Role>,
    pub user_roles: MemoryTable<UserRole>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with a committed country
    pub fn with_country(self, country: Country) -> Self {
        self.countries.seed(country);
        self
    }

    /// Pre-populate with a committed city
    pub fn with_city(self, city: City) -> Self {
        self.cities.seed(city);
        self
    }

    /// Pre-populate with a committed user
    pub fn with_user(self, user: User) -> Self {
        self.users.seed(user);
        self
    }

    pub fn with_group(self, group: Group) -> Self {
        self.groups.seed(group);
        self
    }

    pub fn with_role(self, role: Role) -> Self {
        self.roles.seed(role);
        self
    }

    pub fn with_user_role(self, user_role: UserRole) -> Self {
        self.user_roles.seed(user_role);
        self
    }
}

impl RecordStore for MemoryStore {
    type Countries = MemoryRepository<Country>;
    type Cities = MemoryRepository<City>;
    type Users = MemoryRepository<User>;
    type Groups = MemoryRepository<Group>;
    type Roles = MemoryRepository<Role>;
    type UserRoles = MemoryRepository<UserRole>;

    fn countries(&self) -> Self::Countries {
        MemoryRepository::new(self.countries.clone())
    }

    fn cities(&self) -> Self::Cities {
        MemoryRepository::new(self.cities.clone())
    }

    fn users(&self) -> Self::Users {
        MemoryRepository::new(self.users.clone())
    }

    fn groups(&self) -> Self::Groups {
        MemoryRepository::new(self.groups.clone())
    }

    fn roles(&self) -> Self::Roles {
        MemoryRepository::new(self.roles.clone())
    }

    fn user_roles(&self) -> Self::UserRoles {
        MemoryRepository::new(self.user_roles.clone())
    }
}

// ============================================================================
// Mock Locations API Client
// ============================================================================

/// A call received by `MockLocationsClient`
#[derive(Debug, Clone, PartialEq)]
pub struct LocationsCall {
    pub url: String,
    pub credential: Option<String>,
}

#[derive(Default)]
pub struct MockLocationsClient {
    countries: Arc<RwLock<Vec<CountryRef>>>,
    cities: Arc<RwLock<Vec<CityRef>>>,
    calls: Arc<RwLock<Vec<LocationsCall>>>,
    failing: Arc<AtomicBool>,
}

impl MockLocationsClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_country(self, id: i32, name: &str) -> Self {
        self.countries.write().unwrap().push(CountryRef {
            id,
            country_name: Some(name.to_string()),
        });
        self
    }

    pub fn with_city(self, id: i32, name: &str) -> Self {
        self.cities.write().unwrap().push(CityRef {
            id,
            city_name: Some(name.to_string()),
        });
        self
    }

    /// Answer every call with a 500
    pub fn failing(self) -> Self {
        self.failing.store(true, Ordering::SeqCst);
        self
    }

    /// Calls received so far, in order
    pub fn calls(&self) -> Vec<LocationsCall> {
        self.calls.read().unwrap().clone()
    }

    fn record(&self, url: &str, credential: Option<&str>) -> Result<(), LocationsError> {
        self.calls.write().unwrap().push(LocationsCall {
            url: url.to_string(),
            credential: credential.map(str::to_string),
        });
        if self.failing.load(Ordering::SeqCst) {
            return Err(LocationsError::Api {
                status: 500,
                message: "mock failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LocationsClient for MockLocationsClient {
    async fn countries(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<CountryRef>, LocationsError> {
        self.record(url, credential)?;
        Ok(self.countries.read().unwrap().clone())
    }

    async fn cities(
        &self,
        url: &str,
        credential: Option<&str>,
    ) -> Result<Vec<CityRef>, LocationsError> {
        self.record(url, credential)?;
        Ok(self.cities.read().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Lookup;
    use crate::test_utils::{seeded_store, test_city, test_country};

    #[tokio::test]
    async fn staged_changes_are_invisible_until_persist() {
        let store = MemoryStore::new().with_country(test_country(1, "Türkiye"));
        let repo = store.countries();
        let cancel = CancellationToken::new();

        let created = repo.create(Country::new("Germany")).await.unwrap();
        assert_eq!(created.id, 2);
        assert!(!created.guid.is_nil());

        let other = store.countries();
        assert_eq!(
            other.query(TrackingMode::NoTracking).count(&cancel).await.unwrap(),
            1
        );
        assert_eq!(
            repo.query(TrackingMode::Tracking).count(&cancel).await.unwrap(),
            2
        );

        assert_eq!(repo.persist(&cancel).await.unwrap(), 1);
        assert_eq!(store.countries.rows().len(), 2);
    }

    #[tokio::test]
    async fn cancelled_persist_leaves_store_unchanged() {
        let store = MemoryStore::new().with_country(test_country(1, "Türkiye"));
        let repo = store.countries();
        repo.create(Country::new("Germany")).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        assert!(matches!(
            repo.persist(&cancel).await,
            Err(DomainError::Cancelled)
        ));
        assert_eq!(store.countries.rows().len(), 1);
    }

    #[tokio::test]
    async fn failed_persist_applies_nothing() {
        let store = MemoryStore::new().with_country(test_country(1, "Türkiye"));
        let repo = store.countries();
        repo.create(Country::new("Germany")).await.unwrap();
        repo.delete(test_country(99, "Missing")).await.unwrap();

        let cancel = CancellationToken::new();
        assert!(matches!(
            repo.persist(&cancel).await,
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(store.countries.rows(), vec![test_country(1, "Türkiye")]);
    }

    #[tokio::test]
    async fn tracked_lookup_sees_staged_parent_change() {
        let store = seeded_store();
        let cities = store.cities();
        let cancel = CancellationToken::new();
        cities.update(test_city(2, "Berlin", 1)).await.unwrap();

        let tracked = cities
            .lookup(Lookup::Parent(1), TrackingMode::Tracking, &cancel)
            .await
            .unwrap();
        let committed = cities
            .lookup(Lookup::Parent(1), TrackingMode::NoTracking, &cancel)
            .await
            .unwrap();

        assert_eq!(tracked.len(), 3);
        assert_eq!(committed.len(), 2);
    }

    #[tokio::test]
    async fn restart_ids_follows_highest_committed_row() {
        let store = seeded_store();
        let cancel = CancellationToken::new();
        let cities = store.cities();
        cities.delete(test_city(3, "İzmir", 1)).await.unwrap();
        cities.persist(&cancel).await.unwrap();

        cities.restart_ids(&cancel).await.unwrap();

        let created = cities.create(City::new("Adana", 1)).await.unwrap();
        assert_eq!(created.id, 3);
    }

    #[tokio::test]
    async fn failing_table_faults_queries() {
        let store = MemoryStore::new();
        store.cities.fail();
        let cancel = CancellationToken::new();

        assert!(matches!(
            store.cities().query(TrackingMode::NoTracking).count(&cancel).await,
            Err(DomainError::Database(_))
        ));
    }
}
