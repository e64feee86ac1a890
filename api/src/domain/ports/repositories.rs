//! Repository port traits
//!
//! One generic `Repository<E>` covers every record type. Mutations are
//! staged in a `ChangeSet` owned by the unit of work and only become visible
//! to other units of work once `persist` commits them as a single batch.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::domain::entities::{normalize_name, City, Country, Group, Record, Role, User, UserRole};
use crate::error::DomainError;
use crate::query::{Query, RecordSource};

/// Whether a query should see this unit of work's pending changes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackingMode {
    /// Committed state only
    #[default]
    NoTracking,
    /// Committed state overlaid with the changes staged on this repository
    Tracking,
}

/// A mutation waiting for `persist`
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange<E> {
    Insert(E),
    Update(E),
    Delete(E),
}

impl<E: Record> StagedChange<E> {
    pub fn record(&self) -> &E {
        match self {
            StagedChange::Insert(record)
            | StagedChange::Update(record)
            | StagedChange::Delete(record) => record,
        }
    }
}

/// Apply staged changes, in staging order, on top of committed rows
pub fn overlay<E: Record>(mut rows: Vec<E>, staged: &[StagedChange<E>]) -> Vec<E> {
    for change in staged {
        match change {
            StagedChange::Insert(record) => rows.push(record.clone()),
            StagedChange::Update(record) => {
                if let Some(row) = rows.iter_mut().find(|row| row.id() == record.id()) {
                    *row = record.clone();
                }
            }
            StagedChange::Delete(record) => rows.retain(|row| row.id() != record.id()),
        }
    }
    rows
}

/// A keyed read that adapters can answer from an index instead of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(i32),
    /// Normalized name, see `Lookup::name`
    Name(String),
    /// Records owned by the given parent id
    Parent(i32),
}

impl Lookup {
    /// Name lookup; matching ignores surrounding whitespace and case
    pub fn name(name: &str) -> Self {
        Lookup::Name(normalize_name(name))
    }

    pub fn matches<E: Record>(&self, record: &E) -> bool {
        match self {
            Lookup::Id(id) => record.id() == *id,
            Lookup::Name(name) => record
                .lookup_name()
                .is_some_and(|candidate| normalize_name(candidate) == *name),
            Lookup::Parent(id) => record.parent_id() == Some(*id),
        }
    }
}

/// Apply staged changes to the committed rows matching `lookup`
///
/// Unlike `overlay`, `committed` holds only the matching rows, so a staged
/// update can bring a row into the result or drop it out. Staged updates are
/// taken to target existing rows.
pub fn overlay_matching<E: Record>(
    mut rows: Vec<E>,
    staged: &[StagedChange<E>],
    lookup: &Lookup,
) -> Vec<E> {
    for change in staged {
        let record = change.record();
        let position = rows.iter().position(|row| row.id() == record.id());
        match (change, position) {
            (StagedChange::Delete(_), Some(index)) => {
                rows.remove(index);
            }
            (StagedChange::Delete(_), None) => {}
            (_, Some(index)) if lookup.matches(record) => rows[index] = record.clone(),
            (_, Some(index)) => {
                rows.remove(index);
            }
            (_, None) if lookup.matches(record) => rows.push(record.clone()),
            (_, None) => {}
        }
    }
    rows
}

/// Pending changes of one unit of work
///
/// Cloning shares the same pending list, so tracked queries built before a
/// mutation still see it when they are finally materialized.
#[derive(Debug)]
pub struct ChangeSet<E> {
    staged: Arc<Mutex<Vec<StagedChange<E>>>>,
}

impl<E> Clone for ChangeSet<E> {
    fn clone(&self) -> Self {
        Self {
            staged: Arc::clone(&self.staged),
        }
    }
}

impl<E> Default for ChangeSet<E> {
    fn default() -> Self {
        Self {
            staged: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E: Record> ChangeSet<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stage(&self, change: StagedChange<E>) {
        self.staged.lock().await.push(change);
    }

    pub async fn snapshot(&self) -> Vec<StagedChange<E>> {
        self.staged.lock().await.clone()
    }

    /// Remove and return everything staged so far
    pub async fn take(&self) -> Vec<StagedChange<E>> {
        std::mem::take(&mut *self.staged.lock().await)
    }

    /// Put changes back in front of anything staged since `take`
    pub async fn restore(&self, mut changes: Vec<StagedChange<E>>) {
        let mut staged = self.staged.lock().await;
        changes.append(&mut staged);
        *staged = changes;
    }

    /// A query source reading `committed` through this change set
    pub fn tracked(&self, committed: impl RecordSource<E> + 'static) -> Query<E> {
        Query::from_source(TrackedSource {
            committed: Box::new(committed),
            changes: self.clone(),
        })
    }
}

struct TrackedSource<E> {
    committed: Box<dyn RecordSource<E>>,
    changes: ChangeSet<E>,
}

#[async_trait]
impl<E: Record> RecordSource<E> for TrackedSource<E> {
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<E>, DomainError> {
        let rows = self.committed.load(cancel).await?;
        Ok(overlay(rows, &self.changes.snapshot().await))
    }
}

/// CRUD primitives over one record type, scoped to a unit of work
#[async_trait]
pub trait Repository<E: Record>: Send + Sync {
    /// A lazy query over the records; nothing is loaded until a terminal
    /// operation runs
    fn query(&self, mode: TrackingMode) -> Query<E>;

    /// Stage a new record, assigning its id and guid
    async fn create(&self, record: E) -> Result<E, DomainError>;

    /// Stage an in-place overwrite of an existing record
    async fn update(&self, record: E) -> Result<(), DomainError>;

    /// Stage removal of an existing record
    async fn delete(&self, record: E) -> Result<(), DomainError>;

    /// Commit every staged change atomically; returns how many were applied
    async fn persist(&self, cancel: &CancellationToken) -> Result<usize, DomainError>;

    /// Move the id sequence just past the highest committed id
    async fn restart_ids(&self, cancel: &CancellationToken) -> Result<(), DomainError>;

    /// Records matching `lookup`, in no particular order
    async fn lookup(
        &self,
        lookup: Lookup,
        mode: TrackingMode,
        cancel: &CancellationToken,
    ) -> Result<Vec<E>, DomainError> {
        self.query(mode)
            .filter(move |record| lookup.matches(record))
            .materialize(cancel)
            .await
    }

    /// Find a record by id
    async fn find(
        &self,
        id: i32,
        mode: TrackingMode,
        cancel: &CancellationToken,
    ) -> Result<Option<E>, DomainError> {
        Ok(self
            .lookup(Lookup::Id(id), mode, cancel)
            .await?
            .into_iter()
            .next())
    }
}

/// Hands out one fresh unit of work per call
///
/// Repositories returned from separate calls never share staged changes.
pub trait RecordStore: Clone + Send + Sync + 'static {
    type Countries: Repository<Country> + 'static;
    type Cities: Repository<City> + 'static;
    type Users: Repository<User> + 'static;
    type Groups: Repository<Group> + 'static;
    type Roles: Repository<Role> + 'static;
    type UserRoles: Repository<UserRole> + 'static;

    fn countries(&self) -> Self::Countries;

    fn cities(&self) -> Self::Cities;

    fn users(&self) -> Self::Users;

    fn groups(&self) -> Self::Groups;

    fn roles(&self) -> Self::Roles;

    fn user_roles(&self) -> Self::UserRoles;
}
