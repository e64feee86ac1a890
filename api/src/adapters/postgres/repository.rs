//! Generic PostgreSQL repository
//!
//! Reads go straight to the table; keyed lookups become a filtered SELECT.
//! Mutations are staged in the unit of work's `ChangeSet` and applied inside
//! one transaction on `persist`.

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DatabaseTransaction, DbErr, QueryResult, SqlErr,
    Statement, TransactionTrait,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::mapping::TableMapping;
use crate::domain::ports::{
    overlay_matching, ChangeSet, Lookup, Repository, StagedChange, TrackingMode,
};
use crate::error::DomainError;
use crate::query::{ensure_active, Query, RecordSource};

fn db_error(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => DomainError::Validation(detail),
        _ => match e {
            DbErr::RecordNotFound(what) => DomainError::NotFound(what),
            e => DomainError::Database(e.to_string()),
        },
    }
}

struct TableSource<E> {
    db: DatabaseConnection,
    _record: PhantomData<fn() -> E>,
}

#[async_trait]
impl<E: TableMapping> RecordSource<E> for TableSource<E> {
    async fn load(&self, _cancel: &CancellationToken) -> Result<Vec<E>, DomainError> {
        E::load_all(&self.db).await.map_err(db_error)
    }
}

/// PostgreSQL implementation of `Repository<E>`, one per unit of work
pub struct PostgresRepository<E> {
    db: DatabaseConnection,
    changes: ChangeSet<E>,
}

impl<E: TableMapping> PostgresRepository<E> {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            changes: ChangeSet::new(),
        }
    }

    fn source(&self) -> TableSource<E> {
        TableSource {
            db: self.db.clone(),
            _record: PhantomData,
        }
    }

    async fn sequence_query(&self, sql: String) -> Result<QueryResult, DomainError> {
        let backend = self.db.get_database_backend();
        self.db
            .query_one(Statement::from_string(backend, sql))
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::Internal(format!("no id sequence for {}", E::TABLE)))
    }

    /// Take the next value of the table's id sequence
    async fn reserve_id(&self) -> Result<i32, DomainError> {
        let row = self
            .sequence_query(format!(
                "SELECT nextval(pg_get_serial_sequence('{}', 'id')) AS id",
                E::TABLE
            ))
            .await?;

        let id: i64 = row.try_get("", "id").map_err(db_error)?;
        i32::try_from(id)
            .map_err(|_| DomainError::Internal(format!("{} id sequence exhausted", E::TABLE)))
    }

    async fn apply(
        txn: &DatabaseTransaction,
        changes: &[StagedChange<E>],
        cancel: &CancellationToken,
    ) -> Result<(), DomainError> {
        for change in changes {
            ensure_active(cancel)?;
            match change.clone() {
                StagedChange::Insert(record) => record.insert(txn).await,
                StagedChange::Update(record) => record.update(txn).await,
                StagedChange::Delete(record) => record.delete(txn).await,
            }
            .map_err(db_error)?;
        }
        ensure_active(cancel)
    }

    async fn commit(
        &self,
        changes: &[StagedChange<E>],
        cancel: &CancellationToken,
    ) -> Result<(), DomainError> {
        let txn = self.db.begin().await.map_err(db_error)?;

        if let Err(e) = Self::apply(&txn, changes, cancel).await {
            txn.rollback().await.map_err(db_error)?;
            return Err(e);
        }

        txn.commit().await.map_err(db_error)
    }
}

#[async_trait]
impl<E: TableMapping> Repository<E> for PostgresRepository<E> {
    fn query(&self, mode: TrackingMode) -> Query<E> {
        match mode {
            TrackingMode::NoTracking => Query::from_source(self.source()),
            TrackingMode::Tracking => self.changes.tracked(self.source()),
        }
    }

    async fn create(&self, mut record: E) -> Result<E, DomainError> {
        let id = self.reserve_id().await?;
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

    async fn lookup(
        &self,
        lookup: Lookup,
        mode: TrackingMode,
        cancel: &CancellationToken,
    ) -> Result<Vec<E>, DomainError> {
        ensure_active(cancel)?;
        let committed = E::load_matching(&self.db, &lookup)
            .await
            .map_err(db_error)?;
        ensure_active(cancel)?;

        Ok(match mode {
            TrackingMode::NoTracking => committed,
            TrackingMode::Tracking => {
                overlay_matching(committed, &self.changes.snapshot().await, &lookup)
            }
        })
    }

    async fn restart_ids(&self, cancel: &CancellationToken) -> Result<(), DomainError> {
        ensure_active(cancel)?;
        self.sequence_query(format!(
            "SELECT setval(pg_get_serial_sequence('{table}', 'id'), \
             COALESCE((SELECT MAX(id) FROM {table}), 0) + 1, false)",
            table = E::TABLE
        ))
        .await?;
        tracing::debug!(table = E::TABLE, "Restarted id sequence");
        Ok(())
    }

    async fn persist(&self, cancel: &CancellationToken) -> Result<usize, DomainError> {
        ensure_active(cancel)?;
        let changes = self.changes.take().await;
        if changes.is_empty() {
            return Ok(0);
        }

        match self.commit(&changes, cancel).await {
            Ok(()) => {
                tracing::debug!(table = E::TABLE, applied = changes.len(), "Persisted changes");
                Ok(changes.len())
            }
            Err(e) => {
                self.changes.restore(changes).await;
                Err(e)
            }
        }
    }
}
