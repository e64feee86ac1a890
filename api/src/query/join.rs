//! Join sources
//!
//! Joins are sources like any other: both sides stay lazy until the joined
//! query is counted or materialized, then the left side is loaded first and
//! the right side second. Output follows left-side order, and within one
//! left row, right-side order.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::builder::{ensure_active, Query, RecordSource};
use crate::error::DomainError;

type KeyFn<V, K> = Arc<dyn Fn(&V) -> K + Send + Sync>;

enum Projection<L, R, T> {
    /// Rows without a right-side match are dropped
    Inner(Arc<dyn Fn(&L, &R) -> T + Send + Sync>),
    /// Rows without a right-side match are kept with `None`
    Left(Arc<dyn Fn(&L, Option<&R>) -> T + Send + Sync>),
}

struct JoinSource<L, R, K, T> {
    left: Query<L>,
    right: Query<R>,
    left_key: KeyFn<L, K>,
    right_key: KeyFn<R, K>,
    projection: Projection<L, R, T>,
}

#[async_trait]
impl<L, R, K, T> RecordSource<T> for JoinSource<L, R, K, T>
where
    L: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    K: Eq + Hash + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<T>, DomainError> {
        let left_rows = self.left.materialize(cancel).await?;
        ensure_active(cancel)?;
        let right_rows = self.right.materialize(cancel).await?;

        let by_key = index(&right_rows, self.right_key.as_ref());
        let mut joined = Vec::with_capacity(left_rows.len());

        for left in &left_rows {
            let matches = by_key.get(&(self.left_key)(left));
            match (&self.projection, matches) {
                (Projection::Inner(project), Some(rights)) => {
                    joined.extend(rights.iter().map(|right| project(left, right)));
                }
                (Projection::Left(project), Some(rights)) => {
                    joined.extend(rights.iter().map(|right| project(left, Some(right))));
                }
                (Projection::Left(project), None) => joined.push(project(left, None)),
                (Projection::Inner(_), None) => {}
            }
        }

        Ok(joined)
    }
}

struct GroupJoinSource<L, R, K, T> {
    left: Query<L>,
    right: Query<R>,
    left_key: KeyFn<L, K>,
    right_key: KeyFn<R, K>,
    project: Arc<dyn Fn(&L, &[&R]) -> T + Send + Sync>,
}

#[async_trait]
impl<L, R, K, T> RecordSource<T> for GroupJoinSource<L, R, K, T>
where
    L: Clone + Send + Sync + 'static,
    R: Clone + Send + Sync + 'static,
    K: Eq + Hash + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<T>, DomainError> {
        let left_rows = self.left.materialize(cancel).await?;
        ensure_active(cancel)?;
        let right_rows = self.right.materialize(cancel).await?;

        let by_key = index(&right_rows, self.right_key.as_ref());

        Ok(left_rows
            .iter()
            .map(|left| {
                let group = by_key
                    .get(&(self.left_key)(left))
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                (self.project)(left, group)
            })
            .collect())
    }
}

fn index<'a, R, K>(rows: &'a [R], key: &(dyn Fn(&R) -> K + Send + Sync)) -> HashMap<K, Vec<&'a R>>
where
    K: Eq + Hash,
{
    let mut by_key: HashMap<K, Vec<&R>> = HashMap::new();
    for row in rows {
        by_key.entry(key(row)).or_default().push(row);
    }
    by_key
}

impl<L> Query<L>
where
    L: Clone + Send + Sync + 'static,
{
    /// Pair rows from both sides with equal keys; unmatched rows on either
    /// side are dropped
    pub fn inner_join<R, K, T>(
        self,
        right: Query<R>,
        left_key: impl Fn(&L) -> K + Send + Sync + 'static,
        right_key: impl Fn(&R) -> K + Send + Sync + 'static,
        project: impl Fn(&L, &R) -> T + Send + Sync + 'static,
    ) -> Query<T>
    where
        R: Clone + Send + Sync + 'static,
        K: Eq + Hash + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        Query::from_source(JoinSource {
            left: self,
            right,
            left_key: Arc::new(left_key),
            right_key: Arc::new(right_key),
            projection: Projection::Inner(Arc::new(project)),
        })
    }

    /// Like `inner_join`, but every left row is kept; left rows without a
    /// match are projected once with `None`
    pub fn left_join<R, K, T>(
        self,
        right: Query<R>,
        left_key: impl Fn(&L) -> K + Send + Sync + 'static,
        right_key: impl Fn(&R) -> K + Send + Sync + 'static,
        project: impl Fn(&L, Option<&R>) -> T + Send + Sync + 'static,
    ) -> Query<T>
    where
        R: Clone + Send + Sync + 'static,
        K: Eq + Hash + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        Query::from_source(JoinSource {
            left: self,
            right,
            left_key: Arc::new(left_key),
            right_key: Arc::new(right_key),
            projection: Projection::Left(Arc::new(project)),
        })
    }

    /// One output row per left row, carrying all matching right rows
    pub fn group_join<R, K, T>(
        self,
        right: Query<R>,
        left_key: impl Fn(&L) -> K + Send + Sync + 'static,
        right_key: impl Fn(&R) -> K + Send + Sync + 'static,
        project: impl Fn(&L, &[&R]) -> T + Send + Sync + 'static,
    ) -> Query<T>
    where
        R: Clone + Send + Sync + 'static,
        K: Eq + Hash + Send + Sync + 'static,
        T: Clone + Send + Sync + 'static,
    {
        Query::from_source(GroupJoinSource {
            left: self,
            right,
            left_key: Arc::new(left_key),
            right_key: Arc::new(right_key),
            project: Arc::new(project),
        })
    }
}
