//! Lazy query builder
//!
//! Stage order is fixed regardless of call order: load → filter → (count) →
//! sort → page. Building a query never performs I/O.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::filter::text_filter;
use super::ordering::{Direction, OrderSpec, OrderableField};
use super::paging::{Page, PageSpec};
use crate::error::DomainError;

type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Where a query's rows come from
///
/// Repositories, projections and joins all implement this. `load` is the only
/// place a query touches the store.
#[async_trait]
pub trait RecordSource<T>: Send + Sync {
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<T>, DomainError>;
}

/// Fail fast with `DomainError::Cancelled` once the token has fired
pub fn ensure_active(cancel: &CancellationToken) -> Result<(), DomainError> {
    if cancel.is_cancelled() {
        Err(DomainError::Cancelled)
    } else {
        Ok(())
    }
}

/// A lazily evaluated, composable query over rows of type `T`
pub struct Query<T> {
    source: Arc<dyn RecordSource<T>>,
    predicates: Vec<Predicate<T>>,
    order: Vec<Comparator<T>>,
    paging: PageSpec,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            predicates: self.predicates.clone(),
            order: self.order.clone(),
            paging: self.paging,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("predicates", &self.predicates.len())
            .field("order_keys", &self.order.len())
            .field("paging", &self.paging)
            .finish()
    }
}

impl<T> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn from_source(source: impl RecordSource<T> + 'static) -> Self {
        Self {
            source: Arc::new(source),
            predicates: Vec::new(),
            order: Vec::new(),
            paging: PageSpec::default(),
        }
    }

    /// A query over rows already in memory
    pub fn from_records(records: Vec<T>) -> Self {
        Self::from_source(StaticSource(Arc::new(records)))
    }

    /// Keep only rows matching the predicate
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicates.push(Arc::new(predicate));
        self
    }

    /// Case-sensitive substring filter, skipped when `input` is blank
    pub fn filter_contains(self, input: Option<&str>, field: fn(&T) -> &str) -> Self {
        match text_filter(input) {
            Some(needle) => self.filter(move |row| field(row).contains(needle.as_str())),
            None => self,
        }
    }

    /// Like `filter_contains` for fields that may be missing (outer-join
    /// columns); a missing value is matched as the empty string
    pub fn filter_contains_nullable(
        self,
        input: Option<&str>,
        field: fn(&T) -> Option<&str>,
    ) -> Self {
        match text_filter(input) {
            Some(needle) => {
                self.filter(move |row| field(row).unwrap_or("").contains(needle.as_str()))
            }
            None => self,
        }
    }

    /// Replace the whole ordering with a single comparator
    pub fn order_by(
        mut self,
        compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.order = vec![Arc::new(compare)];
        self
    }

    /// Add a tie-breaker after the existing ordering
    pub fn then_by(
        mut self,
        compare: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.order.push(Arc::new(compare));
        self
    }

    pub fn order_by_key<K: Ord>(
        self,
        key: impl Fn(&T) -> K + Send + Sync + 'static,
        direction: Direction,
    ) -> Self {
        self.order_by(move |a, b| direction.apply(key(a).cmp(&key(b))))
    }

    pub fn then_by_key<K: Ord>(
        self,
        key: impl Fn(&T) -> K + Send + Sync + 'static,
        direction: Direction,
    ) -> Self {
        self.then_by(move |a, b| direction.apply(key(a).cmp(&key(b))))
    }

    /// Apply a requested ordering if it names an allow-listed field of `F`;
    /// otherwise the current (default) ordering stands
    pub fn order_by_field<F: OrderableField<T>>(self, spec: &OrderSpec) -> Self {
        match F::from_name(&spec.property_name) {
            Some(field) => {
                let direction = spec.direction();
                self.order_by(move |a, b| direction.apply(field.compare(a, b)))
            }
            None => self,
        }
    }

    /// Set the page window; a non-positive page number or size disables paging
    pub fn page(mut self, spec: &PageSpec) -> Self {
        self.paging = PageSpec::new(spec.page_number, spec.count_per_page);
        self
    }

    /// Project every row into another shape
    pub fn map<U>(self, project: impl Fn(T) -> U + Send + Sync + 'static) -> Query<U>
    where
        U: Clone + Send + Sync + 'static,
    {
        Query::from_source(MappedSource {
            inner: self,
            project: Arc::new(project),
        })
    }

    /// Number of rows after filtering, ignoring any page window
    pub async fn count(&self, cancel: &CancellationToken) -> Result<usize, DomainError> {
        Ok(self.filtered(cancel).await?.len())
    }

    pub async fn any(&self, cancel: &CancellationToken) -> Result<bool, DomainError> {
        Ok(self.count(cancel).await? > 0)
    }

    /// Filtered, ordered and paged rows
    pub async fn materialize(&self, cancel: &CancellationToken) -> Result<Vec<T>, DomainError> {
        let mut rows = self.filtered(cancel).await?;
        self.sort(&mut rows);
        Ok(self.apply_window(rows))
    }

    pub async fn first(&self, cancel: &CancellationToken) -> Result<Option<T>, DomainError> {
        Ok(self.materialize(cancel).await?.into_iter().next())
    }

    /// One load producing both the page and the unpaged total count
    pub async fn fetch_page(&self, cancel: &CancellationToken) -> Result<Page<T>, DomainError> {
        let mut rows = self.filtered(cancel).await?;
        let total_count = rows.len();
        self.sort(&mut rows);
        Ok(Page {
            items: self.apply_window(rows),
            paging: self.paging.with_total_count(total_count),
        })
    }

    /// The page parameters this query was built with
    pub fn paging(&self) -> PageSpec {
        self.paging
    }

    async fn filtered(&self, cancel: &CancellationToken) -> Result<Vec<T>, DomainError> {
        ensure_active(cancel)?;
        let rows = self.source.load(cancel).await?;
        ensure_active(cancel)?;
        Ok(rows.into_iter().filter(|row| self.matches(row)).collect())
    }

    fn apply_window(&self, rows: Vec<T>) -> Vec<T> {
        match self.paging.window() {
            Some(window) => window.apply(rows),
            None => rows,
        }
    }

    fn matches(&self, row: &T) -> bool {
        self.predicates.iter().all(|predicate| predicate(row))
    }

    fn sort(&self, rows: &mut [T]) {
        if self.order.is_empty() {
            return;
        }
        // stable: rows equal under every key keep their load order
        rows.sort_by(|a, b| {
            self.order
                .iter()
                .map(|compare| compare(a, b))
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }
}

#[async_trait]
impl<T> RecordSource<T> for Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<T>, DomainError> {
        self.materialize(cancel).await
    }
}

struct StaticSource<T>(Arc<Vec<T>>);

#[async_trait]
impl<T> RecordSource<T> for StaticSource<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn load(&self, _cancel: &CancellationToken) -> Result<Vec<T>, DomainError> {
        Ok(self.0.as_ref().clone())
    }
}

struct MappedSource<T, U> {
    inner: Query<T>,
    project: Arc<dyn Fn(T) -> U + Send + Sync>,
}

#[async_trait]
impl<T, U> RecordSource<U> for MappedSource<T, U>
where
    T: Clone + Send + Sync + 'static,
    U: Send + Sync + 'static,
{
    async fn load(&self, cancel: &CancellationToken) -> Result<Vec<U>, DomainError> {
        let rows = self.inner.materialize(cancel).await?;
        Ok(rows.into_iter().map(|row| (self.project)(row)).collect())
    }
}
