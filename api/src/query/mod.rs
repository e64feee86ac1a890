//! Query composition
//!
//! A `Query<T>` accumulates stages (source, predicates, order keys, page
//! window) without touching the store. Only the terminal operations
//! `count`, `materialize` and `fetch_page` load records, and all of them read
//! through the same filtered, unpaged stage.
//!
//! - `builder`: the `Query` builder and the `RecordSource` port it reads from
//! - `filter`: optional text filter semantics
//! - `ordering`: dynamic ordering contract and allow-listed fields
//! - `paging`: page request contract and page windows
//! - `join`: inner, left and group join sources

pub mod builder;
pub mod filter;
pub mod join;
pub mod ordering;
pub mod paging;

pub use builder::{ensure_active, Query, RecordSource};
pub use ordering::{Direction, OrderRequest, OrderSpec, OrderableField};
pub use paging::{Page, PageRequest, PageSpec};
