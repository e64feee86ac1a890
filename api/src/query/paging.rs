//! Paging contract

use serde::{Deserialize, Serialize};

/// Page parameters: `{ pageNumber (1-based), countPerPage, totalCount }`
///
/// `total_count` is output-only; it is filled by `Query::fetch_page` with the
/// size of the filtered set before the page window is applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    pub page_number: i32,
    pub count_per_page: i32,
    #[serde(skip_deserializing)]
    pub total_count: usize,
}

impl PageSpec {
    pub fn new(page_number: i32, count_per_page: i32) -> Self {
        Self {
            page_number,
            count_per_page,
            total_count: 0,
        }
    }

    /// Paging applies only when both page number and page size are positive
    pub fn is_paged(&self) -> bool {
        self.page_number > 0 && self.count_per_page > 0
    }

    pub(crate) fn window(&self) -> Option<PageWindow> {
        if !self.is_paged() {
            return None;
        }
        let take = self.count_per_page as usize;
        let skip = (self.page_number as usize - 1).saturating_mul(take);
        Some(PageWindow { skip, take })
    }

    pub fn with_total_count(self, total_count: usize) -> Self {
        Self {
            total_count,
            ..self
        }
    }
}

/// Implemented by requests that carry paging parameters
pub trait PageRequest {
    fn page_spec(&self) -> PageSpec;
}

/// Skip/take window derived from a `PageSpec`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub skip: usize,
    pub take: usize,
}

impl PageWindow {
    pub fn apply<T>(self, records: Vec<T>) -> Vec<T> {
        records.into_iter().skip(self.skip).take(self.take).collect()
    }
}

/// One materialized page plus the paging state it was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub paging: PageSpec,
}

impl<T> Page<T> {
    pub fn total_count(&self) -> usize {
        self.paging.total_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
