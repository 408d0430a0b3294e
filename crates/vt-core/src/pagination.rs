//! Pagination parameters and the paginated result envelope
//!
//! Every generic read operation accepts [`PageParams`] and returns a
//! [`Paginated`] envelope carrying both the page of rows and the paging
//! metadata derived from the total count.

use serde::{Deserialize, Serialize};

/// Pagination parameters supplied by a caller.
///
/// `offset`, when present, takes precedence over the page-derived offset.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Page number (1-indexed)
    pub page: Option<i64>,

    /// Items per page
    pub limit: Option<i64>,

    /// Offset (alternative to page)
    pub offset: Option<i64>,
}

impl PageParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: Some(page.max(1)),
            limit: Some(limit.clamp(1, 1000)),
            offset: None,
        }
    }

    /// First page with the given page size.
    pub fn first(limit: i64) -> Self {
        Self::new(1, limit)
    }

    /// Explicit offset/limit addressing.
    pub fn with_offset(offset: i64, limit: i64) -> Self {
        Self {
            page: None,
            limit: Some(limit.clamp(1, 1000)),
            offset: Some(offset.max(0)),
        }
    }

    /// The effective page number (1-indexed, default 1).
    pub fn resolved_page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// The effective page size (default 10).
    pub fn resolved_limit(&self) -> i64 {
        self.limit.unwrap_or(10).max(1)
    }

    /// The effective row offset.
    pub fn resolved_offset(&self) -> i64 {
        self.offset
            .unwrap_or_else(|| (self.resolved_page() - 1) * self.resolved_limit())
    }

    /// The inclusive row range `[start, end]` this page addresses.
    pub fn range(&self) -> (i64, i64) {
        let start = self.resolved_offset();
        (start, start + self.resolved_limit() - 1)
    }
}

/// Paginated result envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// The page of rows, at most `limit` entries
    pub data: Vec<T>,

    /// Total row count across all pages
    pub total: i64,

    /// Current page number (1-indexed)
    pub page: i64,

    /// Page size used for the query
    pub limit: i64,

    /// Total number of pages
    pub total_pages: i64,

    /// Whether a later page exists
    pub has_next_page: bool,

    /// Whether an earlier page exists
    pub has_previous_page: bool,
}

impl<T> Paginated<T> {
    /// Build the envelope, deriving `total_pages` and the navigation flags.
    pub fn new(data: Vec<T>, total: i64, page: i64, limit: i64) -> Self {
        let limit = limit.max(1);
        let total_pages = (total + limit - 1) / limit;

        Self {
            data,
            total,
            page,
            limit,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        }
    }

    /// Map the row type while keeping the paging metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
            has_next_page: self.has_next_page,
            has_previous_page: self.has_previous_page,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
