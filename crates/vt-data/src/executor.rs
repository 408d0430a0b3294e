//! Generic query executor
//!
//! The single entry point every read operation funnels through. One call
//! issues two round trips against the injected backend: a count query (same
//! filters, no range) and a data query (filters + selection + sort + range).
//! Both use the same filter translation, so the envelope's totals can never
//! disagree with the page contents about which rows qualify.
//!
//! The two round trips are not atomic: a write landing between them can skew
//! `total` against the page by a row. Callers tolerate that drift.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use vt_core::{BackendConfig, PageParams, Paginated, VtError, VtResult};
use vt_queries::{Filters, JoinSpec};

use crate::backend::Backend;
use crate::request::SelectRequest;
use crate::structure::structure_rows;
use crate::translate::{apply_filters, apply_pagination};

/// Executes declarative queries against an injected [`Backend`].
#[derive(Clone)]
pub struct QueryExecutor {
    backend: Arc<dyn Backend>,
    timeout: Option<Duration>,
    default_limit: Option<i64>,
}

impl QueryExecutor {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            timeout: None,
            default_limit: None,
        }
    }

    /// Build an executor carrying a config's deadline and default page size.
    pub fn from_config(backend: Arc<dyn Backend>, config: &BackendConfig) -> Self {
        Self::new(backend)
            .with_timeout(config.request_timeout())
            .with_default_page_size(config.default_page_size)
    }

    /// Bound each backend round trip by a deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Page size applied when a caller supplies no `limit`.
    pub fn with_default_page_size(mut self, limit: i64) -> Self {
        self.default_limit = Some(limit.max(1));
        self
    }

    /// Fold the configured default page size into the caller's pagination:
    /// it fills a missing `limit` and stands in as first-page paging when no
    /// pagination is given at all. An explicit `limit` always wins.
    fn effective_pagination(&self, pagination: Option<&PageParams>) -> Option<PageParams> {
        match (pagination, self.default_limit) {
            (Some(params), Some(limit)) if params.limit.is_none() => Some(PageParams {
                limit: Some(limit),
                ..params.clone()
            }),
            (Some(params), _) => Some(params.clone()),
            (None, Some(limit)) => Some(PageParams::first(limit)),
            (None, None) => None,
        }
    }

    /// Query a resource with automatic join structuring.
    pub async fn query<T: DeserializeOwned>(
        &self,
        resource: &str,
        filters: Option<&Filters>,
        pagination: Option<&PageParams>,
        joins: Option<&JoinSpec>,
    ) -> VtResult<Paginated<T>> {
        self.query_data(resource, filters, pagination, joins, true)
            .await
    }

    /// Query a resource.
    ///
    /// `auto_structure` controls whether rows with embedded relations are
    /// normalized so every relation reads as a collection; callers that
    /// already know their join shape may pass `false` to receive the
    /// backend's raw nesting.
    #[instrument(skip(self, filters, pagination, joins))]
    pub async fn query_data<T: DeserializeOwned>(
        &self,
        resource: &str,
        filters: Option<&Filters>,
        pagination: Option<&PageParams>,
        joins: Option<&JoinSpec>,
        auto_structure: bool,
    ) -> VtResult<Paginated<T>> {
        if let Some(joins) = joins {
            joins.validate()?;
        }
        let pagination = self.effective_pagination(pagination);

        // Count round trip: same filters, no selection or range.
        let count_request = apply_filters(SelectRequest::new(resource), filters)?;
        let total = self
            .bounded(resource, self.backend.count(&count_request))
            .await?;

        // Data round trip.
        let mut data_request = apply_filters(SelectRequest::new(resource), filters)?;
        if let Some(joins) = joins {
            data_request = data_request.select(joins.clone());
        }
        data_request = apply_pagination(data_request, pagination.as_ref());

        let rows = self
            .bounded(resource, self.backend.fetch(&data_request))
            .await?;
        debug!(rows = rows.len(), total, "fetched raw rows");

        let has_embeds = joins.is_some_and(JoinSpec::has_embeds);
        let rows = if auto_structure && has_embeds {
            structure_rows(rows)
        } else {
            rows
        };

        let data = decode_rows(rows)?;
        let params = pagination.unwrap_or_default();

        Ok(Paginated::new(
            data,
            total,
            params.resolved_page(),
            params.resolved_limit(),
        ))
    }

    async fn bounded<T>(
        &self,
        resource: &str,
        operation: impl std::future::Future<Output = VtResult<T>>,
    ) -> VtResult<T> {
        match self.timeout {
            Some(deadline) => tokio::time::timeout(deadline, operation)
                .await
                .map_err(|_| VtError::Timeout {
                    resource: resource.to_string(),
                    seconds: deadline.as_secs(),
                })?,
            None => operation.await,
        }
    }
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<JsonValue>) -> VtResult<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(|e| VtError::Decode(e.to_string())))
        .collect()
}
