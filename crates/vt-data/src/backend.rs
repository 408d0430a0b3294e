//! The backend capability seam
//!
//! The executor never talks to a concrete backend; it is handed a
//! [`Backend`] at construction. Production code injects the PostgREST
//! adapter, tests inject [`MemoryBackend`](crate::MemoryBackend) or a mock.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use vt_core::VtResult;

use crate::request::SelectRequest;

/// A backend capable of executing a [`SelectRequest`].
///
/// Implementations report failures as `VtError::Backend` carrying the
/// resource name from the request.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute the request and return the matching rows as JSON documents.
    async fn fetch(&self, request: &SelectRequest) -> VtResult<Vec<JsonValue>>;

    /// Count the rows matching the request's predicates and OR-groups,
    /// ignoring its ordering and range.
    async fn count(&self, request: &SelectRequest) -> VtResult<i64>;
}
