//! # vt-data
//!
//! Generic query execution against the VT platform's hosted relational
//! backend.
//!
//! Every read screen in the platform funnels through one entry point,
//! [`QueryExecutor::query_data`]: it translates a declarative
//! [`Filters`](vt_queries::Filters) model and [`PageParams`](vt_core::PageParams)
//! into a backend request, issues a count round trip and a data round trip,
//! normalizes embedded relations into uniform collections, and returns a
//! [`Paginated`](vt_core::Paginated) envelope.
//!
//! ## Structure
//!
//! - `request` - The backend-agnostic chainable query handle
//! - `translate` - Pure translation of the query model onto a handle
//! - `backend` - The injected backend capability trait
//! - `postgrest` - HTTP adapter for a PostgREST-style hosted backend
//! - `memory` - In-memory backend for tests and fixtures
//! - `structure` - Join-result structurer
//! - `executor` - The generic query entry point

pub mod backend;
pub mod executor;
pub mod memory;
pub mod postgrest;
pub mod request;
pub mod structure;
pub mod translate;

// Re-exports for convenience
pub use backend::Backend;
pub use executor::QueryExecutor;
pub use memory::MemoryBackend;
pub use postgrest::PostgrestBackend;
pub use request::{Predicate, SelectRequest};
pub use structure::structure_rows;
pub use translate::{apply_filters, apply_pagination};
