//! # vt-queries
//!
//! Declarative query model for the VT platform data layer.
//!
//! A caller describes *what* it wants — filter conditions, a multi-column
//! text search, sort criteria, pagination, related tables to embed — as plain
//! values from this crate, and hands them to the executor in `vt-data`. No
//! type here talks to a backend.
//!
//! ## Structure
//!
//! - `filters` - Filter conditions, operators, search, and the composite model
//! - `sorts` - Sort criteria and directions
//! - `joins` - Related-table embedding vocabulary
//!
//! ## Example
//!
//! ```
//! use vt_queries::{Filters, FilterCondition, Search};
//!
//! let filters = Filters::new()
//!     .with_condition(FilterCondition::eq("area_id", 5))
//!     .with_search(Search::over(["title", "address"], "park"))
//!     .sorted_by_desc("created_at");
//!
//! assert_eq!(filters.conditions.len(), 1);
//! assert!(filters.search.is_some());
//! ```

pub mod filters;
pub mod joins;
pub mod sorts;

// Re-exports for convenience
pub use filters::{FilterCondition, FilterOperator, FilterValue, Filters, Search};
pub use joins::{JoinDescriptor, JoinSpec};
pub use sorts::{SortCriterion, SortDirection, SortOrder};
