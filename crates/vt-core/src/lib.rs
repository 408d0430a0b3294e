//! # vt-core
//!
//! Core types for the VT platform data layer.
//!
//! This crate provides the foundational building blocks used by the query and
//! data crates:
//! - Common error types and result aliases
//! - Pagination parameters and the paginated result envelope
//! - Backend configuration loaded from the environment

pub mod config;
pub mod error;
pub mod pagination;

pub use config::BackendConfig;
pub use error::{VtError, VtResult};
pub use pagination::{PageParams, Paginated};
