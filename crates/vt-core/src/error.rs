//! Core error types for the VT platform data layer

use thiserror::Error;

/// Error type shared by the query and data crates.
#[derive(Error, Debug)]
pub enum VtError {
    /// The hosted backend rejected a count or data round trip.
    #[error("failed to query {resource}: {message}")]
    Backend { resource: String, message: String },

    /// A filter condition's value shape does not fit its operator.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// A join descriptor is missing required fields or is malformed.
    #[error("invalid join: {0}")]
    InvalidJoin(String),

    /// A row could not be decoded into the caller's type.
    #[error("failed to decode row: {0}")]
    Decode(String),

    /// A backend round trip exceeded the configured deadline.
    #[error("query against {resource} timed out after {seconds}s")]
    Timeout { resource: String, seconds: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl VtError {
    /// Wrap a backend failure with the resource it was issued against.
    pub fn backend(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            resource: resource.into(),
            message: message.into(),
        }
    }
}

/// Standard Result type for VT platform operations
pub type VtResult<T> = Result<T, VtError>;
