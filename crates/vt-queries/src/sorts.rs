//! Query sort orders
//!
//! Sort criteria are applied in sequence: later criteria refine ties left by
//! earlier ones.

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Some(Self::Asc),
            "desc" | "descending" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, Self::Asc)
    }

    pub fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

/// A single sort criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// The column to sort by
    pub column: String,
    /// The sort direction
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(column: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column: column.into(),
            direction,
        }
    }

    /// Create ascending sort
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Asc)
    }

    /// Create descending sort
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, SortDirection::Desc)
    }
}

/// Ordered collection of sort criteria
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortOrder {
    criteria: Vec<SortCriterion>,
}

impl SortOrder {
    pub fn new() -> Self {
        Self { criteria: vec![] }
    }

    /// Create with ascending sort on a single column
    pub fn by_asc(column: impl Into<String>) -> Self {
        Self {
            criteria: vec![SortCriterion::asc(column)],
        }
    }

    /// Create with descending sort on a single column
    pub fn by_desc(column: impl Into<String>) -> Self {
        Self {
            criteria: vec![SortCriterion::desc(column)],
        }
    }

    /// Add a criterion (builder pattern)
    pub fn then(mut self, criterion: SortCriterion) -> Self {
        self.criteria.push(criterion);
        self
    }

    /// Add an ascending criterion (builder pattern)
    pub fn then_asc(self, column: impl Into<String>) -> Self {
        self.then(SortCriterion::asc(column))
    }

    /// Add a descending criterion (builder pattern)
    pub fn then_desc(self, column: impl Into<String>) -> Self {
        self.then(SortCriterion::desc(column))
    }

    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }
}
