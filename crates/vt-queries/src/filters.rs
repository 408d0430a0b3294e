//! Query filters
//!
//! Filters are the building blocks of read queries. Each condition names a
//! column, an operator, and a value; conditions combine with AND semantics.
//! A [`Search`] adds an OR-group of case-insensitive substring matches across
//! several columns, ANDed with the conditions.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use vt_core::{VtError, VtResult};

use crate::sorts::{SortCriterion, SortOrder};

/// Filter operators the backend understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    /// Equals
    Eq,
    /// Not equals
    Neq,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Case-sensitive pattern match (`%` wildcards)
    Like,
    /// Case-insensitive pattern match (`%` wildcards)
    Ilike,
    /// Set membership
    In,
    /// Null/boolean identity test (SQL `IS`)
    Is,
    /// Negated identity test (SQL `IS NOT`)
    Not,
}

impl FilterOperator {
    /// Parse an operator tag. Unknown tags are a caller error, not a silently
    /// dropped predicate.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "ilike" => Some(Self::Ilike),
            "in" => Some(Self::In),
            "is" => Some(Self::Is),
            "not" => Some(Self::Not),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::In => "in",
            Self::Is => "is",
            Self::Not => "not",
        }
    }

    /// Whether a value of the given shape fits this operator.
    pub fn accepts(&self, value: &FilterValue) -> bool {
        match self {
            Self::Eq | Self::Neq => !matches!(value, FilterValue::List(_) | FilterValue::Null),
            Self::Gt | Self::Gte | Self::Lt | Self::Lte => matches!(
                value,
                FilterValue::Int(_) | FilterValue::Float(_) | FilterValue::Str(_)
            ),
            Self::Like | Self::Ilike => matches!(value, FilterValue::Str(_)),
            Self::In => matches!(value, FilterValue::List(_)),
            Self::Is | Self::Not => matches!(value, FilterValue::Null | FilterValue::Bool(_)),
        }
    }
}

/// Filter value shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<FilterValue>),
}

impl FilterValue {
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Int(n) => JsonValue::from(*n),
            Self::Float(f) => JsonValue::from(*f),
            Self::Str(s) => JsonValue::from(s.clone()),
            Self::List(values) => JsonValue::Array(values.iter().map(Self::to_json).collect()),
        }
    }

    /// Render as a backend literal (unquoted).
    pub fn render(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(n) => n.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Str(s) => s.clone(),
            Self::List(values) => values
                .iter()
                .map(Self::render)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for FilterValue {
    fn from(n: i32) -> Self {
        Self::Int(n as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl<V: Into<FilterValue>> From<Vec<V>> for FilterValue {
    fn from(values: Vec<V>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// A single filter condition on one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// The column being filtered
    pub column: String,
    /// The operator to apply
    pub operator: FilterOperator,
    /// The value to compare against
    pub value: FilterValue,
}

impl FilterCondition {
    pub fn new(
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Create an equals condition
    pub fn eq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(column, FilterOperator::Eq, value)
    }

    /// Create a not-equals condition
    pub fn neq(column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(column, FilterOperator::Neq, value)
    }

    /// Create a case-insensitive pattern condition
    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Ilike, pattern.into())
    }

    /// Create a set-membership condition
    pub fn within(column: impl Into<String>, values: impl Into<FilterValue>) -> Self {
        Self::new(column, FilterOperator::In, values)
    }

    /// Create an is-null condition
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Is, FilterValue::Null)
    }

    /// Create an is-not-null condition
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::new(column, FilterOperator::Not, FilterValue::Null)
    }

    /// Check that the value shape fits the operator.
    pub fn validate(&self) -> VtResult<()> {
        if self.column.is_empty() {
            return Err(VtError::InvalidFilter(
                "condition has an empty column name".to_string(),
            ));
        }
        if !self.operator.accepts(&self.value) {
            return Err(VtError::InvalidFilter(format!(
                "operator `{}` does not accept value {:?} (column `{}`)",
                self.operator.as_str(),
                self.value,
                self.column
            )));
        }
        Ok(())
    }
}

/// Multi-column text search: a row matches when *any* listed column contains
/// the query as a case-insensitive substring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Search {
    pub columns: Vec<String>,
    pub query: String,
}

impl Search {
    pub fn over<I, S>(columns: I, query: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            query: query.into(),
        }
    }

    /// An empty query or empty column list matches everything; callers may
    /// skip translation entirely.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() || self.columns.is_empty()
    }
}

/// The composite query intent: conditions (AND), optional search (internal
/// OR), and sort criteria applied after filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,

    #[serde(default)]
    pub sort: SortOrder,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<Search>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition (builder pattern)
    pub fn with_condition(mut self, condition: FilterCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Set the text search (builder pattern)
    pub fn with_search(mut self, search: Search) -> Self {
        self.search = Some(search);
        self
    }

    /// Append an ascending sort criterion
    pub fn sorted_by(mut self, column: impl Into<String>) -> Self {
        self.sort = self.sort.then(SortCriterion::asc(column));
        self
    }

    /// Append a descending sort criterion
    pub fn sorted_by_desc(mut self, column: impl Into<String>) -> Self {
        self.sort = self.sort.then(SortCriterion::desc(column));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
            && self.sort.is_empty()
            && self.search.as_ref().map_or(true, Search::is_empty)
    }

    /// Validate every condition's operator/value pairing.
    pub fn validate(&self) -> VtResult<()> {
        for condition in &self.conditions {
            condition.validate()?;
        }
        Ok(())
    }
}
