//! In-memory backend
//!
//! Holds JSON rows per table and evaluates [`SelectRequest`]s directly:
//! predicates, OR-search groups, multi-key ordering, row ranges, column
//! projection, and relation embedding. Used as the test double for the
//! executor and as a fixture backend in integration tests.
//!
//! Embedding semantics follow the hosted backend: a foreign-key value on the
//! primary row is matched against the related table's key column. No match
//! embeds `null`, exactly one match embeds the object, several matches embed
//! an array. When a join descriptor carries no `foreign_key`, the related
//! table's key column name is assumed to also be the foreign-key column on
//! the primary row.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value as JsonValue};
use vt_core::{VtError, VtResult};
use vt_queries::{FilterOperator, FilterValue, JoinDescriptor, JoinSpec, SortCriterion};

use crate::backend::Backend;
use crate::request::{OrGroup, Predicate, SelectRequest};

struct Table {
    key_column: String,
    rows: Vec<JsonValue>,
}

/// An in-memory table store implementing [`Backend`].
#[derive(Default)]
pub struct MemoryBackend {
    tables: HashMap<String, Table>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table with its key column and rows (builder pattern).
    pub fn with_table(
        mut self,
        name: impl Into<String>,
        key_column: impl Into<String>,
        rows: Vec<JsonValue>,
    ) -> Self {
        self.tables.insert(
            name.into(),
            Table {
                key_column: key_column.into(),
                rows,
            },
        );
        self
    }

    fn table(&self, resource: &str) -> VtResult<&Table> {
        self.tables
            .get(resource)
            .ok_or_else(|| VtError::backend(resource, "unknown resource"))
    }

    fn matching_rows(&self, request: &SelectRequest) -> VtResult<Vec<JsonValue>> {
        let table = self.table(request.resource())?;
        Ok(table
            .rows
            .iter()
            .filter(|row| {
                request
                    .predicates()
                    .iter()
                    .all(|predicate| eval_predicate(row, predicate))
                    && request
                        .or_groups()
                        .iter()
                        .all(|group| eval_or_group(row, group))
            })
            .cloned()
            .collect())
    }

    fn project(&self, resource: &str, row: JsonValue, selection: &JoinSpec) -> VtResult<JsonValue> {
        let fields = match row {
            JsonValue::Object(fields) => fields,
            other => return Ok(other),
        };

        let mut projected = match selection.columns.as_deref() {
            Some(columns) if columns != "*" => {
                let mut kept = JsonMap::new();
                for column in columns.split(',').map(str::trim) {
                    if let Some(value) = fields.get(column) {
                        kept.insert(column.to_string(), value.clone());
                    }
                }
                kept
            }
            _ => fields.clone(),
        };

        for join in &selection.joins {
            let embedded = self.resolve_embed(resource, &fields, join)?;
            projected.insert(join.key().to_string(), embedded);
        }

        Ok(JsonValue::Object(projected))
    }

    fn resolve_embed(
        &self,
        resource: &str,
        fields: &JsonMap<String, JsonValue>,
        join: &JoinDescriptor,
    ) -> VtResult<JsonValue> {
        let related = self.tables.get(&join.table).ok_or_else(|| {
            VtError::backend(resource, format!("unknown related table `{}`", join.table))
        })?;

        let foreign_key = join.foreign_key.as_deref().unwrap_or(&related.key_column);
        let fk_value = match fields.get(foreign_key) {
            Some(value) if !value.is_null() => value,
            _ => return Ok(JsonValue::Null),
        };

        let mut matches: Vec<JsonValue> = related
            .rows
            .iter()
            .filter(|row| row.get(&related.key_column) == Some(fk_value))
            .map(|row| project_embed_columns(row, join.columns.as_deref()))
            .collect();

        Ok(match matches.len() {
            0 => JsonValue::Null,
            1 => matches.remove(0),
            _ => JsonValue::Array(matches),
        })
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn fetch(&self, request: &SelectRequest) -> VtResult<Vec<JsonValue>> {
        // Inline embed expressions in the columns string become descriptors,
        // so projection sees one uniform join shape.
        let selection = request.selection().normalized()?;

        let mut rows = self.matching_rows(request)?;
        sort_rows(&mut rows, request.ordering());

        if let Some((start, end)) = request.row_range() {
            rows = slice_range(rows, start, end);
        }

        rows.into_iter()
            .map(|row| self.project(request.resource(), row, &selection))
            .collect()
    }

    async fn count(&self, request: &SelectRequest) -> VtResult<i64> {
        Ok(self.matching_rows(request)?.len() as i64)
    }
}

fn project_embed_columns(row: &JsonValue, columns: Option<&str>) -> JsonValue {
    let (JsonValue::Object(fields), Some(columns)) = (row, columns) else {
        return row.clone();
    };
    if columns == "*" {
        return row.clone();
    }

    let mut kept = JsonMap::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(value) = fields.get(column) {
            kept.insert(column.to_string(), value.clone());
        }
    }
    JsonValue::Object(kept)
}

fn eval_predicate(row: &JsonValue, predicate: &Predicate) -> bool {
    let field = row.get(&predicate.column).unwrap_or(&JsonValue::Null);

    match predicate.operator {
        FilterOperator::Eq => json_matches(field, &predicate.value),
        FilterOperator::Neq => !json_matches(field, &predicate.value),
        FilterOperator::Gt => compare_with_value(field, &predicate.value)
            .is_some_and(|ord| ord == Ordering::Greater),
        FilterOperator::Gte => compare_with_value(field, &predicate.value)
            .is_some_and(|ord| ord != Ordering::Less),
        FilterOperator::Lt => {
            compare_with_value(field, &predicate.value).is_some_and(|ord| ord == Ordering::Less)
        }
        FilterOperator::Lte => compare_with_value(field, &predicate.value)
            .is_some_and(|ord| ord != Ordering::Greater),
        FilterOperator::Like => match (field.as_str(), &predicate.value) {
            (Some(text), FilterValue::Str(pattern)) => like_match(text, pattern, false),
            _ => false,
        },
        FilterOperator::Ilike => match (field.as_str(), &predicate.value) {
            (Some(text), FilterValue::Str(pattern)) => like_match(text, pattern, true),
            _ => false,
        },
        FilterOperator::In => match &predicate.value {
            FilterValue::List(values) => values.iter().any(|value| json_matches(field, value)),
            _ => false,
        },
        FilterOperator::Is => identity_matches(field, &predicate.value),
        FilterOperator::Not => !identity_matches(field, &predicate.value),
    }
}

fn eval_or_group(row: &JsonValue, group: &OrGroup) -> bool {
    group.patterns.iter().any(|(column, pattern)| {
        row.get(column)
            .and_then(JsonValue::as_str)
            .is_some_and(|text| like_match(text, pattern, true))
    })
}

/// `IS` semantics: a null test or a boolean identity test.
fn identity_matches(field: &JsonValue, value: &FilterValue) -> bool {
    match value {
        FilterValue::Null => field.is_null(),
        FilterValue::Bool(expected) => field.as_bool() == Some(*expected),
        _ => false,
    }
}

fn json_matches(field: &JsonValue, value: &FilterValue) -> bool {
    match (field, value) {
        // Numbers compare across integer/float representations.
        (JsonValue::Number(n), FilterValue::Int(i)) => n.as_f64() == Some(*i as f64),
        (JsonValue::Number(n), FilterValue::Float(f)) => n.as_f64() == Some(*f),
        _ => *field == value.to_json(),
    }
}

fn compare_with_value(field: &JsonValue, value: &FilterValue) -> Option<Ordering> {
    match (field, value) {
        (JsonValue::Number(n), FilterValue::Int(i)) => n.as_f64()?.partial_cmp(&(*i as f64)),
        (JsonValue::Number(n), FilterValue::Float(f)) => n.as_f64()?.partial_cmp(f),
        (JsonValue::String(s), FilterValue::Str(other)) => Some(s.as_str().cmp(other.as_str())),
        (JsonValue::Bool(b), FilterValue::Bool(other)) => Some(b.cmp(other)),
        _ => None,
    }
}

fn sort_rows(rows: &mut [JsonValue], criteria: &[SortCriterion]) {
    if criteria.is_empty() {
        return;
    }

    rows.sort_by(|a, b| {
        for criterion in criteria {
            let ordering = compare_fields(a.get(&criterion.column), b.get(&criterion.column));
            let ordering = if criterion.direction.is_ascending() {
                ordering
            } else {
                ordering.reverse()
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Field comparison for ordering; nulls and missing columns sort last
/// ascending.
fn compare_fields(a: Option<&JsonValue>, b: Option<&JsonValue>) -> Ordering {
    match (a, b) {
        (None | Some(JsonValue::Null), None | Some(JsonValue::Null)) => Ordering::Equal,
        (None | Some(JsonValue::Null), Some(_)) => Ordering::Greater,
        (Some(_), None | Some(JsonValue::Null)) => Ordering::Less,
        (Some(JsonValue::Number(x)), Some(JsonValue::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(JsonValue::String(x)), Some(JsonValue::String(y))) => x.cmp(y),
        (Some(JsonValue::Bool(x)), Some(JsonValue::Bool(y))) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn slice_range(rows: Vec<JsonValue>, start: i64, end: i64) -> Vec<JsonValue> {
    let len = rows.len() as i64;
    let start = start.clamp(0, len);
    let end = end.min(len - 1);
    if start > end {
        return vec![];
    }
    rows.into_iter()
        .skip(start as usize)
        .take((end - start + 1) as usize)
        .collect()
}

/// SQL `LIKE` matching with `%` wildcards.
fn like_match(text: &str, pattern: &str, case_insensitive: bool) -> bool {
    let (text, pattern) = if case_insensitive {
        (text.to_lowercase(), pattern.to_lowercase())
    } else {
        (text.to_owned(), pattern.to_owned())
    };

    let anchored_start = !pattern.starts_with('%');
    let anchored_end = !pattern.ends_with('%');
    let segments: Vec<&str> = pattern.split('%').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        // Pattern is empty or wildcards only.
        return !anchored_start || text.is_empty();
    }

    let mut pos = 0usize;
    for (i, segment) in segments.iter().copied().enumerate() {
        let is_first = i == 0;
        let is_last = i + 1 == segments.len();

        if is_first && anchored_start {
            if !text.starts_with(segment) {
                return false;
            }
            pos = segment.len();
            if is_last {
                return !anchored_end || pos == text.len();
            }
            continue;
        }

        if is_last && anchored_end {
            let rest = &text[pos..];
            return rest.len() >= segment.len() && rest.ends_with(segment);
        }

        match text[pos..].find(segment) {
            Some(found) => pos += found + segment.len(),
            None => return false,
        }
    }

    true
}
