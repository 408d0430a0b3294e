//! The backend-agnostic query handle
//!
//! A [`SelectRequest`] accumulates predicates, search groups, ordering, a row
//! range, and a selection through chainable calls. It is pure data: building
//! one has no side effects, and each backend adapter interprets the finished
//! request its own way (query-string parameters for PostgREST, direct
//! evaluation for the in-memory backend).

use vt_queries::{FilterOperator, FilterValue, JoinSpec, SortCriterion, SortDirection};

/// A single column predicate, ANDed with all others on the request.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub column: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

/// One OR-group of case-insensitive pattern matches. A row passes the group
/// when any listed column matches its pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct OrGroup {
    pub patterns: Vec<(String, String)>,
}

/// A query description ready for a backend to execute.
#[derive(Debug, Clone, Default)]
pub struct SelectRequest {
    resource: String,
    selection: JoinSpec,
    predicates: Vec<Predicate>,
    or_groups: Vec<OrGroup>,
    order: Vec<SortCriterion>,
    range: Option<(i64, i64)>,
}

impl SelectRequest {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            ..Self::default()
        }
    }

    fn predicate(
        mut self,
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        self.predicates.push(Predicate {
            column: column.into(),
            operator,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Eq, value)
    }

    pub fn neq(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Neq, value)
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Gt, value)
    }

    pub fn gte(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Gte, value)
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Lt, value)
    }

    pub fn lte(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Lte, value)
    }

    pub fn like(self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.predicate(column, FilterOperator::Like, pattern.into())
    }

    pub fn ilike(self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.predicate(column, FilterOperator::Ilike, pattern.into())
    }

    pub fn in_list(self, column: impl Into<String>, values: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::In, values)
    }

    pub fn is(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Is, value)
    }

    pub fn not(self, column: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.predicate(column, FilterOperator::Not, value)
    }

    /// Add an OR-group matching `%query%` case-insensitively on each column.
    pub fn or_ilike<I, S>(mut self, columns: I, query: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pattern = format!("%{}%", query);
        self.or_groups.push(OrGroup {
            patterns: columns
                .into_iter()
                .map(|c| (c.into(), pattern.clone()))
                .collect(),
        });
        self
    }

    /// Append a sort criterion; later criteria break ties of earlier ones.
    pub fn order(mut self, criterion: SortCriterion) -> Self {
        self.order.push(criterion);
        self
    }

    pub fn order_by(self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order(SortCriterion::new(column, direction))
    }

    /// Restrict to the inclusive row range `[start, end]`.
    pub fn range(mut self, start: i64, end: i64) -> Self {
        self.range = Some((start, end));
        self
    }

    /// Select columns and embedded relations.
    pub fn select(mut self, selection: JoinSpec) -> Self {
        self.selection = selection;
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn selection(&self) -> &JoinSpec {
        &self.selection
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn or_groups(&self) -> &[OrGroup] {
        &self.or_groups
    }

    pub fn ordering(&self) -> &[SortCriterion] {
        &self.order
    }

    pub fn row_range(&self) -> Option<(i64, i64)> {
        self.range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_predicates_accumulate_in_order() {
        let request = SelectRequest::new("hotspots")
            .eq("area_id", 5)
            .gte("visit_count", 10)
            .is("deleted_at", FilterValue::Null);

        assert_eq!(request.resource(), "hotspots");
        assert_eq!(request.predicates().len(), 3);
        assert_eq!(request.predicates()[0].column, "area_id");
        assert_eq!(request.predicates()[1].operator, FilterOperator::Gte);
        assert_eq!(request.predicates()[2].value, FilterValue::Null);
    }

    #[test]
    fn test_or_ilike_wraps_query_in_wildcards() {
        let request = SelectRequest::new("hotspots").or_ilike(["title", "address"], "park");
        let group = &request.or_groups()[0];
        assert_eq!(group.patterns.len(), 2);
        assert_eq!(group.patterns[0], ("title".to_string(), "%park%".to_string()));
        assert_eq!(group.patterns[1].0, "address");
    }

    #[test]
    fn test_range_is_inclusive_pair() {
        let request = SelectRequest::new("areas").range(10, 19);
        assert_eq!(request.row_range(), Some((10, 19)));
    }
}
