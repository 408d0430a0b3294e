//! Translation of the declarative query model onto a request handle
//!
//! Both translators are pure: they take a [`SelectRequest`] and return a new
//! one with the model applied. The same translation feeds the count and the
//! data round trips, so the two can never disagree about which rows qualify.

use vt_core::{PageParams, VtResult};
use vt_queries::{FilterOperator, Filters};

use crate::request::SelectRequest;

/// Apply conditions, search, and sort criteria to a request.
///
/// Conditions are validated first: an operator/value shape mismatch fails
/// fast with `InvalidFilter` before any round trip is issued.
pub fn apply_filters(request: SelectRequest, filters: Option<&Filters>) -> VtResult<SelectRequest> {
    let Some(filters) = filters else {
        return Ok(request);
    };

    let mut request = request;

    for condition in &filters.conditions {
        condition.validate()?;

        let column = condition.column.clone();
        let value = condition.value.clone();
        request = match condition.operator {
            FilterOperator::Eq => request.eq(column, value),
            FilterOperator::Neq => request.neq(column, value),
            FilterOperator::Gt => request.gt(column, value),
            FilterOperator::Gte => request.gte(column, value),
            FilterOperator::Lt => request.lt(column, value),
            FilterOperator::Lte => request.lte(column, value),
            FilterOperator::Like => request.like(column, value.render()),
            FilterOperator::Ilike => request.ilike(column, value.render()),
            FilterOperator::In => request.in_list(column, value),
            FilterOperator::Is => request.is(column, value),
            FilterOperator::Not => request.not(column, value),
        };
    }

    if let Some(search) = &filters.search {
        if !search.is_empty() {
            request = request.or_ilike(search.columns.iter().cloned(), &search.query);
        }
    }

    for criterion in filters.sort.criteria() {
        request = request.order(criterion.clone());
    }

    Ok(request)
}

/// Apply the page-derived (or explicit) row range to a request.
pub fn apply_pagination(request: SelectRequest, pagination: Option<&PageParams>) -> SelectRequest {
    let Some(pagination) = pagination else {
        return request;
    };

    let (start, end) = pagination.range();
    request.range(start, end)
}
