//! PostgREST backend adapter
//!
//! Renders a [`SelectRequest`] into PostgREST query-string parameters and
//! executes it over HTTP. Rendering is a standalone pure function so the wire
//! format is testable without a network.
//!
//! Operator mapping: `column=eq.5`, `column=in.(1,2,3)`, `column=is.null`,
//! `column=not.is.null`, patterns with `*` wildcards (`title=ilike.*park*`),
//! `or=(title.ilike.*park*,address.ilike.*park*)`, `order=col.asc`, and
//! `limit`/`offset` for row ranges. Counting uses `Prefer: count=exact` with
//! `limit=0` and reads the total from the `Content-Range` response header.

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};
use url::Url;
use vt_core::{BackendConfig, VtError, VtResult};
use vt_queries::{FilterOperator, FilterValue};

use crate::backend::Backend;
use crate::request::SelectRequest;

/// HTTP adapter for a PostgREST-style hosted backend.
pub struct PostgrestBackend {
    base: Url,
    api_key: String,
    http: reqwest::Client,
}

impl PostgrestBackend {
    pub fn new(config: &BackendConfig) -> VtResult<Self> {
        let base = Url::parse(config.url.trim_end_matches('/'))
            .map_err(|e| VtError::Config(format!("invalid backend url: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| VtError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            base,
            api_key: config.api_key.clone(),
            http,
        })
    }

    fn endpoint(&self, resource: &str) -> VtResult<Url> {
        Url::parse(&format!(
            "{}/{}",
            self.base.as_str().trim_end_matches('/'),
            resource
        ))
            .map_err(|e| VtError::backend(resource, format!("invalid resource path: {}", e)))
    }

    fn headers(&self, resource: &str) -> VtResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.api_key)
            .map_err(|e| VtError::backend(resource, format!("invalid api key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| VtError::backend(resource, format!("invalid api key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        Ok(headers)
    }

    async fn send(
        &self,
        resource: &str,
        params: &[(String, String)],
        extra: Option<(&'static str, &'static str)>,
    ) -> VtResult<reqwest::Response> {
        let mut headers = self.headers(resource)?;
        if let Some((name, value)) = extra {
            headers.insert(name, HeaderValue::from_static(value));
        }

        let response = self
            .http
            .get(self.endpoint(resource)?)
            .headers(headers)
            .query(params)
            .send()
            .await
            .map_err(|e| VtError::backend(resource, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VtError::backend(
                resource,
                format!("backend returned {}: {}", status, body),
            ));
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl Backend for PostgrestBackend {
    #[instrument(skip(self, request), fields(resource = request.resource()))]
    async fn fetch(&self, request: &SelectRequest) -> VtResult<Vec<JsonValue>> {
        let resource = request.resource();
        let params = render_params(request);
        debug!(?params, "issuing data query");

        let response = self.send(resource, &params, None).await?;
        response
            .json::<Vec<JsonValue>>()
            .await
            .map_err(|e| VtError::Decode(e.to_string()))
    }

    #[instrument(skip(self, request), fields(resource = request.resource()))]
    async fn count(&self, request: &SelectRequest) -> VtResult<i64> {
        let resource = request.resource();
        let mut params = render_params(request);
        params.push(("limit".to_string(), "0".to_string()));
        debug!(?params, "issuing count query");

        let response = self
            .send(resource, &params, Some(("prefer", "count=exact")))
            .await?;

        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| VtError::backend(resource, "count response missing content-range"))?;

        parse_content_range(content_range).ok_or_else(|| {
            VtError::backend(
                resource,
                format!("unparsable content-range `{}`", content_range),
            )
        })
    }
}

/// Render a request into PostgREST query-string parameters. Pure.
pub fn render_params(request: &SelectRequest) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), request.selection().select_expr())];

    for predicate in request.predicates() {
        let rhs = match predicate.operator {
            FilterOperator::In => format!("in.({})", render_in_list(&predicate.value)),
            FilterOperator::Not => format!("not.is.{}", predicate.value.render()),
            FilterOperator::Like | FilterOperator::Ilike => format!(
                "{}.{}",
                predicate.operator.as_str(),
                to_wildcards(&predicate.value.render())
            ),
            _ => format!("{}.{}", predicate.operator.as_str(), predicate.value.render()),
        };
        params.push((predicate.column.clone(), rhs));
    }

    for group in request.or_groups() {
        let clauses: Vec<String> = group
            .patterns
            .iter()
            .map(|(column, pattern)| format!("{}.ilike.{}", column, to_wildcards(pattern)))
            .collect();
        params.push(("or".to_string(), format!("({})", clauses.join(","))));
    }

    if !request.ordering().is_empty() {
        let order: Vec<String> = request
            .ordering()
            .iter()
            .map(|criterion| format!("{}.{}", criterion.column, criterion.direction.as_str()))
            .collect();
        params.push(("order".to_string(), order.join(",")));
    }

    if let Some((start, end)) = request.row_range() {
        params.push(("offset".to_string(), start.to_string()));
        params.push(("limit".to_string(), (end - start + 1).to_string()));
    }

    params
}

/// Render the element list of an `in` filter.
fn render_in_list(value: &FilterValue) -> String {
    let elements: Vec<String> = match value {
        FilterValue::List(values) => values.iter().map(render_in_element).collect(),
        other => vec![render_in_element(other)],
    };
    elements.join(",")
}

/// String elements carrying grammar-reserved characters must be
/// double-quoted, with `"` and `\` backslash-escaped, or the backend
/// misparses the list.
fn render_in_element(value: &FilterValue) -> String {
    let raw = value.render();
    let reserved = raw
        .chars()
        .any(|c| matches!(c, ',' | '.' | '(' | ')' | '"' | '\\' | ' '));
    if matches!(value, FilterValue::Str(_)) && reserved {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}

/// PostgREST uses `*` where SQL patterns use `%`.
fn to_wildcards(pattern: &str) -> String {
    pattern.replace('%', "*")
}

/// Extract the total from a `Content-Range` header (`0-9/57` or `*/57`).
fn parse_content_range(value: &str) -> Option<i64> {
    value.rsplit('/').next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vt_queries::{FilterValue, JoinDescriptor, JoinSpec, SortDirection};

    fn param<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn test_render_basic_predicates() {
        let request = SelectRequest::new("hotspots")
            .eq("area_id", 5)
            .gte("visit_count", 10)
            .is("deleted_at", FilterValue::Null)
            .not("published", FilterValue::Null);
        let params = render_params(&request);

        assert_eq!(param(&params, "select"), Some("*"));
        assert_eq!(param(&params, "area_id"), Some("eq.5"));
        assert_eq!(param(&params, "visit_count"), Some("gte.10"));
        assert_eq!(param(&params, "deleted_at"), Some("is.null"));
        assert_eq!(param(&params, "published"), Some("not.is.null"));
    }

    #[test]
    fn test_render_in_list() {
        let request = SelectRequest::new("hotspots").in_list("area_id", vec![1i64, 2, 3]);
        let params = render_params(&request);
        assert_eq!(param(&params, "area_id"), Some("in.(1,2,3)"));
    }

    #[test]
    fn test_render_in_quotes_reserved_string_elements() {
        let request = SelectRequest::new("areas")
            .in_list("area_name", vec!["Hue", "Hoi An", "a,b(c)", "v1.2"]);
        let params = render_params(&request);
        assert_eq!(
            param(&params, "area_name"),
            Some(r#"in.(Hue,"Hoi An","a,b(c)","v1.2")"#)
        );
    }

    #[test]
    fn test_render_ilike_converts_wildcards() {
        let request = SelectRequest::new("hotspots").ilike("title", "%park%");
        let params = render_params(&request);
        assert_eq!(param(&params, "title"), Some("ilike.*park*"));
    }

    #[test]
    fn test_render_or_group() {
        let request = SelectRequest::new("hotspots").or_ilike(["title", "address"], "park");
        let params = render_params(&request);
        assert_eq!(
            param(&params, "or"),
            Some("(title.ilike.*park*,address.ilike.*park*)")
        );
    }

    #[test]
    fn test_render_order_and_range() {
        let request = SelectRequest::new("hotspots")
            .order_by("created_at", SortDirection::Desc)
            .order_by("title", SortDirection::Asc)
            .range(10, 19);
        let params = render_params(&request);
        assert_eq!(param(&params, "order"), Some("created_at.desc,title.asc"));
        assert_eq!(param(&params, "offset"), Some("10"));
        assert_eq!(param(&params, "limit"), Some("10"));
    }

    #[test]
    fn test_render_select_with_embeds() {
        let selection = JoinSpec::new().join(
            JoinDescriptor::new("areas")
                .via("area_id")
                .aliased("area")
                .columns("area_name"),
        );
        let request = SelectRequest::new("hotspots").select(selection);
        let params = render_params(&request);
        assert_eq!(param(&params, "select"), Some("*,area:areas!area_id(area_name)"));
    }

    #[test]
    fn test_parse_content_range() {
        assert_eq!(parse_content_range("0-9/57"), Some(57));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("garbage"), None);
    }
}
