//! End-to-end executor scenarios over the in-memory backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use vt_core::{BackendConfig, PageParams, VtError, VtResult};
use vt_data::{Backend, MemoryBackend, QueryExecutor, SelectRequest};
use vt_queries::{FilterCondition, Filters, JoinDescriptor, JoinSpec, Search};

fn seeded_backend() -> MemoryBackend {
    MemoryBackend::new()
        .with_table(
            "hotspots",
            "hotspot_id",
            vec![
                json!({ "hotspot_id": 1, "title": "Central Park Gate", "area_id": 5, "address": "North Rd" }),
                json!({ "hotspot_id": 2, "title": "Old Citadel", "area_id": 5, "address": "Citadel Sq" }),
                json!({ "hotspot_id": 3, "title": "River Market", "area_id": 5, "address": "Park Street 3" }),
                json!({ "hotspot_id": 4, "title": "Beach Tower", "area_id": 7, "address": "Shore Ln" }),
            ],
        )
        .with_table(
            "areas",
            "area_id",
            vec![
                json!({ "area_id": 5, "area_name": "Hue", "region": "Central" }),
                json!({ "area_id": 7, "area_name": "Hoi An", "region": "Central" }),
            ],
        )
}

fn executor() -> QueryExecutor {
    QueryExecutor::new(Arc::new(seeded_backend()))
}

#[tokio::test]
async fn filtered_join_query_returns_structured_first_page() {
    let filters = Filters::new().with_condition(FilterCondition::eq("area_id", 5));
    let pagination = PageParams::new(1, 2);
    let joins = JoinSpec::new().join(
        JoinDescriptor::new("areas")
            .via("area_id")
            .aliased("area")
            .columns("area_name"),
    );

    let result = executor()
        .query::<JsonValue>("hotspots", Some(&filters), Some(&pagination), Some(&joins))
        .await
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.page, 1);
    assert_eq!(result.limit, 2);
    assert_eq!(result.total_pages, 2);
    assert!(result.has_next_page);
    assert!(!result.has_previous_page);

    assert_eq!(result.data.len(), 2);
    for row in &result.data {
        // Relations always read as collections, one-to-one included.
        assert_eq!(row["area"], json!([{ "area_name": "Hue" }]));
    }
    assert_eq!(result.data[0]["hotspot_id"], json!(1));
    assert_eq!(result.data[1]["hotspot_id"], json!(2));
}

#[tokio::test]
async fn second_page_carries_the_remainder() {
    let filters = Filters::new().with_condition(FilterCondition::eq("area_id", 5));
    let pagination = PageParams::new(2, 2);

    let result = executor()
        .query::<JsonValue>("hotspots", Some(&filters), Some(&pagination), None)
        .await
        .unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.data.len(), 1);
    assert_eq!(result.data[0]["hotspot_id"], json!(3));
    assert!(!result.has_next_page);
    assert!(result.has_previous_page);
}

#[tokio::test]
async fn search_matches_any_listed_column_and_respects_conditions() {
    // "park" appears in hotspot 1's title and hotspot 3's address; hotspot 4
    // is excluded by the area condition even though nothing in it matches
    // anyway.
    let filters = Filters::new()
        .with_condition(FilterCondition::eq("area_id", 5))
        .with_search(Search::over(["title", "address"], "park"));

    let result = executor()
        .query::<JsonValue>("hotspots", Some(&filters), None, None)
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    let ids: Vec<_> = result.data.iter().map(|r| r["hotspot_id"].clone()).collect();
    assert_eq!(ids, vec![json!(1), json!(3)]);
}

#[tokio::test]
async fn configured_default_page_size_applies_when_pagination_is_absent() {
    let result = executor()
        .with_default_page_size(2)
        .query::<JsonValue>("hotspots", None, None, None)
        .await
        .unwrap();

    assert_eq!(result.limit, 2);
    assert_eq!(result.data.len(), 2);
    assert_eq!(result.total, 4);
    assert_eq!(result.total_pages, 2);
    assert!(result.has_next_page);
}

#[tokio::test]
async fn default_page_size_fills_a_missing_limit() {
    let params = PageParams {
        page: Some(2),
        limit: None,
        offset: None,
    };

    let result = executor()
        .with_default_page_size(2)
        .query::<JsonValue>("hotspots", None, Some(&params), None)
        .await
        .unwrap();

    assert_eq!(result.page, 2);
    assert_eq!(result.limit, 2);
    let ids: Vec<_> = result.data.iter().map(|r| r["hotspot_id"].clone()).collect();
    assert_eq!(ids, vec![json!(3), json!(4)]);
}

#[tokio::test]
async fn explicit_limit_wins_over_the_configured_default() {
    let result = executor()
        .with_default_page_size(2)
        .query::<JsonValue>("hotspots", None, Some(&PageParams::new(1, 3)), None)
        .await
        .unwrap();

    assert_eq!(result.limit, 3);
    assert_eq!(result.data.len(), 3);
}

#[tokio::test]
async fn executor_built_from_config_carries_its_page_size() {
    let config = BackendConfig {
        default_page_size: 2,
        ..BackendConfig::default()
    };

    let result = QueryExecutor::from_config(Arc::new(seeded_backend()), &config)
        .query::<JsonValue>("hotspots", None, None, None)
        .await
        .unwrap();

    assert_eq!(result.limit, 2);
    assert_eq!(result.data.len(), 2);
}

#[tokio::test]
async fn embed_written_into_the_columns_string_is_structured() {
    let joins = JoinSpec::new().columns("*,area:areas(area_name)");

    let result = executor()
        .query::<JsonValue>("hotspots", None, Some(&PageParams::new(1, 1)), Some(&joins))
        .await
        .unwrap();

    assert_eq!(result.data[0]["area"], json!([{ "area_name": "Hue" }]));
}

#[tokio::test]
async fn no_joins_leaves_rows_untouched() {
    let result = executor()
        .query::<JsonValue>("areas", None, None, None)
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(
        result.data[0],
        json!({ "area_id": 5, "area_name": "Hue", "region": "Central" })
    );
}

#[tokio::test]
async fn auto_structure_can_be_disabled() {
    let joins = JoinSpec::new().join(
        JoinDescriptor::new("areas")
            .via("area_id")
            .aliased("area")
            .columns("area_name"),
    );

    let result = executor()
        .query_data::<JsonValue>("hotspots", None, None, Some(&joins), false)
        .await
        .unwrap();

    // Raw backend nesting: a many-to-one embed is a bare object.
    assert_eq!(result.data[0]["area"], json!({ "area_name": "Hue" }));
}

#[derive(Debug, Deserialize)]
struct HotspotWithArea {
    hotspot_id: i64,
    title: String,
    area: Vec<AreaRef>,
}

#[derive(Debug, Deserialize)]
struct AreaRef {
    area_name: String,
}

#[tokio::test]
async fn structured_rows_decode_into_typed_models() {
    let joins = JoinSpec::new().join(
        JoinDescriptor::new("areas")
            .via("area_id")
            .aliased("area")
            .columns("area_name"),
    );

    let result = executor()
        .query::<HotspotWithArea>("hotspots", None, Some(&PageParams::new(1, 1)), Some(&joins))
        .await
        .unwrap();

    let hotspot = &result.data[0];
    assert_eq!(hotspot.hotspot_id, 1);
    assert_eq!(hotspot.title, "Central Park Gate");
    assert_eq!(hotspot.area[0].area_name, "Hue");
}

#[tokio::test]
async fn invalid_filter_fails_before_any_round_trip() {
    let filters = Filters::new().with_condition(FilterCondition::new(
        "area_id",
        vt_queries::FilterOperator::In,
        5,
    ));

    let err = executor()
        .query::<JsonValue>("hotspots", Some(&filters), None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, VtError::InvalidFilter(_)));
}

mockall::mock! {
    FailingBackend {}

    #[async_trait]
    impl Backend for FailingBackend {
        async fn fetch(&self, request: &SelectRequest) -> VtResult<Vec<JsonValue>>;
        async fn count(&self, request: &SelectRequest) -> VtResult<i64>;
    }
}

#[tokio::test]
async fn count_failure_aborts_the_call_with_resource_context() {
    let mut backend = MockFailingBackend::new();
    backend
        .expect_count()
        .returning(|request| Err(VtError::backend(request.resource(), "connection reset")));
    backend.expect_fetch().never();

    let executor = QueryExecutor::new(Arc::new(backend));
    let err = executor
        .query::<JsonValue>("hotspots", None, None, None)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "failed to query hotspots: connection reset"
    );
}

#[tokio::test]
async fn data_failure_after_successful_count_still_aborts() {
    let mut backend = MockFailingBackend::new();
    backend.expect_count().returning(|_| Ok(12));
    backend
        .expect_fetch()
        .returning(|request| Err(VtError::backend(request.resource(), "gateway timeout")));

    let executor = QueryExecutor::new(Arc::new(backend));
    let err = executor
        .query::<JsonValue>("areas", None, None, None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("gateway timeout"));
}

struct StalledBackend;

#[async_trait]
impl Backend for StalledBackend {
    async fn fetch(&self, _request: &SelectRequest) -> VtResult<Vec<JsonValue>> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(vec![])
    }

    async fn count(&self, _request: &SelectRequest) -> VtResult<i64> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(0)
    }
}

#[tokio::test]
async fn deadline_is_enforced_per_round_trip() {
    let executor =
        QueryExecutor::new(Arc::new(StalledBackend)).with_timeout(Duration::from_millis(20));
    let err = executor
        .query::<JsonValue>("hotspots", None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, VtError::Timeout { .. }));
}
