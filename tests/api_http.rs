// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with
// the upstreams served by a stub transport.
//
// Covered:
// - GET /health
// - GET /api/aggregator/aggregated-data (wire shape, filter, sort, alias)
// - repeated / conflicting query keys are tolerated
// - all upstreams down -> 200 with []

use std::sync::Arc;

use axum::{
    body::{self, Body},
    Router,
};
use http::{Request, StatusCode};
use serde_json::Value as Json;
use tower::ServiceExt as _; // for `oneshot`

use api_aggregation_service::config::{ApiKey, AppConfig};
use api_aggregation_service::http_client::{HttpResponse, StubHttpClient};
use api_aggregation_service::{api, Aggregator, AppState, MemoryCache};

const BODY_LIMIT: usize = 1024 * 1024;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{name}")).expect("fixture")
}

fn healthy_stub() -> StubHttpClient {
    StubHttpClient::new()
        .route(
            "https://api.openweathermap.org/",
            HttpResponse::ok_json(fixture("weather_london.json")),
        )
        .route(
            "https://newsapi.org/",
            HttpResponse::ok_json(fixture("news_top_headlines.json")),
        )
        .route(
            "https://api.github.com/",
            HttpResponse::ok_json(fixture("github_search.json")),
        )
}

fn test_router(stub: StubHttpClient) -> Router {
    let mut cfg = AppConfig::default();
    cfg.weather.api_key = Some(ApiKey::new("wk"));
    cfg.news.api_key = Some(ApiKey::new("nk"));
    let aggregator = Aggregator::with_defaults(&cfg, Arc::new(stub), Arc::new(MemoryCache::new()));
    api::create_router(AppState::new(aggregator))
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("build GET");
    let resp = app.oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let v: Json = serde_json::from_slice(&bytes).expect("parse json");
    (status, v)
}

fn field<'a>(v: &'a Json, name: &str) -> Vec<&'a str> {
    v.as_array()
        .expect("array body")
        .iter()
        .map(|r| r[name].as_str().expect("string field"))
        .collect()
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let app = test_router(StubHttpClient::new());

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let body = String::from_utf8(bytes).expect("utf8");
    assert_eq!(body.trim(), "OK");
}

#[tokio::test]
async fn aggregated_data_returns_expected_json_fields() {
    let (status, v) = get_json(test_router(healthy_stub()), "/api/aggregator/aggregated-data").await;
    assert_eq!(status, StatusCode::OK);

    let arr = v.as_array().expect("array body");
    assert_eq!(arr.len(), 3);
    for rec in arr {
        let obj = rec.as_object().expect("record object");
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, ["category", "data", "date", "source"]);
    }
    assert_eq!(field(&v, "category"), ["Weather", "News", "Repository"]);
    assert_eq!(arr[1]["date"], "2024-06-01T08:30:00Z");
}

#[tokio::test]
async fn filter_query_narrows_by_source() {
    let (status, v) = get_json(
        test_router(healthy_stub()),
        "/api/aggregator/aggregated-data?filter=git",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&v, "source"), ["GitHub"]);
}

#[tokio::test]
async fn sort_by_alias_and_plain_sort_agree() {
    let app = test_router(healthy_stub());

    let (_, aliased) = get_json(app.clone(), "/api/aggregator/aggregated-data?sortBy=category").await;
    let (_, plain) = get_json(app, "/api/aggregator/aggregated-data?sort=category").await;

    assert_eq!(field(&aliased, "category"), ["News", "Repository", "Weather"]);
    assert_eq!(aliased, plain);
}

#[tokio::test]
async fn unknown_sort_and_empty_filter_are_accepted() {
    let (status, v) = get_json(
        test_router(healthy_stub()),
        "/api/aggregator/aggregated-data?filter=&sortBy=popularity",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&v, "category"), ["Weather", "News", "Repository"]);
}

#[tokio::test]
async fn sort_with_sort_by_prefers_sort() {
    let (status, v) = get_json(
        test_router(healthy_stub()),
        "/api/aggregator/aggregated-data?sort=date&sortBy=category",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&v, "category"), ["Repository", "News", "Weather"]);
}

#[tokio::test]
async fn repeated_keys_use_the_first_value() {
    let app = test_router(healthy_stub());

    let (status, v) = get_json(app.clone(), "/api/aggregator/aggregated-data?filter=git&filter=news").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&v, "source"), ["GitHub"]);

    let (status, v) = get_json(app, "/api/aggregator/aggregated-data?sort=category&sort=date").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(field(&v, "category"), ["News", "Repository", "Weather"]);
}

#[tokio::test]
async fn all_upstreams_down_is_still_200_with_empty_array() {
    let stub = StubHttpClient::new()
        .route("https://api.openweathermap.org/", HttpResponse::new(500, "oops"))
        .route("https://newsapi.org/", HttpResponse::new(401, "bad key"));
    let (status, v) = get_json(test_router(stub), "/api/aggregator/aggregated-data").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(v, serde_json::json!([]));
}
