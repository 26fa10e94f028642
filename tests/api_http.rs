// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot, with the
// fixture provider standing in for the search API and the mock AI provider.

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use news_trend_analyzer::annotate::ai_adapter::{CachingClient, MockProvider};
use news_trend_analyzer::api::{self, AppState};
use news_trend_analyzer::config::app::AppConfig;
use news_trend_analyzer::ingest::providers::FixtureProvider;
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

const BODY_LIMIT: usize = 1024 * 1024;
const FIXTURE: &str = include_str!("fixtures/newsapi_everything.json");

fn test_router_with(cfg: &AppConfig) -> Router {
    let state = AppState::new(
        cfg,
        Arc::new(FixtureProvider::from_fixture(FIXTURE)),
        Arc::new(CachingClient::new(MockProvider, 1_000)),
    );
    api::router(state)
}

fn test_router() -> Router {
    test_router_with(&AppConfig::default())
}

fn post_json(uri: &str, payload: &Json) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST")
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

fn corpus() -> Json {
    json!([
        { "content": "cats are great pets", "topic": "animals", "sentiment": "Positive", "publishedAt": "2024-01-01T10:00:00Z" },
        { "content": "dogs are loyal pets", "topic": "animals", "sentiment": "Positive", "publishedAt": "2024-01-01T11:00:00Z" },
        { "content": "stocks rose today", "topic": "finance", "sentiment": "Neutral", "publishedAt": "2024-01-02T09:00:00Z" }
    ])
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = test_router().oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    assert_eq!(String::from_utf8(bytes.to_vec()).unwrap(), "ok");
}

#[tokio::test]
async fn search_articles_cleans_filters_and_annotates() {
    let resp = test_router()
        .oneshot(post_json("/search_articles", &json!({ "query": "markets" })))
        .await
        .expect("oneshot /search_articles");
    assert_eq!(resp.status(), StatusCode::OK);

    let v = read_json(resp).await;
    let arr = v.as_array().expect("array response");
    assert_eq!(arr.len(), 2, "records without description are dropped");

    let first = &arr[0];
    assert_eq!(first["title"], "stocks rise as inflation cools");
    assert_eq!(first["source"], "Reuters");
    assert_eq!(first["publishedAt"], "2024-03-05T14:30:00Z");
    assert_eq!(first["sentiment"], "Neutral");
    assert_eq!(first["topic"], "General");
    assert!(first["summary"].as_str().unwrap().starts_with("Summary: stocks rose"));
    assert_eq!(first["key_points"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn search_articles_rejects_empty_query() {
    let resp = test_router()
        .oneshot(post_json("/search_articles", &json!({ "query": "  " })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_articles_is_rate_limited_per_client() {
    let cfg = AppConfig::from_toml_str("[server]\nrate_limit = 2\n").unwrap();
    let app = test_router_with(&cfg);
    let payload = json!({ "query": "markets", "page_size": 1 });

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(post_json("/search_articles", &payload))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = app
        .clone()
        .oneshot(post_json("/search_articles", &payload))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    let v = read_json(resp).await;
    assert_eq!(v["detail"], "Rate limit exceeded. Try again later.");

    // another client is unaffected
    let mut req = post_json("/search_articles", &payload);
    req.headers_mut()
        .insert("x-forwarded-for", "203.0.113.9".parse().unwrap());
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn analytics_trending_uses_explicit_top_n() {
    let resp = test_router()
        .oneshot(post_json(
            "/analytics/trending",
            &json!({ "articles": corpus(), "top_n": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let v = read_json(resp).await;
    assert_eq!(v, json!([{ "topic": "animals", "count": 2 }]));
}

#[tokio::test]
async fn analytics_sentiment_groups_by_day() {
    let resp = test_router()
        .oneshot(post_json("/analytics/sentiment", &json!({ "articles": corpus() })))
        .await
        .unwrap();
    let v = read_json(resp).await;
    assert_eq!(
        v,
        json!({ "2024-01-01": { "Positive": 2 }, "2024-01-02": { "Neutral": 1 } })
    );
}

#[tokio::test]
async fn analytics_related_returns_scores_best_first() {
    let resp = test_router()
        .oneshot(post_json(
            "/analytics/related",
            &json!({ "articles": corpus(), "target": { "content": "cats and dogs are pets" } }),
        ))
        .await
        .unwrap();
    let v = read_json(resp).await;
    let arr = v.as_array().unwrap();
    // default related count is 3
    assert_eq!(arr.len(), 3);
    let first = arr[0]["article"]["content"].as_str().unwrap();
    assert!(first == "cats are great pets" || first == "dogs are loyal pets");
    assert_eq!(arr[2]["score"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn analytics_clusters_on_empty_corpus_is_empty_object() {
    let resp = test_router()
        .oneshot(post_json("/analytics/clusters", &json!({ "articles": [] })))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, json!({}));

    let resp = test_router()
        .oneshot(post_json("/analytics/clusters", &json!({ "articles": corpus() })))
        .await
        .unwrap();
    let v = read_json(resp).await;
    assert_eq!(v["animals"].as_array().unwrap().len(), 2);
    assert_eq!(v["finance"].as_array().unwrap().len(), 1);
}
