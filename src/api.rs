use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;

use crate::analyze::ArticleAnalyzer;
use crate::annotate::{self, DynAiClient};
use crate::config::app::{AnalyticsConfig, AppConfig};
use crate::corpus::{Article, CorpusStore};
use crate::ingest::{self, types::ArticleQuery, types::ArticleSource};
use crate::rate_limit::{RateLimited, RateLimiter};

const FALLBACK_CLIENT: &str = "127.0.0.1";

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ArticleSource>,
    pub ai: DynAiClient,
    pub limiter: Arc<RateLimiter>,
    pub defaults: AnalyticsConfig,
}

impl AppState {
    pub fn new(cfg: &AppConfig, source: Arc<dyn ArticleSource>, ai: DynAiClient) -> Self {
        Self {
            source,
            ai,
            limiter: Arc::new(RateLimiter::new(
                cfg.server.rate_limit,
                Duration::from_secs(cfg.server.rate_limit_window_secs),
            )),
            defaults: cfg.analytics,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search_articles", post(search_articles))
        .route("/analytics/trending", post(trending))
        .route("/analytics/sentiment", post(sentiment))
        .route("/analytics/related", post(related))
        .route("/analytics/clusters", post(clusters))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded. Try again later.")]
    RateLimited,
    #[error("{0}")]
    BadRequest(String),
}

impl From<RateLimited> for ApiError {
    fn from(_: RateLimited) -> Self {
        ApiError::RateLimited
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        };
        let body = serde_json::json!({ "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Rate-limit key: first `X-Forwarded-For` hop, then `X-Real-IP`, then loopback.
pub fn client_key(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    forwarded
        .or(real_ip)
        .unwrap_or(FALLBACK_CLIENT)
        .to_string()
}

async fn search_articles(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(query): Json<ArticleQuery>,
) -> Result<Json<Vec<Article>>, ApiError> {
    let client = client_key(&headers);
    state.limiter.check(&client)?;

    if query.query.trim().is_empty() {
        return Err(ApiError::BadRequest("query must not be empty".to_string()));
    }

    let raw = ingest::fetch_once(state.source.as_ref(), &query).await;
    let processed = ingest::process_articles(raw);
    let annotated = annotate::annotate_all(state.ai.as_ref(), processed).await;

    tracing::info!(target: "api", %client, query = %query.query, returned = annotated.len(), "search_articles");
    Ok(Json(annotated))
}

#[derive(Deserialize)]
struct CorpusReq {
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    top_n: Option<usize>,
}

#[derive(Deserialize)]
struct RelatedReq {
    #[serde(default)]
    articles: Vec<Article>,
    target: Article,
    #[serde(default)]
    top_n: Option<usize>,
}

#[derive(Serialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}

async fn trending(State(state): State<AppState>, Json(req): Json<CorpusReq>) -> Json<Vec<TopicCount>> {
    let store = CorpusStore::new(req.articles);
    let top_n = req.top_n.unwrap_or(state.defaults.default_top_topics);
    let out = ArticleAnalyzer::new(&store)
        .trending_topics(top_n)
        .into_iter()
        .map(|(topic, count)| TopicCount { topic, count })
        .collect();
    Json(out)
}

async fn sentiment(Json(req): Json<CorpusReq>) -> Json<BTreeMap<String, BTreeMap<String, usize>>> {
    let store = CorpusStore::new(req.articles);
    Json(ArticleAnalyzer::new(&store).sentiment_over_time())
}

#[derive(Serialize)]
struct RelatedOut {
    score: f64,
    article: Article,
}

async fn related(State(state): State<AppState>, Json(req): Json<RelatedReq>) -> Json<Vec<RelatedOut>> {
    let store = CorpusStore::new(req.articles);
    let top_n = req.top_n.unwrap_or(state.defaults.default_related);
    let out = ArticleAnalyzer::new(&store)
        .related_scored(&req.target, top_n)
        .into_iter()
        .map(|r| RelatedOut {
            score: r.score,
            article: r.article.clone(),
        })
        .collect();
    Json(out)
}

async fn clusters(Json(req): Json<CorpusReq>) -> Json<BTreeMap<String, Vec<Article>>> {
    let store = CorpusStore::new(req.articles);
    let out = ArticleAnalyzer::new(&store)
        .clusters()
        .into_iter()
        .map(|(topic, members)| (topic, members.into_iter().cloned().collect()))
        .collect();
    Json(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn client_key_prefers_forwarded_for() {
        let mut h = HeaderMap::new();
        assert_eq!(client_key(&h), "127.0.0.1");
        h.insert("x-real-ip", HeaderValue::from_static("10.0.0.2"));
        assert_eq!(client_key(&h), "10.0.0.2");
        h.insert("x-forwarded-for", HeaderValue::from_static(" 1.2.3.4 , 10.0.0.1"));
        assert_eq!(client_key(&h), "1.2.3.4");
    }
}
