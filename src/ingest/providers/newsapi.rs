// src/ingest/providers/newsapi.rs
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use serde::Deserialize;

use crate::config::app::NewsApiConfig;
use crate::ingest::types::{ArticleQuery, ArticleSource, RawArticle};

/// Envelope of the `/v2/everything` response.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub articles: Vec<RawArticle>,
}

impl SearchResponse {
    pub(crate) fn into_articles(self) -> Result<Vec<RawArticle>> {
        match self.status.as_deref() {
            None | Some("ok") => Ok(self.articles),
            Some(other) => Err(anyhow!(
                "search api status={other} code={} message={}",
                self.code.as_deref().unwrap_or("-"),
                self.message.as_deref().unwrap_or("-")
            )),
        }
    }
}

/// Search API provider (`newsapi.org` style `everything` endpoint).
pub struct NewsApiProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiProvider {
    pub fn new(cfg: &NewsApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("news-trend-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(cfg.timeout_secs.max(1)))
            .build()
            .context("building search api http client")?;
        let api_key = cfg.resolved_api_key();
        if api_key.is_empty() {
            tracing::warn!(target: "ingest", "search api key is empty; requests will be rejected upstream");
        }
        Ok(Self {
            http,
            base_url: cfg.base_url.clone(),
            api_key,
        })
    }

    fn query_params(query: &ArticleQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.query.clone()),
            ("sortBy", query.sort_by.clone()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(from) = query.from_date.as_deref().filter(|s| !s.is_empty()) {
            params.push(("from", from.to_string()));
        }
        params
    }
}

#[async_trait]
impl ArticleSource for NewsApiProvider {
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>> {
        let t0 = std::time::Instant::now();

        let resp = self
            .http
            .get(&self.base_url)
            .header("X-Api-Key", &self.api_key)
            .query(&Self::query_params(query))
            .send()
            .await
            .context("search api request")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("search api returned {status}: {}", truncate(&body, 200)));
        }

        let body: SearchResponse = resp.json().await.context("decoding search api json")?;
        let articles = body.into_articles()?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("ingest_fetch_ms").record(ms);

        Ok(articles)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
