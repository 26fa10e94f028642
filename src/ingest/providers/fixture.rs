// src/ingest/providers/fixture.rs
use anyhow::{Context, Result};
use async_trait::async_trait;

use super::newsapi::SearchResponse;
use crate::ingest::types::{ArticleQuery, ArticleSource, RawArticle};

/// Serves a search API payload held in memory. Accepts either the full
/// response envelope or a bare JSON array of articles.
pub struct FixtureProvider {
    pub json_content: String,
}

impl FixtureProvider {
    pub fn from_fixture(content: &str) -> Self {
        Self {
            json_content: content.to_string(),
        }
    }

    /// Parse without going through the async trait (used by the report binary).
    pub fn parse(&self) -> Result<Vec<RawArticle>> {
        let trimmed = self.json_content.trim_start();
        if trimmed.starts_with('[') {
            return serde_json::from_str(trimmed).context("parsing article array json");
        }
        let resp: SearchResponse =
            serde_json::from_str(trimmed).context("parsing search response json")?;
        resp.into_articles()
    }
}

#[async_trait]
impl ArticleSource for FixtureProvider {
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>> {
        let mut out = self.parse()?;
        out.truncate(query.page_size as usize);
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}
