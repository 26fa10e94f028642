// src/ingest/types.rs
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One article record as returned by the search API. Every field may be missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(default, rename = "publishedAt")]
    pub published_at: Option<String>,
    #[serde(default)]
    pub source: Option<RawSource>,
    // Upstream annotations, when the records were already analyzed.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
}

/// The search API nests the source as `{ "id": .., "name": .. }`; flattened
/// dumps carry just the name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawSource {
    Named {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
    Plain(String),
}

impl RawSource {
    pub fn name(&self) -> &str {
        match self {
            RawSource::Named { name, .. } => name.as_deref().unwrap_or_default(),
            RawSource::Plain(s) => s,
        }
    }
}

fn default_sort_by() -> String {
    "popularity".to_string()
}

fn default_page_size() -> u32 {
    10
}

/// Search parameters, shared by the HTTP layer and the providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArticleQuery {
    pub query: String,
    /// `YYYY-MM-DD` lower bound for the publication date.
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default = "default_sort_by")]
    pub sort_by: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl ArticleQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            from_date: None,
            sort_by: default_sort_by(),
            page_size: default_page_size(),
        }
    }
}

#[async_trait::async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self, query: &ArticleQuery) -> Result<Vec<RawArticle>>;
    fn name(&self) -> &'static str;
}
