//! # Corpus
//! In-memory, ordered collection of cleaned and (optionally) annotated articles.
//!
//! A `CorpusStore` is built once per analysis session and only ever read
//! afterwards. Insertion order is the fetch/annotation order and is what every
//! analytics operation uses for tie-breaking.

use serde::{Deserialize, Serialize};

/// A single cleaned, optionally annotated news record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    /// ISO-8601 timestamp as delivered by the search API (may be date-only).
    #[serde(default, rename = "publishedAt")]
    pub published_at: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,
}

impl Article {
    /// Convenience constructor for content-only articles.
    pub fn with_content(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    /// Topic label, if present and non-empty.
    pub fn topic_label(&self) -> Option<&str> {
        non_empty(self.topic.as_deref())
    }

    /// Sentiment label, if present and non-empty.
    pub fn sentiment_label(&self) -> Option<&str> {
        non_empty(self.sentiment.as_deref())
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|v| !v.is_empty())
}

/// Read-only snapshot of the articles under analysis.
#[derive(Debug, Clone, Default)]
pub struct CorpusStore {
    articles: Vec<Article>,
}

impl CorpusStore {
    /// Build a store from a batch of cleaned articles.
    ///
    /// Articles with empty `content` are dropped, so they take no part in any
    /// analytics even when they carry a topic or sentiment (search results that
    /// only have a description end up here). Everything else keeps its position
    /// relative to the input.
    pub fn new(articles: Vec<Article>) -> Self {
        let total = articles.len();
        let articles: Vec<Article> = articles
            .into_iter()
            .filter(|a| !a.content.is_empty())
            .collect();
        let dropped = total - articles.len();
        if dropped > 0 {
            tracing::info!(target: "corpus", dropped, kept = articles.len(), "dropped articles without content");
        }
        Self { articles }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Article> {
        self.articles.iter()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

impl FromIterator<Article> for CorpusStore {
    fn from_iter<I: IntoIterator<Item = Article>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CorpusStore {
    type Item = &'a Article;
    type IntoIter = std::slice::Iter<'a, Article>;

    fn into_iter(self) -> Self::IntoIter {
        self.articles.iter()
    }
}
