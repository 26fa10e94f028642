// src/ingest/mod.rs
pub mod providers;
pub mod types;

use crate::corpus::Article;
use crate::ingest::types::{ArticleQuery, ArticleSource, RawArticle};
use metrics::{counter, describe_counter};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("ingest_raw_total", "Raw records returned by providers.");
        describe_counter!(
            "ingest_kept_total",
            "Records kept after cleaning + description filter."
        );
        describe_counter!(
            "ingest_dropped_total",
            "Records dropped for a missing/empty description."
        );
        describe_counter!(
            "ingest_provider_errors_total",
            "Provider fetch/parse errors."
        );
    });
}

// Non-greedy, no nesting awareness, does not cross line breaks.
static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("tag regex"));
static RE_SPECIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9\s]").expect("special chars regex"));

/// Clean raw article text: strip tags, drop everything but ASCII letters,
/// digits and whitespace, lower-case, trim.
///
/// Lossy: sentence punctuation and all non-ASCII characters disappear.
pub fn clean_text(s: &str) -> String {
    let out = RE_TAGS.replace_all(s, "");
    let out = RE_SPECIAL.replace_all(&out, "");
    out.to_lowercase().trim().to_string()
}

/// Clean one record. Returns `None` when the description is missing or empty,
/// whatever the content looks like.
pub fn process_article(raw: RawArticle) -> Option<Article> {
    let description = raw.description.as_deref().unwrap_or_default();
    if description.is_empty() {
        return None;
    }

    Some(Article {
        title: clean_text(raw.title.as_deref().unwrap_or_default()),
        description: clean_text(description),
        content: clean_text(raw.content.as_deref().unwrap_or_default()),
        published_at: raw.published_at.unwrap_or_default(),
        source: raw
            .source
            .as_ref()
            .map(|s| s.name().to_string())
            .unwrap_or_default(),
        topic: raw.topic,
        sentiment: raw.sentiment,
        summary: None,
        key_points: Vec::new(),
    })
}

/// Clean a batch, preserving order. Output may be shorter than the input.
pub fn process_articles(raw: Vec<RawArticle>) -> Vec<Article> {
    ensure_metrics_described();

    let total = raw.len();
    let kept: Vec<Article> = raw.into_iter().filter_map(process_article).collect();
    let dropped = total - kept.len();

    counter!("ingest_kept_total").increment(kept.len() as u64);
    counter!("ingest_dropped_total").increment(dropped as u64);
    tracing::debug!(target: "ingest", total, kept = kept.len(), dropped, "processed batch");

    kept
}

/// Fetch once from `source`. Provider errors are logged and yield an empty batch.
pub async fn fetch_once(source: &dyn ArticleSource, query: &ArticleQuery) -> Vec<RawArticle> {
    ensure_metrics_described();

    match source.fetch_articles(query).await {
        Ok(raw) => {
            counter!("ingest_raw_total").increment(raw.len() as u64);
            tracing::info!(
                target: "ingest",
                provider = source.name(),
                query = %query.query,
                count = raw.len(),
                "fetched articles"
            );
            raw
        }
        Err(e) => {
            tracing::warn!(target: "ingest", error = ?e, provider = source.name(), "provider error");
            counter!("ingest_provider_errors_total").increment(1);
            Vec::new()
        }
    }
}
