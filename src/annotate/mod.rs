// src/annotate/mod.rs
//! Article annotation: summary, key points, sentiment and topic from the LLM.

pub mod ai_adapter;

use crate::annotate::ai_adapter::{sanitize_label, split_key_points, AiClient, AiTask};
use crate::corpus::Article;

pub use ai_adapter::{build_client_from_config, DisabledClient, DynAiClient};

/// Run all four tasks over `article.content`. A task that yields nothing leaves
/// its field absent (or empty, for key points). Blank content is returned as-is
/// without calling the client.
pub async fn annotate_article(ai: &dyn AiClient, mut article: Article) -> Article {
    if article.content.trim().is_empty() {
        tracing::debug!(target: "annotate", title = %article.title, "skipping article without content");
        return article;
    }
    let text = article.content.clone();

    for task in AiTask::ALL {
        let Some(out) = ai.complete(task, &text).await else {
            tracing::debug!(target: "annotate", task = task.as_str(), provider = ai.provider_name(), "no AI output");
            continue;
        };
        match task {
            AiTask::Summary => article.summary = non_empty(out.text.trim().to_string()),
            AiTask::KeyPoints => article.key_points = split_key_points(&out.text),
            AiTask::Sentiment => article.sentiment = non_empty(sanitize_label(&out.text)),
            AiTask::Topic => article.topic = non_empty(sanitize_label(&out.text)),
        }
    }

    article
}

/// Annotate a batch sequentially, preserving order.
pub async fn annotate_all(ai: &dyn AiClient, articles: Vec<Article>) -> Vec<Article> {
    let mut out = Vec::with_capacity(articles.len());
    for article in articles {
        out.push(annotate_article(ai, article).await);
    }
    tracing::info!(target: "annotate", count = out.len(), provider = ai.provider_name(), "annotated batch");
    out
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::ai_adapter::{CachingClient, MockProvider};

    #[tokio::test]
    async fn disabled_client_keeps_upstream_labels() {
        let a = Article {
            topic: Some("upstream".into()),
            ..Article::with_content("text")
        };
        let out = annotate_article(&DisabledClient, a).await;
        assert_eq!(out.topic.as_deref(), Some("upstream"));
        assert!(out.summary.is_none());
        assert!(out.key_points.is_empty());
    }

    #[tokio::test]
    async fn blank_content_is_not_sent() {
        let client = CachingClient::new(MockProvider, 100);
        let a = Article {
            description: "has a description".into(),
            ..Article::with_content("  \n ")
        };
        let out = annotate_article(&client, a).await;
        assert_eq!(client.calls_today(), 0);
        assert_eq!(client.cached_entries(), 0);
        assert!(out.summary.is_none());
        assert!(out.topic.is_none());
        assert_eq!(out.description, "has a description");
    }

    #[tokio::test]
    async fn mock_client_fills_every_field() {
        let client = CachingClient::new(MockProvider, 100);
        let out = annotate_article(&client, Article::with_content("stocks rose today")).await;
        assert_eq!(out.summary.as_deref(), Some("Summary: stocks rose today"));
        assert_eq!(out.key_points, vec!["first point", "second point"]);
        assert_eq!(out.sentiment.as_deref(), Some("Neutral"));
        assert_eq!(out.topic.as_deref(), Some("General"));
    }
}
