//! Offline analytics over a saved search API response (or a bare JSON array of
//! articles): cleans the records and prints trending topics, sentiment over
//! time, topic clusters and, optionally, related articles as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use news_trend_analyzer::ingest::{self, providers::FixtureProvider};
use news_trend_analyzer::{ArticleAnalyzer, CorpusStore};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(name = "corpus_report", about = "Corpus analytics over a saved article dump")]
struct Cli {
    /// JSON file: search API response envelope or array of articles
    #[arg(short, long)]
    input: PathBuf,

    /// Number of trending topics to list
    #[arg(long, default_value_t = 5)]
    top_topics: usize,

    /// Index (after cleaning) of an article to find related articles for
    #[arg(long)]
    related_to: Option<usize>,

    /// Number of related articles to list
    #[arg(long, default_value_t = 3)]
    top_related: usize,
}

fn main() -> Result<()> {
    news_trend_analyzer::init_tracing();
    let cli = Cli::parse();

    let content = std::fs::read_to_string(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let raw = FixtureProvider::from_fixture(&content).parse()?;
    let raw_count = raw.len();

    let store = CorpusStore::new(ingest::process_articles(raw));
    tracing::info!(raw = raw_count, kept = store.len(), "corpus loaded");

    let analyzer = ArticleAnalyzer::new(&store);
    let clusters: Vec<_> = analyzer
        .clusters()
        .into_iter()
        .map(|(topic, members)| {
            let titles: Vec<&str> = members.iter().map(|a| a.title.as_str()).collect();
            json!({ "topic": topic, "titles": titles })
        })
        .collect();

    let related = match cli.related_to {
        Some(i) => {
            let target = store
                .articles()
                .get(i)
                .with_context(|| format!("--related-to {i} out of range (corpus has {})", store.len()))?;
            let hits: Vec<_> = analyzer
                .related_scored(target, cli.top_related)
                .into_iter()
                .map(|r| json!({ "score": r.score, "title": r.article.title }))
                .collect();
            Some(hits)
        }
        None => None,
    };

    let report = json!({
        "articles": store.len(),
        "trending_topics": analyzer.trending_topics(cli.top_topics),
        "sentiment_over_time": analyzer.sentiment_over_time(),
        "clusters": clusters,
        "related": related,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
