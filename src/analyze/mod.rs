// src/analyze/mod.rs
//! Corpus analytics: trending topics, sentiment over time, related-article
//! lookup and topic clusters. Every operation is a read over an immutable
//! `CorpusStore`; nothing is cached between calls.

pub mod cluster;
pub mod similarity;
pub mod stopwords;
pub mod trend;

use std::collections::BTreeMap;
use std::time::Instant;

use metrics::histogram;

use crate::corpus::{Article, CorpusStore};

// Re-export convenient types.
pub use crate::analyze::similarity::{Related, TfIdfIndex};

/// Facade bundling the four analytics operations over one borrowed store.
#[derive(Debug, Clone, Copy)]
pub struct ArticleAnalyzer<'a> {
    store: &'a CorpusStore,
}

impl<'a> ArticleAnalyzer<'a> {
    pub fn new(store: &'a CorpusStore) -> Self {
        Self { store }
    }

    pub fn trending_topics(&self, top_n: usize) -> Vec<(String, usize)> {
        timed("trending", || trend::trending_topics(self.store, top_n))
    }

    pub fn sentiment_over_time(&self) -> BTreeMap<String, BTreeMap<String, usize>> {
        timed("sentiment", || trend::sentiment_over_time(self.store))
    }

    pub fn related(&self, target: &Article, top_n: usize) -> Vec<&'a Article> {
        timed("related", || similarity::related(self.store, target, top_n))
    }

    pub fn related_scored(&self, target: &Article, top_n: usize) -> Vec<Related<'a>> {
        timed("related", || similarity::related_scored(self.store, target, top_n))
    }

    pub fn clusters(&self) -> BTreeMap<String, Vec<&'a Article>> {
        timed("clusters", || cluster::clusters(self.store))
    }
}

fn timed<T>(op: &'static str, f: impl FnOnce() -> T) -> T {
    let t0 = Instant::now();
    let out = f();
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("analytics_duration_ms", "op" => op).record(ms);
    tracing::debug!(target: "analyze", op, ms, "analytics op finished");
    out
}
