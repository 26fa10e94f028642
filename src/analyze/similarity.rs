//! # Similarity
//! TF-IDF vectors over article bodies and cosine nearest-neighbour lookup.
//!
//! Weighting follows the usual vector-space defaults:
//! - tokens are runs of 2+ word characters, lower-cased, English stop words removed
//! - tf is the raw term count
//! - idf is smoothed: `ln((1 + n) / (1 + df)) + 1`
//! - every row is L2-normalized, so cosine similarity is a plain dot product
//!
//! The index is rebuilt from scratch on every lookup; there is no incremental
//! update path.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::stopwords::is_stop_word;
use crate::corpus::{Article, CorpusStore};

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?u)\b\w\w+\b").expect("token regex"));

/// Lower-cased, stop-word-filtered tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE_TOKEN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// Sparse row: `(term id, weight)` sorted by term id.
type SparseRow = Vec<(usize, f64)>;

/// Fitted TF-IDF matrix over a fixed list of documents.
#[derive(Debug, Clone)]
pub struct TfIdfIndex {
    vocabulary: HashMap<String, usize>,
    rows: Vec<SparseRow>,
}

impl TfIdfIndex {
    /// Fit the vocabulary and idf on `docs` and vectorize every document.
    pub fn fit(docs: &[&str]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<HashMap<usize, f64>> = Vec::with_capacity(docs.len());

        for doc in docs {
            let mut tf: HashMap<usize, f64> = HashMap::new();
            for token in tokenize(doc) {
                let next = vocabulary.len();
                let id = *vocabulary.entry(token).or_insert(next);
                *tf.entry(id).or_insert(0.0) += 1.0;
            }
            counts.push(tf);
        }

        let mut df = vec![0usize; vocabulary.len()];
        for tf in &counts {
            for &id in tf.keys() {
                df[id] += 1;
            }
        }

        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        let rows = counts
            .into_iter()
            .map(|tf| {
                let mut row: SparseRow = tf.into_iter().map(|(id, c)| (id, c * idf[id])).collect();
                row.sort_by_key(|&(id, _)| id);
                let norm = row.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for (_, w) in row.iter_mut() {
                        *w /= norm;
                    }
                }
                row
            })
            .collect();

        Self { vocabulary, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    /// Cosine similarity between documents `a` and `b`. Zero vectors score 0.
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        match (self.rows.get(a), self.rows.get(b)) {
            (Some(ra), Some(rb)) => sparse_dot(ra, rb),
            _ => 0.0,
        }
    }
}

// Both rows are sorted by term id.
fn sparse_dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j, mut acc) = (0, 0, 0.0);
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                acc += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    acc
}

/// One lookup hit.
#[derive(Debug, Clone, Serialize)]
pub struct Related<'a> {
    pub score: f64,
    pub article: &'a Article,
}

/// The `top_n` corpus articles most similar to `target`, best first.
///
/// Ties keep corpus order. The target is not excluded if it is also part of
/// the corpus; it then scores ~1.0 against itself.
pub fn related_scored<'a>(store: &'a CorpusStore, target: &Article, top_n: usize) -> Vec<Related<'a>> {
    if store.is_empty() || top_n == 0 {
        return Vec::new();
    }

    let mut docs: Vec<&str> = store.iter().map(|a| a.content.as_str()).collect();
    docs.push(target.content.as_str());
    let index = TfIdfIndex::fit(&docs);
    let target_row = docs.len() - 1;

    let mut scored: Vec<Related<'a>> = store
        .iter()
        .enumerate()
        .map(|(i, article)| Related {
            score: index.cosine(target_row, i),
            article,
        })
        .collect();

    // stable: equal scores stay in corpus order
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_n);
    scored
}

/// Like [`related_scored`] without the scores.
pub fn related<'a>(store: &'a CorpusStore, target: &Article, top_n: usize) -> Vec<&'a Article> {
    related_scored(store, target, top_n)
        .into_iter()
        .map(|r| r.article)
        .collect()
}
