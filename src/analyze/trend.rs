//! # Trends
//! Topic frequency ranking and per-day sentiment distribution.

use std::collections::{BTreeMap, HashMap};

use crate::corpus::CorpusStore;

/// Count topics and return the `top_n` most frequent, most frequent first.
///
/// Equal counts keep first-encounter order: the topic seen earlier in the
/// corpus ranks higher.
pub fn trending_topics(store: &CorpusStore, top_n: usize) -> Vec<(String, usize)> {
    // (topic, count) in first-encounter order + index for O(1) increments
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for topic in store.iter().filter_map(|a| a.topic_label()) {
        match index.get(topic) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(topic, counts.len());
                counts.push((topic.to_string(), 1));
            }
        }
    }

    // stable: ties stay in insertion order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(top_n);
    counts
}

/// Date portion of a timestamp: everything before the first `T`, or the whole
/// string when there is none.
pub fn date_part(published_at: &str) -> &str {
    published_at
        .split_once('T')
        .map(|(date, _)| date)
        .unwrap_or(published_at)
}

/// `date -> sentiment -> count` over articles carrying both a timestamp and a
/// sentiment. Only observed pairs appear.
pub fn sentiment_over_time(store: &CorpusStore) -> BTreeMap<String, BTreeMap<String, usize>> {
    let mut out: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for article in store {
        let Some(sentiment) = article.sentiment_label() else {
            continue;
        };
        if article.published_at.is_empty() {
            continue;
        }
        let date = date_part(&article.published_at);
        *out.entry(date.to_string())
            .or_default()
            .entry(sentiment.to_string())
            .or_insert(0) += 1;
    }

    out
}
