use std::collections::BTreeMap;

use crate::corpus::{Article, CorpusStore};

/// Group articles by topic label. Members keep corpus order; articles without
/// a topic are left out.
pub fn clusters(store: &CorpusStore) -> BTreeMap<String, Vec<&Article>> {
    let mut out: BTreeMap<String, Vec<&Article>> = BTreeMap::new();
    for article in store {
        if let Some(topic) = article.topic_label() {
            out.entry(topic.to_string()).or_default().push(article);
        }
    }
    out
}
