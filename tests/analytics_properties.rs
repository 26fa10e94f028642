// tests/analytics_properties.rs
//
// Randomized corpora checked against invariants that must hold for any input.

use std::collections::{HashMap, HashSet};

use news_trend_analyzer::analyze::trend::date_part;
use news_trend_analyzer::{Article, ArticleAnalyzer, CorpusStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TOPICS: &[&str] = &["politics", "finance", "sports", "tech", ""];
const SENTIMENTS: &[&str] = &["Positive", "Negative", "Neutral"];
const DATES: &[&str] = &[
    "2024-05-01T08:00:00Z",
    "2024-05-01T21:15:00Z",
    "2024-05-02T00:00:00Z",
    "2024-05-03",
    "",
];
const WORDS: &[&str] = &[
    "market", "election", "goal", "chip", "rates", "vote", "team", "cloud", "the", "and",
];

fn random_corpus(rng: &mut StdRng) -> CorpusStore {
    let n = rng.random_range(0..40);
    let articles = (0..n)
        .map(|i| {
            let words: Vec<&str> = (0..rng.random_range(1..8))
                .map(|_| WORDS[rng.random_range(0..WORDS.len())])
                .collect();
            Article {
                title: format!("article {i}"),
                content: words.join(" "),
                topic: rng
                    .random_bool(0.7)
                    .then(|| TOPICS[rng.random_range(0..TOPICS.len())].to_string()),
                sentiment: rng
                    .random_bool(0.7)
                    .then(|| SENTIMENTS[rng.random_range(0..SENTIMENTS.len())].to_string()),
                published_at: DATES[rng.random_range(0..DATES.len())].to_string(),
                ..Article::default()
            }
        })
        .collect();
    CorpusStore::new(articles)
}

#[test]
fn invariants_hold_over_random_corpora() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..200 {
        let store = random_corpus(&mut rng);
        let analyzer = ArticleAnalyzer::new(&store);
        let topical: Vec<&Article> = store.iter().filter(|a| a.topic_label().is_some()).collect();

        // clusters: only topic-bearing articles, and all of them
        let clusters = analyzer.clusters();
        let mut members: HashSet<*const Article> = HashSet::new();
        for (topic, group) in &clusters {
            assert!(!topic.is_empty());
            for a in group {
                assert_eq!(a.topic_label(), Some(topic.as_str()));
                assert!(members.insert(*a as *const Article), "article in two clusters");
            }
        }
        let expected: HashSet<*const Article> =
            topical.iter().map(|a| *a as *const Article).collect();
        assert_eq!(members, expected);

        // trending: idempotent, and counts add up to the topical articles
        let distinct = clusters.len();
        let first = analyzer.trending_topics(distinct);
        assert_eq!(first, analyzer.trending_topics(distinct));
        assert_eq!(first.iter().map(|(_, c)| c).sum::<usize>(), topical.len());
        assert!(first.windows(2).all(|w| w[0].1 >= w[1].1));

        // sentiment: exactly the observed (date, sentiment) pairs, no zeros
        let mut observed: HashMap<(String, String), usize> = HashMap::new();
        for a in store.iter() {
            if let Some(s) = a.sentiment_label() {
                if !a.published_at.is_empty() {
                    *observed
                        .entry((date_part(&a.published_at).to_string(), s.to_string()))
                        .or_insert(0) += 1;
                }
            }
        }
        let got: HashMap<(String, String), usize> = analyzer
            .sentiment_over_time()
            .into_iter()
            .flat_map(|(d, by)| by.into_iter().map(move |(s, c)| ((d.clone(), s), c)))
            .collect();
        assert!(got.values().all(|&c| c > 0));
        assert_eq!(got, observed);

        // related: bounded, sorted, scores in [0, 1]
        if let Some(target) = store.articles().first() {
            let hits = analyzer.related_scored(target, 5);
            assert_eq!(hits.len(), store.len().min(5));
            assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
            assert!(hits.iter().all(|h| (0.0..=1.0 + 1e-9).contains(&h.score)));
        }
    }
}
