//! AI adapter: provider abstraction + in-memory response cache + daily limit.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::ai::AiConfig;

// ------------------------------------------------------------
// Public surface
// ------------------------------------------------------------

/// The four text-analysis calls made per article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiTask {
    Summary,
    KeyPoints,
    Sentiment,
    Topic,
}

impl AiTask {
    pub const ALL: [AiTask; 4] = [
        AiTask::Summary,
        AiTask::KeyPoints,
        AiTask::Sentiment,
        AiTask::Topic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiTask::Summary => "summary",
            AiTask::KeyPoints => "key_points",
            AiTask::Sentiment => "sentiment",
            AiTask::Topic => "topic",
        }
    }

    /// Completion-style prompt for `text`.
    pub fn prompt(&self, text: &str) -> String {
        match self {
            AiTask::Summary => format!("Summarize the following article:\n\n{text}\n\nSummary:"),
            AiTask::KeyPoints => {
                format!("List the key points from the following article:\n\n{text}\n\nKey Points:")
            }
            AiTask::Sentiment => {
                format!("Analyze the sentiment of the following text:\n\n{text}\n\nSentiment:")
            }
            AiTask::Topic => {
                format!("Identify the main topic of the following article:\n\n{text}\n\nTopic:")
            }
        }
    }
}

/// Result returned by AI providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiResult {
    pub text: String,
}

/// Trait object used elsewhere in the app (handlers/tests).
pub trait AiClient: Send + Sync {
    /// Run `task` over `input`; `None` when disabled, limited or failed.
    fn complete<'a>(
        &'a self,
        task: AiTask,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiResult>> + Send + 'a>>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynAiClient = Arc<dyn AiClient>;

/// Factory: build a client according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock`, returns a deterministic mock client.
/// * Else if `config.enabled==false`, returns a disabled client.
/// * Else builds the real provider (OpenAI) wrapped with caching + daily limit.
pub fn build_client_from_config(config: &AiConfig) -> DynAiClient {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Arc::new(CachingClient::new(MockProvider, config.daily_limit));
    }

    if !config.enabled {
        return Arc::new(DisabledClient);
    }

    match config.provider.as_str() {
        "openai" => match OpenAiProvider::new(config) {
            Ok(provider) => Arc::new(CachingClient::new(provider, config.daily_limit)),
            Err(e) => {
                tracing::warn!(target: "ai", error = ?e, "openai provider init failed; AI disabled");
                Arc::new(DisabledClient)
            }
        },
        other => {
            tracing::warn!(target: "ai", provider = other, "unknown AI provider; AI disabled");
            Arc::new(DisabledClient)
        }
    }
}

// ------------------------------------------------------------
// Provider abstraction + concrete providers
// ------------------------------------------------------------

/// Low-level provider: does a *real* remote call. Separated so we can reuse the same
/// caching wrapper for production and tests.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        task: AiTask,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiResult>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// OpenAI provider (Chat Completions API).
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiProvider {
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("news-trend-analyzer/0.1")
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            http,
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            max_tokens: cfg.max_tokens,
            temperature: cfg.temperature,
        })
    }
}

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        task: AiTask,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiResult>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let prompt = task.prompt(input);
            let req = Req {
                model: &self.model,
                messages: vec![Msg {
                    role: "user",
                    content: &prompt,
                }],
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let resp = match self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(target: "ai", error = %e, task = task.as_str(), "openai request failed");
                    return None;
                }
            };

            if !resp.status().is_success() {
                tracing::warn!(target: "ai", status = %resp.status(), task = task.as_str(), "openai non-success");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.trim())
                .unwrap_or("");
            if content.is_empty() {
                None
            } else {
                Some(AiResult {
                    text: content.to_string(),
                })
            }
        })
    }
    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Returns `None` always; used when AI is disabled.
pub struct DisabledClient;

impl AiClient for DisabledClient {
    fn complete<'a>(
        &'a self,
        _task: AiTask,
        _input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiResult>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Deterministic provider for tests/local runs.
#[derive(Clone, Copy)]
pub struct MockProvider;

impl MockProvider {
    pub fn answer(task: AiTask, input: &str) -> String {
        match task {
            AiTask::Summary => {
                let words: Vec<&str> = input.split_whitespace().take(12).collect();
                format!("Summary: {}", words.join(" "))
            }
            AiTask::KeyPoints => "- first point\n- second point".to_string(),
            AiTask::Sentiment => "Neutral".to_string(),
            AiTask::Topic => "General".to_string(),
        }
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        task: AiTask,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiResult>> + Send + 'a>> {
        let out = AiResult {
            text: Self::answer(task, input),
        };
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching client wrapper (memory cache + daily limit)
// ------------------------------------------------------------

/// Entries kept in memory before the oldest ones are evicted.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

pub struct CachingClient<P: Provider> {
    inner: P,
    daily_limit_max: u32,
    state: Mutex<CacheState>,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, AiResult>,
    // insertion order, oldest first
    order: VecDeque<String>,
    capacity: usize,
    counter: DailyCounter,
}

impl CacheState {
    fn insert(&mut self, key: String, value: AiResult) {
        if self.entries.insert(key.clone(), value).is_none() {
            self.order.push_back(key);
        }
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, daily_limit_max: u32) -> Self {
        Self {
            inner,
            daily_limit_max,
            state: Mutex::new(CacheState {
                capacity: DEFAULT_CACHE_CAPACITY,
                ..CacheState::default()
            }),
        }
    }

    pub fn with_cache_capacity(self, capacity: usize) -> Self {
        self.lock().capacity = capacity;
        self
    }

    /// Real provider calls made (or in flight) today.
    pub fn calls_today(&self) -> u32 {
        let mut g = self.lock();
        g.counter.roll_over(today());
        g.counter.count
    }

    pub fn cached_entries(&self) -> usize {
        self.lock().entries.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }

    async fn complete_impl(&self, task: AiTask, input: &str) -> Option<AiResult> {
        let key = cache_key(task, input);

        // 1) Cache lookup (free), then reserve a slot under the daily limit.
        let reserved_on = {
            let mut g = self.lock();
            if let Some(hit) = g.entries.get(&key) {
                counter!("ai_cache_hits_total").increment(1);
                return Some(hit.clone());
            }
            g.counter.roll_over(today());
            if g.counter.count >= self.daily_limit_max {
                counter!("ai_limited_total").increment(1);
                tracing::debug!(target: "ai", task = task.as_str(), "daily limit reached");
                return None;
            }
            g.counter.count += 1;
            g.counter.date
        };

        // 2) Real call; a failed call gives its slot back.
        counter!("ai_calls_total", "task" => task.as_str()).increment(1);
        let Some(fresh) = self.inner.fetch(task, input).await else {
            let mut g = self.lock();
            if g.counter.date == reserved_on {
                g.counter.count = g.counter.count.saturating_sub(1);
            }
            return None;
        };
        self.lock().insert(key, fresh.clone());
        Some(fresh)
    }
}

impl<P: Provider> AiClient for CachingClient<P> {
    fn complete<'a>(
        &'a self,
        task: AiTask,
        input: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<AiResult>> + Send + 'a>> {
        Box::pin(self.complete_impl(task, input))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

fn cache_key(task: AiTask, input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(task.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for b in digest.iter().take(16) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

// ------------------------------------------------------------
// Daily counter
// ------------------------------------------------------------

#[derive(Debug, Clone)]
struct DailyCounter {
    date: NaiveDate,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn roll_over(&mut self, now: NaiveDate) {
        if self.date != now {
            self.date = now;
            self.count = 0;
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ------------------------------------------------------------
// Output shaping
// ------------------------------------------------------------

/// Single label out of a free-form answer: first non-empty line, trimmed,
/// trailing period removed, at most 64 chars.
pub fn sanitize_label(input: &str) -> String {
    let line = input
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let line = line.trim_end_matches('.').trim();
    line.chars().take(64).collect::<String>().trim().to_string()
}

/// One key point per line; bullet markers and blank lines dropped.
pub fn split_key_points(input: &str) -> Vec<String> {
    input
        .lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
