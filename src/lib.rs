// src/lib.rs
// Public library surface for the service binary, the report CLI and integration tests.

pub mod ai_bootstrap;
pub mod analyze;
pub mod annotate;
pub mod api;
pub mod config;
pub mod corpus;
pub mod ingest;
pub mod metrics;
pub mod rate_limit;

use std::sync::Arc;

use axum::Router;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ---- Re-exports for stable public API ----
pub use crate::analyze::ArticleAnalyzer;
pub use crate::api::router;
pub use crate::corpus::{Article, CorpusStore};

/// Install the global tracing subscriber. `RUST_LOG` filters (default
/// `news_trend_analyzer=info,warn`); `LOG_FORMAT=json` switches to JSON lines.
/// A subscriber installed earlier (e.g. by the hosting runtime) wins.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("news_trend_analyzer=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let res = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .try_init()
    };
    if res.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Build the service router from a loaded `AppConfig`, the `AiConfig` file
/// (falls back to disabled) and the search API provider.
pub fn app_with_config(cfg: &config::app::AppConfig) -> anyhow::Result<Router> {
    let ai = ai_bootstrap::AiRuntime::from_path_or_disabled(&config::ai::AiConfig::default_path());
    let source = ingest::providers::NewsApiProvider::new(&cfg.newsapi)?;

    info!(
        rate_limit = cfg.server.rate_limit,
        window_secs = cfg.server.rate_limit_window_secs,
        ai_provider = ai.client.provider_name(),
        "building router"
    );

    let state = api::AppState::new(cfg, Arc::new(source), ai.client);
    Ok(api::router(state))
}

/// Call this after tracing init to perform a one-off smoke test of the AI
/// client. It won't panic on failure; it just logs the result.
pub async fn run_ai_quick_probe() -> anyhow::Result<()> {
    let ai = ai_bootstrap::AiRuntime::from_path(&config::ai::AiConfig::default_path())?;
    ai.quick_probe().await;
    info!("AI quick probe finished");
    Ok(())
}
