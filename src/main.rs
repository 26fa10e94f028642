//! News Trend Analyzer: binary entrypoint.
//! Boots the Axum HTTP server: config, tracing, metrics, shared state and routes.

use news_trend_analyzer::config::{self, app::AppConfig};
use news_trend_analyzer::metrics::Metrics;
use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // .env.default, then .env overriding it; both optional.
    let loaded = config::load_env_files(".");

    news_trend_analyzer::init_tracing();
    tracing::info!(env_files = loaded, "starting news-trend-analyzer");

    if std::env::var("AI_QUICK_PROBE").ok().as_deref() == Some("1") {
        if let Err(e) = news_trend_analyzer::run_ai_quick_probe().await {
            tracing::warn!(error = ?e, "AI quick probe didn't run");
        }
    }

    let cfg = AppConfig::load_default()?;
    let metrics = Metrics::init(&cfg.server)?;
    let router = news_trend_analyzer::app_with_config(&cfg)?.merge(metrics.router());

    Ok(router.into())
}
