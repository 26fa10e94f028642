// src/ai_bootstrap.rs
use crate::annotate::ai_adapter::{build_client_from_config, AiTask, DynAiClient};
use crate::config::ai::AiConfig;
use tracing::{info, warn};

pub struct AiRuntime {
    pub cfg: AiConfig,
    pub client: DynAiClient,
}

impl AiRuntime {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let cfg = AiConfig::load_from_file(path)?;
        // Safe diagnostics: only provider + enabled + key length
        info!(
            "AI cfg loaded: provider={}, model={}, enabled={}, key_len={}",
            cfg.provider,
            cfg.model,
            cfg.enabled,
            cfg.api_key.len()
        );
        let client = build_client_from_config(&cfg);
        Ok(Self { cfg, client })
    }

    /// Like `from_path`, but any config problem yields a disabled runtime
    /// (mock mode via `AI_TEST_MODE` still applies).
    pub fn from_path_or_disabled(path: &str) -> Self {
        match Self::from_path(path) {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = ?e, path, "AI config unavailable; annotations disabled");
                let cfg = AiConfig::default();
                let client = build_client_from_config(&cfg);
                Self { cfg, client }
            }
        }
    }

    pub async fn quick_probe(&self) {
        if !self.cfg.enabled {
            warn!("AI quick_probe skipped: AI is disabled in config");
            return;
        }
        let sample = "Central bank holds rates steady as inflation cools for a third month.";
        let out = self.client.complete(AiTask::Sentiment, sample).await;
        info!("AI quick_probe => {:?}", out);
    }
}
