use crate::i18n::ReadinessConfig;
use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    // Bundles
    pub messages_dir: String,
    pub messages_base_url: Option<String>,
    pub bundle_cache: bool,
    pub bundle_timeout_ms: u64,

    // Readiness gate parameters handed to clients
    pub readiness_delay_ms: u64,
    pub readiness_max_rechecks: u32,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("PORT must be a port number, got '{}'", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            // Bundles - filesystem unless a delivery URL is configured
            messages_dir: std::env::var("MESSAGES_DIR").unwrap_or_else(|_| "messages".to_string()),
            messages_base_url: std::env::var("MESSAGES_BASE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            bundle_cache: std::env::var("BUNDLE_CACHE")
                .map(|v| !matches!(v.trim(), "0" | "false" | "no" | "off"))
                .unwrap_or(true),
            bundle_timeout_ms: std::env::var("BUNDLE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5000),

            // Readiness gate
            readiness_delay_ms: std::env::var("READINESS_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
            readiness_max_rechecks: std::env::var("READINESS_MAX_RECHECKS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),

            port,
        })
    }

    pub fn bundle_timeout(&self) -> Duration {
        Duration::from_millis(self.bundle_timeout_ms)
    }

    pub fn readiness(&self) -> ReadinessConfig {
        ReadinessConfig::new(Duration::from_millis(self.readiness_delay_ms))
            .with_max_rechecks(self.readiness_max_rechecks)
    }
}
