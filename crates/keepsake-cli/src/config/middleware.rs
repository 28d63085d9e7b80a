//! Middleware and log format configuration.

use clap::Args;
use keepsake_server::middleware::RecoveryConfig;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Middleware configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Recovery middleware configuration.
    ///
    /// The timeout bounds the time to response headers, not the download.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,

    /// Emits logs as JSON lines instead of human-readable text.
    #[arg(long, env = "LOG_JSON", default_value_t = false)]
    #[serde(default)]
    pub log_json: bool,
}

impl MiddlewareConfig {
    /// Validates the recovery settings.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.recovery.validate()?;
        Ok(())
    }

    /// Logs middleware configuration at info level.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            request_timeout_secs = self.recovery.request_timeout,
            log_json = self.log_json,
            "Middleware configuration"
        );
    }
}
