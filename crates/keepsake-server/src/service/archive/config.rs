use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::CompressionLevel;
use crate::{Error, Result};

/// Default values for archive options.
mod defaults {
    /// Seconds one blob fetch may take before it counts as transient.
    pub const FETCH_TIMEOUT_SECS: u64 = 30;

    /// Fetched photos buffered ahead of the writer.
    pub const PREFETCH: usize = 2;

    /// Bytes buffered between the writer and the response body.
    pub const BUFFER_BYTES: usize = 64 * 1024;

    /// File name prefix of whole-portfolio archives.
    pub fn portfolio_archive_name() -> String {
        "wedding-photo-portfolio".to_owned()
    }
}

const MAX_PREFETCH: usize = 64;
const MIN_BUFFER_BYTES: usize = 4 * 1024;
const MAX_BUFFER_BYTES: usize = 16 * 1024 * 1024;

/// Archive pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
#[builder(
    pattern = "owned",
    setter(into, prefix = "with"),
    build_fn(validate = "Self::validate")
)]
pub struct ArchiveConfig {
    /// Seconds a single photo fetch may take.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = defaults::FETCH_TIMEOUT_SECS)
    )]
    #[builder(default = "defaults::FETCH_TIMEOUT_SECS")]
    pub fetch_timeout_secs: u64,

    /// Number of fetched photos buffered ahead of the zip writer.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ARCHIVE_PREFETCH", default_value_t = defaults::PREFETCH)
    )]
    #[builder(default = "defaults::PREFETCH")]
    pub archive_prefetch: usize,

    /// Bytes buffered between the zip writer and the response body.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "ARCHIVE_BUFFER_BYTES", default_value_t = defaults::BUFFER_BYTES)
    )]
    #[builder(default = "defaults::BUFFER_BYTES")]
    pub archive_buffer_bytes: usize,

    /// Deflate level for archive entries.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "COMPRESSION_LEVEL", value_enum, default_value_t = CompressionLevel::Best)
    )]
    #[builder(default)]
    pub compression_level: CompressionLevel,

    /// File name prefix of whole-portfolio archives.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PORTFOLIO_ARCHIVE_NAME", default_value_t = defaults::portfolio_archive_name())
    )]
    #[builder(default = "defaults::portfolio_archive_name()")]
    pub portfolio_archive_name: String,
}

impl ArchiveConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ArchiveConfigBuilder {
        ArchiveConfigBuilder::default()
    }

    /// Returns the per-fetch timeout.
    #[inline]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Checks that every option is within range.
    pub fn validate(&self) -> Result<()> {
        check_fetch_timeout(self.fetch_timeout_secs)
            .and_then(|_| check_prefetch(self.archive_prefetch))
            .and_then(|_| check_buffer_bytes(self.archive_buffer_bytes))
            .and_then(|_| check_archive_name(&self.portfolio_archive_name))
            .map_err(Error::config)
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: defaults::FETCH_TIMEOUT_SECS,
            archive_prefetch: defaults::PREFETCH,
            archive_buffer_bytes: defaults::BUFFER_BYTES,
            compression_level: CompressionLevel::default(),
            portfolio_archive_name: defaults::portfolio_archive_name(),
        }
    }
}

impl ArchiveConfigBuilder {
    fn validate(builder: &ArchiveConfigBuilder) -> Result<(), String> {
        if let Some(secs) = builder.fetch_timeout_secs {
            check_fetch_timeout(secs)?;
        }
        if let Some(prefetch) = builder.archive_prefetch {
            check_prefetch(prefetch)?;
        }
        if let Some(bytes) = builder.archive_buffer_bytes {
            check_buffer_bytes(bytes)?;
        }
        if let Some(name) = &builder.portfolio_archive_name {
            check_archive_name(name)?;
        }
        Ok(())
    }
}

fn check_fetch_timeout(secs: u64) -> Result<(), String> {
    if !(1..=600).contains(&secs) {
        return Err("Fetch timeout must be between 1 and 600 seconds".to_owned());
    }
    Ok(())
}

fn check_prefetch(prefetch: usize) -> Result<(), String> {
    if !(1..=MAX_PREFETCH).contains(&prefetch) {
        return Err(format!("Archive prefetch must be between 1 and {MAX_PREFETCH}"));
    }
    Ok(())
}

fn check_buffer_bytes(bytes: usize) -> Result<(), String> {
    if !(MIN_BUFFER_BYTES..=MAX_BUFFER_BYTES).contains(&bytes) {
        return Err(format!(
            "Archive buffer must be between {MIN_BUFFER_BYTES} and {MAX_BUFFER_BYTES} bytes"
        ));
    }
    Ok(())
}

fn check_archive_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Portfolio archive name cannot be empty".to_owned());
    }
    if name.contains(['/', '\\', '"']) {
        return Err("Portfolio archive name cannot contain '/', '\\' or '\"'".to_owned());
    }
    Ok(())
}
