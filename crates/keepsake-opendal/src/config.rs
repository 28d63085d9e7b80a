//! Storage configuration types.

use std::fmt;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{StorageError, StorageResult};

/// Storage backend selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BackendType {
    /// Local filesystem rooted at [`StorageConfig::root`].
    #[default]
    Fs,
    /// In-process memory store. Contents are lost on restart.
    Memory,
    /// Amazon S3 or an S3-compatible service.
    S3,
}

/// Blob storage configuration.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Storage backend used for photo originals.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "STORAGE_BACKEND", value_enum, default_value_t = BackendType::Fs)
    )]
    pub backend_type: BackendType,

    /// Root directory (fs) or key prefix (s3) that storage paths are relative to.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-root", env = "STORAGE_ROOT", default_value = "./data/photos")
    )]
    pub root: String,

    /// Bucket name (s3 only).
    #[cfg_attr(feature = "config", arg(long = "storage-bucket", env = "STORAGE_BUCKET"))]
    pub bucket: Option<String>,

    /// Bucket region (s3 only).
    #[cfg_attr(feature = "config", arg(long = "storage-region", env = "STORAGE_REGION"))]
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services such as MinIO or R2.
    #[cfg_attr(feature = "config", arg(long = "storage-endpoint", env = "STORAGE_ENDPOINT"))]
    pub endpoint: Option<String>,

    /// Access key id (s3 only).
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-access-key-id", env = "STORAGE_ACCESS_KEY_ID")
    )]
    pub access_key_id: Option<String>,

    /// Secret access key (s3 only).
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-secret-access-key", env = "STORAGE_SECRET_ACCESS_KEY")
    )]
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Creates a filesystem configuration rooted at `root`.
    pub fn fs(root: impl Into<String>) -> Self {
        Self {
            backend_type: BackendType::Fs,
            root: root.into(),
            ..Self::memory()
        }
    }

    /// Creates an in-memory configuration.
    pub fn memory() -> Self {
        Self {
            backend_type: BackendType::Memory,
            root: "/".to_owned(),
            bucket: None,
            region: None,
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }

    /// Creates an S3 configuration for `bucket`.
    pub fn s3(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            backend_type: BackendType::S3,
            bucket: Some(bucket.into()),
            region: Some(region.into()),
            ..Self::memory()
        }
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Validates the configuration for the selected backend.
    pub fn validate(&self) -> StorageResult<()> {
        match self.backend_type {
            BackendType::Fs if self.root.trim().is_empty() => Err(StorageError::init(
                "filesystem storage requires a non-empty root directory",
            )),
            BackendType::S3 if self.bucket.as_deref().is_none_or(str::is_empty) => Err(
                StorageError::init("s3 storage requires a bucket name"),
            ),
            BackendType::S3 if self.access_key_id.is_some() != self.secret_access_key.is_some() => {
                Err(StorageError::init(
                    "s3 access key id and secret access key must be provided together",
                ))
            }
            _ => Ok(()),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::fs("./data/photos")
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend_type", &self.backend_type)
            .field("root", &self.root)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid_fs() {
        let config = StorageConfig::default();
        assert_eq!(config.backend_type, BackendType::Fs);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reject_empty_fs_root() {
        assert!(StorageConfig::fs("  ").validate().is_err());
    }

    #[test]
    fn s3_requires_bucket_and_paired_credentials() {
        let mut config = StorageConfig::s3("wedding-photos", "eu-west-1");
        assert!(config.validate().is_ok());

        config.access_key_id = Some("AKIA".to_owned());
        assert!(config.validate().is_err());

        config = config.with_credentials("AKIA", "secret");
        assert!(config.validate().is_ok());

        config.bucket = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn debug_masks_secret() {
        let config = StorageConfig::s3("bucket", "us-east-1").with_credentials("id", "hunter2");
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn backend_type_display() {
        assert_eq!(BackendType::Fs.to_string(), "fs");
        assert_eq!(BackendType::S3.as_ref(), "s3");
    }
}
