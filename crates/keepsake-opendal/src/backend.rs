//! Storage backend implementation.

use std::fmt;

use bytes::Bytes;
use opendal::{Operator, services};

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Storage backend that wraps an OpenDAL [`Operator`].
///
/// Cloning is cheap: the operator is reference counted internally.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;
        let operator = Self::create_operator(&config)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend_type,
            root = %config.root,
            "storage backend initialized"
        );

        Ok(Self { operator, config })
    }

    /// Creates an empty in-memory backend.
    pub fn memory() -> StorageResult<Self> {
        Self::new(StorageConfig::memory())
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the backend type.
    pub fn backend_type(&self) -> BackendType {
        self.config.backend_type
    }

    /// Reads an object from storage.
    pub async fn read(&self, path: &str) -> StorageResult<Bytes> {
        tracing::debug!(target: TRACING_TARGET, path = %path, "reading object");

        let data = self.operator.read(path).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "object read complete"
        );

        Ok(data)
    }

    /// Writes an object to storage, replacing any existing content.
    pub async fn write(&self, path: &str, data: impl Into<Bytes>) -> StorageResult<()> {
        let data = data.into();
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "writing object"
        );

        self.operator.write(path, data).await?;
        Ok(())
    }

    /// Checks if an object exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(config: &StorageConfig) -> StorageResult<Operator> {
        match config.backend_type {
            BackendType::Fs => {
                let builder = services::Fs::default().root(&config.root);
                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            BackendType::Memory => {
                let builder = services::Memory::default().root(&config.root);
                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "s3")]
            BackendType::S3 => {
                let bucket = config.bucket.as_deref().unwrap_or_default();
                let mut builder = services::S3::default().bucket(bucket).root(&config.root);

                if let Some(ref region) = config.region {
                    builder = builder.region(region);
                }

                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = config.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[allow(unreachable_patterns)]
            _ => Err(StorageError::init(format!(
                "backend type {} is not supported with current features",
                config.backend_type
            ))),
        }
    }
}

impl fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend_type", &self.config.backend_type)
            .field("root", &self.config.root)
            .finish()
    }
}
