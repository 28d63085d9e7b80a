//! Blob retrieval with a three-way outcome.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use keepsake_opendal::ObjectStore;

use crate::utility::tracing_targets::ARCHIVE_FETCHER as TRACING_TARGET;

/// Result of fetching one object. Never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Full object contents.
    Fetched(Bytes),
    /// The object does not exist.
    NotFound,
    /// The store failed or timed out.
    Transient(String),
}

impl FetchOutcome {
    /// Returns `true` if the object bytes were retrieved.
    #[inline]
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched(_))
    }
}

/// Reads whole objects from blob storage, bounded per call by a timeout.
#[derive(Clone)]
pub struct ObjectFetcher {
    store: Arc<dyn ObjectStore>,
    timeout: Duration,
}

impl ObjectFetcher {
    /// Creates a new fetcher over `store`.
    pub fn new(store: Arc<dyn ObjectStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Returns the per-call timeout.
    #[inline]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches the object at `path`.
    pub async fn fetch(&self, path: &str) -> FetchOutcome {
        if path.is_empty() {
            tracing::warn!(target: TRACING_TARGET, "photo has no storage path");
            return FetchOutcome::NotFound;
        }

        match tokio::time::timeout(self.timeout, self.store.get_object(path)).await {
            Ok(Ok(bytes)) => {
                tracing::debug!(target: TRACING_TARGET, path, size = bytes.len(), "object fetched");
                FetchOutcome::Fetched(bytes)
            }
            Ok(Err(err)) if err.is_not_found() => {
                tracing::warn!(target: TRACING_TARGET, path, "object not found");
                FetchOutcome::NotFound
            }
            Ok(Err(err)) => {
                tracing::warn!(target: TRACING_TARGET, path, error = %err, "object fetch failed");
                FetchOutcome::Transient(err.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path,
                    timeout = ?self.timeout,
                    "object fetch timed out"
                );
                FetchOutcome::Transient(format!("timed out after {:?}", self.timeout))
            }
        }
    }
}

impl fmt::Debug for ObjectFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFetcher")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use keepsake_opendal::{StorageBackend, StorageError, StorageResult};

    use super::*;

    struct StalledStore;

    #[async_trait]
    impl ObjectStore for StalledStore {
        async fn get_object(&self, _path: &str) -> StorageResult<Bytes> {
            futures::future::pending().await
        }
    }

    struct DeniedStore;

    #[async_trait]
    impl ObjectStore for DeniedStore {
        async fn get_object(&self, path: &str) -> StorageResult<Bytes> {
            Err(StorageError::permission_denied(path))
        }
    }

    #[tokio::test]
    async fn fetches_existing_object() -> anyhow::Result<()> {
        let backend = StorageBackend::memory()?;
        backend.write("guests/ada/1.jpg", &b"jpeg"[..]).await?;

        let fetcher = ObjectFetcher::new(Arc::new(backend), Duration::from_secs(5));
        let outcome = fetcher.fetch("guests/ada/1.jpg").await;
        assert_eq!(outcome, FetchOutcome::Fetched(Bytes::from_static(b"jpeg")));
        Ok(())
    }

    #[tokio::test]
    async fn missing_object_is_not_found() -> anyhow::Result<()> {
        let fetcher = ObjectFetcher::new(Arc::new(StorageBackend::memory()?), Duration::from_secs(5));
        assert_eq!(fetcher.fetch("nope.jpg").await, FetchOutcome::NotFound);
        assert_eq!(fetcher.fetch("").await, FetchOutcome::NotFound);
        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_transient() {
        let fetcher = ObjectFetcher::new(Arc::new(StalledStore), Duration::from_secs(30));
        let outcome = fetcher.fetch("slow.jpg").await;
        assert!(matches!(outcome, FetchOutcome::Transient(_)));
    }

    #[tokio::test]
    async fn store_failure_is_transient() {
        let fetcher = ObjectFetcher::new(Arc::new(DeniedStore), Duration::from_secs(5));
        let outcome = fetcher.fetch("secret.jpg").await;
        assert!(matches!(outcome, FetchOutcome::Transient(_)));
        assert!(!outcome.is_fetched());
    }
}
