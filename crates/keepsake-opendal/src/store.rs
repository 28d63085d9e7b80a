//! Read-only object access used by the archive pipeline.

use async_trait::async_trait;
use bytes::Bytes;

use crate::{StorageBackend, StorageResult};

/// Read access to photo originals keyed by storage path.
///
/// Implementations must report absent objects as [`StorageError::NotFound`]
/// so that callers can skip them instead of failing.
///
/// [`StorageError::NotFound`]: crate::StorageError::NotFound
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Returns the full contents of the object at `path`.
    async fn get_object(&self, path: &str) -> StorageResult<Bytes>;
}

#[async_trait]
impl ObjectStore for StorageBackend {
    async fn get_object(&self, path: &str) -> StorageResult<Bytes> {
        self.read(path).await
    }
}
