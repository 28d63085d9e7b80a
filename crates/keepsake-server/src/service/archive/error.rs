//! Archive error types.

use uuid::Uuid;

use super::ArchiveScope;

/// Result type for archive operations.
pub type ArchiveResult<T, E = ArchiveError> = Result<T, E>;

/// Errors that stop an archive before or while it is streamed.
///
/// Per-object fetch failures are not errors; they are counted as skips.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// The requested guest does not exist.
    #[error("guest {0} not found")]
    GuestNotFound(Uuid),

    /// The scope has no photos, so no archive is produced.
    #[error("nothing to archive for {0}")]
    NothingToArchive(ArchiveScope),

    /// Listing records from the metadata store failed.
    #[error("listing photos failed: {0}")]
    Listing(#[source] crate::Error),

    /// Writing to the output stream failed.
    #[error("archive output failed: {0}")]
    Io(#[from] std::io::Error),

    /// The zip encoder rejected an entry or failed to finalize.
    #[error("zip encoding failed: {0}")]
    Zip(#[from] async_zip::error::ZipError),

    /// The writer was already finalized or aborted.
    #[error("archive writer is {0}")]
    WriterClosed(&'static str),

    /// The job was cancelled before it finished.
    #[error("archive aborted: {0}")]
    Aborted(String),
}
