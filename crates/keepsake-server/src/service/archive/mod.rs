//! Streaming zip archives of portfolio photos.
//!
//! [`ArchivePipeline`] lists photo records through a [`PhotoCatalog`],
//! fetches each object through an [`ObjectFetcher`] and writes it into an
//! [`ArchiveWriter`] that streams straight to the client. Missing or
//! unreadable photos are skipped and counted; only output failures and
//! cancellation abort an archive.

mod catalog;
mod config;
mod cursor;
mod error;
mod fetcher;
mod job;
mod namer;
mod pipeline;
mod record;
mod responder;
mod writer;

pub use catalog::{InMemoryCatalog, PhotoCatalog};
pub use config::{ArchiveConfig, ArchiveConfigBuilder};
pub use cursor::{BytesEmitted, StreamCursor};
pub use error::{ArchiveError, ArchiveResult};
pub use fetcher::{FetchOutcome, ObjectFetcher};
pub use job::{ArchiveJob, ArchiveSummary, JobState};
pub use namer::EntryNamer;
pub use pipeline::{ArchiveHandle, ArchivePipeline, ArchiveStream};
pub use record::{ArchiveRequest, ArchiveScope, GuestProfile, PhotoRecord};
pub use responder::{
    StreamResponder, content_disposition, guest_archive_name, portfolio_archive_name,
};
pub use writer::{ArchiveWriter, CompressionLevel, WriterState};

#[cfg(test)]
pub(crate) use writer::tests::read_entries;
