//! Archive orchestration: listing, fetching and writing.
//!
//! A build lists the records once, then runs two tasks:
//!
//! - the fetch task reads objects in record order and sends them through a
//!   bounded channel, so it never runs more than `archive_prefetch` photos
//!   ahead of the writer;
//! - the writer task names and compresses each photo into one half of a
//!   duplex pipe whose other half is the response body.
//!
//! A full pipe blocks the writer, which fills the channel, which blocks the
//! fetcher. Both tasks share a [`CancellationToken`] that fires when the
//! [`ArchiveStream`] is dropped or aborted.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use keepsake_opendal::ObjectStore;
use pin_project_lite::pin_project;
use tokio::io::{AsyncRead, DuplexStream, ReadBuf};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use uuid::Uuid;

use super::{
    ArchiveConfig, ArchiveError, ArchiveJob, ArchiveRequest, ArchiveResult, ArchiveScope,
    ArchiveSummary, ArchiveWriter, CompressionLevel, EntryNamer, FetchOutcome, GuestProfile,
    ObjectFetcher, PhotoCatalog, PhotoRecord, StreamCursor,
};
use crate::service::AdminPrincipal;
use crate::utility::tracing_targets::ARCHIVE_PIPELINE as TRACING_TARGET;

/// One photo handed from the fetch task to the writer task.
#[derive(Debug)]
struct FetchedPhoto {
    record: PhotoRecord,
    outcome: FetchOutcome,
}

/// Builds streaming zip archives of photo collections.
///
/// Cheap to clone; every [`build`](Self::build) runs an independent job.
#[derive(Clone)]
pub struct ArchivePipeline {
    catalog: Arc<dyn PhotoCatalog>,
    fetcher: ObjectFetcher,
    config: ArchiveConfig,
}

impl ArchivePipeline {
    /// Creates a pipeline reading metadata from `catalog` and bytes from `store`.
    pub fn new(
        catalog: Arc<dyn PhotoCatalog>,
        store: Arc<dyn ObjectStore>,
        config: ArchiveConfig,
    ) -> Self {
        let fetcher = ObjectFetcher::new(store, config.fetch_timeout());
        Self {
            catalog,
            fetcher,
            config,
        }
    }

    /// Returns the archive configuration.
    #[inline]
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Lists the records of `request` and starts streaming their archive.
    ///
    /// Only an authorized admin may build archives. Fails without starting
    /// any task if the guest is unknown, the listing fails or the scope is empty.
    #[tracing::instrument(skip_all, target = TRACING_TARGET, fields(scope = %request.scope()))]
    pub async fn build(
        &self,
        _admin: &AdminPrincipal,
        request: ArchiveRequest,
    ) -> ArchiveResult<ArchiveStream> {
        let scope = request.scope();
        let guest = match scope {
            ArchiveScope::AllPhotos => None,
            ArchiveScope::GuestPhotos(guest_id) => Some(self.resolve_guest(guest_id).await?),
        };

        let records = self
            .catalog
            .list_photos(&scope)
            .await
            .map_err(ArchiveError::Listing)?;
        if records.is_empty() {
            tracing::info!(target: TRACING_TARGET, "nothing to archive");
            return Err(ArchiveError::NothingToArchive(scope));
        }

        tracing::info!(target: TRACING_TARGET, records = records.len(), "archive started");
        let mut stream = self.stream(records);
        stream.guest = guest;
        Ok(stream)
    }

    async fn resolve_guest(&self, guest_id: Uuid) -> ArchiveResult<GuestProfile> {
        self.catalog
            .find_guest(guest_id)
            .await
            .map_err(ArchiveError::Listing)?
            .ok_or(ArchiveError::GuestNotFound(guest_id))
    }

    /// Starts the fetch and writer tasks for `records`.
    ///
    /// An empty list yields a valid archive without entries.
    pub fn stream(&self, records: Vec<PhotoRecord>) -> ArchiveStream {
        let cancel = CancellationToken::new();
        let (photo_tx, photo_rx) = mpsc::channel(self.config.archive_prefetch.max(1));
        let (sink, reader) = tokio::io::duplex(self.config.archive_buffer_bytes.max(1));
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let record_count = records.len();

        let fetch_task = tokio::spawn(fetch_photos(
            self.fetcher.clone(),
            records,
            photo_tx,
            cancel.clone(),
        ));

        let level = self.config.compression_level;
        let writer_cancel = cancel.clone();
        tokio::spawn(async move {
            let fetch = FetchTask {
                handle: fetch_task,
                record_count,
            };
            let outcome = write_archive(photo_rx, fetch, sink, level, writer_cancel).await;
            // The receiver is gone when the body was dropped; the outcome is already logged.
            let _ = outcome_tx.send(outcome);
        });

        ArchiveStream {
            reader,
            outcome: outcome_rx,
            handle: ArchiveHandle {
                cancel: cancel.clone(),
            },
            guard: cancel.drop_guard(),
            record_count,
            guest: None,
        }
    }
}

impl fmt::Debug for ArchivePipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchivePipeline")
            .field("fetcher", &self.fetcher)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Fetches every record in order until done or cancelled.
async fn fetch_photos(
    fetcher: ObjectFetcher,
    records: Vec<PhotoRecord>,
    photo_tx: mpsc::Sender<FetchedPhoto>,
    cancel: CancellationToken,
) {
    for record in records {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            outcome = fetcher.fetch(&record.storage_path) => outcome,
        };

        let sent = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            sent = photo_tx.send(FetchedPhoto { record, outcome }) => sent,
        };

        if sent.is_err() {
            break;
        }
    }

    tracing::debug!(
        target: TRACING_TARGET,
        cancelled = cancel.is_cancelled(),
        "fetch task finished"
    );
}

/// The producer side of one archive, joined once its channel closes.
struct FetchTask {
    handle: JoinHandle<()>,
    record_count: usize,
}

impl FetchTask {
    /// Checks that the fetch task ran to completion and handed over every record.
    ///
    /// A closed channel alone does not prove this: a panicking store also
    /// drops the sender.
    async fn join(self, job: &ArchiveJob) -> ArchiveResult<()> {
        if let Err(err) = self.handle.await {
            return Err(ArchiveError::Aborted(format!("fetch task failed: {err}")));
        }

        let handed_over = job.written() + job.skipped();
        if handed_over != self.record_count {
            return Err(ArchiveError::Aborted(format!(
                "fetch task stopped after {handed_over} of {} photos",
                self.record_count
            )));
        }

        Ok(())
    }
}

/// Writes every fetched photo, then finalizes; aborts on cancellation,
/// output failure or a fetch task that ended early.
async fn write_archive(
    mut photo_rx: mpsc::Receiver<FetchedPhoto>,
    fetch: FetchTask,
    sink: DuplexStream,
    level: CompressionLevel,
    cancel: CancellationToken,
) -> ArchiveResult<ArchiveSummary> {
    let cursor = StreamCursor::new(sink);
    let bytes_emitted = cursor.bytes_emitted();
    let mut writer = ArchiveWriter::new(cursor, level);
    let mut namer = EntryNamer::new();
    let mut job = ArchiveJob::new();

    let mut built = write_entries(&mut photo_rx, &mut writer, &mut namer, &mut job, &cancel).await;
    if built.is_ok() {
        built = fetch.join(&job).await;
    }

    let result = match built {
        Ok(()) => {
            job.begin_finalizing();
            writer.finalize().await.map(|_| ())
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => {
            job.finish();
            let summary = job.summary(bytes_emitted.get());
            tracing::info!(
                target: TRACING_TARGET,
                state = %job.state(),
                entries = summary.entries_written,
                skipped = summary.skipped,
                bytes = summary.bytes_emitted,
                "archive completed"
            );
            Ok(summary)
        }
        Err(err) => {
            writer.abort(&err.to_string());
            job.abort();
            cancel.cancel();
            tracing::warn!(
                target: TRACING_TARGET,
                state = %job.state(),
                entries = job.written(),
                skipped = job.skipped(),
                bytes = bytes_emitted.get(),
                error = %err,
                "archive aborted"
            );
            Err(err)
        }
    }
}

async fn write_entries<W>(
    photo_rx: &mut mpsc::Receiver<FetchedPhoto>,
    writer: &mut ArchiveWriter<W>,
    namer: &mut EntryNamer,
    job: &mut ArchiveJob,
    cancel: &CancellationToken,
) -> ArchiveResult<()>
where
    W: tokio::io::AsyncWrite + Unpin,
{
    loop {
        let received = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(cancelled()),
            received = photo_rx.recv() => received,
        };

        // The fetch task also stops early when cancelled; only a full run may finalize.
        let Some(FetchedPhoto { record, outcome }) = received else {
            if cancel.is_cancelled() {
                return Err(cancelled());
            }
            return Ok(());
        };

        match outcome {
            FetchOutcome::Fetched(bytes) => {
                let name = namer.name(&record);
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(cancelled()),
                    appended = writer.append(&name, &bytes) => appended?,
                }
                job.record_written();
            }
            FetchOutcome::NotFound => {
                tracing::warn!(target: TRACING_TARGET, photo_id = %record.id, "photo skipped: not found");
                job.record_skipped(record.id);
            }
            FetchOutcome::Transient(reason) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    photo_id = %record.id,
                    reason = %reason,
                    "photo skipped: fetch failed"
                );
                job.record_skipped(record.id);
            }
        }
    }
}

fn cancelled() -> ArchiveError {
    ArchiveError::Aborted("cancelled".to_owned())
}

/// Cancels a running archive from outside its body stream.
#[derive(Debug, Clone)]
pub struct ArchiveHandle {
    cancel: CancellationToken,
}

impl ArchiveHandle {
    /// Stops both tasks; the archive ends without a central directory.
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    /// Returns `true` once the archive was aborted or its stream dropped.
    pub fn is_aborted(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

pin_project! {
    /// Readable output of a running archive job.
    ///
    /// Dropping the stream cancels the job.
    pub struct ArchiveStream {
        #[pin]
        reader: DuplexStream,
        outcome: oneshot::Receiver<ArchiveResult<ArchiveSummary>>,
        handle: ArchiveHandle,
        guard: DropGuard,
        record_count: usize,
        guest: Option<GuestProfile>,
    }
}

/// Parts of an [`ArchiveStream`] used to build a response body.
pub(super) struct ArchiveParts {
    pub reader: DuplexStream,
    pub outcome: oneshot::Receiver<ArchiveResult<ArchiveSummary>>,
    pub guard: DropGuard,
}

impl ArchiveStream {
    /// Returns the number of records listed for this archive.
    #[inline]
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Returns the guest of a single-guest archive.
    #[inline]
    pub fn guest(&self) -> Option<&GuestProfile> {
        self.guest.as_ref()
    }

    /// Returns a handle that can abort the job.
    pub fn handle(&self) -> ArchiveHandle {
        self.handle.clone()
    }

    /// Aborts the job.
    pub fn abort(&self) {
        self.handle.abort();
    }

    /// Waits for the job outcome.
    ///
    /// The writer blocks on a full pipe, so read the stream to its end first.
    pub async fn finish(self) -> ArchiveResult<ArchiveSummary> {
        let ArchiveParts { outcome, guard, .. } = self.into_parts();
        let outcome = outcome.await.unwrap_or_else(|_| Err(unreported()));
        drop(guard);
        outcome
    }

    pub(super) fn into_parts(self) -> ArchiveParts {
        ArchiveParts {
            reader: self.reader,
            outcome: self.outcome,
            guard: self.guard,
        }
    }
}

/// Error for a writer task that ended without sending its outcome.
pub(super) fn unreported() -> ArchiveError {
    ArchiveError::Aborted("archive job ended without reporting".to_owned())
}

impl AsyncRead for ArchiveStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.project().reader.poll_read(cx, buf)
    }
}

impl fmt::Debug for ArchiveStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveStream")
            .field("record_count", &self.record_count)
            .field("aborted", &self.handle.is_aborted())
            .finish_non_exhaustive()
    }
}
