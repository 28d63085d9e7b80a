//! Turns a running archive into an HTTP download.

use std::io;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use jiff::Timestamp;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use tokio_util::io::ReaderStream;

use super::pipeline::{ArchiveParts, unreported};
use super::{ArchiveScope, ArchiveStream};
use crate::utility::tracing_targets::ARCHIVE_RESPONDER as TRACING_TARGET;

/// Streaming `application/zip` response for one archive.
#[derive(Debug)]
pub struct StreamResponder {
    stream: ArchiveStream,
    file_name: String,
}

impl StreamResponder {
    /// Creates a responder serving `stream` as `file_name`.
    pub fn new(stream: ArchiveStream, file_name: impl Into<String>) -> Self {
        Self {
            stream,
            file_name: file_name.into(),
        }
    }

    /// Creates a responder named after the scope and today's UTC date.
    ///
    /// `portfolio_name` prefixes whole-portfolio archives; guest archives are
    /// named after the guest.
    pub fn for_scope(stream: ArchiveStream, scope: ArchiveScope, portfolio_name: &str) -> Self {
        let today = utc_today();
        let file_name = match (scope, stream.guest()) {
            (ArchiveScope::GuestPhotos(_), Some(guest)) => {
                guest_archive_name(&guest.display_name(), today)
            }
            _ => portfolio_archive_name(portfolio_name, today),
        };

        Self::new(stream, file_name)
    }

    /// Returns the download file name.
    #[inline]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl IntoResponse for StreamResponder {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/zip"),
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        match HeaderValue::from_str(&content_disposition(&self.file_name)) {
            Ok(value) => {
                headers.insert(header::CONTENT_DISPOSITION, value);
            }
            Err(err) => {
                tracing::warn!(target: TRACING_TARGET, error = %err, "invalid content disposition");
                headers.insert(
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_static("attachment"),
                );
            }
        }

        tracing::debug!(target: TRACING_TARGET, file_name = %self.file_name, "streaming archive");
        (StatusCode::OK, headers, archive_body(self.stream)).into_response()
    }
}

/// Forwards archive chunks as they are produced.
///
/// At end of input the job outcome decides whether the body ends cleanly or
/// with an error. The body owns the drop guard, so dropping it cancels the job.
fn archive_body(stream: ArchiveStream) -> Body {
    let ArchiveParts {
        reader,
        outcome,
        guard,
    } = stream.into_parts();

    let body = async_stream::stream! {
        let _guard = guard;
        let mut chunks = ReaderStream::new(reader);

        while let Some(chunk) = futures::StreamExt::next(&mut chunks).await {
            match chunk {
                Ok(bytes) => yield Ok::<Bytes, io::Error>(bytes),
                Err(err) => {
                    tracing::warn!(target: TRACING_TARGET, error = %err, "archive read failed");
                    yield Err(err);
                    return;
                }
            }
        }

        match outcome.await.unwrap_or_else(|_| Err(unreported())) {
            Ok(summary) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    entries = summary.entries_written,
                    skipped = summary.skipped,
                    "archive body complete"
                );
            }
            Err(err) => {
                tracing::warn!(target: TRACING_TARGET, error = %err, "archive body terminated");
                yield Err(io::Error::other(err));
            }
        }
    };

    Body::from_stream(body)
}

fn utc_today() -> Date {
    Timestamp::now().to_zoned(TimeZone::UTC).date()
}

/// `<prefix>-YYYY-MM-DD.zip`
pub fn portfolio_archive_name(prefix: &str, date: Date) -> String {
    format!("{}-{date}.zip", prefix.trim())
}

/// `<owner>_photos_YYYY-MM-DD.zip`, owner limited to `[A-Za-z0-9_.-]`.
pub fn guest_archive_name(owner: &str, date: Date) -> String {
    let owner: String = owner
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '_' | '.' | '-' => c,
            _ => '_',
        })
        .collect();
    format!("{owner}_photos_{date}.zip")
}

/// Builds an attachment disposition with an ASCII fallback and an RFC 5987 name.
pub fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            ' '..='~' if c != '"' && c != '\\' => c,
            _ => '_',
        })
        .collect();
    let encoded = urlencoding::encode(file_name);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::to_bytes;
    use keepsake_opendal::StorageBackend;

    use super::*;
    use crate::service::archive::pipeline::tests::{Fixture, admin};
    use crate::service::archive::writer::tests::read_entries;
    use crate::service::archive::{
        ArchiveConfig, ArchivePipeline, ArchiveRequest, InMemoryCatalog, PhotoRecord,
    };

    #[test]
    fn archive_file_names() -> anyhow::Result<()> {
        let date: Date = "2025-06-14".parse()?;
        assert_eq!(
            portfolio_archive_name("wedding-photo-portfolio", date),
            "wedding-photo-portfolio-2025-06-14.zip"
        );
        assert_eq!(
            guest_archive_name("José O'Neil", date),
            "Jos__O_Neil_photos_2025-06-14.zip"
        );
        assert_eq!(
            guest_archive_name("ANONYMOUS", date),
            "ANONYMOUS_photos_2025-06-14.zip"
        );
        Ok(())
    }

    #[test]
    fn disposition_has_ascii_fallback() {
        assert_eq!(
            content_disposition("Zoë \"Z\".zip"),
            "attachment; filename=\"Zo_ _Z_.zip\"; filename*=UTF-8''Zo%C3%AB%20%22Z%22.zip"
        );
        assert_eq!(
            content_disposition("a_photos_2025-06-14.zip"),
            "attachment; filename=\"a_photos_2025-06-14.zip\"; filename*=UTF-8''a_photos_2025-06-14.zip"
        );
    }

    #[tokio::test]
    async fn response_streams_a_complete_archive() -> anyhow::Result<()> {
        let fixture = Fixture::new().await?;
        let scope = ArchiveScope::GuestPhotos(fixture.guest.id);
        let stream = fixture
            .pipeline()
            .build(&admin(), ArchiveRequest::guest_photos(fixture.guest.id))
            .await?;

        let responder = StreamResponder::for_scope(stream, scope, "portfolio");
        assert!(responder.file_name().starts_with("Ada_Lovelace_photos_"));

        let response = responder.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");

        let body = to_bytes(response.into_body(), usize::MAX).await?;
        assert_eq!(read_entries(body.to_vec()).await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn aborted_job_fails_the_body() -> anyhow::Result<()> {
        let guest = uuid::Uuid::new_v4();
        let catalog = InMemoryCatalog::new().with_photo(
            guest,
            PhotoRecord::new(uuid::Uuid::new_v4(), "missing.jpg", "Ada"),
        );
        let pipeline = ArchivePipeline::new(
            Arc::new(catalog),
            Arc::new(StorageBackend::memory()?),
            ArchiveConfig::default(),
        );

        let stream = pipeline.build(&admin(), ArchiveRequest::all_photos()).await?;
        stream.abort();
        let response = StreamResponder::new(stream, "a.zip").into_response();

        assert!(to_bytes(response.into_body(), usize::MAX).await.is_err());
        Ok(())
    }
}
