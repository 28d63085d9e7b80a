//! Archive error to HTTP error conversion.

use super::http_error::{Error as HttpError, ErrorKind};
use crate::service::archive::{ArchiveError, ArchiveScope};

/// Tracing target for archive error conversions.
const TRACING_TARGET: &str = "keepsake_server::handler::archive";

impl From<ArchiveError> for HttpError<'static> {
    fn from(error: ArchiveError) -> Self {
        match error {
            ArchiveError::GuestNotFound(guest_id) => {
                tracing::warn!(target: TRACING_TARGET, %guest_id, "guest not found");
                ErrorKind::NotFound
                    .with_message("Guest not found")
                    .with_resource("guest")
            }
            ArchiveError::NothingToArchive(ArchiveScope::GuestPhotos(guest_id)) => {
                tracing::info!(target: TRACING_TARGET, %guest_id, "guest has no photos");
                ErrorKind::NotFound
                    .with_message("No photos found for this guest.")
                    .with_resource("photo")
            }
            ArchiveError::NothingToArchive(ArchiveScope::AllPhotos) => {
                tracing::info!(target: TRACING_TARGET, "portfolio has no photos");
                ErrorKind::NotFound
                    .with_message("No photos found in the portfolio.")
                    .with_resource("photo")
            }
            error => {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %error,
                    "archive generation failed"
                );
                ErrorKind::InternalServerError.with_message("Failed to generate portfolio ZIP")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[test]
    fn not_found_messages() {
        let error = HttpError::from(ArchiveError::GuestNotFound(Uuid::nil()));
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(error.message(), Some("Guest not found"));

        let error = HttpError::from(ArchiveError::NothingToArchive(ArchiveScope::GuestPhotos(
            Uuid::nil(),
        )));
        assert_eq!(error.message(), Some("No photos found for this guest."));

        let error = HttpError::from(ArchiveError::NothingToArchive(ArchiveScope::AllPhotos));
        assert_eq!(error.message(), Some("No photos found in the portfolio."));
    }

    #[test]
    fn listing_failure_is_internal() {
        let cause = crate::Error::database("pool timed out");
        let error = HttpError::from(ArchiveError::Listing(cause));
        assert_eq!(error.kind(), ErrorKind::InternalServerError);
        assert_eq!(error.message(), Some("Failed to generate portfolio ZIP"));
        assert_eq!(error.context(), None);
    }
}
