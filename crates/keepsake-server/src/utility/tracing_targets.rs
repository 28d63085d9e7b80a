//! Tracing target constants for structured logging.
//!
//! Filter with e.g. `RUST_LOG=keepsake_server::archive=debug`.

/// Admin bearer token checks.
pub const AUTHENTICATION: &str = "keepsake_server::authentication";

/// Blob fetches performed while building an archive.
pub const ARCHIVE_FETCHER: &str = "keepsake_server::archive::fetcher";

/// Zip writer lifecycle.
pub const ARCHIVE_WRITER: &str = "keepsake_server::archive::writer";

/// Listing, task orchestration and job outcome.
pub const ARCHIVE_PIPELINE: &str = "keepsake_server::archive::pipeline";

/// Response construction and body streaming.
pub const ARCHIVE_RESPONDER: &str = "keepsake_server::archive::responder";

/// Service state initialization.
pub const SERVICE_STATE: &str = "keepsake_server::service::state";

/// Error recovery including middleware errors and request failures.
pub const RECOVERY_ERROR: &str = "keepsake_server::recovery::error";

/// Panic recovery including handler panics.
pub const RECOVERY_PANIC: &str = "keepsake_server::recovery::panic";
