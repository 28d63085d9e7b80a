#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Embeds all migrations into the final binary.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!();

// Tracing target constants for consistent logging.

/// Tracing target for client-related operations.
pub const TRACING_TARGET_CLIENT: &str = "keepsake_postgres::client";

/// Tracing target for database query operations.
pub const TRACING_TARGET_QUERY: &str = "keepsake_postgres::queries";

/// Tracing target for database migration operations.
pub const TRACING_TARGET_MIGRATION: &str = "keepsake_postgres::migrations";

/// Tracing target for connection establishment and pool management.
pub const TRACING_TARGET_CONNECTION: &str = "keepsake_postgres::connection";

mod client;
mod error;
pub mod model;
pub mod query;
mod schema;

pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, PgClient, PgClientMigrationExt, PgConfig, PgPoolStatus, PooledConnection,
};
pub use crate::error::{PgError, PgResult};
