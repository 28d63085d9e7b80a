//! Embedded schema migrations.

use std::time::Instant;

use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Extension trait adding migration support to [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending embedded migration.
    ///
    /// Returns the versions that were applied, in order. Safe to call repeatedly.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>> + Send;
}

impl PgClientMigrationExt for PgClient {
    #[tracing::instrument(skip(self), target = TRACING_TARGET_MIGRATION)]
    async fn run_pending_migrations(&self) -> PgResult<Vec<String>> {
        tracing::info!(target: TRACING_TARGET_MIGRATION, "Starting database migration process");

        let start_time = Instant::now();
        let conn = self.get_connection().await?;
        let mut conn: AsyncConnectionWrapper<_> = conn.into();

        let versions = spawn_blocking(move || {
            conn.run_pending_migrations(MIGRATIONS)
                .map(|versions| versions.into_iter().map(|v| v.to_string()).collect::<Vec<_>>())
        })
        .await
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Migration task panicked"
            );
            PgError::Migration(err.into())
        })?
        .map_err(|err| {
            tracing::error!(
                target: TRACING_TARGET_MIGRATION,
                error = %err,
                "Database migration process failed"
            );
            PgError::Migration(err)
        })?;

        tracing::info!(
            target: TRACING_TARGET_MIGRATION,
            duration = ?start_time.elapsed(),
            migrations_count = versions.len(),
            "Database migration process completed"
        );

        Ok(versions)
    }
}
