//! Photo repository for archive listings.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{Guest, PortfolioPhoto};
use crate::{PgConnection, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Read-only access to guests and their photos.
pub trait PhotoRepository {
    /// Finds a guest by its unique identifier.
    fn find_guest_by_id(
        &mut self,
        guest_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Guest>>> + Send;

    /// Lists every photo, oldest upload first.
    fn list_portfolio_photos(&mut self) -> impl Future<Output = PgResult<Vec<PortfolioPhoto>>> + Send;

    /// Lists the photos of one guest, oldest upload first.
    fn list_guest_photos(
        &mut self,
        guest_id: Uuid,
    ) -> impl Future<Output = PgResult<Vec<PortfolioPhoto>>> + Send;
}

/// Columns of [`PortfolioPhoto`], in field order.
macro_rules! portfolio_photo_columns {
    () => {
        (
            schema::photos::id,
            schema::photos::guest_id,
            schema::photos::storage_path,
            schema::photos::file_name,
            schema::albums::album_name.nullable(),
            schema::guests::full_name,
            schema::guests::is_anonymous,
            schema::photos::uploaded_at,
        )
    };
}

impl PhotoRepository for PgConnection {
    async fn find_guest_by_id(&mut self, guest_id: Uuid) -> PgResult<Option<Guest>> {
        use schema::guests::{self, dsl};

        let guest = guests::table
            .filter(dsl::id.eq(guest_id))
            .select(Guest::as_select())
            .first(self)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(guest)
    }

    async fn list_portfolio_photos(&mut self) -> PgResult<Vec<PortfolioPhoto>> {
        use schema::{albums, guests, photos};

        let rows = photos::table
            .inner_join(guests::table)
            .left_join(albums::table)
            .order((photos::uploaded_at.asc(), photos::id.asc()))
            .select(portfolio_photo_columns!())
            .load::<PortfolioPhoto>(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, count = rows.len(), "Listed portfolio photos");
        Ok(rows)
    }

    async fn list_guest_photos(&mut self, guest_id: Uuid) -> PgResult<Vec<PortfolioPhoto>> {
        use schema::{albums, guests, photos};

        let rows = photos::table
            .inner_join(guests::table)
            .left_join(albums::table)
            .filter(photos::guest_id.eq(guest_id))
            .order((photos::uploaded_at.asc(), photos::id.asc()))
            .select(portfolio_photo_columns!())
            .load::<PortfolioPhoto>(self)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(
            target: TRACING_TARGET_QUERY,
            %guest_id,
            count = rows.len(),
            "Listed guest photos"
        );
        Ok(rows)
    }
}
