//! Metadata lookups the archive pipeline depends on.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use keepsake_postgres::PgClient;
use keepsake_postgres::query::PhotoRepository;
use uuid::Uuid;

use super::{ArchiveScope, GuestProfile, PhotoRecord};
use crate::Result;

/// Source of guests and photo records.
///
/// Listings are ordered by upload time, oldest first; archives keep that order.
#[async_trait]
pub trait PhotoCatalog: Send + Sync + 'static {
    /// Finds a guest by id.
    async fn find_guest(&self, guest_id: Uuid) -> Result<Option<GuestProfile>>;

    /// Lists the photo records in `scope`.
    async fn list_photos(&self, scope: &ArchiveScope) -> Result<Vec<PhotoRecord>>;
}

#[async_trait]
impl PhotoCatalog for PgClient {
    async fn find_guest(&self, guest_id: Uuid) -> Result<Option<GuestProfile>> {
        let mut conn = self.get_connection().await?;
        let guest = conn.find_guest_by_id(guest_id).await?;
        Ok(guest.map(GuestProfile::from))
    }

    async fn list_photos(&self, scope: &ArchiveScope) -> Result<Vec<PhotoRecord>> {
        let mut conn = self.get_connection().await?;
        let photos = match scope {
            ArchiveScope::AllPhotos => conn.list_portfolio_photos().await?,
            ArchiveScope::GuestPhotos(guest_id) => conn.list_guest_photos(*guest_id).await?,
        };

        Ok(photos.into_iter().map(PhotoRecord::from).collect())
    }
}

/// Catalog held in memory, in insertion order.
///
/// Backs local runs with the `memory` storage backend and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    guests: Arc<HashMap<Uuid, GuestProfile>>,
    photos: Arc<Vec<(Uuid, PhotoRecord)>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a guest.
    pub fn with_guest(mut self, guest: GuestProfile) -> Self {
        Arc::make_mut(&mut self.guests).insert(guest.id, guest);
        self
    }

    /// Adds a photo uploaded by `guest_id`, after all photos added so far.
    pub fn with_photo(mut self, guest_id: Uuid, photo: PhotoRecord) -> Self {
        Arc::make_mut(&mut self.photos).push((guest_id, photo));
        self
    }
}

#[async_trait]
impl PhotoCatalog for InMemoryCatalog {
    async fn find_guest(&self, guest_id: Uuid) -> Result<Option<GuestProfile>> {
        Ok(self.guests.get(&guest_id).cloned())
    }

    async fn list_photos(&self, scope: &ArchiveScope) -> Result<Vec<PhotoRecord>> {
        let photos = self
            .photos
            .iter()
            .filter(|(owner, _)| match scope {
                ArchiveScope::AllPhotos => true,
                ArchiveScope::GuestPhotos(guest_id) => owner == guest_id,
            })
            .map(|(_, photo)| photo.clone())
            .collect();

        Ok(photos)
    }
}
