//! Inputs of an archive build.

use std::fmt;

use keepsake_postgres::model::{Guest, PortfolioPhoto};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which photos one archive contains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "guestId", rename_all = "camelCase")]
pub enum ArchiveScope {
    /// Every photo in the portfolio.
    AllPhotos,
    /// Photos uploaded by one guest.
    GuestPhotos(Uuid),
}

impl fmt::Display for ArchiveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllPhotos => f.write_str("portfolio"),
            Self::GuestPhotos(guest_id) => write!(f, "guest {guest_id}"),
        }
    }
}

/// One archive build request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveRequest {
    scope: ArchiveScope,
}

impl ArchiveRequest {
    /// Requests an archive of the whole portfolio.
    pub const fn all_photos() -> Self {
        Self {
            scope: ArchiveScope::AllPhotos,
        }
    }

    /// Requests an archive of one guest's photos.
    pub const fn guest_photos(guest_id: Uuid) -> Self {
        Self {
            scope: ArchiveScope::GuestPhotos(guest_id),
        }
    }

    /// Returns the requested scope.
    #[inline]
    pub const fn scope(&self) -> ArchiveScope {
        self.scope
    }
}

/// Photo metadata needed to place one object in an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    pub id: Uuid,
    pub storage_path: String,
    pub file_name: Option<String>,
    pub album_name: Option<String>,
    pub owner_display_name: String,
}

impl PhotoRecord {
    /// Creates a record without file or album name.
    pub fn new(id: Uuid, storage_path: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            id,
            storage_path: storage_path.into(),
            file_name: None,
            album_name: None,
            owner_display_name: owner.into(),
        }
    }

    /// Sets the original file name.
    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Sets the album name.
    pub fn with_album(mut self, album_name: impl Into<String>) -> Self {
        self.album_name = Some(album_name.into());
        self
    }
}

impl From<PortfolioPhoto> for PhotoRecord {
    fn from(photo: PortfolioPhoto) -> Self {
        let owner_display_name = photo.owner_display_name();
        Self {
            id: photo.id,
            storage_path: photo.storage_path,
            file_name: photo.file_name,
            album_name: photo.album_name,
            owner_display_name,
        }
    }
}

/// Guest as seen by the archive pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub is_anonymous: bool,
}

impl GuestProfile {
    /// Returns the folder name used for this guest's photos.
    pub fn display_name(&self) -> String {
        keepsake_postgres::model::owner_display_name(self.full_name.as_deref(), self.is_anonymous)
    }
}

impl From<Guest> for GuestProfile {
    fn from(guest: Guest) -> Self {
        Self {
            id: guest.id,
            full_name: guest.full_name,
            is_anonymous: guest.is_anonymous,
        }
    }
}
