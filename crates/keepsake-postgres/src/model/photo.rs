//! Photo projection used to build archives.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use super::owner_display_name;

/// Photo joined with its guest and optional album.
///
/// Columns are selected by position in [`PhotoRepository`](crate::query::PhotoRepository).
#[derive(Debug, Clone, PartialEq, Queryable)]
pub struct PortfolioPhoto {
    /// Unique photo identifier.
    pub id: Uuid,
    /// Guest who uploaded the photo.
    pub guest_id: Uuid,
    /// Object key in blob storage.
    pub storage_path: String,
    /// Original file name, if recorded.
    pub file_name: Option<String>,
    /// Album the photo is filed under.
    pub album_name: Option<String>,
    /// Full name of the uploading guest.
    pub guest_full_name: Option<String>,
    /// Whether the uploading guest is anonymous.
    pub guest_is_anonymous: bool,
    /// Upload time; archives follow this order.
    pub uploaded_at: Timestamp,
}

impl PortfolioPhoto {
    /// Returns the owner folder name for this photo.
    pub fn owner_display_name(&self) -> String {
        owner_display_name(self.guest_full_name.as_deref(), self.guest_is_anonymous)
    }
}
