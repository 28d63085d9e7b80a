use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::albums;

/// Album that groups photos into one folder of an archive.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = albums)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Album {
    /// Unique album identifier.
    pub id: Uuid,
    /// Folder name shown inside archives.
    pub album_name: String,
    /// Timestamp when the album was created.
    pub created_at: Timestamp,
}
