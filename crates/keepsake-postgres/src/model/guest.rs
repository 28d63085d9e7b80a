//! Guest model.

use diesel::prelude::*;
use jiff_diesel::Timestamp;
use uuid::Uuid;

use crate::schema::guests;

/// Display name used for guests who uploaded anonymously.
pub const ANONYMOUS_OWNER: &str = "ANONYMOUS";

/// Display name used when a named guest has no usable name.
pub const UNKNOWN_OWNER: &str = "Unknown_Guest";

/// Guest who uploads photos.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = guests)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Guest {
    /// Unique guest identifier.
    pub id: Uuid,
    /// Full name, absent for anonymous guests.
    pub full_name: Option<String>,
    /// Whether the guest chose to stay anonymous.
    pub is_anonymous: bool,
    /// Timestamp when the guest was registered.
    pub created_at: Timestamp,
}

impl Guest {
    /// Returns the name photos of this guest are filed under.
    pub fn display_name(&self) -> String {
        owner_display_name(self.full_name.as_deref(), self.is_anonymous)
    }
}

/// Resolves the owner name of a guest.
///
/// Anonymous guests are always [`ANONYMOUS_OWNER`]; a missing or blank
/// name falls back to [`UNKNOWN_OWNER`].
pub fn owner_display_name(full_name: Option<&str>, is_anonymous: bool) -> String {
    if is_anonymous {
        return ANONYMOUS_OWNER.to_owned();
    }

    match full_name.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => UNKNOWN_OWNER.to_owned(),
    }
}
