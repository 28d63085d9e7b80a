//! Database models for guests, albums and photos.

mod album;
mod guest;
mod photo;

pub use album::Album;
pub use guest::{ANONYMOUS_OWNER, Guest, UNKNOWN_OWNER, owner_display_name};
pub use photo::PortfolioPhoto;
