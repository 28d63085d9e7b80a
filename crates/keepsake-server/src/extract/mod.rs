//! Request extractors with JSON error rejections.
//!
//! - [`AdminSession`] checks the admin bearer token.
//! - [`Path`] wraps axum's path extractor with descriptive 400 responses.

mod admin_session;
mod path;

pub use crate::extract::admin_session::AdminSession;
pub use crate::extract::path::Path;
