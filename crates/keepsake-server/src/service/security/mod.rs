//! Admin credential handling.

mod admin_token;

pub use admin_token::{AdminPrincipal, AdminToken};
