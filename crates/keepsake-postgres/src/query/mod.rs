//! Database query repositories.

mod photo;

pub use photo::PhotoRepository;
