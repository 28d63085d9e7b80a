//! [`Error`], [`ErrorKind`] and [`Result`].

mod archive_error;
mod http_error;

pub use http_error::{Error, ErrorKind, Result};
