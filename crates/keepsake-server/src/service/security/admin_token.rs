//! Shared admin bearer token.

use std::fmt;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Minimum accepted token length.
const MIN_TOKEN_LENGTH: usize = 16;

/// SHA-256 digest of the configured admin token.
///
/// The plain token is dropped after hashing; presented tokens are hashed and
/// compared digest to digest.
#[derive(Clone)]
pub struct AdminToken {
    digest: Arc<[u8; 32]>,
}

impl AdminToken {
    /// Hashes `token` after checking it is long enough.
    pub fn new(token: &str) -> Result<Self> {
        let token = token.trim();
        if token.len() < MIN_TOKEN_LENGTH {
            return Err(Error::config(format!(
                "admin token must be at least {MIN_TOKEN_LENGTH} characters"
            )));
        }

        Ok(Self {
            digest: Arc::new(digest(token)),
        })
    }

    /// Returns a principal if `presented` is the admin token.
    pub fn authorize(&self, presented: &str) -> Option<AdminPrincipal> {
        self.verify(presented).then_some(AdminPrincipal { _private: () })
    }

    /// Returns `true` if `presented` hashes to the configured digest.
    pub fn verify(&self, presented: &str) -> bool {
        let presented = digest(presented);
        presented
            .iter()
            .zip(self.digest.iter())
            .fold(0_u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

/// Caller that presented the admin token.
///
/// Only [`AdminToken::authorize`] creates one, so holding it is the
/// authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminPrincipal {
    _private: (),
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminToken").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifies_matching_token() -> anyhow::Result<()> {
        let token = AdminToken::new("correct-horse-battery-staple")?;
        assert!(token.verify("correct-horse-battery-staple"));
        assert!(!token.verify("correct-horse-battery-stapler"));
        assert!(!token.verify(""));
        assert!(token.authorize("correct-horse-battery-staple").is_some());
        assert!(token.authorize("wrong").is_none());
        Ok(())
    }

    #[test]
    fn rejects_short_tokens() {
        assert!(AdminToken::new("short").is_err());
        assert!(AdminToken::new("   padded-short   ").is_err());
    }

    #[test]
    fn debug_hides_digest() -> anyhow::Result<()> {
        let token = AdminToken::new("correct-horse-battery-staple")?;
        assert_eq!(format!("{token:?}"), "AdminToken { .. }");
        Ok(())
    }
}
