use serde::{Deserialize, Serialize};

/// Liveness probe body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
}

impl Health {
    /// Reports a running service.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
        }
    }
}
