//! Application state and dependency injection.

pub mod archive;
mod config;
mod security;

use std::sync::Arc;

use keepsake_opendal::ObjectStore;

use crate::service::archive::{ArchiveConfig, ArchivePipeline, PhotoCatalog};
pub use crate::service::config::ServiceConfig;
pub use crate::service::security::{AdminPrincipal, AdminToken};
pub use crate::{Error, Result};

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Debug, Clone)]
pub struct ServiceState {
    pub archive_pipeline: ArchivePipeline,
    pub admin_token: AdminToken,
}

impl ServiceState {
    /// Creates state from already opened stores.
    pub fn new(
        catalog: Arc<dyn PhotoCatalog>,
        store: Arc<dyn ObjectStore>,
        archive_config: ArchiveConfig,
        admin_token: AdminToken,
    ) -> Self {
        Self {
            archive_pipeline: ArchivePipeline::new(catalog, store, archive_config),
            admin_token,
        }
    }

    /// Initializes application state from configuration.
    ///
    /// Connects to Postgres, applies migrations and opens the blob store.
    pub async fn from_config(service_config: &ServiceConfig) -> Result<Self> {
        service_config.validate()?;

        let catalog = service_config.connect_postgres().await?;
        let storage = service_config.connect_storage()?;

        Ok(Self::new(
            Arc::new(catalog),
            storage,
            service_config.archive.clone(),
            service_config.admin_token()?,
        ))
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(archive_pipeline: ArchivePipeline);
impl_di!(admin_token: AdminToken);
