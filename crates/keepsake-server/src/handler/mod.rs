//! All `axum::`[`Router`]s with related `axum::`[`Handler`]s.
//!
//! [`Router`]: axum::routing::Router
//! [`Handler`]: axum::handler::Handler

mod error;
mod health;
mod portfolio;
mod response;

use axum::Router;
use axum::response::{IntoResponse, Response};

pub use crate::handler::error::{Error, ErrorKind, Result};
pub use crate::handler::response::{ErrorResponse, Health};
use crate::service::ServiceState;

#[inline]
async fn fallback() -> Response {
    ErrorKind::NotFound.into_response()
}

/// Returns a [`Router`] with every route and a JSON `404` fallback.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .merge(portfolio::routes())
        .merge(health::routes())
        .fallback(fallback)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use axum_test::TestServer;
    use keepsake_opendal::StorageBackend;

    use crate::handler::routes;
    use crate::service::archive::{ArchiveConfig, InMemoryCatalog};
    use crate::service::{AdminToken, ServiceState};

    pub const ADMIN_TOKEN: &str = "correct-horse-battery-staple";

    /// Returns state over an in-memory catalog and blob store.
    pub fn create_test_state(
        catalog: InMemoryCatalog,
        store: StorageBackend,
    ) -> anyhow::Result<ServiceState> {
        Ok(ServiceState::new(
            Arc::new(catalog),
            Arc::new(store),
            ArchiveConfig::default(),
            AdminToken::new(ADMIN_TOKEN)?,
        ))
    }

    /// Returns a new [`TestServer`] with all routes and the given state.
    pub fn create_test_server_with_state(state: ServiceState) -> anyhow::Result<TestServer> {
        let app = routes().with_state(state);
        let server = TestServer::new(app)?;
        Ok(server)
    }

    /// Returns a new [`TestServer`] over empty stores.
    pub fn create_test_server() -> anyhow::Result<TestServer> {
        let state = create_test_state(InMemoryCatalog::new(), StorageBackend::memory()?)?;
        create_test_server_with_state(state)
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/admin/unknown").await;
        response.assert_status_not_found();

        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "not_found");
        Ok(())
    }
}
