//! Liveness probe.

use axum::Json;
use axum::Router;
use axum::routing::get;

use crate::handler::response::Health;
use crate::service::ServiceState;

async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// Returns a [`Router`] with the liveness route.
pub fn routes() -> Router<ServiceState> {
    Router::new().route("/health", get(health))
}

#[cfg(test)]
mod tests {
    use crate::handler::response::Health;
    use crate::handler::test::create_test_server;

    #[tokio::test]
    async fn reports_ok() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&Health::ok());
        Ok(())
    }
}
