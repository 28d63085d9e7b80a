//! HTTP server with a bounded graceful shutdown.

use std::future::IntoFuture;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::lifecycle::{log_error, serve_with_shutdown};
use super::shutdown::shutdown_signal;
use super::{ServerError, ServerResult};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Starts an HTTP server and stops it on SIGTERM or Ctrl+C.
///
/// After the signal, new connections are refused and open responses get
/// `shutdown_timeout` to finish. Archive downloads still streaming when the
/// timeout elapses are cut off.
pub async fn serve_http(app: Router, server_config: ServerConfig) -> ServerResult<()> {
    if let Err(err) = server_config.validate() {
        let err = ServerError::invalid_config(&err);
        log_error(&err, 0);
        return Err(err);
    }

    let server_addr = server_config.server_addr();
    let listener = match TcpListener::bind(server_addr).await {
        Ok(listener) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_STARTUP,
                addr = %server_addr,
                "Successfully bound to address"
            );
            listener
        }
        Err(err) => {
            let err = ServerError::bind_error(server_addr, err);
            log_error(&err, 0);
            return Err(err);
        }
    };

    let shutdown_timeout = server_config.shutdown_timeout();
    serve_with_shutdown(&server_config, || async move {
        let draining = CancellationToken::new();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(draining.clone().cancelled_owned())
            .into_future();
        tokio::pin!(server);

        tokio::select! {
            result = &mut server => return result.map_err(ServerError::Runtime),
            () = shutdown_signal() => {}
        }

        draining.cancel();
        let started = Instant::now();
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            timeout_secs = shutdown_timeout.as_secs(),
            "Draining open connections"
        );

        match tokio::time::timeout(shutdown_timeout, server).await {
            Ok(result) => {
                tracing::debug!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    drained_ms = started.elapsed().as_millis() as u64,
                    "Open connections drained"
                );
                result.map_err(ServerError::Runtime)
            }
            Err(_) => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVER_SHUTDOWN,
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Shutdown timeout elapsed, cutting off in-flight downloads"
                );
                Ok(())
            }
        }
    })
    .await
}
