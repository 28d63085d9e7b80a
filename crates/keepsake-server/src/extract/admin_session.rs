//! Admin bearer token extraction.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use axum_extra::typed_header::TypedHeaderRejectionReason;

use crate::handler::{Error, ErrorKind};
use crate::service::{AdminPrincipal, AdminToken};
use crate::utility::tracing_targets::AUTHENTICATION as TRACING_TARGET;

/// Proof that the request carried the admin bearer token.
///
/// Handlers take this as an argument and pass its [`AdminPrincipal`] on;
/// the token itself is never passed on.
///
/// ```rust,ignore
/// async fn handler(session: AdminSession) -> Result<Response> { ... }
/// ```
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminSession {
    principal: AdminPrincipal,
}

impl AdminSession {
    /// Returns the authorized principal.
    #[inline]
    pub fn principal(&self) -> &AdminPrincipal {
        &self.principal
    }
}

impl<S> FromRequestParts<S> for AdminSession
where
    S: Sync + Send,
    AdminToken: FromRef<S>,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(session) = parts.extensions.get::<Self>() {
            return Ok(*session);
        }

        type AuthBearerHeader = TypedHeader<Authorization<Bearer>>;
        let bearer = match AuthBearerHeader::from_request_parts(parts, state).await {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(rejection) => {
                let error = match rejection.reason() {
                    TypedHeaderRejectionReason::Missing => ErrorKind::MissingAuthToken
                        .with_context("Missing Authorization header with Bearer token"),
                    TypedHeaderRejectionReason::Error(_) => ErrorKind::MalformedAuthToken
                        .with_context("Authorization header must contain a valid Bearer token"),
                    _ => ErrorKind::MalformedAuthToken.into_error(),
                };
                tracing::debug!(target: TRACING_TARGET, error = %error, "admin token rejected");
                return Err(error.with_resource("authentication"));
            }
        };

        let Some(principal) = AdminToken::from_ref(state).authorize(bearer.token()) else {
            tracing::warn!(target: TRACING_TARGET, "invalid admin token");
            return Err(ErrorKind::Unauthorized.with_resource("authentication"));
        };

        let session = Self { principal };
        parts.extensions.insert(session);
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use axum::routing::get;
    use axum_test::TestServer;

    use super::*;

    const TOKEN: &str = "correct-horse-battery-staple";

    async fn protected(_session: AdminSession) -> &'static str {
        "ok"
    }

    fn server() -> anyhow::Result<TestServer> {
        let token = AdminToken::new(TOKEN)?;
        let app = Router::new().route("/", get(protected)).with_state(token);
        Ok(TestServer::new(app)?)
    }

    async fn rejection(server: &TestServer, value: Option<&str>) -> (StatusCode, String) {
        let mut request = server.get("/");
        if let Some(value) = value {
            request = request.add_header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(value).unwrap_or(HeaderValue::from_static("invalid")),
            );
        }

        let response = request.await;
        let body: serde_json::Value = response.json();
        (response.status_code(), body["name"].as_str().unwrap_or_default().to_owned())
    }

    #[tokio::test]
    async fn accepts_admin_token() -> anyhow::Result<()> {
        let server = server()?;
        let response = server
            .get("/")
            .authorization_bearer(TOKEN)
            .await;
        response.assert_status_ok();
        response.assert_text("ok");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_requests() -> anyhow::Result<()> {
        let server = server()?;

        let (status, name) = rejection(&server, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(name, "missing_auth_token");

        let (status, name) = rejection(&server, Some("Basic YWRtaW46YWRtaW4=")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(name, "malformed_auth_token");

        let (status, name) = rejection(&server, Some("Bearer wrong-token-value-here")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(name, "unauthorized");
        Ok(())
    }
}
