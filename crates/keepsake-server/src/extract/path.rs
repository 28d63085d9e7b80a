use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use derive_more::{Deref, DerefMut, From};
use serde::de::DeserializeOwned;

use crate::handler::{Error, ErrorKind};

/// Path parameter extractor that rejects with a JSON [`Error`].
///
/// Malformed parameters, such as a guest id that is not a UUID, become a
/// `400` with the message `Invalid path parameter format`.
#[must_use]
#[derive(Debug, Clone, Copy, Default, Deref, DerefMut, From)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    /// Returns the inner path parameters.
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let extractor =
            <AxumPath<T> as FromRequestParts<S>>::from_request_parts(parts, state).await;
        extractor.map(|x| Self(x.0)).map_err(Into::into)
    }
}

impl From<PathRejection> for Error<'static> {
    fn from(rejection: PathRejection) -> Self {
        match rejection {
            PathRejection::FailedToDeserializePathParams(err) => ErrorKind::BadRequest
                .with_message("Invalid path parameter format")
                .with_context(format!(
                    "{}. {}",
                    sanitize_error_message(&err.body_text()),
                    parameter_hint(&err.body_text()),
                )),
            PathRejection::MissingPathParams(_) => ErrorKind::MissingPathParam
                .with_message("Required path parameter missing"),
            _ => ErrorKind::InternalServerError.with_message("Path processing failed"),
        }
    }
}

/// Returns a format hint for the parameter that failed to parse.
fn parameter_hint(error_message: &str) -> &'static str {
    let error_lower = error_message.to_lowercase();

    if error_lower.contains("uuid") || error_lower.contains("invalid character") {
        "Identifiers must be UUIDs: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx"
    } else {
        "Check that the parameter format matches the expected type"
    }
}

/// Keeps the first two lines and at most 150 characters.
fn sanitize_error_message(message: &str) -> String {
    message
        .lines()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(150)
        .collect()
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum_test::TestServer;
    use uuid::Uuid;

    use super::*;

    async fn echo(Path(id): Path<Uuid>) -> String {
        id.to_string()
    }

    #[tokio::test]
    async fn rejects_malformed_uuid() -> anyhow::Result<()> {
        let server = TestServer::new(Router::new().route("/guests/{id}", get(echo)))?;

        let id = Uuid::new_v4();
        server
            .get(&format!("/guests/{id}"))
            .await
            .assert_text(id.to_string());

        let response = server.get("/guests/not-a-uuid").await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Invalid path parameter format");
        Ok(())
    }
}
