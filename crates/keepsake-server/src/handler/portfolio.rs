//! Admin portfolio archive downloads.

use axum::Router;
use axum::extract::State;
use axum::routing::get;
use uuid::Uuid;

use crate::extract::{AdminSession, Path};
use crate::handler::Result;
use crate::service::ServiceState;
use crate::service::archive::{ArchivePipeline, ArchiveRequest, StreamResponder};

/// Tracing target for portfolio downloads.
const TRACING_TARGET: &str = "keepsake_server::handler::portfolio";

/// Streams every photo of the portfolio as one zip archive.
async fn download_portfolio(
    admin: AdminSession,
    State(pipeline): State<ArchivePipeline>,
) -> Result<StreamResponder> {
    tracing::info!(target: TRACING_TARGET, "portfolio archive requested");
    stream_archive(&pipeline, &admin, ArchiveRequest::all_photos()).await
}

/// Streams one guest's photos as a zip archive.
async fn download_guest_portfolio(
    admin: AdminSession,
    Path(guest_id): Path<Uuid>,
    State(pipeline): State<ArchivePipeline>,
) -> Result<StreamResponder> {
    tracing::info!(target: TRACING_TARGET, %guest_id, "guest archive requested");
    stream_archive(&pipeline, &admin, ArchiveRequest::guest_photos(guest_id)).await
}

async fn stream_archive(
    pipeline: &ArchivePipeline,
    admin: &AdminSession,
    request: ArchiveRequest,
) -> Result<StreamResponder> {
    let stream = pipeline.build(admin.principal(), request).await?;
    let portfolio_name = &pipeline.config().portfolio_archive_name;
    Ok(StreamResponder::for_scope(stream, request.scope(), portfolio_name))
}

/// Returns a [`Router`] with the admin archive routes.
pub fn routes() -> Router<ServiceState> {
    Router::new()
        .route("/admin/portfolio/archive", get(download_portfolio))
        .route("/admin/guests/{guest_id}/archive", get(download_guest_portfolio))
}

#[cfg(test)]
mod tests {
    use axum::http::header;
    use axum_test::TestServer;
    use bytes::Bytes;
    use keepsake_opendal::StorageBackend;

    use super::*;
    use crate::handler::test::{ADMIN_TOKEN, create_test_server_with_state, create_test_state};
    use crate::service::archive::{GuestProfile, InMemoryCatalog, PhotoRecord, read_entries};

    struct Wedding {
        server: TestServer,
        guest: GuestProfile,
        shy_guest: GuestProfile,
    }

    /// One guest with two stored photos and one missing, plus a guest without photos.
    async fn wedding() -> anyhow::Result<Wedding> {
        let guest = GuestProfile {
            id: Uuid::new_v4(),
            full_name: Some("Grace Hopper".into()),
            is_anonymous: false,
        };
        let shy_guest = GuestProfile {
            id: Uuid::new_v4(),
            full_name: None,
            is_anonymous: true,
        };

        let store = StorageBackend::memory()?;
        let mut catalog = InMemoryCatalog::new()
            .with_guest(guest.clone())
            .with_guest(shy_guest.clone());
        for index in 1..=3 {
            let path = format!("{}/{index}.jpg", guest.id);
            if index != 2 {
                store.write(&path, Bytes::from(vec![index as u8; 256])).await?;
            }
            let photo = PhotoRecord::new(Uuid::new_v4(), path, guest.display_name())
                .with_file_name(format!("DSC_{index}.jpg"));
            catalog = catalog.with_photo(guest.id, photo);
        }

        let state = create_test_state(catalog, store)?;
        Ok(Wedding {
            server: create_test_server_with_state(state)?,
            guest,
            shy_guest,
        })
    }

    #[tokio::test]
    async fn portfolio_archive_skips_missing_photos() -> anyhow::Result<()> {
        let wedding = wedding().await?;
        let response = wedding
            .server
            .get("/admin/portfolio/archive")
            .authorization_bearer(ADMIN_TOKEN)
            .await;

        response.assert_status_ok();
        assert_eq!(response.header(header::CONTENT_TYPE), "application/zip");
        assert_eq!(response.header(header::CACHE_CONTROL), "no-store");
        let disposition = response.header(header::CONTENT_DISPOSITION);
        let disposition = disposition.to_str()?;
        assert!(disposition.starts_with("attachment; filename=\"wedding-photo-portfolio-"));
        assert!(disposition.contains("filename*=UTF-8''wedding-photo-portfolio-"));

        let entries = read_entries(response.as_bytes().to_vec()).await?;
        let names: Vec<_> = entries.into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["Grace Hopper/DSC_1.jpg", "Grace Hopper/DSC_3.jpg"]);
        Ok(())
    }

    #[tokio::test]
    async fn guest_archive_is_named_after_guest() -> anyhow::Result<()> {
        let wedding = wedding().await?;
        let response = wedding
            .server
            .get(&format!("/admin/guests/{}/archive", wedding.guest.id))
            .authorization_bearer(ADMIN_TOKEN)
            .await;

        response.assert_status_ok();
        let disposition = response.header(header::CONTENT_DISPOSITION);
        assert!(
            disposition
                .to_str()?
                .starts_with("attachment; filename=\"Grace_Hopper_photos_")
        );
        Ok(())
    }

    #[tokio::test]
    async fn not_found_responses() -> anyhow::Result<()> {
        let wedding = wedding().await?;

        let response = wedding
            .server
            .get(&format!("/admin/guests/{}/archive", Uuid::new_v4()))
            .authorization_bearer(ADMIN_TOKEN)
            .await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Guest not found");

        let response = wedding
            .server
            .get(&format!("/admin/guests/{}/archive", wedding.shy_guest.id))
            .authorization_bearer(ADMIN_TOKEN)
            .await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "No photos found for this guest.");
        Ok(())
    }

    #[tokio::test]
    async fn empty_portfolio_is_not_found() -> anyhow::Result<()> {
        let state = create_test_state(InMemoryCatalog::new(), StorageBackend::memory()?)?;
        let server = create_test_server_with_state(state)?;

        let response = server
            .get("/admin/portfolio/archive")
            .authorization_bearer(ADMIN_TOKEN)
            .await;
        response.assert_status_not_found();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "No photos found in the portfolio.");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_guest_id_is_bad_request() -> anyhow::Result<()> {
        let wedding = wedding().await?;
        let response = wedding
            .server
            .get("/admin/guests/not-a-uuid/archive")
            .authorization_bearer(ADMIN_TOKEN)
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Invalid path parameter format");
        Ok(())
    }

    #[tokio::test]
    async fn archives_require_admin_token() -> anyhow::Result<()> {
        let wedding = wedding().await?;

        let response = wedding.server.get("/admin/portfolio/archive").await;
        response.assert_status_unauthorized();

        let response = wedding
            .server
            .get(&format!("/admin/guests/{}/archive", wedding.guest.id))
            .authorization_bearer("not-the-admin-token")
            .await;
        response.assert_status_unauthorized();
        let body: serde_json::Value = response.json();
        assert_eq!(body["name"], "unauthorized");
        Ok(())
    }
}
