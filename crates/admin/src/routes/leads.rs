//! Lead upload and distribution views.

use std::path::Path as FsPath;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{
        Multipart, Path, State, multipart::MultipartError, rejection::PathRejection,
    },
    http::StatusCode,
    routing::{get, post},
};

use leaddesk_core::AgentId;

use super::{ApiResponse, agent_id};
use crate::error::AppError;
use crate::ingest::FileFormat;
use crate::middleware::RequireAdminAuth;
use crate::models::Lead;
use crate::services::{DistributionSummary, RecipientGroup, UploadedFile};
use crate::state::AppState;

/// Multipart field carrying the lead file.
pub const UPLOAD_FIELD: &str = "file";

/// Build the leads router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/leads/upload", post(upload))
        .route("/api/leads/distribution", get(distribution))
        .route("/api/leads/agent/{id}", get(for_agent))
}

/// Upload a lead file and split it across every agent.
///
/// POST /api/leads/upload
async fn upload(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<DistributionSummary>>, AppError> {
    let (file_name, bytes) = read_upload(multipart).await?;

    let upload = UploadedFile::stage(&state.config().uploads.dir, &file_name, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to stage upload: {e}")))?;
    tracing::info!(
        admin_id = %admin.id,
        file_name = %file_name,
        bytes = bytes.len(),
        path = %upload.path().display(),
        "upload staged"
    );

    let summary = state.coordinator().upload_and_distribute(upload).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// Pull the file field out of the form, checking its extension before any
/// bytes are buffered.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().filter(|name| !name.is_empty()) else {
            continue;
        };
        let file_name = file_name.to_owned();

        FileFormat::from_path(FsPath::new(&file_name))
            .map_err(|e| AppError::UnsupportedMediaType(e.to_string()))?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok((file_name, bytes));
    }

    Err(AppError::BadRequest("No file uploaded".to_string()))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// GET /api/leads/distribution
async fn distribution(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<RecipientGroup>>>, AppError> {
    let groups = state.queries().grouped_by_recipient().await?;
    Ok(Json(ApiResponse::ok(groups)))
}

/// GET /api/leads/agent/{id}
async fn for_agent(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    path: Result<Path<AgentId>, PathRejection>,
) -> Result<Json<ApiResponse<Vec<Lead>>>, AppError> {
    let id = agent_id(path)?;
    let leads = state.queries().list_by_recipient(id).await?;
    Ok(Json(ApiResponse::ok(leads)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        extract::DefaultBodyLimit,
        http::{Request, header},
    };
    use tempfile::TempDir;

    use super::*;
    use crate::routes::test_support::{app, send};

    const BOUNDARY: &str = "leaddesk-test-boundary";

    fn multipart_body(field: &str, file_name: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        )
    }

    fn upload_request(uri: &str, body: String) -> Request<Body> {
        Request::post(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    /// Router exposing only the form reader, so no session is needed.
    fn reader_app(limit: usize) -> Router {
        async fn handler(multipart: Multipart) -> Result<String, AppError> {
            let (name, bytes) = read_upload(multipart).await?;
            Ok(format!("{name}:{}", bytes.len()))
        }

        Router::new()
            .route("/read", post(handler))
            .layer(DefaultBodyLimit::max(limit))
    }

    async fn read(body: String, limit: usize) -> (StatusCode, String) {
        use tower::ServiceExt;

        let response = reader_app(limit)
            .oneshot(upload_request("/read", body))
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_reads_file_field() {
        let body = multipart_body("file", "leads.CSV", "FirstName,Phone\nAda,+1555\n");
        let (status, text) = read(body, 1024).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(text, "leads.CSV:26");
    }

    #[tokio::test]
    async fn test_missing_file_is_bad_request() {
        let body = multipart_body("document", "leads.csv", "FirstName,Phone\n");
        let (status, text) = read(body, 1024).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(text.contains("No file uploaded"));

        let body = multipart_body("file", "", "");
        let (status, _) = read(body, 1024).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_rejected() {
        let body = multipart_body("file", "leads.txt", "FirstName,Phone\n");
        let (status, text) = read(body, 1024).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert!(text.contains("UNSUPPORTED_FORMAT"));
        assert!(text.contains(".txt"));
    }

    #[tokio::test]
    async fn test_oversized_upload_is_rejected() {
        let body = multipart_body("file", "leads.csv", &"x".repeat(4096));
        let (status, text) = read(body, 512).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert!(text.contains("PAYLOAD_TOO_LARGE"));
    }

    #[tokio::test]
    async fn test_upload_requires_session_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let body = multipart_body("file", "leads.csv", "FirstName,Phone\nAda,+1555\n");

        let (status, json) = send(app(dir.path()), upload_request("/api/leads/upload", body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
