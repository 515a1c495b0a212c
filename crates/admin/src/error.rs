//! Unified error handling for admin.
//!
//! Every error leaves the API as JSON:
//! `{ "success": false, "kind": "...", "message": "..." }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{AuthError, DistributionError, ErrorKind};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// An upload could not be distributed.
    #[error(transparent)]
    Distribution(#[from] DistributionError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request body exceeded the upload limit.
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Upload is not a supported file type.
    #[error("Unsupported file type: {0}")]
    UnsupportedMediaType(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal(err.to_string()),
            AuthError::UserAlreadyExists => Self::Conflict(err.to_string()),
            AuthError::InvalidEmail(_) | AuthError::WeakPassword => Self::BadRequest(err.to_string()),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    kind: &'a str,
    message: String,
}

impl AppError {
    /// HTTP status and stable kind for this error.
    fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Database(RepositoryError::NotFound) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Database(RepositoryError::Conflict(_)) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Database(_) | Self::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
            }
            Self::Distribution(err) => {
                let kind = err.kind();
                let status = match kind {
                    ErrorKind::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    ErrorKind::NoValidData => StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorKind::NoRecipients => StatusCode::CONFLICT,
                    ErrorKind::UnreadableUpload => StatusCode::BAD_REQUEST,
                    ErrorKind::PersistenceFailure => StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, kind.as_str())
            }
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::UnsupportedMediaType(_) => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorKind::UnsupportedFormat.as_str(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = self.classify();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound | RepositoryError::Conflict(_)) => {
                self.to_string()
            }
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Distribution(DistributionError::Persistence(_)) => {
                "Could not save leads; nothing from this upload was stored".to_string()
            }
            Self::Distribution(DistributionError::RecipientLookup(_)) => {
                "Agent list is temporarily unavailable".to_string()
            }
            Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Unauthorized(m)
            | Self::BadRequest(m)
            | Self::PayloadTooLarge(m)
            | Self::UnsupportedMediaType(m) => m.clone(),
            Self::Distribution(err) => err.to_string(),
        };

        let body = ErrorBody {
            success: false,
            kind,
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from an admin user ID.
pub fn set_sentry_user(admin_user_id: i32, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::ingest::ParseError;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("agent 7".to_string());
        assert_eq!(err.to_string(), "Not found: agent 7");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let (status, body) = render(AppError::NotFound("agent 7".to_string())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);
        assert_eq!(body["kind"], "NOT_FOUND");
        assert_eq!(body["message"], "agent 7");
    }

    #[tokio::test]
    async fn test_distribution_status_codes() {
        let cases = [
            (
                DistributionError::from(ParseError::UnsupportedFormat {
                    extension: ".txt".to_string(),
                }),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
            ),
            (
                DistributionError::from(ParseError::NoValidData),
                StatusCode::UNPROCESSABLE_ENTITY,
                "NO_VALID_DATA",
            ),
            (
                DistributionError::NoRecipients,
                StatusCode::CONFLICT,
                "NO_RECIPIENTS",
            ),
            (
                DistributionError::Persistence(RepositoryError::DataCorruption("x".to_string())),
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_FAILURE",
            ),
            (
                DistributionError::RecipientLookup(RepositoryError::DataCorruption(
                    "x".to_string(),
                )),
                StatusCode::SERVICE_UNAVAILABLE,
                "STORAGE_UNAVAILABLE",
            ),
        ];

        for (err, status, kind) in cases {
            let (got_status, body) = render(AppError::from(err)).await;
            assert_eq!(got_status, status, "{kind}");
            assert_eq!(body["kind"], kind);
        }
    }

    #[tokio::test]
    async fn test_persistence_detail_is_hidden() {
        let err = DistributionError::Persistence(RepositoryError::DataCorruption(
            "constraint lead_phone_check".to_string(),
        ));
        let (_, body) = render(AppError::from(err)).await;
        assert!(!body["message"].as_str().unwrap().contains("lead_phone_check"));
    }

    #[tokio::test]
    async fn test_repository_not_found_and_conflict() {
        let (status, _) = render(AppError::Database(RepositoryError::NotFound)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = render(AppError::Database(RepositoryError::Conflict(
            "an agent with this email already exists".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["message"].as_str().unwrap().contains("already exists"));
    }

    #[test]
    fn test_auth_errors_map_to_statuses() {
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(AuthError::WeakPassword),
            AppError::BadRequest(_)
        ));
    }
}
