//! Authentication route handlers for admin.
//!
//! Email and password login backed by a server-side session.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use super::ApiResponse;
use crate::db::AdminUserRepository;
use crate::error::{AppError, clear_sentry_user};
use crate::middleware::{RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::services::AuthService;
use crate::state::AppState;

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Verify credentials and start an admin session.
///
/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<ApiResponse<CurrentAdmin>>, AppError> {
    let user = AuthService::new(state.pool())
        .login(&request.email, &request.password)
        .await
        .inspect_err(|_| tracing::info!("admin login rejected"))?;

    let admin = CurrentAdmin::from(&user);
    set_current_admin(&session, &admin)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store session: {e}")))?;

    tracing::info!(admin_id = %admin.id, "admin logged in");
    Ok(Json(ApiResponse::ok(admin)))
}

/// End the session.
///
/// POST /api/auth/logout
async fn logout(session: Session) -> Result<Json<ApiResponse<()>>, AppError> {
    clear_current_admin(&session)
        .await
        .map_err(|e| AppError::Internal(format!("failed to clear session: {e}")))?;
    clear_sentry_user();

    Ok(Json(ApiResponse::message("Logged out")))
}

/// The logged-in admin, reloaded so a removed account stops working.
///
/// GET /api/auth/me
async fn me(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CurrentAdmin>>, AppError> {
    let user = AdminUserRepository::new(state.pool())
        .get_by_id(admin.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Admin account no longer exists".to_string()))?;

    Ok(Json(ApiResponse::ok(CurrentAdmin::from(&user))))
}
