//! Assignment read views.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::PathRejection},
    routing::get,
};

use leaddesk_core::AgentId;

use super::{ApiResponse, agent_id};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{AssignmentDetail, AssignmentStats};
use crate::state::AppState;

/// Build the assignments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/assignments", get(index))
        .route("/api/assignments/agent/{id}", get(for_agent))
        .route("/api/assignments/stats", get(stats))
}

/// GET /api/assignments
async fn index(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AssignmentDetail>>>, AppError> {
    let assignments = state.queries().all().await?;
    Ok(Json(ApiResponse::ok(assignments)))
}

/// GET /api/assignments/agent/{id}
async fn for_agent(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    path: Result<Path<AgentId>, PathRejection>,
) -> Result<Json<ApiResponse<Vec<AssignmentDetail>>>, AppError> {
    let id = agent_id(path)?;
    let assignments = state.queries().assignments_by_recipient(id).await?;
    Ok(Json(ApiResponse::ok(assignments)))
}

/// GET /api/assignments/stats
async fn stats(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<AssignmentStats>>, AppError> {
    let stats = state.queries().stats().await?;
    Ok(Json(ApiResponse::ok(stats)))
}
