//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /api/health                   - Liveness with a JSON body
//!
//! # Auth (email + password, session cookie)
//! POST   /api/auth/login               - Log in
//! POST   /api/auth/logout              - Log out
//! GET    /api/auth/me                  - Current admin
//!
//! # Agents
//! POST   /api/agents                   - Create agent
//! GET    /api/agents                   - List agents with assignment counts
//! GET    /api/agents/{id}              - Agent with assigned leads
//! DELETE /api/agents/{id}              - Delete agent and its leads
//!
//! # Leads
//! POST   /api/leads/upload             - Upload a file and distribute it
//! GET    /api/leads/distribution       - Leads grouped by agent
//! GET    /api/leads/agent/{id}         - One agent's leads
//!
//! # Assignments
//! GET    /api/assignments              - Every assignment
//! GET    /api/assignments/agent/{id}   - One agent's assignments
//! GET    /api/assignments/stats        - Totals and per-agent counts
//! ```
//!
//! Everything except health and login requires an admin session.

pub mod agents;
pub mod assignments;
pub mod auth;
pub mod leads;

use axum::{
    Json, Router,
    extract::{Path, rejection::PathRejection},
    routing::get,
};
use serde::Serialize;

use leaddesk_core::AgentId;

use crate::error::AppError;
use crate::state::AppState;

/// Successful JSON envelope: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Wrap `data` in a success envelope.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success envelope carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Build the complete API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(api_health))
        .merge(auth::router())
        .merge(agents::router())
        .merge(leads::router())
        .merge(assignments::router())
}

async fn api_health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Server running"))
}

/// Unwrap an `{id}` path segment, answering a malformed one with the JSON
/// error envelope instead of axum's plain-text rejection.
pub(crate) fn agent_id(path: Result<Path<AgentId>, PathRejection>) -> Result<AgentId, AppError> {
    path.map(|Path(id)| id).map_err(|e| AppError::BadRequest(e.body_text()))
}
