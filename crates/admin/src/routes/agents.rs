//! Agent management route handlers.

use axum::{
    Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use serde::{Deserialize, Serialize};

use leaddesk_core::AgentId;

use super::{ApiResponse, agent_id};
use crate::db::AgentRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{Agent, AgentSummary, Lead, NewAgent};
use crate::state::AppState;

/// Build the agents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/agents", get(list).post(create))
        .route("/api/agents/{id}", get(show).delete(delete))
}

/// Create agent request body.
#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// An agent with the leads it currently holds.
#[derive(Debug, Serialize)]
pub struct AgentDetail {
    #[serde(flatten)]
    pub agent: Agent,
    pub leads: Vec<Lead>,
}

/// Result of deleting an agent.
#[derive(Debug, Serialize)]
pub struct DeletedAgent {
    pub id: AgentId,
    pub removed_leads: u64,
}

/// POST /api/agents
async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    payload: Result<Json<CreateAgentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Agent>>), AppError> {
    let Json(request) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let new_agent = NewAgent::parse(&request.name, &request.email, &request.phone)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let agent = AgentRepository::new(state.pool()).create(&new_agent).await?;
    tracing::info!(admin_id = %admin.id, agent_id = %agent.id, "agent created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(agent))))
}

/// GET /api/agents
async fn list(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AgentSummary>>>, AppError> {
    let agents = AgentRepository::new(state.pool()).list_with_counts().await?;
    Ok(Json(ApiResponse::ok(agents)))
}

/// GET /api/agents/{id}
async fn show(
    _auth: RequireAdminAuth,
    State(state): State<AppState>,
    path: Result<Path<AgentId>, PathRejection>,
) -> Result<Json<ApiResponse<AgentDetail>>, AppError> {
    let id = agent_id(path)?;
    let agent = AgentRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("agent {id}")))?;
    let leads = state.queries().list_by_recipient(id).await?;

    Ok(Json(ApiResponse::ok(AgentDetail { agent, leads })))
}

/// DELETE /api/agents/{id}
async fn delete(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    path: Result<Path<AgentId>, PathRejection>,
) -> Result<Json<ApiResponse<DeletedAgent>>, AppError> {
    let id = agent_id(path)?;
    let removed_leads = AgentRepository::new(state.pool()).delete(id).await?;
    tracing::info!(admin_id = %admin.id, agent_id = %id, removed_leads, "agent deleted");

    Ok(Json(ApiResponse::ok(DeletedAgent { id, removed_leads })))
}
