//! Route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use super::errors::ApiError;
use super::models::{
    ApprovalRequest, ApprovalResponse, HealthResponse, PendingApprovalsResponse, ProjectsResponse,
    QueryRequest, QueryResponse, UsersResponse,
};
use super::AppState;
use crate::core::TargetCollection;

pub const SERVICE_NAME: &str = "gatekeeper-bot";

pub async fn query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let Json(request) = payload?;
    let command = request.query.trim();
    if command.is_empty() {
        return Err(ApiError::bad_request("query must not be empty"));
    }

    let outcome = state.gatekeeper.handle_command(command, &request.user_id)?;
    tracing::info!(
        actor = %request.user_id,
        operation = %outcome.operation,
        executed = outcome.executed,
        approval_id = ?outcome.approval_id,
        "Query handled"
    );
    Ok(Json(outcome.into()))
}

pub async fn approve(
    State(state): State<AppState>,
    payload: Result<Json<ApprovalRequest>, JsonRejection>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let Json(request) = payload?;
    let request_id = request.request_id.trim();
    if request_id.is_empty() {
        return Err(ApiError::bad_request("request_id must not be empty"));
    }

    tracing::info!(
        approval_id = %request_id,
        actor = %request.user_id,
        approved = request.approved,
        "Resolving approval"
    );
    let outcome = state
        .gatekeeper
        .resolve(request_id, request.approved)
        .map_err(|err| ApiError::from(err).with_request_id(request_id))?;
    Ok(Json(outcome.into()))
}

pub async fn pending_approvals(State(state): State<AppState>) -> Json<PendingApprovalsResponse> {
    Json(PendingApprovalsResponse {
        pending_approvals: state.gatekeeper.list_pending(),
    })
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let gatekeeper = &state.gatekeeper;
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        users_count: gatekeeper.count(TargetCollection::Users),
        projects_count: gatekeeper.count(TargetCollection::Projects),
        pending_count: gatekeeper.pending_count(),
    })
}

pub async fn users(State(state): State<AppState>) -> Json<UsersResponse> {
    Json(UsersResponse {
        users: state.gatekeeper.entities(TargetCollection::Users),
    })
}

pub async fn projects(State(state): State<AppState>) -> Json<ProjectsResponse> {
    Json(ProjectsResponse {
        projects: state.gatekeeper.entities(TargetCollection::Projects),
    })
}
