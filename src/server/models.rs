//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use crate::approval::{PendingSummary, ResolutionOutcome, ResolutionStatus, SubmitOutcome};
use crate::core::{Operation, Parameters};
use crate::service::DEFAULT_ACTOR;
use crate::store::Entity;

fn default_actor() -> String {
    DEFAULT_ACTOR.to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    pub query: String,
    #[serde(default = "default_actor")]
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: String,
    pub operation_type: Operation,
    pub executed: bool,
    pub requires_approval: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval_id: Option<String>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposed_changes: Option<Parameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_results: Option<Vec<Entity>>,
}

impl From<SubmitOutcome> for QueryResponse {
    fn from(outcome: SubmitOutcome) -> Self {
        Self {
            response: outcome.response_text,
            operation_type: outcome.operation,
            executed: outcome.executed,
            requires_approval: outcome.requires_approval,
            approval_id: outcome.approval_id,
            summary: outcome.summary,
            proposed_changes: outcome.proposed_changes,
            query_results: outcome.results,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalRequest {
    pub request_id: String,
    /// Approving actor; accepted but not checked against the requester
    #[serde(default = "default_actor")]
    pub user_id: String,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub status: ResolutionStatus,
    pub message: String,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Entity>,
}

impl From<ResolutionOutcome> for ApprovalResponse {
    fn from(outcome: ResolutionOutcome) -> Self {
        Self {
            status: outcome.status,
            message: outcome.message,
            request_id: outcome.approval_id,
            entity: outcome.entity,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingApprovalsResponse {
    pub pending_approvals: Vec<PendingSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub users_count: usize,
    pub projects_count: usize,
    pub pending_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<Entity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsResponse {
    pub projects: Vec<Entity>,
}
