//! Governance route handlers
//!
//! The proposal lifecycle endpoints: create, vote, finalize, query, audit.

use crate::audit::{AuditAction, AuditEntry};
use crate::error::{validation_error, ApiResult};
use crate::models::SuccessResponse;
use crate::proposal::{Proposal, ProposalStatus};
use crate::state::SharedState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;
use validator::Validate;

// =============================================================================
// REQUEST/RESPONSE TYPES
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProposalRequest {
    #[validate(length(min = 1, max = 128, message = "Proposer is required"))]
    pub proposer: String,

    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,

    #[serde(default)]
    #[validate(length(max = 4000, message = "Description is limited to 4000 characters"))]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    #[validate(length(min = 1, max = 128, message = "Voter is required"))]
    pub voter: String,

    pub vote_for: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogQuery {
    pub proposal_id: Option<Uuid>,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub proposal: Proposal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposals: Vec<Proposal>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntry>,
}

// =============================================================================
// PROPOSAL ROUTES
// =============================================================================

/// Create a new proposal
pub async fn create_proposal(
    State(state): State<SharedState>,
    Json(payload): Json<CreateProposalRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<ProposalResponse>>)> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let proposal = state
        .engine
        .create_proposal(payload.proposer, payload.title, payload.description)
        .await?;

    state
        .audit
        .record(AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: Some(proposal.proposer.clone()),
            action: AuditAction::ProposalCreated,
            proposal_id: Some(proposal.id),
            details: Some(serde_json::json!({ "title": proposal.title })),
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            format!("Proposal {} created", proposal.id),
            ProposalResponse { proposal },
        )),
    ))
}

/// Cast a vote on a proposal
pub async fn vote_on_proposal(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<VoteRequest>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    let voter = payload.voter.clone();
    let proposal = state.engine.cast_vote(id, payload.voter, payload.vote_for).await?;

    state
        .audit
        .record(AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: Some(voter),
            action: AuditAction::VoteCast,
            proposal_id: Some(id),
            details: Some(serde_json::json!({
                "voteFor": payload.vote_for,
                "votesFor": proposal.votes_for,
                "votesAgainst": proposal.votes_against,
            })),
        })
        .await;

    Ok(Json(SuccessResponse::with_data(
        format!(
            "Vote recorded on proposal {}: {} for / {} against",
            id, proposal.votes_for, proposal.votes_against
        ),
        ProposalResponse { proposal },
    )))
}

/// Finalize a proposal once quorum is reached
pub async fn finalize_proposal(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let proposal = state.engine.finalize(id).await?;

    let (action, verdict) = match proposal.status {
        ProposalStatus::Accepted => (AuditAction::ProposalAccepted, "accepted"),
        _ => (AuditAction::ProposalRejected, "rejected"),
    };

    state
        .audit
        .record(AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: None,
            action,
            proposal_id: Some(id),
            details: Some(serde_json::json!({
                "votesFor": proposal.votes_for,
                "votesAgainst": proposal.votes_against,
            })),
        })
        .await;

    Ok(Json(SuccessResponse::with_data(
        format!("Proposal {} {}", id, verdict),
        ProposalResponse { proposal },
    )))
}

/// Get a proposal by ID
pub async fn get_proposal(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SuccessResponse<ProposalResponse>>> {
    let proposal = state.engine.get_proposal(id).await?;

    Ok(Json(SuccessResponse::with_data(
        "Proposal retrieved",
        ProposalResponse { proposal },
    )))
}

/// List all proposals
pub async fn list_proposals(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<ProposalListResponse>>> {
    let proposals = state.engine.list_proposals().await;
    debug!("Listed {} proposals", proposals.len());

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} proposals", proposals.len()),
        ProposalListResponse { proposals },
    )))
}

// =============================================================================
// AUDIT LOG ROUTES
// =============================================================================

pub async fn get_audit_log(
    State(state): State<SharedState>,
    Query(query): Query<AuditLogQuery>,
) -> ApiResult<Json<SuccessResponse<AuditLogResponse>>> {
    let entries = state.audit.recent(query.proposal_id, query.limit).await;

    Ok(Json(SuccessResponse::with_data(
        format!("Retrieved {} audit entries", entries.len()),
        AuditLogResponse { entries },
    )))
}
