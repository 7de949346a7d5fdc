//! Membership route handlers

use crate::audit::{AuditAction, AuditEntry};
use crate::error::{validation_error, ApiResult};
use crate::models::SuccessResponse;
use crate::state::SharedState;
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddMemberRequest {
    /// Caller identity. Recorded for the audit trail but not verified;
    /// admission control is delegated to the configured `AdmissionPolicy`.
    #[validate(length(min = 1, max = 128, message = "Admin is required"))]
    pub admin: String,

    #[validate(length(min = 1, max = 128, message = "Member is required"))]
    pub member: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub member: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberListResponse {
    pub members: Vec<String>,
    pub count: usize,
}

/// Add a member to the DAO
pub async fn add_member(
    State(state): State<SharedState>,
    Json(payload): Json<AddMemberRequest>,
) -> ApiResult<(StatusCode, Json<SuccessResponse<MemberResponse>>)> {
    payload.validate().map_err(|e| validation_error(e.to_string()))?;

    state.admission.authorize(&payload.admin, &payload.member)?;

    let newly_added = state.members.add_member(payload.member.clone()).await;

    if newly_added {
        state
            .audit
            .record(AuditEntry {
                id: Uuid::new_v4(),
                timestamp: Utc::now(),
                actor: Some(payload.admin),
                action: AuditAction::MemberAdded,
                proposal_id: None,
                details: Some(serde_json::json!({ "member": payload.member })),
            })
            .await;
    }

    let message = if newly_added {
        format!("Member '{}' added", payload.member)
    } else {
        format!("'{}' is already a member", payload.member)
    };

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::with_data(
            message,
            MemberResponse {
                member: payload.member,
            },
        )),
    ))
}

/// List the member roster
pub async fn list_members(
    State(state): State<SharedState>,
) -> ApiResult<Json<SuccessResponse<MemberListResponse>>> {
    let count = state.members.len().await;
    let members = state.members.members().await;

    Ok(Json(SuccessResponse::with_data(
        format!("Found {} members", count),
        MemberListResponse { members, count },
    )))
}
