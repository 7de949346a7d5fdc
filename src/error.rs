//! Error handling module
//!
//! Provides unified error types and handling for the entire application.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Application-wide error type
///
/// The governance variants are the domain outcomes callers branch on;
/// every one of them is detected before any state is mutated.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not a member: {0}")]
    NotAMember(String),

    #[error("Proposal {0} not found")]
    ProposalNotFound(Uuid),

    #[error("Voting is closed on proposal {0}")]
    VotingClosed(Uuid),

    #[error("Proposal {0} has already been finalized")]
    AlreadyFinalized(Uuid),

    #[error("Quorum not met on proposal {id}: {total} of {quorum} required votes")]
    QuorumNotMet { id: Uuid, total: u64, quorum: u64 },

    #[error("Member {voter} has already voted on proposal {id}")]
    AlreadyVoted { id: Uuid, voter: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[allow(dead_code)]
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            AppError::NotAMember(id) => (
                StatusCode::FORBIDDEN,
                "NOT_A_MEMBER",
                format!("'{}' is not a member of the DAO", id),
                None,
            ),
            AppError::ProposalNotFound(id) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Proposal {} not found", id),
                None,
            ),
            AppError::VotingClosed(id) => (
                StatusCode::CONFLICT,
                "VOTING_CLOSED",
                format!("Voting is closed on proposal {}", id),
                None,
            ),
            AppError::AlreadyFinalized(id) => (
                StatusCode::CONFLICT,
                "ALREADY_FINALIZED",
                format!("Proposal {} has already been finalized", id),
                None,
            ),
            AppError::QuorumNotMet { id, total, quorum } => (
                StatusCode::CONFLICT,
                "QUORUM_NOT_MET",
                format!(
                    "Proposal {} has {} votes; {} required to finalize",
                    id, total, quorum
                ),
                None,
            ),
            AppError::AlreadyVoted { id, voter } => (
                StatusCode::CONFLICT,
                "ALREADY_VOTED",
                format!("Member '{}' has already voted on proposal {}", voter, id),
                None,
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    Some(msg.clone()),
                )
            }
        };

        let body = Json(ErrorResponse {
            success: false,
            message,
            error: details,
            code: Some(error_code.to_string()),
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, AppError>;

/// Helper function to create a validation error
pub fn validation_error(msg: impl Into<String>) -> AppError {
    AppError::Validation(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_not_met_message_names_counts() {
        let err = AppError::QuorumNotMet {
            id: Uuid::nil(),
            total: 2,
            quorum: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains('2'));
        assert!(msg.contains('3'));
    }
}
