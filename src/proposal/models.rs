//! Proposal data models
//!
//! Defines the proposal record and its lifecycle state machine.

use crate::error::AppError;
use crate::membership::MemberId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proposal status in the governance lifecycle
///
/// `Pending -> Accepted` or `Pending -> Rejected`; both outcomes are
/// terminal and a proposal never leaves a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    /// Open for voting
    Pending,
    /// Finalized with enough supporting votes
    Accepted,
    /// Finalized without enough supporting votes
    Rejected,
}

impl ProposalStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

impl Default for ProposalStatus {
    fn default() -> Self {
        ProposalStatus::Pending
    }
}

/// A single cast vote, kept as an append-only ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ballot {
    pub voter: MemberId,
    pub vote_for: bool,
    pub cast_at: DateTime<Utc>,
}

/// A governance proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: Uuid,
    /// Human-readable title
    pub title: String,
    /// Detailed description
    pub description: String,
    /// Member who created the proposal
    pub proposer: MemberId,
    /// Current lifecycle status
    pub status: ProposalStatus,
    /// Count of supporting votes
    pub votes_for: u64,
    /// Count of opposing votes
    pub votes_against: u64,
    /// Every cast vote, in arrival order. The counters above are the
    /// source of truth for finalization; the ledger backs the optional
    /// one-vote-per-member enforcement and the audit surface.
    pub ballots: Vec<Ballot>,
    /// Output of the execution hook; set if and only if the proposal
    /// was accepted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_result: Option<String>,
    /// When the proposal was created
    pub created_at: DateTime<Utc>,
    /// Last mutation time; unset until the first vote or finalization
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Proposal {
    /// Create a new pending proposal
    pub fn new(
        proposer: MemberId,
        title: String,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            proposer,
            status: ProposalStatus::Pending,
            votes_for: 0,
            votes_against: 0,
            ballots: Vec::new(),
            execution_result: None,
            created_at,
            updated_at: None,
        }
    }

    /// Total votes cast so far
    pub fn total_votes(&self) -> u64 {
        self.votes_for + self.votes_against
    }

    /// Whether this member has a ballot on record
    pub fn has_voted(&self, voter: &str) -> bool {
        self.ballots.iter().any(|b| b.voter == voter)
    }

    /// Record a vote on a pending proposal
    ///
    /// Increments exactly one counter and appends to the ballot ledger.
    /// With `enforce_single_vote` unset a member may vote repeatedly and
    /// each call counts again; that matches the modeled system.
    pub fn record_vote(
        &mut self,
        voter: MemberId,
        vote_for: bool,
        enforce_single_vote: bool,
        at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if self.status.is_terminal() {
            return Err(AppError::VotingClosed(self.id));
        }
        if enforce_single_vote && self.has_voted(&voter) {
            return Err(AppError::AlreadyVoted {
                id: self.id,
                voter,
            });
        }

        if vote_for {
            self.votes_for += 1;
        } else {
            self.votes_against += 1;
        }
        self.ballots.push(Ballot {
            voter,
            vote_for,
            cast_at: at,
        });
        self.updated_at = Some(at);
        Ok(())
    }

    /// Transition to Accepted, storing the execution outcome
    pub fn mark_accepted(&mut self, execution_result: String, at: DateTime<Utc>) {
        self.status = ProposalStatus::Accepted;
        self.execution_result = Some(execution_result);
        self.updated_at = Some(at);
    }

    /// Transition to Rejected
    pub fn mark_rejected(&mut self, at: DateTime<Utc>) {
        self.status = ProposalStatus::Rejected;
        self.updated_at = Some(at);
    }
}
