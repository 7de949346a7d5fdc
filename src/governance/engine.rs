//! Governance engine
//!
//! The state machine behind every exposed operation. Each mutation runs
//! its precondition checks before touching state, so failed calls are
//! all-or-nothing, and each read-modify-write goes through the store's
//! atomic `update_with` primitive.

use crate::clock::Clock;
use crate::error::AppError;
use crate::governance::ExecutionHook;
use crate::membership::{MemberId, MembershipSet};
use crate::proposal::{Proposal, ProposalStore};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Minimum total votes before a proposal can be finalized
pub const QUORUM: u64 = 3;

/// Minimum supporting votes for acceptance (raw count, not a ratio)
pub const THRESHOLD: u64 = 2;

/// The proposal lifecycle state machine
pub struct GovernanceEngine {
    members: Arc<MembershipSet>,
    proposals: Arc<ProposalStore>,
    clock: Arc<dyn Clock>,
    executor: Arc<dyn ExecutionHook>,
    single_vote_per_member: bool,
}

impl GovernanceEngine {
    pub fn new(
        members: Arc<MembershipSet>,
        proposals: Arc<ProposalStore>,
        clock: Arc<dyn Clock>,
        executor: Arc<dyn ExecutionHook>,
        single_vote_per_member: bool,
    ) -> Self {
        Self {
            members,
            proposals,
            clock,
            executor,
            single_vote_per_member,
        }
    }

    /// Create a new pending proposal
    ///
    /// The proposer must already be a member; nothing is stored otherwise.
    pub async fn create_proposal(
        &self,
        proposer: MemberId,
        title: String,
        description: String,
    ) -> Result<Proposal, AppError> {
        if !self.members.is_member(&proposer).await {
            return Err(AppError::NotAMember(proposer));
        }

        let proposal = Proposal::new(proposer, title, description, self.clock.now());
        let proposal = self.proposals.insert(proposal).await;

        info!(
            proposal_id = %proposal.id,
            proposer = %proposal.proposer,
            "Proposal created"
        );
        Ok(proposal)
    }

    /// Cast a vote on a pending proposal
    ///
    /// Membership is checked first, then existence and status inside the
    /// store lock. The counter increment, ballot append, and timestamp
    /// update land as one overwrite.
    pub async fn cast_vote(
        &self,
        proposal_id: Uuid,
        voter: MemberId,
        vote_for: bool,
    ) -> Result<Proposal, AppError> {
        if !self.members.is_member(&voter).await {
            return Err(AppError::NotAMember(voter));
        }

        let now = self.clock.now();
        let enforce = self.single_vote_per_member;
        let updated = self
            .proposals
            .update_with(proposal_id, |proposal| {
                proposal.record_vote(voter, vote_for, enforce, now)
            })
            .await?;

        info!(
            proposal_id = %proposal_id,
            votes_for = updated.votes_for,
            votes_against = updated.votes_against,
            "Vote recorded"
        );
        Ok(updated)
    }

    /// Finalize a pending proposal once quorum is reached
    ///
    /// Below quorum the proposal stays Pending and the call is retryable.
    /// At or above quorum the decision is `votes_for >= THRESHOLD`; on
    /// acceptance the execution hook runs inside the same transition and
    /// its outcome (or failure text) is stored with the status.
    pub async fn finalize(&self, proposal_id: Uuid) -> Result<Proposal, AppError> {
        let now = self.clock.now();
        let executor = Arc::clone(&self.executor);

        let finalized = self
            .proposals
            .update_with(proposal_id, |proposal| {
                if proposal.status.is_terminal() {
                    return Err(AppError::AlreadyFinalized(proposal_id));
                }
                let total = proposal.total_votes();
                if total < QUORUM {
                    return Err(AppError::QuorumNotMet {
                        id: proposal_id,
                        total,
                        quorum: QUORUM,
                    });
                }

                if proposal.votes_for >= THRESHOLD {
                    let outcome = match executor.execute(proposal_id) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!(proposal_id = %proposal_id, "Execution hook failed: {e:#}");
                            format!("Execution failed: {e:#}")
                        }
                    };
                    proposal.mark_accepted(outcome, now);
                } else {
                    proposal.mark_rejected(now);
                }
                Ok(())
            })
            .await?;

        info!(
            proposal_id = %proposal_id,
            status = ?finalized.status,
            votes_for = finalized.votes_for,
            votes_against = finalized.votes_against,
            "Proposal finalized"
        );
        Ok(finalized)
    }

    /// Get a proposal by ID. Read-only.
    pub async fn get_proposal(&self, proposal_id: Uuid) -> Result<Proposal, AppError> {
        self.proposals.get(proposal_id).await
    }

    /// Full snapshot of every proposal. Read-only, unordered.
    pub async fn list_proposals(&self) -> Vec<Proposal> {
        self.proposals.values().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::governance::execution::test_support::FailingExecutor;
    use crate::governance::StubExecutor;
    use crate::proposal::ProposalStatus;
    use pretty_assertions::assert_eq;

    struct Fixture {
        engine: GovernanceEngine,
        members: Arc<MembershipSet>,
        proposals: Arc<ProposalStore>,
    }

    async fn fixture_with(executor: Arc<dyn ExecutionHook>, single_vote: bool) -> Fixture {
        let members = Arc::new(MembershipSet::new());
        let proposals = Arc::new(ProposalStore::new());
        for name in ["alice", "bob", "carol", "dave"] {
            members.add_member(name.to_string()).await;
        }
        let engine = GovernanceEngine::new(
            Arc::clone(&members),
            Arc::clone(&proposals),
            Arc::new(SystemClock::new()),
            executor,
            single_vote,
        );
        Fixture {
            engine,
            members,
            proposals,
        }
    }

    async fn fixture() -> Fixture {
        fixture_with(Arc::new(StubExecutor), false).await
    }

    #[tokio::test]
    async fn test_non_member_cannot_create_proposal() {
        let f = fixture().await;
        let err = f
            .engine
            .create_proposal("mallory".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAMember(_)));
        assert_eq!(f.engine.list_proposals().await.len(), 0);
    }

    #[tokio::test]
    async fn test_created_proposal_resolves_by_id_as_pending() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();

        let fetched = f.engine.get_proposal(created.id).await.unwrap();
        assert_eq!(fetched.status, ProposalStatus::Pending);
        assert_eq!(fetched.votes_for, 0);
        assert_eq!(fetched.votes_against, 0);
        assert_eq!(fetched.execution_result, None);
        assert_eq!(fetched.updated_at, None);
        assert_eq!(fetched.proposer, "alice");
    }

    #[tokio::test]
    async fn test_non_member_vote_changes_nothing() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();

        let err = f
            .engine
            .cast_vote(created.id, "mallory".to_string(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotAMember(_)));

        let fetched = f.engine.get_proposal(created.id).await.unwrap();
        assert_eq!(fetched.total_votes(), 0);
        assert_eq!(fetched.updated_at, None);
    }

    #[tokio::test]
    async fn test_vote_on_missing_proposal_is_not_found() {
        let f = fixture().await;
        let err = f
            .engine
            .cast_vote(Uuid::new_v4(), "alice".to_string(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ProposalNotFound(_)));
    }

    #[tokio::test]
    async fn test_tally_matches_accepted_vote_calls() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();

        f.engine
            .cast_vote(created.id, "bob".to_string(), true)
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "carol".to_string(), false)
            .await
            .unwrap();
        // Non-member attempt must not count
        let _ = f
            .engine
            .cast_vote(created.id, "mallory".to_string(), true)
            .await;

        let fetched = f.engine.get_proposal(created.id).await.unwrap();
        assert_eq!(fetched.total_votes(), 2);
        assert_eq!(fetched.ballots.len(), 2);
        assert!(fetched.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_finalize_below_quorum_is_retryable() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "bob".to_string(), true)
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "carol".to_string(), true)
            .await
            .unwrap();

        let err = f.engine.finalize(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::QuorumNotMet { total: 2, .. }));

        // Still pending: one more vote makes finalization succeed
        let fetched = f.engine.get_proposal(created.id).await.unwrap();
        assert_eq!(fetched.status, ProposalStatus::Pending);

        f.engine
            .cast_vote(created.id, "dave".to_string(), false)
            .await
            .unwrap();
        let finalized = f.engine.finalize(created.id).await.unwrap();
        assert_eq!(finalized.status, ProposalStatus::Accepted);
    }

    #[tokio::test]
    async fn test_two_for_one_against_is_accepted_with_execution() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "bob".to_string(), true)
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "carol".to_string(), true)
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "dave".to_string(), false)
            .await
            .unwrap();

        let finalized = f.engine.finalize(created.id).await.unwrap();
        assert_eq!(finalized.status, ProposalStatus::Accepted);
        let result = finalized.execution_result.unwrap();
        assert!(result.contains(&created.id.to_string()));
    }

    #[tokio::test]
    async fn test_one_for_two_against_is_rejected_without_execution() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "bob".to_string(), true)
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "carol".to_string(), false)
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "dave".to_string(), false)
            .await
            .unwrap();

        let finalized = f.engine.finalize(created.id).await.unwrap();
        assert_eq!(finalized.status, ProposalStatus::Rejected);
        assert_eq!(finalized.execution_result, None);
    }

    #[tokio::test]
    async fn test_second_finalize_is_rejected_and_leaves_fields_alone() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        for (voter, choice) in [("bob", true), ("carol", true), ("dave", false)] {
            f.engine
                .cast_vote(created.id, voter.to_string(), choice)
                .await
                .unwrap();
        }

        let first = f.engine.finalize(created.id).await.unwrap();
        let err = f.engine.finalize(created.id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyFinalized(_)));

        let after = f.engine.get_proposal(created.id).await.unwrap();
        assert_eq!(after.status, first.status);
        assert_eq!(after.execution_result, first.execution_result);
        assert_eq!(after.updated_at, first.updated_at);
        assert_eq!(after.votes_for, first.votes_for);
        assert_eq!(after.votes_against, first.votes_against);
    }

    #[tokio::test]
    async fn test_voting_after_finalization_is_closed() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        for (voter, choice) in [("bob", true), ("carol", true), ("dave", true)] {
            f.engine
                .cast_vote(created.id, voter.to_string(), choice)
                .await
                .unwrap();
        }
        f.engine.finalize(created.id).await.unwrap();

        let err = f
            .engine
            .cast_vote(created.id, "alice".to_string(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::VotingClosed(_)));
    }

    #[tokio::test]
    async fn test_failing_hook_still_accepts_with_failure_text() {
        let f = fixture_with(Arc::new(FailingExecutor), false).await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        for (voter, choice) in [("bob", true), ("carol", true), ("dave", false)] {
            f.engine
                .cast_vote(created.id, voter.to_string(), choice)
                .await
                .unwrap();
        }

        let finalized = f.engine.finalize(created.id).await.unwrap();
        assert_eq!(finalized.status, ProposalStatus::Accepted);
        let result = finalized.execution_result.unwrap();
        assert!(result.contains("Execution failed"));
    }

    #[tokio::test]
    async fn test_single_vote_mode_rejects_repeat_voter() {
        let f = fixture_with(Arc::new(StubExecutor), true).await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        f.engine
            .cast_vote(created.id, "bob".to_string(), true)
            .await
            .unwrap();

        let err = f
            .engine
            .cast_vote(created.id, "bob".to_string(), true)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AlreadyVoted { .. }));

        let fetched = f.engine.get_proposal(created.id).await.unwrap();
        assert_eq!(fetched.total_votes(), 1);
    }

    #[tokio::test]
    async fn test_timestamps_come_from_the_injected_clock() {
        use crate::clock::test_support::ManualClock;
        use chrono::{Duration, TimeZone, Utc};

        let members = Arc::new(MembershipSet::new());
        let proposals = Arc::new(ProposalStore::new());
        members.add_member("alice".to_string()).await;
        let clock = Arc::new(ManualClock::starting_at(
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        ));
        let engine = GovernanceEngine::new(
            members,
            proposals,
            Arc::clone(&clock) as Arc<dyn Clock>,
            Arc::new(StubExecutor),
            false,
        );

        let created = engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();
        assert_eq!(created.created_at, clock.now());

        clock.advance(Duration::seconds(60));
        let voted = engine
            .cast_vote(created.id, "alice".to_string(), true)
            .await
            .unwrap();
        assert_eq!(voted.updated_at, Some(clock.now()));
        assert_eq!(voted.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_membership_grows_while_voting() {
        let f = fixture().await;
        let created = f
            .engine
            .create_proposal("alice".to_string(), "T".to_string(), "D".to_string())
            .await
            .unwrap();

        // eve joins mid-flight and can immediately vote
        f.members.add_member("eve".to_string()).await;
        f.engine
            .cast_vote(created.id, "eve".to_string(), true)
            .await
            .unwrap();

        let fetched = f.proposals.get(created.id).await.unwrap();
        assert_eq!(fetched.votes_for, 1);
    }

    #[tokio::test]
    async fn test_list_proposals_reflects_exactly_what_was_created() {
        let f = fixture().await;
        let a = f
            .engine
            .create_proposal("alice".to_string(), "A".to_string(), "".to_string())
            .await
            .unwrap();
        let b = f
            .engine
            .create_proposal("bob".to_string(), "B".to_string(), "".to_string())
            .await
            .unwrap();

        let ids: Vec<_> = f
            .engine
            .list_proposals()
            .await
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&a.id));
        assert!(ids.contains(&b.id));
    }
}
