//! Application state management
//!
//! Contains shared state accessible across all handlers. Collaborators are
//! injected here once and passed down explicitly; nothing is a global.

use crate::audit::AuditLog;
use crate::clock::SystemClock;
use crate::config::GovernanceConfig;
use crate::governance::{GovernanceEngine, StubExecutor};
use crate::membership::{AdmissionPolicy, MembershipSet, OpenAdmission};
use crate::proposal::ProposalStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Member roster (has internal locking)
    pub members: Arc<MembershipSet>,

    /// The governance state machine; owns the proposal store
    pub engine: GovernanceEngine,

    /// Boundary policy for member admission
    pub admission: Box<dyn AdmissionPolicy>,

    /// Append-only audit trail
    pub audit: AuditLog,
}

impl AppState {
    /// Create new application state with the default collaborators:
    /// system clock, stub execution hook, open admission.
    pub fn new(governance: &GovernanceConfig) -> Self {
        let members = Arc::new(MembershipSet::new());
        let proposals = Arc::new(ProposalStore::new());
        let engine = GovernanceEngine::new(
            Arc::clone(&members),
            proposals,
            Arc::new(SystemClock::new()),
            Arc::new(StubExecutor),
            governance.single_vote_per_member,
        );

        Self {
            members,
            engine,
            admission: Box::new(OpenAdmission),
            audit: AuditLog::new(),
        }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
