//! Proposal execution hook
//!
//! Invoked exactly once, synchronously, when a proposal is accepted. The
//! engine folds any failure into the stored result text, so a failing
//! hook can never keep a proposal from reaching its terminal state.

use uuid::Uuid;

/// Pluggable side effect run on acceptance
pub trait ExecutionHook: Send + Sync {
    fn execute(&self, proposal_id: Uuid) -> anyhow::Result<String>;
}

/// Default hook: records that execution would have happened.
///
/// On-chain fund transfer (or any real side effect) is out of scope for
/// this engine; deployments wire their own hook into `AppState`.
pub struct StubExecutor;

impl ExecutionHook for StubExecutor {
    fn execute(&self, proposal_id: Uuid) -> anyhow::Result<String> {
        Ok(format!("Proposal {} executed successfully.", proposal_id))
    }
}
