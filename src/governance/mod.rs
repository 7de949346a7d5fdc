//! Governance module - the proposal lifecycle state machine
//!
//! Creates proposals, records votes, finalizes outcomes, and invokes
//! execution on acceptance.

mod engine;
mod execution;

pub use engine::{GovernanceEngine, QUORUM, THRESHOLD};
pub use execution::{ExecutionHook, StubExecutor};
