//! Proposal module - the unit entity of governance
//!
//! Defines the proposal record, its lifecycle states, and the store that
//! owns every record.

mod models;
mod store;

pub use models::*;
pub use store::ProposalStore;
