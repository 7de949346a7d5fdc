//! Proposal storage
//!
//! In-memory store owning every proposal record, keyed by id. Writes go
//! through full-record overwrite or the atomic `update_with` primitive;
//! there is no partial-update path.

use crate::error::AppError;
use crate::proposal::Proposal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Thread-safe proposal store
pub struct ProposalStore {
    proposals: RwLock<HashMap<Uuid, Proposal>>,
}

impl ProposalStore {
    pub fn new() -> Self {
        Self {
            proposals: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or fully overwrite the record at its id
    pub async fn insert(&self, proposal: Proposal) -> Proposal {
        let mut proposals = self.proposals.write().await;
        proposals.insert(proposal.id, proposal.clone());
        proposal
    }

    /// Get a proposal by ID
    pub async fn get(&self, id: Uuid) -> Result<Proposal, AppError> {
        let proposals = self.proposals.read().await;
        proposals
            .get(&id)
            .cloned()
            .ok_or(AppError::ProposalNotFound(id))
    }

    /// List all proposals. Iteration order carries no meaning.
    pub async fn values(&self) -> Vec<Proposal> {
        let proposals = self.proposals.read().await;
        proposals.values().cloned().collect()
    }

    /// Apply a mutation to the record at `id` and persist it as a single
    /// overwrite, all under the store's write lock.
    ///
    /// This is the read-modify-write primitive behind votes and
    /// finalization: holding the lock for the whole closure serializes
    /// concurrent mutations of the same proposal, so counter updates are
    /// never lost. The closure must not mutate before its precondition
    /// checks pass; a returned error leaves the record untouched.
    pub async fn update_with<F>(&self, id: Uuid, mutate: F) -> Result<Proposal, AppError>
    where
        F: FnOnce(&mut Proposal) -> Result<(), AppError>,
    {
        let mut proposals = self.proposals.write().await;
        let proposal = proposals
            .get_mut(&id)
            .ok_or(AppError::ProposalNotFound(id))?;
        mutate(proposal)?;
        Ok(proposal.clone())
    }

    /// Get proposal count
    pub async fn count(&self) -> usize {
        let proposals = self.proposals.read().await;
        proposals.len()
    }
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new()
    }
}
