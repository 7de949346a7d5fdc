//! DAO membership roster
//!
//! A set of opaque member identifiers. Membership is add-only; there is no
//! removal in this system. Admission is routed through a pluggable
//! `AdmissionPolicy` so a real authorization scheme can be injected at the
//! boundary later. The shipped policy admits everyone, a known gap of the
//! modeled system.

use crate::error::AppError;
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Opaque member identifier (an address or account name)
pub type MemberId = String;

/// Thread-safe member roster
pub struct MembershipSet {
    members: RwLock<HashSet<MemberId>>,
}

impl MembershipSet {
    pub fn new() -> Self {
        Self {
            members: RwLock::new(HashSet::new()),
        }
    }

    /// Check whether an identifier is a member. Pure lookup, no side effects.
    pub async fn is_member(&self, id: &str) -> bool {
        let members = self.members.read().await;
        members.contains(id)
    }

    /// Add a member. Idempotent: returns `true` if the id was newly
    /// inserted, `false` if it was already present.
    pub async fn add_member(&self, id: MemberId) -> bool {
        let mut members = self.members.write().await;
        members.insert(id)
    }

    /// Snapshot of the current roster
    pub async fn members(&self) -> Vec<MemberId> {
        let members = self.members.read().await;
        let mut list: Vec<_> = members.iter().cloned().collect();
        list.sort();
        list
    }

    /// Get member count
    pub async fn len(&self) -> usize {
        let members = self.members.read().await;
        members.len()
    }
}

impl Default for MembershipSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Boundary capability deciding who may admit new members.
///
/// The core enforces no admission authorization (`addMember` is effectively
/// open); callers wishing to restrict it supply their own policy here.
pub trait AdmissionPolicy: Send + Sync {
    fn authorize(&self, admin: &str, candidate: &str) -> Result<(), AppError>;
}

/// Default policy: any caller may add any member.
pub struct OpenAdmission;

impl AdmissionPolicy for OpenAdmission {
    fn authorize(&self, _admin: &str, _candidate: &str) -> Result<(), AppError> {
        Ok(())
    }
}
