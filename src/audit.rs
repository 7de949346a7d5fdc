//! Audit log
//!
//! In-memory append-only record of governance actions. Observational only;
//! the proposal store remains the source of truth for state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Member that performed the action, when known
    pub actor: Option<String>,
    pub action: AuditAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // Proposal actions
    ProposalCreated,
    VoteCast,
    ProposalAccepted,
    ProposalRejected,

    // Membership actions
    MemberAdded,
}

/// Append-only audit log
pub struct AuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub async fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write().await;
        entries.push(entry);
    }

    /// Most recent entries first, optionally filtered by proposal
    pub async fn recent(&self, proposal_id: Option<Uuid>, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .rev()
            .filter(|e| proposal_id.map(|id| e.proposal_id == Some(id)).unwrap_or(true))
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: AuditAction, proposal_id: Option<Uuid>) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            actor: Some("alice".to_string()),
            action,
            proposal_id,
            details: None,
        }
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_capped() {
        let log = AuditLog::new();
        let pid = Uuid::new_v4();
        log.record(entry(AuditAction::ProposalCreated, Some(pid))).await;
        log.record(entry(AuditAction::VoteCast, Some(pid))).await;
        log.record(entry(AuditAction::ProposalAccepted, Some(pid))).await;

        let recent = log.recent(None, 2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].action, AuditAction::ProposalAccepted);
        assert_eq!(recent[1].action, AuditAction::VoteCast);
    }

    #[tokio::test]
    async fn test_recent_filters_by_proposal() {
        let log = AuditLog::new();
        let pid = Uuid::new_v4();
        log.record(entry(AuditAction::ProposalCreated, Some(pid))).await;
        log.record(entry(AuditAction::MemberAdded, None)).await;

        let filtered = log.recent(Some(pid), 10).await;
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].action, AuditAction::ProposalCreated);
        assert_eq!(log.len().await, 2);
    }
}
