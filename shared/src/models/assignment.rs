//! Assignment proposal model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{AreaKind, GuestId, TableId};
use crate::types::Timestamp;

/// Where a proposal came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalSource {
    Local,
    Server,
}

/// Machine-readable assignment issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssignmentIssueCode {
    /// Party larger than every table
    PartyTooLarge,
    /// Party fits some table but no table has room left
    InsufficientCapacity,
    /// No tables in the area
    NoTables,
    /// Reported by the remote solver
    SolverWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentIssue {
    pub code: AssignmentIssueCode,
    pub message: String,
    /// Guests affected by the issue
    #[serde(default)]
    pub guest_ids: Vec<GuestId>,
}

/// Candidate guest→table mapping, never applied automatically
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentProposal {
    pub id: Uuid,
    pub area: AreaKind,
    pub source: ProposalSource,
    pub mapping: BTreeMap<GuestId, TableId>,
    /// 0..=100, share of pending seats the proposal places
    pub score: f64,
    pub issues: Vec<AssignmentIssue>,
    pub suggestions: Vec<String>,
    pub created_at: Timestamp,
}

impl AssignmentProposal {
    /// Guests mapped to `table_id`, in mapping order
    pub fn guests_for(&self, table_id: TableId) -> Vec<&GuestId> {
        self.mapping
            .iter()
            .filter(|(_, t)| **t == table_id)
            .map(|(g, _)| g)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_code_serialize_kebab() {
        let json = serde_json::to_string(&AssignmentIssueCode::PartyTooLarge).unwrap();
        assert_eq!(json, "\"party-too-large\"");
    }

    #[test]
    fn test_guests_for() {
        let mut mapping = BTreeMap::new();
        mapping.insert("a".to_string(), 1);
        mapping.insert("b".to_string(), 2);
        mapping.insert("c".to_string(), 1);
        let proposal = AssignmentProposal {
            id: Uuid::new_v4(),
            area: AreaKind::Banquet,
            source: ProposalSource::Local,
            mapping,
            score: 100.0,
            issues: vec![],
            suggestions: vec![],
            created_at: 0,
        };
        assert_eq!(proposal.guests_for(1), vec!["a", "c"]);
        assert!(!proposal.is_empty());
    }
}
