//! Remote proposal lifecycle
//!
//! Only the most recent request counts. Each request gets a ticket; a
//! response whose ticket is not the latest pending one is stale and is
//! dropped on arrival.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use shared::models::{
    Area, AreaKind, AssignmentIssue, AssignmentIssueCode, AssignmentProposal, Guest,
    ProposalSource,
};
use shared::util::now_millis;
use uuid::Uuid;

use crate::core::SolverError;
use crate::solver::SolverResponse;

/// Handle for one in-flight remote request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteTicket {
    pub id: u64,
    pub area: AreaKind,
}

/// Caller-visible state of the remote proposal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteStatus {
    #[default]
    Idle,
    Pending {
        ticket: u64,
    },
    Succeeded {
        ticket: u64,
    },
    Failed {
        ticket: u64,
        error: SolverError,
    },
}

impl RemoteStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }
}

#[derive(Debug, Default)]
pub struct RemoteTracker {
    last_ticket: u64,
    status: RemoteStatus,
}

impl RemoteTracker {
    pub fn status(&self) -> &RemoteStatus {
        &self.status
    }

    /// Start a request, superseding any in-flight one
    pub fn begin(&mut self, area: AreaKind) -> RemoteTicket {
        if let RemoteStatus::Pending { ticket } = self.status {
            tracing::debug!(ticket, "Superseding in-flight remote assignment");
        }
        self.last_ticket += 1;
        self.status = RemoteStatus::Pending {
            ticket: self.last_ticket,
        };
        RemoteTicket {
            id: self.last_ticket,
            area,
        }
    }

    /// Whether `ticket` is the request the engine is waiting for
    pub fn is_current(&self, ticket: &RemoteTicket) -> bool {
        self.status == RemoteStatus::Pending { ticket: ticket.id }
    }

    pub fn succeed(&mut self, ticket: &RemoteTicket) {
        self.status = RemoteStatus::Succeeded { ticket: ticket.id };
    }

    pub fn fail(&mut self, ticket: &RemoteTicket, error: SolverError) {
        self.status = RemoteStatus::Failed {
            ticket: ticket.id,
            error,
        };
    }

    /// Abandon the in-flight request; its response will be stale
    pub fn cancel(&mut self) -> bool {
        if self.status.is_pending() {
            self.status = RemoteStatus::Idle;
            return true;
        }
        false
    }
}

/// Turn a raw solver answer into a proposal
///
/// Rejects answers that seat one guest twice, or that mention guests or
/// tables the request did not contain.
pub fn normalize_response(
    area: &Area,
    guests: &[Guest],
    response: SolverResponse,
) -> Result<AssignmentProposal, SolverError> {
    let known_guests: HashSet<&str> = guests.iter().map(|g| g.id.as_str()).collect();
    let mut mapping = BTreeMap::new();

    for placement in response.assignments {
        if !known_guests.contains(placement.guest_id.as_str()) {
            return Err(SolverError::MalformedResponse(format!(
                "unknown guest {}",
                placement.guest_id
            )));
        }
        if area.table(placement.table_id).is_none() {
            return Err(SolverError::MalformedResponse(format!(
                "unknown table {}",
                placement.table_id
            )));
        }
        if mapping
            .insert(placement.guest_id.clone(), placement.table_id)
            .is_some()
        {
            return Err(SolverError::MalformedResponse(format!(
                "guest {} assigned twice",
                placement.guest_id
            )));
        }
    }

    let score = match response.score {
        Some(s) if s.is_finite() => s.clamp(0.0, 100.0),
        Some(_) => {
            return Err(SolverError::MalformedResponse("non-finite score".into()));
        }
        None => placed_share(area, guests, &mapping),
    };

    let issues = response
        .warnings
        .into_iter()
        .map(|message| AssignmentIssue {
            code: AssignmentIssueCode::SolverWarning,
            message,
            guest_ids: Vec::new(),
        })
        .collect();

    Ok(AssignmentProposal {
        id: Uuid::new_v4(),
        area: area.kind,
        source: ProposalSource::Server,
        mapping,
        score,
        issues,
        suggestions: response.suggestions,
        created_at: now_millis(),
    })
}

/// Share of unseated guests' seats the mapping places, 0..=100
fn placed_share(area: &Area, guests: &[Guest], mapping: &BTreeMap<String, i64>) -> f64 {
    let pending: Vec<&Guest> = guests
        .iter()
        .filter(|g| area.table_of_guest(&g.id).is_none())
        .collect();
    let total: u32 = pending.iter().map(|g| g.seat_count()).sum();
    if total == 0 {
        return 100.0;
    }
    let placed: u32 = pending
        .iter()
        .filter(|g| mapping.contains_key(&g.id))
        .map(|g| g.seat_count())
        .sum();
    f64::from(placed) / f64::from(total) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::SolverPlacement;
    use shared::Point;
    use shared::models::{Table, TableShape};

    fn area_with_table(id: i64) -> Area {
        let mut area = Area::new(AreaKind::Banquet);
        area.tables.push(Table {
            id,
            name: "Mesa 1".into(),
            shape: TableShape::Round { diameter: 150.0 },
            position: Point::new(100.0, 100.0),
            rotation: 0.0,
            auto_capacity: true,
            seats: 8,
            assigned_guest_ids: vec![],
            locked: false,
        });
        area
    }

    fn placement(guest: &str, table: i64) -> SolverPlacement {
        SolverPlacement {
            guest_id: guest.into(),
            table_id: table,
        }
    }

    #[test]
    fn test_tracker_supersedes() {
        let mut tracker = RemoteTracker::default();
        let first = tracker.begin(AreaKind::Banquet);
        let second = tracker.begin(AreaKind::Banquet);
        assert!(!tracker.is_current(&first));
        assert!(tracker.is_current(&second));
        tracker.succeed(&second);
        assert_eq!(tracker.status(), &RemoteStatus::Succeeded { ticket: second.id });
        assert!(!tracker.is_current(&second));
    }

    #[test]
    fn test_tracker_cancel() {
        let mut tracker = RemoteTracker::default();
        let ticket = tracker.begin(AreaKind::Ceremony);
        assert!(tracker.cancel());
        assert!(!tracker.is_current(&ticket));
        assert!(!tracker.cancel());
        assert_eq!(tracker.status(), &RemoteStatus::Idle);
    }

    #[test]
    fn test_normalize_ok() {
        let area = area_with_table(7);
        let guests = vec![Guest::new("g1", "Ana"), Guest::new("g2", "Luis")];
        let response = SolverResponse {
            assignments: vec![placement("g1", 7)],
            warnings: vec!["g2 has no compatible table".into()],
            ..Default::default()
        };
        let proposal = normalize_response(&area, &guests, response).unwrap();
        assert_eq!(proposal.source, ProposalSource::Server);
        assert_eq!(proposal.mapping.get("g1"), Some(&7));
        assert_eq!(proposal.score, 50.0);
        assert_eq!(proposal.issues[0].code, AssignmentIssueCode::SolverWarning);
    }

    #[test]
    fn test_normalize_rejects_duplicates_and_unknowns() {
        let area = area_with_table(7);
        let guests = vec![Guest::new("g1", "Ana")];

        let dup = SolverResponse {
            assignments: vec![placement("g1", 7), placement("g1", 7)],
            ..Default::default()
        };
        assert!(matches!(
            normalize_response(&area, &guests, dup),
            Err(SolverError::MalformedResponse(_))
        ));

        let unknown_guest = SolverResponse {
            assignments: vec![placement("ghost", 7)],
            ..Default::default()
        };
        assert!(normalize_response(&area, &guests, unknown_guest).is_err());

        let unknown_table = SolverResponse {
            assignments: vec![placement("g1", 99)],
            ..Default::default()
        };
        assert!(normalize_response(&area, &guests, unknown_table).is_err());
    }

    #[test]
    fn test_solver_score_is_clamped() {
        let area = area_with_table(7);
        let response = SolverResponse {
            score: Some(140.0),
            ..Default::default()
        };
        let proposal = normalize_response(&area, &[], response).unwrap();
        assert_eq!(proposal.score, 100.0);
    }
}
