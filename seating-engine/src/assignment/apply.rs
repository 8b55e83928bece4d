//! Atomic application of an assignment proposal to the plan

use std::collections::{BTreeMap, HashMap};

use shared::models::{AssignmentProposal, Guest, GuestId, PlanSnapshot, TableId};

use super::heuristic::occupied_seats;
use crate::core::{EngineError, EngineResult};

/// Validate a proposal against the current plan, then write it
///
/// All-or-nothing: every check runs before the first write, so an `Err`
/// leaves `plan` untouched. Guests already seated at their proposed table
/// are skipped. Returns the number of guests newly seated.
pub fn apply_proposal(
    plan: &mut PlanSnapshot,
    proposal: &AssignmentProposal,
    guests: &[Guest],
) -> EngineResult<usize> {
    let writes = plan_writes(plan, proposal, guests)?;
    let Some(area) = plan.areas.get_mut(&proposal.area) else {
        return Err(EngineError::AreaMissing {
            expected: proposal.area,
        });
    };

    let mut seated = 0;
    for (table_id, guest_ids) in writes {
        if let Some(table) = area.table_mut(table_id) {
            seated += guest_ids.len();
            table.assigned_guest_ids.extend(guest_ids);
        }
    }
    Ok(seated)
}

/// Read-only validation producing the per-table additions
fn plan_writes(
    plan: &PlanSnapshot,
    proposal: &AssignmentProposal,
    guests: &[Guest],
) -> EngineResult<BTreeMap<TableId, Vec<GuestId>>> {
    let area = plan.area(proposal.area).ok_or(EngineError::AreaMissing {
        expected: proposal.area,
    })?;
    let by_id: HashMap<&str, &Guest> = guests.iter().map(|g| (g.id.as_str(), g)).collect();

    let mut writes: BTreeMap<TableId, Vec<GuestId>> = BTreeMap::new();
    for (guest_id, table_id) in &proposal.mapping {
        if area.table(*table_id).is_none() {
            return Err(EngineError::ProposalStale(*table_id));
        }
        if !by_id.contains_key(guest_id.as_str()) {
            return Err(EngineError::GuestNotFound(guest_id.clone()));
        }

        let current = plan
            .areas
            .values()
            .find_map(|a| a.table_of_guest(guest_id).map(|t| (a.kind, t)));
        match current {
            Some((kind, t)) if kind == proposal.area && t == *table_id => continue,
            Some((_, t)) => {
                return Err(EngineError::GuestAlreadyAssigned {
                    guest_id: guest_id.clone(),
                    table_id: t,
                });
            }
            None => writes.entry(*table_id).or_default().push(guest_id.clone()),
        }
    }

    for (table_id, guest_ids) in &writes {
        let Some(table) = area.table(*table_id) else {
            return Err(EngineError::ProposalStale(*table_id));
        };
        let adding: u32 = guest_ids
            .iter()
            .filter_map(|g| by_id.get(g.as_str()))
            .map(|g| g.seat_count())
            .sum();
        let required = occupied_seats(table, &by_id) + adding;
        if required > table.seats {
            return Err(EngineError::TableOverCapacity {
                table_id: *table_id,
                required,
                seats: table.seats,
            });
        }
    }

    Ok(writes)
}
