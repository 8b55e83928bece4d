//! Local best-fit-decreasing assignment
//!
//! Parties are packed whole, largest first, each into the table whose
//! remaining capacity fits it most tightly. A party is never split; one
//! that cannot be placed is reported as an issue.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use shared::models::{
    Area, AreaKind, AssignmentIssue, AssignmentIssueCode, AssignmentProposal, Guest, GuestId,
    PlanSnapshot, ProposalSource, Table, TableId,
};
use shared::util::now_millis;
use uuid::Uuid;

/// Guests seated together
#[derive(Debug, Clone, PartialEq)]
pub struct Party {
    /// `party_id`, or the guest id for a guest without one
    pub key: String,
    pub guest_ids: Vec<GuestId>,
    /// Seats needed, companions included
    pub size: u32,
}

/// Group guests by party, in order of first appearance
pub fn group_parties<'a>(guests: impl IntoIterator<Item = &'a Guest>) -> Vec<Party> {
    let mut parties: Vec<Party> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for guest in guests {
        let key = guest.party_id.clone().unwrap_or_else(|| guest.id.clone());
        match index.get(&key) {
            Some(&i) => {
                parties[i].guest_ids.push(guest.id.clone());
                parties[i].size += guest.seat_count();
            }
            None => {
                index.insert(key.clone(), parties.len());
                parties.push(Party {
                    key,
                    guest_ids: vec![guest.id.clone()],
                    size: guest.seat_count(),
                });
            }
        }
    }
    parties
}

/// Guests that may be seated in `kind`
///
/// A guest holds one seat in the whole plan, so anyone already seated in
/// another area is left out.
pub fn eligible_guests(plan: &PlanSnapshot, kind: AreaKind, guests: &[Guest]) -> Vec<Guest> {
    guests
        .iter()
        .filter(|g| {
            !plan
                .areas
                .values()
                .any(|a| a.kind != kind && a.table_of_guest(&g.id).is_some())
        })
        .cloned()
        .collect()
}

/// Seats taken at a table; guests missing from the directory count as one
pub fn occupied_seats(table: &Table, guests: &HashMap<&str, &Guest>) -> u32 {
    table
        .assigned_guest_ids
        .iter()
        .map(|id| guests.get(id.as_str()).map_or(1, |g| g.seat_count()))
        .sum()
}

/// Compute a local proposal for every guest not yet seated in `area`
pub fn local_assignment(area: &Area, guests: &[Guest]) -> AssignmentProposal {
    let by_id: HashMap<&str, &Guest> = guests.iter().map(|g| (g.id.as_str(), g)).collect();
    let pending: Vec<&Guest> = guests
        .iter()
        .filter(|g| area.table_of_guest(&g.id).is_none())
        .collect();

    let mut parties = group_parties(pending.iter().copied());
    parties.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.key.cmp(&b.key)));

    let mut remaining: Vec<(TableId, u32, u32)> = area
        .tables
        .iter()
        .map(|t| {
            let used = occupied_seats(t, &by_id);
            (t.id, t.seats, t.seats.saturating_sub(used))
        })
        .collect();
    let largest = area.tables.iter().map(|t| t.seats).max().unwrap_or(0);

    let mut mapping = BTreeMap::new();
    let mut issues = Vec::new();
    let mut placed_seats = 0u32;
    let mut unplaced_seats = 0u32;
    let mut too_large: Vec<GuestId> = Vec::new();
    let mut no_room: Vec<GuestId> = Vec::new();

    if area.tables.is_empty() && !parties.is_empty() {
        let guest_ids: Vec<GuestId> = parties.iter().flat_map(|p| p.guest_ids.clone()).collect();
        issues.push(AssignmentIssue {
            code: AssignmentIssueCode::NoTables,
            message: format!("No tables in {} to seat {} guests", area.kind, guest_ids.len()),
            guest_ids,
        });
        unplaced_seats = parties.iter().map(|p| p.size).sum();
        parties.clear();
    }

    for party in &parties {
        let best = remaining
            .iter_mut()
            .enumerate()
            .filter(|(_, (_, _, free))| *free >= party.size)
            .min_by_key(|(i, (_, _, free))| (*free, *i))
            .map(|(_, slot)| slot);

        match best {
            Some((table_id, _, free)) => {
                *free -= party.size;
                placed_seats += party.size;
                for guest_id in &party.guest_ids {
                    mapping.insert(guest_id.clone(), *table_id);
                }
            }
            None if party.size > largest => {
                unplaced_seats += party.size;
                too_large.extend(party.guest_ids.iter().cloned());
                issues.push(AssignmentIssue {
                    code: AssignmentIssueCode::PartyTooLarge,
                    message: format!(
                        "Party {} needs {} seats, the largest table has {}",
                        party.key, party.size, largest
                    ),
                    guest_ids: party.guest_ids.clone(),
                });
            }
            None => {
                unplaced_seats += party.size;
                no_room.extend(party.guest_ids.iter().cloned());
                issues.push(AssignmentIssue {
                    code: AssignmentIssueCode::InsufficientCapacity,
                    message: format!(
                        "No table has {} free seats left for party {}",
                        party.size, party.key
                    ),
                    guest_ids: party.guest_ids.clone(),
                });
            }
        }
    }

    let mut suggestions = Vec::new();
    if !too_large.is_empty() {
        suggestions.push(format!(
            "Add a table with at least {} seats or split the oversized parties by hand",
            parties
                .iter()
                .filter(|p| p.size > largest)
                .map(|p| p.size)
                .max()
                .unwrap_or(0)
        ));
    }
    if !no_room.is_empty() || (area.tables.is_empty() && unplaced_seats > 0) {
        suggestions.push(format!("Add {} more seats", unplaced_seats));
    }

    let pending_seats = placed_seats + unplaced_seats;
    let score = if pending_seats == 0 {
        100.0
    } else {
        f64::from(placed_seats) / f64::from(pending_seats) * 100.0
    };

    tracing::debug!(
        area = %area.kind,
        pending = pending.len(),
        placed = mapping.len(),
        issues = issues.len(),
        "Local assignment computed"
    );

    AssignmentProposal {
        id: Uuid::new_v4(),
        area: area.kind,
        source: ProposalSource::Local,
        mapping,
        score,
        issues,
        suggestions,
        created_at: now_millis(),
    }
}

/// Candidate table for one guest's party
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSuggestion {
    pub table_id: TableId,
    pub free_seats: u32,
    /// Free seats left after seating the party; negative when it does not fit
    pub fit: i64,
}

/// Rank the area's tables for seating `guest_id`'s party, best fit first
///
/// Unseated party members are counted; tables are ordered by the seats
/// left after seating them, most room first.
pub fn suggest_tables(area: &Area, guests: &[Guest], guest_id: &str) -> Vec<TableSuggestion> {
    let Some(guest) = guests.iter().find(|g| g.id == guest_id) else {
        return Vec::new();
    };
    let by_id: HashMap<&str, &Guest> = guests.iter().map(|g| (g.id.as_str(), g)).collect();

    let party_size: u32 = match &guest.party_id {
        Some(party) => guests
            .iter()
            .filter(|g| g.party_id.as_ref() == Some(party))
            .filter(|g| g.id == guest.id || area.table_of_guest(&g.id).is_none())
            .map(Guest::seat_count)
            .sum(),
        None => guest.seat_count(),
    };

    let mut list: Vec<TableSuggestion> = area
        .tables
        .iter()
        .map(|t| {
            let free = t.seats.saturating_sub(occupied_seats(t, &by_id));
            TableSuggestion {
                table_id: t.id,
                free_seats: free,
                fit: i64::from(free) - i64::from(party_size),
            }
        })
        .collect();
    list.sort_by(|a, b| b.fit.cmp(&a.fit));
    list
}
