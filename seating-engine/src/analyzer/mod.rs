//! Layout analyzer
//!
//! Deterministic, side-effect free scoring of one area. The result names
//! issues and ranked suggestions; acting on a suggestion is up to the
//! caller (a batch transform or an assignment), the analyzer never mutates.
//!
//! Score breakdown (out of [`MAX_SCORE`]):
//! - utilization (40): guests seated and seats filled
//! - walkability (35): share of tables without placement conflicts
//! - balance (25): evenness of table fill, minus isolated tables

mod conflicts;

pub use conflicts::{Conflict, ConflictKind, find_conflicts};

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use shared::models::{Area, AreaKind, Guest, TableId};

use crate::assignment::{group_parties, occupied_seats};
use crate::geometry::table_bounds;

pub const MAX_SCORE: f64 = 100.0;
const UTILIZATION_WEIGHT: f64 = 40.0;
const WALKABILITY_WEIGHT: f64 = 35.0;
const BALANCE_WEIGHT: f64 = 25.0;

/// Edge gap, in aisle widths, past which a table counts as isolated
const ISOLATION_AISLES: f64 = 5.0;
/// Tables whose centers differ by less than this on one axis look misaligned (cm)
const ALIGN_TOLERANCE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
    /// No tables to rate
    Empty,
}

impl Rating {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 85.0 => Self::Excellent,
            s if s >= 70.0 => Self::Good,
            s if s >= 50.0 => Self::Fair,
            _ => Self::Poor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::Poor => "poor",
            Self::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutIssueCode {
    OvercrowdedTable,
    CapacityBelowGuestCount,
    OutsidePerimeter,
    ObstacleCollision,
    InsufficientSpacing,
    BlocksAisle,
    IsolatedTable,
    EmptyTable,
    UnassignedGuests,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutIssue {
    pub code: LayoutIssueCode,
    pub message: String,
    pub table_ids: Vec<TableId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionType {
    Redistribute,
    EnlargeTable,
    AddTable,
    ReAlign,
    MoveTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutSuggestion {
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub priority: Priority,
    pub message: String,
    pub table_ids: Vec<TableId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub utilization: f64,
    pub walkability: f64,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutAnalysis {
    pub area: AreaKind,
    pub score: f64,
    pub max_score: f64,
    pub rating: Rating,
    pub breakdown: ScoreBreakdown,
    pub issues: Vec<LayoutIssue>,
    pub suggestions: Vec<LayoutSuggestion>,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Analyze one area against the guest list
pub fn analyze(area: &Area, guests: &[Guest]) -> LayoutAnalysis {
    if area.tables.is_empty() {
        let mut issues = Vec::new();
        let mut suggestions = Vec::new();
        if !guests.is_empty() {
            let needed: u32 = guests.iter().map(Guest::seat_count).sum();
            issues.push(LayoutIssue {
                code: LayoutIssueCode::CapacityBelowGuestCount,
                message: format!("{needed} seats needed, none available"),
                table_ids: vec![],
            });
            suggestions.push(LayoutSuggestion {
                kind: SuggestionType::AddTable,
                priority: Priority::High,
                message: format!("Add tables for {needed} seats"),
                table_ids: vec![],
            });
        }
        return LayoutAnalysis {
            area: area.kind,
            score: 0.0,
            max_score: MAX_SCORE,
            rating: Rating::Empty,
            breakdown: ScoreBreakdown::default(),
            issues,
            suggestions,
        };
    }

    let by_id: HashMap<&str, &Guest> = guests.iter().map(|g| (g.id.as_str(), g)).collect();
    let mut issues = Vec::new();
    let mut suggestions = Vec::new();

    // capacity
    let total_seats = area.total_seats();
    let demand: u32 = guests.iter().map(Guest::seat_count).sum();
    let occupancy: Vec<(TableId, u32, u32)> = area
        .tables
        .iter()
        .map(|t| (t.id, occupied_seats(t, &by_id), t.seats))
        .collect();
    let occupied_total: u32 = occupancy.iter().map(|(_, used, _)| *used).sum();

    let overcrowded: Vec<TableId> = occupancy
        .iter()
        .filter(|(_, used, seats)| used > seats)
        .map(|(id, _, _)| *id)
        .collect();
    if !overcrowded.is_empty() {
        issues.push(LayoutIssue {
            code: LayoutIssueCode::OvercrowdedTable,
            message: format!("{} tables seat more guests than they hold", overcrowded.len()),
            table_ids: overcrowded.clone(),
        });
        suggestions.push(LayoutSuggestion {
            kind: SuggestionType::Redistribute,
            priority: Priority::High,
            message: "Move guests from overcrowded tables to tables with free seats".into(),
            table_ids: overcrowded.clone(),
        });
    }

    if demand > total_seats {
        issues.push(LayoutIssue {
            code: LayoutIssueCode::CapacityBelowGuestCount,
            message: format!("{demand} seats needed, {total_seats} available"),
            table_ids: vec![],
        });
        suggestions.push(LayoutSuggestion {
            kind: SuggestionType::AddTable,
            priority: Priority::High,
            message: format!("Add {} more seats", demand - total_seats),
            table_ids: vec![],
        });
    }

    let unseated: Vec<&Guest> = guests
        .iter()
        .filter(|g| area.table_of_guest(&g.id).is_none())
        .collect();
    let seated_demand: u32 = demand - unseated.iter().map(|g| g.seat_count()).sum::<u32>();
    if !unseated.is_empty() {
        issues.push(LayoutIssue {
            code: LayoutIssueCode::UnassignedGuests,
            message: format!("{} guests have no table", unseated.len()),
            table_ids: vec![],
        });
        if demand <= total_seats {
            suggestions.push(LayoutSuggestion {
                kind: SuggestionType::Redistribute,
                priority: Priority::Medium,
                message: "Run auto-assignment to seat the remaining guests".into(),
                table_ids: vec![],
            });
        }
    }

    // parties no table can hold
    let largest = area.tables.iter().map(|t| t.seats).max().unwrap_or(0);
    let oversized = group_parties(unseated.iter().copied())
        .into_iter()
        .filter(|p| p.size > largest)
        .map(|p| p.size)
        .max();
    if let Some(size) = oversized {
        let target = area
            .tables
            .iter()
            .max_by_key(|t| (t.seats, std::cmp::Reverse(t.id)))
            .map(|t| vec![t.id])
            .unwrap_or_default();
        suggestions.push(LayoutSuggestion {
            kind: SuggestionType::EnlargeTable,
            priority: Priority::Medium,
            message: format!("Enlarge a table to {size} seats to keep the largest party together"),
            table_ids: target,
        });
    }

    // placement
    let conflicts = find_conflicts(area);
    let mut conflicted: BTreeSet<TableId> = BTreeSet::new();
    for (kind, code, message) in [
        (
            ConflictKind::OutsidePerimeter,
            LayoutIssueCode::OutsidePerimeter,
            "outside the venue perimeter",
        ),
        (
            ConflictKind::ObstacleCollision,
            LayoutIssueCode::ObstacleCollision,
            "too close to an obstacle or door",
        ),
        (
            ConflictKind::InsufficientSpacing,
            LayoutIssueCode::InsufficientSpacing,
            "closer than the minimum aisle to another table",
        ),
        (
            ConflictKind::BlocksAisle,
            LayoutIssueCode::BlocksAisle,
            "blocking an aisle",
        ),
    ] {
        let ids: Vec<TableId> = conflicts
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.table_id)
            .collect();
        if ids.is_empty() {
            continue;
        }
        conflicted.extend(ids.iter().copied());
        issues.push(LayoutIssue {
            code,
            message: format!("{} tables {}", ids.len(), message),
            table_ids: ids.clone(),
        });
        let priority = if kind == ConflictKind::InsufficientSpacing {
            Priority::Medium
        } else {
            Priority::High
        };
        suggestions.push(LayoutSuggestion {
            kind: SuggestionType::MoveTable,
            priority,
            message: format!("Move tables {message}"),
            table_ids: ids,
        });
    }

    let isolated = isolated_tables(area);
    if !isolated.is_empty() {
        issues.push(LayoutIssue {
            code: LayoutIssueCode::IsolatedTable,
            message: format!("{} tables are far from the rest", isolated.len()),
            table_ids: isolated.clone(),
        });
        suggestions.push(LayoutSuggestion {
            kind: SuggestionType::MoveTable,
            priority: Priority::Low,
            message: "Bring isolated tables closer to the group".into(),
            table_ids: isolated.clone(),
        });
    }

    let empty: Vec<TableId> = if occupied_total > 0 {
        occupancy
            .iter()
            .filter(|(_, used, _)| *used == 0)
            .map(|(id, _, _)| *id)
            .collect()
    } else {
        Vec::new()
    };
    if !empty.is_empty() {
        issues.push(LayoutIssue {
            code: LayoutIssueCode::EmptyTable,
            message: format!("{} tables have no guests", empty.len()),
            table_ids: empty,
        });
    }

    let misaligned = misaligned_tables(area);
    if !misaligned.is_empty() {
        suggestions.push(LayoutSuggestion {
            kind: SuggestionType::ReAlign,
            priority: Priority::Low,
            message: "Align tables that are almost in line".into(),
            table_ids: misaligned,
        });
    }

    // score
    let coverage = if demand == 0 {
        1.0
    } else {
        f64::from(seated_demand) / f64::from(demand)
    };
    let fill = if total_seats == 0 {
        0.0
    } else {
        (f64::from(occupied_total) / f64::from(total_seats)).min(1.0)
    };
    let utilization = UTILIZATION_WEIGHT * (0.5 * coverage + 0.5 * fill);

    let n = area.tables.len() as f64;
    let walkability = WALKABILITY_WEIGHT * (1.0 - conflicted.len() as f64 / n);

    let ratios: Vec<f64> = occupancy
        .iter()
        .map(|(_, used, seats)| {
            if *seats == 0 {
                1.0
            } else {
                (f64::from(*used) / f64::from(*seats)).min(1.0)
            }
        })
        .collect();
    let mean = ratios.iter().sum::<f64>() / n;
    let deviation = ratios.iter().map(|r| (r - mean).abs()).sum::<f64>() / n;
    let balance = (BALANCE_WEIGHT * (1.0 - deviation)
        - BALANCE_WEIGHT * 0.5 * isolated.len() as f64 / n)
        .max(0.0);

    let breakdown = ScoreBreakdown {
        utilization: round1(utilization),
        walkability: round1(walkability),
        balance: round1(balance),
    };
    let score = round1((utilization + walkability + balance).clamp(0.0, MAX_SCORE));

    suggestions.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(a.kind.cmp(&b.kind))
            .then(a.table_ids.first().cmp(&b.table_ids.first()))
    });

    tracing::debug!(area = %area.kind, score, issues = issues.len(), "Layout analyzed");

    LayoutAnalysis {
        area: area.kind,
        score,
        max_score: MAX_SCORE,
        rating: Rating::from_score(score),
        breakdown,
        issues,
        suggestions,
    }
}

/// Tables whose nearest neighbour edge gap exceeds the isolation distance
///
/// Needs at least 3 tables to make sense.
fn isolated_tables(area: &Area) -> Vec<TableId> {
    if area.tables.len() < 3 {
        return Vec::new();
    }
    let limit = ISOLATION_AISLES * area.aisle_min;
    let boxes: Vec<_> = area.tables.iter().map(|t| (t.id, table_bounds(t))).collect();
    boxes
        .iter()
        .filter(|(id, b)| {
            boxes
                .iter()
                .filter(|(other, _)| other != id)
                .map(|(_, o)| {
                    let dx = (o.min_x - b.max_x).max(b.min_x - o.max_x).max(0.0);
                    let dy = (o.min_y - b.max_y).max(b.min_y - o.max_y).max(0.0);
                    dx.hypot(dy)
                })
                .fold(f64::INFINITY, f64::min)
                > limit
        })
        .map(|(id, _)| *id)
        .collect()
}

/// Unlocked tables nearly, but not exactly, sharing a row or column
fn misaligned_tables(area: &Area) -> Vec<TableId> {
    let mut out = BTreeSet::new();
    for (i, a) in area.tables.iter().enumerate() {
        for b in &area.tables[i + 1..] {
            if a.locked || b.locked {
                continue;
            }
            let dy = (a.position.y - b.position.y).abs();
            let dx = (a.position.x - b.position.x).abs();
            if (dy > 0.0 && dy < ALIGN_TOLERANCE) || (dx > 0.0 && dx < ALIGN_TOLERANCE) {
                out.insert(a.id);
                out.insert(b.id);
            }
        }
    }
    out.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Point;
    use shared::models::{Table, TableShape};

    fn table(id: TableId, x: f64, y: f64, seats: u32, guests: &[&str]) -> Table {
        Table {
            id,
            name: format!("Mesa {id}"),
            shape: TableShape::Round { diameter: 100.0 },
            position: Point::new(x, y),
            rotation: 0.0,
            auto_capacity: false,
            seats,
            assigned_guest_ids: guests.iter().map(|g| g.to_string()).collect(),
            locked: false,
        }
    }

    fn area(tables: Vec<Table>) -> Area {
        let mut area = Area::new(AreaKind::Banquet);
        area.tables = tables;
        area
    }

    fn guests(ids: &[&str]) -> Vec<Guest> {
        ids.iter().map(|id| Guest::new(*id, *id)).collect()
    }

    #[test]
    fn test_empty_area_is_neutral() {
        let result = analyze(&Area::new(AreaKind::Ceremony), &[]);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.max_score, MAX_SCORE);
        assert_eq!(result.rating, Rating::Empty);
        assert!(result.issues.is_empty());

        let result = analyze(&Area::new(AreaKind::Ceremony), &guests(&["a"]));
        assert_eq!(result.issues[0].code, LayoutIssueCode::CapacityBelowGuestCount);
        assert_eq!(result.suggestions[0].kind, SuggestionType::AddTable);
    }

    #[test]
    fn test_perfect_layout_scores_max() {
        let area = area(vec![
            table(1, 200.0, 200.0, 2, &["a", "b"]),
            table(2, 400.0, 200.0, 2, &["c", "d"]),
        ]);
        let result = analyze(&area, &guests(&["a", "b", "c", "d"]));
        assert_eq!(result.score, 100.0);
        assert_eq!(result.rating, Rating::Excellent);
        assert!(result.issues.is_empty());
        assert!(result.suggestions.is_empty());
    }

    #[test]
    fn test_overcrowded_and_capacity() {
        let area = area(vec![
            table(1, 200.0, 200.0, 2, &["a", "b", "c"]),
            table(2, 400.0, 200.0, 2, &[]),
        ]);
        let result = analyze(&area, &guests(&["a", "b", "c", "d", "e"]));
        let codes: Vec<LayoutIssueCode> = result.issues.iter().map(|i| i.code).collect();
        assert!(codes.contains(&LayoutIssueCode::OvercrowdedTable));
        assert!(codes.contains(&LayoutIssueCode::CapacityBelowGuestCount));
        assert!(codes.contains(&LayoutIssueCode::UnassignedGuests));
        assert!(codes.contains(&LayoutIssueCode::EmptyTable));
        assert!(result.score < 85.0);

        // high priority first, then by type order
        assert_eq!(result.suggestions[0].priority, Priority::High);
        assert_eq!(result.suggestions[0].kind, SuggestionType::Redistribute);
        assert_eq!(result.suggestions[1].kind, SuggestionType::AddTable);
    }

    #[test]
    fn test_spacing_hurts_walkability() {
        let area = area(vec![
            table(1, 200.0, 200.0, 2, &[]),
            table(2, 320.0, 200.0, 2, &[]),
        ]);
        let result = analyze(&area, &[]);
        assert_eq!(result.breakdown.walkability, 0.0);
        assert!(
            result
                .issues
                .iter()
                .any(|i| i.code == LayoutIssueCode::InsufficientSpacing)
        );
        assert!(
            result
                .suggestions
                .iter()
                .any(|s| s.kind == SuggestionType::MoveTable && s.priority == Priority::Medium)
        );
    }

    #[test]
    fn test_isolated_and_misaligned() {
        let area = area(vec![
            table(1, 200.0, 200.0, 4, &[]),
            table(2, 400.0, 205.0, 4, &[]),
            table(3, 1700.0, 1100.0, 4, &[]),
        ]);
        let result = analyze(&area, &[]);
        let isolated = result
            .issues
            .iter()
            .find(|i| i.code == LayoutIssueCode::IsolatedTable)
            .unwrap();
        assert_eq!(isolated.table_ids, vec![3]);
        let realign = result
            .suggestions
            .iter()
            .find(|s| s.kind == SuggestionType::ReAlign)
            .unwrap();
        assert_eq!(realign.table_ids, vec![1, 2]);
    }

    #[test]
    fn test_enlarge_table_for_big_party() {
        let area = area(vec![table(1, 200.0, 200.0, 4, &[]), table(2, 500.0, 200.0, 6, &[])]);
        let party: Vec<Guest> = (0..8)
            .map(|i| Guest::new(format!("g{i}"), "x").in_party("fam"))
            .collect();
        let result = analyze(&area, &party);
        let enlarge = result
            .suggestions
            .iter()
            .find(|s| s.kind == SuggestionType::EnlargeTable)
            .unwrap();
        assert_eq!(enlarge.table_ids, vec![2]);
    }

    #[test]
    fn test_deterministic() {
        let area = area(vec![
            table(1, 200.0, 200.0, 2, &["a"]),
            table(2, 260.0, 200.0, 4, &[]),
            table(3, 900.0, 900.0, 4, &["b"]),
        ]);
        let guests = guests(&["a", "b", "c"]);
        assert_eq!(analyze(&area, &guests), analyze(&area, &guests));
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(Rating::from_score(85.0), Rating::Excellent);
        assert_eq!(Rating::from_score(70.0), Rating::Good);
        assert_eq!(Rating::from_score(50.0), Rating::Fair);
        assert_eq!(Rating::from_score(49.9), Rating::Poor);
    }
}
