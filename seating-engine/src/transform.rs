//! Batch transforms over the selected tables
//!
//! Every operation reads the current tables, computes the new positions and
//! reports each change through a mandatory `on_move` callback. Nothing here
//! mutates the plan directly; the engine collects the updates and commits
//! them as one history entry.
//!
//! Locked tables are never moved and do not take part in alignment or
//! distribution. An empty or undersized selection is a no-op that reports
//! zero moved tables.

use serde::{Deserialize, Serialize};
use shared::Point;
use shared::models::{Table, TableId};

use crate::geometry::normalize_rotation;

/// Minimum tables needed for an alignment
pub const MIN_ALIGN: usize = 2;
/// Minimum tables needed for a distribution
pub const MIN_DISTRIBUTE: usize = 3;

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlignDirection {
    Left,
    Right,
    Top,
    Bottom,
    /// Common x at the midpoint of the selection's x extrema
    CenterH,
    /// Common y at the midpoint of the selection's y extrema
    CenterV,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DistributeDirection {
    Horizontal,
    Vertical,
}

/// Selected, unlocked tables in selection order
fn movable<'a>(tables: &'a [Table], ids: &[TableId]) -> Vec<&'a Table> {
    ids.iter()
        .filter_map(|id| tables.iter().find(|t| t.id == *id))
        .filter(|t| !t.locked)
        .collect()
}

fn emit(table: &Table, to: Point, on_move: &mut impl FnMut(TableId, Point)) -> bool {
    let from = table.position;
    if (from.x - to.x).abs() < EPSILON && (from.y - to.y).abs() < EPSILON {
        return false;
    }
    on_move(table.id, to);
    true
}

/// Translate every selected table by the same delta
pub fn move_selected(
    tables: &[Table],
    ids: &[TableId],
    dx: f64,
    dy: f64,
    mut on_move: impl FnMut(TableId, Point),
) -> usize {
    if !dx.is_finite() || !dy.is_finite() {
        return 0;
    }
    movable(tables, ids)
        .into_iter()
        .filter(|t| emit(t, t.position.offset(dx, dy), &mut on_move))
        .count()
}

/// Snap the aligned axis of every selected table to one target coordinate
///
/// The other axis is left untouched.
pub fn align_selected(
    tables: &[Table],
    ids: &[TableId],
    direction: AlignDirection,
    mut on_move: impl FnMut(TableId, Point),
) -> usize {
    let selected = movable(tables, ids);
    if selected.len() < MIN_ALIGN {
        return 0;
    }

    let xs = selected.iter().map(|t| t.position.x);
    let ys = selected.iter().map(|t| t.position.y);
    let (min_x, max_x) = xs.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (min_y, max_y) = ys.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let target = |p: Point| match direction {
        AlignDirection::Left => Point::new(min_x, p.y),
        AlignDirection::Right => Point::new(max_x, p.y),
        AlignDirection::CenterH => Point::new((min_x + max_x) / 2.0, p.y),
        AlignDirection::Top => Point::new(p.x, min_y),
        AlignDirection::Bottom => Point::new(p.x, max_y),
        AlignDirection::CenterV => Point::new(p.x, (min_y + max_y) / 2.0),
    };

    selected
        .into_iter()
        .filter(|t| emit(t, target(t.position), &mut on_move))
        .count()
}

/// Space the selected tables evenly between the two extreme ones
///
/// Tables are ordered by the distribution axis (ties by id); the first and
/// last never move.
pub fn distribute_selected(
    tables: &[Table],
    ids: &[TableId],
    direction: DistributeDirection,
    mut on_move: impl FnMut(TableId, Point),
) -> usize {
    let mut selected = movable(tables, ids);
    if selected.len() < MIN_DISTRIBUTE {
        return 0;
    }

    let axis = |p: Point| match direction {
        DistributeDirection::Horizontal => p.x,
        DistributeDirection::Vertical => p.y,
    };
    selected.sort_by(|a, b| {
        axis(a.position)
            .total_cmp(&axis(b.position))
            .then(a.id.cmp(&b.id))
    });

    let n = selected.len();
    let first = axis(selected[0].position);
    let last = axis(selected[n - 1].position);
    let step = (last - first) / (n - 1) as f64;

    selected[1..n - 1]
        .iter()
        .enumerate()
        .filter(|(i, t)| {
            let value = first + (*i + 1) as f64 * step;
            let to = match direction {
                DistributeDirection::Horizontal => Point::new(value, t.position.y),
                DistributeDirection::Vertical => Point::new(t.position.x, value),
            };
            emit(t, to, &mut on_move)
        })
        .count()
}

/// Rotate every selected table by `degrees`, normalized to -180..180
pub fn rotate_selected(
    tables: &[Table],
    ids: &[TableId],
    degrees: f64,
    mut on_rotate: impl FnMut(TableId, f64),
) -> usize {
    if !degrees.is_finite() || degrees % 360.0 == 0.0 {
        return 0;
    }
    let selected = movable(tables, ids);
    for t in &selected {
        on_rotate(t.id, normalize_rotation(t.rotation + degrees));
    }
    selected.len()
}
