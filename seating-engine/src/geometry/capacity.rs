//! Seat capacity from table geometry
//!
//! Pure functions: same shape and limit in, same seat count out.

use shared::models::TableShape;
use std::f64::consts::PI;

/// Arc length each seat needs around a round table (cm)
pub const ROUND_SEAT_ARC_CM: f64 = 55.0;
/// Edge length each seat needs along a straight side (cm)
pub const EDGE_SEAT_CM: f64 = 60.0;
/// Smallest usable round table
pub const ROUND_MIN_SEATS: u32 = 4;
/// Smallest usable rectangular / square table
pub const EDGE_MIN_SEATS: u32 = 2;

/// Capacity of a shape before the global maximum is applied
pub fn raw_capacity(shape: &TableShape) -> u32 {
    if !shape.is_valid() {
        return 0;
    }

    match *shape {
        TableShape::Round { diameter } => {
            let seats = (PI * diameter / ROUND_SEAT_ARC_CM).floor() as u32;
            seats.max(ROUND_MIN_SEATS)
        }
        TableShape::Rectangular { width, height } => {
            let seats = (2.0 * (width + height) / EDGE_SEAT_CM).floor() as u32;
            // both long sides seat the same number of guests
            (seats - seats % 2).max(EDGE_MIN_SEATS)
        }
        TableShape::Square { side } => {
            let seats = (4.0 * side / EDGE_SEAT_CM).floor() as u32;
            seats.max(EDGE_MIN_SEATS)
        }
        TableShape::Custom { width, height } => {
            let seats = (2.0 * (width + height) / EDGE_SEAT_CM).floor() as u32;
            seats.max(EDGE_MIN_SEATS)
        }
    }
}

/// Seat capacity clamped to `[0, max_seats]` when a maximum is configured
pub fn compute_capacity(shape: &TableShape, max_seats: Option<u32>) -> u32 {
    let seats = raw_capacity(shape);
    match max_seats {
        Some(max) => seats.min(max),
        None => seats,
    }
}

/// Seats per long side and per short side of a rectangular table
///
/// `seats` is split evenly between the two halves of the table, then each
/// half is shared between a long and a short side in proportion to their
/// lengths. Returns `None` for non-rectangular shapes.
pub fn seat_split(shape: &TableShape, seats: u32) -> Option<(u32, u32)> {
    let TableShape::Rectangular { width, height } = *shape else {
        return None;
    };
    if !shape.is_valid() {
        return Some((0, 0));
    }

    let (long, short) = if width >= height {
        (width, height)
    } else {
        (height, width)
    };
    let half = seats / 2;
    let on_long = ((half as f64) * long / (long + short)).round() as u32;
    Some((on_long.min(half), half - on_long.min(half)))
}
