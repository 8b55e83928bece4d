//! Geometry & capacity
//!
//! Pure helpers with no engine state: seat capacity from table shape and the
//! planar primitives the selection, draw-mode and analyzer modules share.

pub mod capacity;
pub mod shapes;

pub use capacity::{compute_capacity, raw_capacity, seat_split};
pub use shapes::{
    clamp_into_venue, distance_to_polyline, distance_to_segment, normalize_rotation,
    point_in_polygon, polyline_crosses_rect, shape_bounds, snap_to_grid, table_bounds,
};
