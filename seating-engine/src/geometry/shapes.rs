use shared::models::{Table, TableShape};
use shared::{Point, Rect};

/// Axis-aligned bounding box of a table, rotation included
///
/// Round tables ignore rotation.
pub fn table_bounds(table: &Table) -> Rect {
    shape_bounds(&table.shape, table.position, table.rotation)
}

pub fn shape_bounds(shape: &TableShape, center: Point, rotation: f64) -> Rect {
    let (w, h) = shape.footprint();
    let (w, h) = (w.max(0.0), h.max(0.0));
    if let TableShape::Round { .. } = shape {
        return Rect::centered(center, w, h);
    }

    let rad = rotation.to_radians();
    let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
    Rect::centered(center, w * cos + h * sin, w * sin + h * cos)
}

/// Normalize an angle in degrees to `-180..=180`
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let mut d = degrees % 360.0;
    if d > 180.0 {
        d -= 360.0;
    } else if d < -180.0 {
        d += 360.0;
    }
    d
}

/// Round a point to the nearest grid intersection
pub fn snap_to_grid(p: Point, step: f64) -> Point {
    if step <= 0.0 || !step.is_finite() {
        return p;
    }
    Point::new((p.x / step).round() * step, (p.y / step).round() * step)
}

/// Clamp a point into `[margin, size - margin]` on both axes
pub fn clamp_into_venue(p: Point, width: f64, height: f64, margin: f64) -> Point {
    let clamp = |v: f64, size: f64| {
        let hi = (size - margin).max(margin);
        v.max(margin).min(hi)
    };
    Point::new(clamp(p.x, width), clamp(p.y, height))
}

/// Even-odd point-in-polygon test
///
/// Polygons with fewer than 3 vertices contain nothing.
pub fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from `p` to the segment `a..b`
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return p.distance_to(a);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    p.distance_to(Point::new(a.x + t * dx, a.y + t * dy))
}

/// Shortest distance from `p` to any segment of a polyline
///
/// A single point polyline degenerates to point distance; empty gives `None`.
pub fn distance_to_polyline(p: Point, points: &[Point]) -> Option<f64> {
    match points {
        [] => None,
        [only] => Some(p.distance_to(*only)),
        _ => points
            .windows(2)
            .map(|w| distance_to_segment(p, w[0], w[1]))
            .min_by(|a, b| a.total_cmp(b)),
    }
}

/// Whether the segment `a..b` touches `rect` (Liang-Barsky clipping)
fn segment_hits_rect(a: Point, b: Point, rect: &Rect) -> bool {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let (mut t0, mut t1) = (0.0f64, 1.0f64);
    for (p, q) in [
        (-dx, a.x - rect.min_x),
        (dx, rect.max_x - a.x),
        (-dy, a.y - rect.min_y),
        (dy, rect.max_y - a.y),
    ] {
        if p == 0.0 {
            // parallel to this edge and outside it
            if q < 0.0 {
                return false;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            t0 = t0.max(r);
        } else {
            t1 = t1.min(r);
        }
        if t0 > t1 {
            return false;
        }
    }
    true
}

/// Whether a polyline passes through a rectangle, edges included
pub fn polyline_crosses_rect(points: &[Point], rect: &Rect) -> bool {
    match points {
        [] => false,
        [only] => rect.contains(*only),
        _ => points
            .windows(2)
            .any(|w| segment_hits_rect(w[0], w[1], rect)),
    }
}
