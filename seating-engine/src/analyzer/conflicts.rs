//! Spatial conflicts between tables and venue annotations
//!
//! Each table reports at most one placement conflict, checked in order:
//! perimeter, obstacles and doors, spacing to other tables. Aisle crossings
//! are reported separately since they can coexist with the others.

use shared::models::{AnnotationKind, Area, TableId};
use shared::{Point, Rect};

use crate::geometry::{point_in_polygon, polyline_crosses_rect, table_bounds};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    OutsidePerimeter,
    ObstacleCollision,
    InsufficientSpacing,
    BlocksAisle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub table_id: TableId,
}

/// First boundary polygon with at least 3 vertices
fn perimeter(area: &Area) -> Option<&[Point]> {
    area.annotations.iter().find_map(|a| match &a.kind {
        AnnotationKind::Boundary { points } if points.len() >= 3 => Some(points.as_slice()),
        _ => None,
    })
}

/// Bounding boxes of obstacles and doors
fn blockers(area: &Area) -> Vec<Rect> {
    area.annotations
        .iter()
        .filter(|a| {
            matches!(
                a.kind,
                AnnotationKind::Obstacle { .. } | AnnotationKind::Door { .. }
            )
        })
        .filter_map(|a| a.bounds())
        .collect()
}

fn inside_perimeter(bounds: &Rect, polygon: &[Point]) -> bool {
    bounds.corners().iter().all(|c| point_in_polygon(*c, polygon))
}

pub fn find_conflicts(area: &Area) -> Vec<Conflict> {
    let boundary = perimeter(area);
    let blockers = blockers(area);
    let half_aisle = area.aisle_min / 2.0;
    let boxes: Vec<(TableId, Rect)> = area
        .tables
        .iter()
        .map(|t| (t.id, table_bounds(t)))
        .collect();

    let mut out = Vec::new();
    for (table_id, bounds) in &boxes {
        let padded = bounds.expand(half_aisle);

        let kind = if boundary.is_some_and(|poly| !inside_perimeter(bounds, poly)) {
            Some(ConflictKind::OutsidePerimeter)
        } else if blockers.iter().any(|b| padded.overlaps(b)) {
            Some(ConflictKind::ObstacleCollision)
        } else if boxes
            .iter()
            .any(|(other, b)| other != table_id && padded.overlaps(&b.expand(half_aisle)))
        {
            Some(ConflictKind::InsufficientSpacing)
        } else {
            None
        };
        if let Some(kind) = kind {
            out.push(Conflict {
                kind,
                table_id: *table_id,
            });
        }

        let crosses_aisle = area.annotations.iter().any(|a| match &a.kind {
            AnnotationKind::Aisle { points } => polyline_crosses_rect(points, bounds),
            _ => false,
        });
        if crosses_aisle {
            out.push(Conflict {
                kind: ConflictKind::BlocksAisle,
                table_id: *table_id,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Annotation, AreaKind, Table, TableShape};

    fn table(id: TableId, x: f64, y: f64) -> Table {
        Table {
            id,
            name: format!("Mesa {id}"),
            shape: TableShape::Round { diameter: 100.0 },
            position: Point::new(x, y),
            rotation: 0.0,
            auto_capacity: true,
            seats: 5,
            assigned_guest_ids: vec![],
            locked: false,
        }
    }

    fn rect_points(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point> {
        Rect::from_corners(Point::new(x0, y0), Point::new(x1, y1))
            .corners()
            .to_vec()
    }

    #[test]
    fn test_spacing_uses_aisle_min() {
        let mut area = Area::new(AreaKind::Banquet);
        // gap between edges: 60 cm, below the 80 cm aisle
        area.tables = vec![table(1, 100.0, 100.0), table(2, 260.0, 100.0)];
        let conflicts = find_conflicts(&area);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts.iter().all(|c| c.kind == ConflictKind::InsufficientSpacing));

        area.aisle_min = 50.0;
        assert!(find_conflicts(&area).is_empty());
    }

    #[test]
    fn test_perimeter_takes_priority() {
        let mut area = Area::new(AreaKind::Banquet);
        area.annotations.push(Annotation {
            id: 10,
            kind: AnnotationKind::Boundary {
                points: rect_points(0.0, 0.0, 1000.0, 1000.0),
            },
        });
        area.tables = vec![table(1, 20.0, 500.0), table(2, 500.0, 500.0)];
        assert_eq!(
            find_conflicts(&area),
            vec![Conflict {
                kind: ConflictKind::OutsidePerimeter,
                table_id: 1
            }]
        );
    }

    #[test]
    fn test_obstacle_door_and_aisle() {
        let mut area = Area::new(AreaKind::Banquet);
        area.annotations = vec![
            Annotation {
                id: 10,
                kind: AnnotationKind::Obstacle {
                    points: rect_points(150.0, 0.0, 200.0, 200.0),
                },
            },
            Annotation {
                id: 11,
                kind: AnnotationKind::Door {
                    at: Point::new(1000.0, 120.0),
                    angle: 0.0,
                },
            },
            Annotation {
                id: 12,
                kind: AnnotationKind::Aisle {
                    points: vec![Point::new(500.0, 0.0), Point::new(500.0, 1000.0)],
                },
            },
        ];
        area.tables = vec![
            table(1, 100.0, 100.0),
            table(2, 1000.0, 100.0),
            table(3, 500.0, 600.0),
        ];
        let conflicts = find_conflicts(&area);
        assert!(conflicts.contains(&Conflict {
            kind: ConflictKind::ObstacleCollision,
            table_id: 1
        }));
        assert!(conflicts.contains(&Conflict {
            kind: ConflictKind::ObstacleCollision,
            table_id: 2
        }));
        assert!(conflicts.contains(&Conflict {
            kind: ConflictKind::BlocksAisle,
            table_id: 3
        }));
        assert_eq!(conflicts.len(), 3);
    }
}
