//! Venue annotation model (perimeter, obstacles, doors, aisles)

use serde::{Deserialize, Serialize};

use crate::types::{Point, Rect};

/// Annotation identifier
pub type AnnotationId = i64;

/// Annotation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationType {
    Boundary,
    Obstacle,
    Door,
    Aisle,
}

/// Annotation geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Venue perimeter polygon
    Boundary { points: Vec<Point> },
    /// Blocking polygon (rectangles are stored as 4 vertices)
    Obstacle { points: Vec<Point> },
    /// Door position plus orientation in degrees
    Door { at: Point, angle: f64 },
    /// Walkway polyline
    Aisle { points: Vec<Point> },
}

impl AnnotationKind {
    pub fn annotation_type(&self) -> AnnotationType {
        match self {
            Self::Boundary { .. } => AnnotationType::Boundary,
            Self::Obstacle { .. } => AnnotationType::Obstacle,
            Self::Door { .. } => AnnotationType::Door,
            Self::Aisle { .. } => AnnotationType::Aisle,
        }
    }
}

/// An annotation drawn onto an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: AnnotationId,
    pub kind: AnnotationKind,
}

impl Annotation {
    pub fn annotation_type(&self) -> AnnotationType {
        self.kind.annotation_type()
    }

    /// Bounding box of the annotation geometry
    ///
    /// Doors are treated as a point; callers pad them as needed.
    pub fn bounds(&self) -> Option<Rect> {
        match &self.kind {
            AnnotationKind::Boundary { points }
            | AnnotationKind::Obstacle { points }
            | AnnotationKind::Aisle { points } => Rect::bounding(points),
            AnnotationKind::Door { at, .. } => Some(Rect::from_corners(*at, *at)),
        }
    }
}
