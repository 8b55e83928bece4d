//! Draw-mode state machine
//!
//! Exactly one tool is active. Pointer events are interpreted by the active
//! tool and turned into a [`DrawEffect`]; the engine applies committed
//! annotations and erasures to the plan, so this module never touches plan
//! data itself.

use serde::{Deserialize, Serialize};
use shared::Point;
use shared::models::{Annotation, AnnotationId, AnnotationKind};
use shared::types::Rect;

use crate::geometry::{distance_to_polyline, normalize_rotation, point_in_polygon};

/// Minimum spacing between recorded aisle points (cm)
pub const AISLE_POINT_SPACING: f64 = 10.0;
/// Erase hit radius around doors and aisle polylines (cm)
pub const ERASE_HIT_RADIUS: f64 = 25.0;
/// Vertices needed to close a boundary polygon
pub const MIN_BOUNDARY_VERTICES: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    #[default]
    Pan,
    Boundary,
    Obstacle,
    Door,
    Aisle,
    Erase,
}

/// Annotation being drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Boundary {
        vertices: Vec<Point>,
        /// Floating vertex following the pointer
        preview: Option<Point>,
    },
    Obstacle {
        anchor: Point,
        corner: Point,
    },
    Door {
        at: Point,
        angle: f64,
    },
    Aisle {
        points: Vec<Point>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    DoubleClick(Point),
}

/// Outcome of a pointer event
#[derive(Debug, Clone, PartialEq)]
pub enum DrawEffect {
    /// Nothing to do
    None,
    /// Viewport offset changed (pan only)
    ViewportMoved(Point),
    /// Draft started or extended
    DraftUpdated,
    /// Draft discarded without a commit
    DraftDiscarded,
    /// New annotation to add to the active area
    Commit(AnnotationKind),
    /// Annotation to remove from the active area
    Erase(AnnotationId),
}

#[derive(Debug, Clone, Default)]
pub struct DrawController {
    mode: DrawMode,
    draft: Option<Draft>,
    pan_anchor: Option<Point>,
    viewport: Point,
}

impl DrawController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn viewport_offset(&self) -> Point {
        self.viewport
    }

    /// Switch tool, dropping any draft or pan gesture
    ///
    /// Returns whether the mode actually changed.
    pub fn set_mode(&mut self, mode: DrawMode) -> bool {
        self.draft = None;
        self.pan_anchor = None;
        if self.mode == mode {
            return false;
        }
        tracing::debug!(from = ?self.mode, to = ?mode, "Draw mode changed");
        self.mode = mode;
        true
    }

    /// Drop the draft (escape); returns whether one existed
    pub fn cancel_draft(&mut self) -> bool {
        self.pan_anchor = None;
        self.draft.take().is_some()
    }

    /// Interpret a pointer event under the active tool
    ///
    /// `annotations` are the active area's annotations, used for erase
    /// hit-testing.
    pub fn handle(&mut self, event: PointerEvent, annotations: &[Annotation]) -> DrawEffect {
        match self.mode {
            DrawMode::Pan => self.handle_pan(event),
            DrawMode::Boundary => self.handle_boundary(event),
            DrawMode::Obstacle => self.handle_obstacle(event),
            DrawMode::Door => self.handle_door(event),
            DrawMode::Aisle => self.handle_aisle(event),
            DrawMode::Erase => match event {
                PointerEvent::Down(p) => hit_test(annotations, p)
                    .map(DrawEffect::Erase)
                    .unwrap_or(DrawEffect::None),
                _ => DrawEffect::None,
            },
        }
    }

    fn handle_pan(&mut self, event: PointerEvent) -> DrawEffect {
        match event {
            PointerEvent::Down(p) => {
                self.pan_anchor = Some(p);
                DrawEffect::None
            }
            PointerEvent::Move(p) => match self.pan_anchor.replace(p) {
                Some(anchor) => {
                    self.viewport = self.viewport.offset(p.x - anchor.x, p.y - anchor.y);
                    DrawEffect::ViewportMoved(self.viewport)
                }
                None => {
                    self.pan_anchor = None;
                    DrawEffect::None
                }
            },
            PointerEvent::Up(_) | PointerEvent::DoubleClick(_) => {
                self.pan_anchor = None;
                DrawEffect::None
            }
        }
    }

    fn handle_boundary(&mut self, event: PointerEvent) -> DrawEffect {
        match (event, self.draft.as_mut()) {
            (PointerEvent::Down(p), Some(Draft::Boundary { vertices, preview })) => {
                // the first click of a double-click lands on the last vertex
                if vertices.last().is_none_or(|last| last.distance_to(p) > f64::EPSILON) {
                    vertices.push(p);
                }
                *preview = None;
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Down(p), _) => {
                self.draft = Some(Draft::Boundary {
                    vertices: vec![p],
                    preview: None,
                });
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Move(p), Some(Draft::Boundary { preview, .. })) => {
                *preview = Some(p);
                DrawEffect::DraftUpdated
            }
            (PointerEvent::DoubleClick(_), Some(Draft::Boundary { .. })) => {
                let Some(Draft::Boundary { vertices, .. }) = self.draft.take() else {
                    return DrawEffect::None;
                };
                if vertices.len() >= MIN_BOUNDARY_VERTICES {
                    DrawEffect::Commit(AnnotationKind::Boundary { points: vertices })
                } else {
                    DrawEffect::DraftDiscarded
                }
            }
            _ => DrawEffect::None,
        }
    }

    fn handle_obstacle(&mut self, event: PointerEvent) -> DrawEffect {
        match (event, self.draft.as_mut()) {
            (PointerEvent::Down(p), _) => {
                self.draft = Some(Draft::Obstacle {
                    anchor: p,
                    corner: p,
                });
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Move(p), Some(Draft::Obstacle { corner, .. })) => {
                *corner = p;
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Up(p), Some(Draft::Obstacle { anchor, .. })) => {
                let rect = Rect::from_corners(*anchor, p);
                self.draft = None;
                if rect.width() > 0.0 && rect.height() > 0.0 {
                    DrawEffect::Commit(AnnotationKind::Obstacle {
                        points: rect.corners().to_vec(),
                    })
                } else {
                    DrawEffect::DraftDiscarded
                }
            }
            _ => DrawEffect::None,
        }
    }

    fn handle_door(&mut self, event: PointerEvent) -> DrawEffect {
        match (event, self.draft.as_mut()) {
            (PointerEvent::Down(p), _) => {
                self.draft = Some(Draft::Door { at: p, angle: 0.0 });
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Move(p), Some(Draft::Door { at, angle })) => {
                if at.distance_to(p) > 0.0 {
                    *angle = normalize_rotation((p.y - at.y).atan2(p.x - at.x).to_degrees());
                }
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Up(_), Some(Draft::Door { at, angle })) => {
                let kind = AnnotationKind::Door {
                    at: *at,
                    angle: *angle,
                };
                self.draft = None;
                DrawEffect::Commit(kind)
            }
            _ => DrawEffect::None,
        }
    }

    fn handle_aisle(&mut self, event: PointerEvent) -> DrawEffect {
        match (event, self.draft.as_mut()) {
            (PointerEvent::Down(p), _) => {
                self.draft = Some(Draft::Aisle { points: vec![p] });
                DrawEffect::DraftUpdated
            }
            (PointerEvent::Move(p), Some(Draft::Aisle { points })) => {
                if push_spaced(points, p) {
                    DrawEffect::DraftUpdated
                } else {
                    DrawEffect::None
                }
            }
            (PointerEvent::Up(p), Some(Draft::Aisle { points })) => {
                push_spaced(points, p);
                let points = std::mem::take(points);
                self.draft = None;
                if points.len() >= 2 {
                    DrawEffect::Commit(AnnotationKind::Aisle { points })
                } else {
                    DrawEffect::DraftDiscarded
                }
            }
            _ => DrawEffect::None,
        }
    }
}

fn push_spaced(points: &mut Vec<Point>, p: Point) -> bool {
    match points.last() {
        Some(last) if last.distance_to(p) < AISLE_POINT_SPACING => false,
        _ => {
            points.push(p);
            true
        }
    }
}

/// Topmost annotation under a point (last drawn wins)
pub fn hit_test(annotations: &[Annotation], p: Point) -> Option<AnnotationId> {
    annotations
        .iter()
        .rev()
        .find(|a| match &a.kind {
            AnnotationKind::Boundary { points } | AnnotationKind::Obstacle { points } => {
                point_in_polygon(p, points)
            }
            AnnotationKind::Door { at, .. } => at.distance_to(p) <= ERASE_HIT_RADIUS,
            AnnotationKind::Aisle { points } => {
                distance_to_polyline(p, points).is_some_and(|d| d <= ERASE_HIT_RADIUS)
            }
        })
        .map(|a| a.id)
}
