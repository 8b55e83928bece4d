//! Selection & marquee
//!
//! Transient, never persisted: the ordered set of selected entities plus an
//! optional rubber-band rectangle being dragged.

use serde::{Deserialize, Serialize};
use shared::models::{AnnotationId, Area, Table, TableId};
use shared::{Point, Rect};

use crate::geometry::table_bounds;

/// A selectable plan entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityRef {
    Table(TableId),
    Annotation(AnnotationId),
}

/// In-progress marquee drag
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Marquee {
    pub start: Point,
    pub end: Point,
}

impl Marquee {
    /// Normalized rectangle, independent of drag direction
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.start, self.end)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    ids: Vec<EntityRef>,
    marquee: Option<Marquee>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selected entities in selection order
    pub fn selected_ids(&self) -> &[EntityRef] {
        &self.ids
    }

    /// Selected table ids in selection order
    pub fn selected_table_ids(&self) -> Vec<TableId> {
        self.ids
            .iter()
            .filter_map(|e| match e {
                EntityRef::Table(id) => Some(*id),
                EntityRef::Annotation(_) => None,
            })
            .collect()
    }

    pub fn is_selected(&self, entity: EntityRef) -> bool {
        self.ids.contains(&entity)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn marquee(&self) -> Option<&Marquee> {
        self.marquee.as_ref()
    }

    pub fn start_marquee(&mut self, p: Point) {
        self.marquee = Some(Marquee { start: p, end: p });
    }

    /// Move the free corner; ignored when no marquee is in progress
    pub fn update_marquee(&mut self, p: Point) -> bool {
        match self.marquee.as_mut() {
            Some(m) => {
                m.end = p;
                true
            }
            None => false,
        }
    }

    /// Finish the marquee, replacing the selection with every table whose
    /// position lies inside the rectangle (edges inclusive)
    ///
    /// The marquee is always reset, even when nothing matched. Without an
    /// in-progress marquee the selection is left as is and 0 is returned.
    pub fn end_marquee(&mut self, tables: &[Table]) -> usize {
        let Some(marquee) = self.marquee.take() else {
            return 0;
        };
        let rect = marquee.rect();
        self.ids = tables
            .iter()
            .filter(|t| rect.contains(t.position))
            .map(|t| EntityRef::Table(t.id))
            .collect();
        tracing::debug!(count = self.ids.len(), "Marquee selection finished");
        self.ids.len()
    }

    pub fn cancel_marquee(&mut self) {
        self.marquee = None;
    }

    /// Add or remove one entity (shift-click)
    pub fn toggle(&mut self, entity: EntityRef) {
        if let Some(pos) = self.ids.iter().position(|e| *e == entity) {
            self.ids.remove(pos);
        } else {
            self.ids.push(entity);
        }
    }

    /// Replace the selection with a single entity
    pub fn select_single(&mut self, entity: EntityRef) {
        self.ids.clear();
        self.ids.push(entity);
    }

    /// Replace (or extend when `append`) the selection, dropping duplicates
    pub fn select_many(&mut self, entities: impl IntoIterator<Item = EntityRef>, append: bool) {
        if !append {
            self.ids.clear();
        }
        for entity in entities {
            if !self.ids.contains(&entity) {
                self.ids.push(entity);
            }
        }
    }

    /// Drop selection and marquee; returns whether anything was selected
    pub fn clear(&mut self) -> bool {
        self.marquee = None;
        let had = !self.ids.is_empty();
        self.ids.clear();
        had
    }

    /// Forget entities that no longer exist in `area`
    ///
    /// Returns whether the selection changed.
    pub fn retain_existing(&mut self, area: &Area) -> bool {
        let before = self.ids.len();
        self.ids.retain(|e| match e {
            EntityRef::Table(id) => area.table(*id).is_some(),
            EntityRef::Annotation(id) => area.annotation(*id).is_some(),
        });
        before != self.ids.len()
    }
}

/// Topmost table under a point (last drawn wins)
pub fn table_at(tables: &[Table], p: Point) -> Option<TableId> {
    tables
        .iter()
        .rev()
        .find(|t| table_bounds(t).contains(p))
        .map(|t| t.id)
}
