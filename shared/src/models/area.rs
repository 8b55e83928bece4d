//! Area Model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{Annotation, AnnotationId, Table, TableId};

/// Default venue width (cm)
pub const DEFAULT_VENUE_WIDTH: f64 = 1800.0;
/// Default venue height (cm)
pub const DEFAULT_VENUE_HEIGHT: f64 = 1200.0;
/// Default minimum aisle width (cm)
pub const DEFAULT_AISLE_MIN: f64 = 80.0;

/// Venue zone (ceremony or banquet)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Ceremony,
    Banquet,
}

impl AreaKind {
    pub const ALL: [AreaKind; 2] = [AreaKind::Ceremony, AreaKind::Banquet];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ceremony => "ceremony",
            Self::Banquet => "banquet",
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A spatial region with its own tables and annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub kind: AreaKind,
    /// Venue width (cm)
    pub width: f64,
    /// Venue height (cm)
    pub height: f64,
    /// Minimum aisle width between tables (cm)
    #[serde(default = "default_aisle_min")]
    pub aisle_min: f64,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

fn default_aisle_min() -> f64 {
    DEFAULT_AISLE_MIN
}

impl Area {
    /// Empty area with the default venue size
    pub fn new(kind: AreaKind) -> Self {
        Self::with_size(kind, DEFAULT_VENUE_WIDTH, DEFAULT_VENUE_HEIGHT)
    }

    pub fn with_size(kind: AreaKind, width: f64, height: f64) -> Self {
        Self {
            kind,
            width,
            height,
            aisle_min: DEFAULT_AISLE_MIN,
            tables: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn table(&self, id: TableId) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn table_mut(&mut self, id: TableId) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id == id)
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Table currently seating `guest_id`, if any
    pub fn table_of_guest(&self, guest_id: &str) -> Option<TableId> {
        self.tables
            .iter()
            .find(|t| t.is_assigned(guest_id))
            .map(|t| t.id)
    }

    /// Total seats across every table
    pub fn total_seats(&self) -> u32 {
        self.tables.iter().map(|t| t.seats).sum()
    }
}

/// Full mutable plan state: every area keyed by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub areas: BTreeMap<AreaKind, Area>,
}

impl PlanSnapshot {
    pub fn area(&self, kind: AreaKind) -> Option<&Area> {
        self.areas.get(&kind)
    }
}

impl Default for PlanSnapshot {
    fn default() -> Self {
        Self {
            areas: AreaKind::ALL
                .iter()
                .map(|kind| (*kind, Area::new(*kind)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_has_both_areas() {
        let snapshot = PlanSnapshot::default();
        assert_eq!(snapshot.areas.len(), 2);
        let banquet = snapshot.area(AreaKind::Banquet).unwrap();
        assert_eq!(banquet.width, DEFAULT_VENUE_WIDTH);
        assert_eq!(banquet.aisle_min, DEFAULT_AISLE_MIN);
        assert!(banquet.tables.is_empty());
    }

    #[test]
    fn test_area_kind_serialize() {
        assert_eq!(
            serde_json::to_string(&AreaKind::Ceremony).unwrap(),
            "\"ceremony\""
        );
        assert_eq!(AreaKind::Banquet.to_string(), "banquet");
    }

    #[test]
    fn test_area_missing_optional_fields() {
        let json = r#"{"kind": "banquet", "width": 1000.0, "height": 800.0}"#;
        let area: Area = serde_json::from_str(json).unwrap();
        assert_eq!(area.aisle_min, DEFAULT_AISLE_MIN);
        assert!(area.tables.is_empty());
        assert!(area.annotations.is_empty());
    }
}
