//! Table Model

use serde::{Deserialize, Serialize};

use super::GuestId;
use crate::types::Point;

/// Table identifier
pub type TableId = i64;

/// Table category as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableType {
    Round,
    Rectangular,
    Square,
    Custom,
}

/// Table shape together with its dimensions (centimeters)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TableShape {
    Round { diameter: f64 },
    Rectangular { width: f64, height: f64 },
    Square { side: f64 },
    /// Free-form table approximated by its bounding width/height
    Custom { width: f64, height: f64 },
}

impl TableShape {
    pub fn table_type(&self) -> TableType {
        match self {
            Self::Round { .. } => TableType::Round,
            Self::Rectangular { .. } => TableType::Rectangular,
            Self::Square { .. } => TableType::Square,
            Self::Custom { .. } => TableType::Custom,
        }
    }

    /// Unrotated footprint `(width, height)`
    pub fn footprint(&self) -> (f64, f64) {
        match *self {
            Self::Round { diameter } => (diameter, diameter),
            Self::Rectangular { width, height } | Self::Custom { width, height } => {
                (width, height)
            }
            Self::Square { side } => (side, side),
        }
    }

    /// Every dimension strictly positive and finite
    pub fn is_valid(&self) -> bool {
        let (w, h) = self.footprint();
        w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0
    }
}

/// Seating table placed in an area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub shape: TableShape,
    /// Center of the table
    pub position: Point,
    /// Degrees, normalized to -180..180
    pub rotation: f64,
    /// When true `seats` is derived from the shape and never hand-edited
    pub auto_capacity: bool,
    pub seats: u32,
    /// Seated guests in seating order
    #[serde(default)]
    pub assigned_guest_ids: Vec<GuestId>,
    /// Locked tables ignore drags and batch transforms
    #[serde(default)]
    pub locked: bool,
}

impl Table {
    pub fn table_type(&self) -> TableType {
        self.shape.table_type()
    }

    pub fn is_assigned(&self, guest_id: &str) -> bool {
        self.assigned_guest_ids.iter().any(|g| g == guest_id)
    }
}

/// Add table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCreate {
    pub name: Option<String>,
    pub shape: TableShape,
    pub position: Point,
    #[serde(default)]
    pub rotation: f64,
    /// Manual seat count; `None` turns auto capacity on
    pub seats: Option<u32>,
}

impl TableCreate {
    /// Auto-capacity table at `position`
    pub fn new(shape: TableShape, position: Point) -> Self {
        Self {
            name: None,
            shape,
            position,
            rotation: 0.0,
            seats: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_seats(mut self, seats: u32) -> Self {
        self.seats = Some(seats);
        self
    }
}
