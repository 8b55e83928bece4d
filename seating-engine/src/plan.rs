//! Plan editing operations
//!
//! Each function edits one [`Area`] in place and validates before the first
//! write, so an `Err` means the area is untouched. History, dirty tracking
//! and events are the engine's job; see [`crate::engine`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::Point;
use shared::models::{
    Annotation, AnnotationId, AnnotationKind, Area, GuestId, PlanSnapshot, Table, TableCreate,
    TableId, TableShape,
};
use shared::util::snowflake_id;

use crate::core::{EngineError, EngineResult};
use crate::geometry::{clamp_into_venue, compute_capacity, normalize_rotation};

/// Offset applied to a duplicated table (cm)
pub const DUPLICATE_OFFSET: f64 = 30.0;
/// Margin kept from the venue walls by `fix_table_position` (cm)
pub const VENUE_MARGIN: f64 = 20.0;
/// Largest grid `generate_banquet_layout` builds
pub const MAX_LAYOUT_TABLES: usize = 200;

/// Snowflake id unused by any table or annotation in `plan` and not in `reserved`
pub fn allocate_id(plan: &PlanSnapshot, reserved: &HashSet<i64>) -> i64 {
    let used: HashSet<i64> = plan
        .areas
        .values()
        .flat_map(|a| {
            a.tables
                .iter()
                .map(|t| t.id)
                .chain(a.annotations.iter().map(|n| n.id))
        })
        .collect();
    loop {
        let id = snowflake_id();
        if !used.contains(&id) && !reserved.contains(&id) {
            return id;
        }
    }
}

/// `n` distinct fresh ids
pub fn allocate_ids(plan: &PlanSnapshot, n: usize) -> Vec<i64> {
    let mut reserved = HashSet::with_capacity(n);
    (0..n)
        .map(|_| {
            let id = allocate_id(plan, &reserved);
            reserved.insert(id);
            id
        })
        .collect()
}

/// First free "Mesa N" name, counting from the table count
fn next_table_name(area: &Area) -> String {
    let mut n = area.tables.len() + 1;
    loop {
        let name = format!("Mesa {n}");
        if !area.tables.iter().any(|t| t.name == name) {
            return name;
        }
        n += 1;
    }
}

fn table_mut(area: &mut Area, id: TableId) -> EngineResult<&mut Table> {
    area.table_mut(id).ok_or(EngineError::TableNotFound(id))
}

fn unlocked_mut(area: &mut Area, id: TableId) -> EngineResult<&mut Table> {
    let table = table_mut(area, id)?;
    if table.locked {
        return Err(EngineError::TableLocked(id));
    }
    Ok(table)
}

fn check_seats(table_id: TableId, seats: u32, max: Option<u32>) -> EngineResult<()> {
    match max {
        Some(max) if seats > max => Err(EngineError::SeatsExceedMaximum {
            table_id,
            seats,
            max,
        }),
        _ => Ok(()),
    }
}

pub fn add_table(
    area: &mut Area,
    id: TableId,
    data: TableCreate,
    max_seats: Option<u32>,
) -> EngineResult<TableId> {
    if !data.shape.is_valid() {
        return Err(EngineError::InvalidDimensions);
    }
    let (auto_capacity, seats) = match data.seats {
        Some(seats) => {
            check_seats(id, seats, max_seats)?;
            (false, seats)
        }
        None => (true, compute_capacity(&data.shape, max_seats)),
    };
    let name = data
        .name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| next_table_name(area));
    area.tables.push(Table {
        id,
        name,
        shape: data.shape,
        position: data.position,
        rotation: normalize_rotation(data.rotation),
        auto_capacity,
        seats,
        assigned_guest_ids: Vec::new(),
        locked: false,
    });
    Ok(id)
}

/// Remove a table, returning the guests released back to the pool
pub fn remove_table(area: &mut Area, id: TableId) -> EngineResult<Vec<GuestId>> {
    let index = area
        .tables
        .iter()
        .position(|t| t.id == id)
        .ok_or(EngineError::TableNotFound(id))?;
    Ok(area.tables.remove(index).assigned_guest_ids)
}

/// Copy a table without its guests, offset diagonally
pub fn duplicate_table(area: &mut Area, id: TableId, new_id: TableId) -> EngineResult<TableId> {
    let source = area.table(id).ok_or(EngineError::TableNotFound(id))?;
    let copy = Table {
        id: new_id,
        name: next_table_name(area),
        position: source
            .position
            .offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET),
        assigned_guest_ids: Vec::new(),
        locked: false,
        ..source.clone()
    };
    area.tables.push(copy);
    Ok(new_id)
}

pub fn move_table(area: &mut Area, id: TableId, to: Point) -> EngineResult<()> {
    if !to.x.is_finite() || !to.y.is_finite() {
        return Err(EngineError::InvalidDimensions);
    }
    unlocked_mut(area, id)?.position = to;
    Ok(())
}

/// Set the absolute rotation
pub fn rotate_table(area: &mut Area, id: TableId, degrees: f64) -> EngineResult<()> {
    unlocked_mut(area, id)?.rotation = normalize_rotation(degrees);
    Ok(())
}

pub fn resize_table(
    area: &mut Area,
    id: TableId,
    shape: TableShape,
    max_seats: Option<u32>,
) -> EngineResult<()> {
    if !shape.is_valid() {
        return Err(EngineError::InvalidDimensions);
    }
    let table = unlocked_mut(area, id)?;
    table.shape = shape;
    if table.auto_capacity {
        table.seats = compute_capacity(&shape, max_seats);
    }
    Ok(())
}

/// Manual seat override
pub fn set_table_seats(
    area: &mut Area,
    id: TableId,
    seats: u32,
    max_seats: Option<u32>,
) -> EngineResult<()> {
    let table = table_mut(area, id)?;
    if table.auto_capacity {
        return Err(EngineError::SeatsAutoManaged(id));
    }
    check_seats(id, seats, max_seats)?;
    table.seats = seats;
    Ok(())
}

pub fn set_auto_capacity(
    area: &mut Area,
    id: TableId,
    enabled: bool,
    max_seats: Option<u32>,
) -> EngineResult<()> {
    let table = table_mut(area, id)?;
    table.auto_capacity = enabled;
    if enabled {
        table.seats = compute_capacity(&table.shape, max_seats);
    }
    Ok(())
}

/// Recompute seats of every auto-capacity table; returns how many changed
pub fn refresh_auto_capacity(area: &mut Area, max_seats: Option<u32>) -> usize {
    let mut changed = 0;
    for table in area.tables.iter_mut().filter(|t| t.auto_capacity) {
        let seats = compute_capacity(&table.shape, max_seats);
        if table.seats != seats {
            table.seats = seats;
            changed += 1;
        }
    }
    changed
}

pub fn rename_table(area: &mut Area, id: TableId, name: &str) -> EngineResult<()> {
    table_mut(area, id)?.name = name.trim().to_string();
    Ok(())
}

/// Flip the lock flag; returns the new state
pub fn toggle_table_lock(area: &mut Area, id: TableId) -> EngineResult<bool> {
    let table = table_mut(area, id)?;
    table.locked = !table.locked;
    Ok(table.locked)
}

/// Pull a table back inside the venue, keeping [`VENUE_MARGIN`] from the walls
pub fn fix_table_position(area: &mut Area, id: TableId) -> EngineResult<Point> {
    let (width, height) = (area.width, area.height);
    let table = table_mut(area, id)?;
    table.position = clamp_into_venue(table.position, width, height, VENUE_MARGIN);
    Ok(table.position)
}

pub fn set_venue_size(area: &mut Area, width: f64, height: f64) -> EngineResult<()> {
    if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
        return Err(EngineError::InvalidDimensions);
    }
    area.width = width;
    area.height = height;
    Ok(())
}

/// Drop every table and annotation, keeping the venue size
pub fn reset_area(area: &mut Area) -> Vec<GuestId> {
    area.annotations.clear();
    area.tables
        .drain(..)
        .flat_map(|t| t.assigned_guest_ids)
        .collect()
}

/// Grid of identical tables replacing an area's tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BanquetLayout {
    pub rows: u32,
    pub cols: u32,
    /// Center-to-center spacing (cm)
    pub gap_x: f64,
    pub gap_y: f64,
    /// Center of the first table (cm)
    pub start_x: f64,
    pub start_y: f64,
    pub shape: TableShape,
    /// Manual seat count; `None` for auto capacity
    pub seats: Option<u32>,
}

impl Default for BanquetLayout {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 4,
            gap_x: 140.0,
            gap_y: 160.0,
            start_x: 120.0,
            start_y: 160.0,
            shape: TableShape::Rectangular {
                width: 80.0,
                height: 60.0,
            },
            seats: Some(8),
        }
    }
}

impl BanquetLayout {
    pub fn table_count(&self) -> usize {
        (self.rows as usize).saturating_mul(self.cols as usize)
    }

    /// Check the grid size and table shape before any id is allocated
    pub fn validate(&self) -> EngineResult<()> {
        let tables = self.table_count();
        if tables > MAX_LAYOUT_TABLES {
            return Err(EngineError::LayoutTooLarge {
                tables,
                max: MAX_LAYOUT_TABLES,
            });
        }
        if !self.shape.is_valid() {
            return Err(EngineError::InvalidDimensions);
        }
        Ok(())
    }
}

/// Replace the area's tables with a generated grid
///
/// `ids` must hold at least [`BanquetLayout::table_count`] fresh ids.
/// Returns the guests released from the replaced tables.
pub fn generate_banquet_layout(
    area: &mut Area,
    layout: &BanquetLayout,
    ids: &[TableId],
    max_seats: Option<u32>,
) -> EngineResult<Vec<GuestId>> {
    layout.validate()?;
    if ids.len() < layout.table_count() {
        return Err(EngineError::InvalidDimensions);
    }
    let mut generated = Vec::with_capacity(layout.table_count());
    for row in 0..layout.rows {
        for col in 0..layout.cols {
            let index = generated.len();
            let id = ids[index];
            let (auto_capacity, seats) = match layout.seats {
                Some(seats) => {
                    check_seats(id, seats, max_seats)?;
                    (false, seats)
                }
                None => (true, compute_capacity(&layout.shape, max_seats)),
            };
            generated.push(Table {
                id,
                name: format!("Mesa {}", index + 1),
                shape: layout.shape,
                position: Point::new(
                    layout.start_x + f64::from(col) * layout.gap_x,
                    layout.start_y + f64::from(row) * layout.gap_y,
                ),
                rotation: 0.0,
                auto_capacity,
                seats,
                assigned_guest_ids: Vec::new(),
                locked: false,
            });
        }
    }
    let released = area
        .tables
        .drain(..)
        .flat_map(|t| t.assigned_guest_ids)
        .collect();
    area.tables = generated;
    Ok(released)
}

/// Release a guest from whichever table seats them
pub fn unassign_guest(area: &mut Area, guest_id: &str) -> EngineResult<TableId> {
    let table = area
        .tables
        .iter_mut()
        .find(|t| t.is_assigned(guest_id))
        .ok_or_else(|| EngineError::GuestNotFound(guest_id.to_string()))?;
    table.assigned_guest_ids.retain(|g| g != guest_id);
    Ok(table.id)
}

pub fn add_annotation(area: &mut Area, id: AnnotationId, kind: AnnotationKind) -> AnnotationId {
    area.annotations.push(Annotation { id, kind });
    id
}

pub fn delete_annotation(area: &mut Area, id: AnnotationId) -> EngineResult<Annotation> {
    let index = area
        .annotations
        .iter()
        .position(|a| a.id == id)
        .ok_or(EngineError::AnnotationNotFound(id))?;
    Ok(area.annotations.remove(index))
}
