//! Snapshot store and guest directory collaborators
//!
//! The engine reads and writes whole areas through [`SnapshotStore`] and
//! reads guests through [`GuestDirectory`]. Transport, retries and
//! conflict resolution belong to the implementations; the engine assumes
//! last-write-wins.

mod memory;

pub use memory::{MemoryGuestDirectory, MemorySnapshotStore};

use async_trait::async_trait;
use shared::models::{Area, AreaKind, Guest};

use crate::core::StoreError;

#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load one area; `StoreError::NotFound` when it was never saved
    async fn load_area(&self, wedding_id: &str, kind: AreaKind) -> Result<Area, StoreError>;

    async fn save_area(&self, wedding_id: &str, kind: AreaKind, area: &Area)
    -> Result<(), StoreError>;
}

/// Read-only guest source
#[async_trait]
pub trait GuestDirectory: Send + Sync {
    async fn list_guests(&self, wedding_id: &str) -> Result<Vec<Guest>, StoreError>;
}
