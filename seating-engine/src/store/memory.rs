//! In-process collaborators for tests and demos

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use shared::models::{Area, AreaKind, Guest};
use tokio::sync::RwLock;

use super::{GuestDirectory, SnapshotStore};
use crate::core::StoreError;

/// Snapshot store keeping areas as JSON in memory
///
/// Areas are stored serialized so a loaded area never aliases a saved one.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    areas: Arc<RwLock<HashMap<(String, AreaKind), String>>>,
    unavailable: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with `StoreError::Unavailable`
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub async fn contains(&self, wedding_id: &str, kind: AreaKind) -> bool {
        self.areas
            .read()
            .await
            .contains_key(&(wedding_id.to_string(), kind))
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn load_area(&self, wedding_id: &str, kind: AreaKind) -> Result<Area, StoreError> {
        self.check_available()?;
        let areas = self.areas.read().await;
        let json = areas
            .get(&(wedding_id.to_string(), kind))
            .ok_or_else(|| StoreError::NotFound {
                wedding_id: wedding_id.to_string(),
                area: kind,
            })?;
        serde_json::from_str(json).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    async fn save_area(
        &self,
        wedding_id: &str,
        kind: AreaKind,
        area: &Area,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let json =
            serde_json::to_string(area).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.areas
            .write()
            .await
            .insert((wedding_id.to_string(), kind), json);
        self.saves.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(wedding_id, area = %kind, "Area saved to memory store");
        Ok(())
    }
}

/// Guest directory over a fixed list per wedding
#[derive(Debug, Clone, Default)]
pub struct MemoryGuestDirectory {
    guests: Arc<RwLock<HashMap<String, Vec<Guest>>>>,
}

impl MemoryGuestDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, wedding_id: impl Into<String>, guests: Vec<Guest>) {
        self.guests.write().await.insert(wedding_id.into(), guests);
    }
}

#[async_trait]
impl GuestDirectory for MemoryGuestDirectory {
    async fn list_guests(&self, wedding_id: &str) -> Result<Vec<Guest>, StoreError> {
        Ok(self
            .guests
            .read()
            .await
            .get(wedding_id)
            .cloned()
            .unwrap_or_default())
    }
}
