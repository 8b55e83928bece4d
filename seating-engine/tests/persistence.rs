use seating_engine::{
    EngineConfig, EngineError, MemoryGuestDirectory, MemorySnapshotStore, SeatingEngine,
    SnapshotStore, StoreError,
};
use shared::Point;
use shared::models::{Area, AreaKind, Guest, TableCreate, TableShape};

fn round_at(x: f64, y: f64) -> TableCreate {
    TableCreate::new(TableShape::Round { diameter: 120.0 }, Point::new(x, y))
}

async fn seeded() -> (MemorySnapshotStore, MemoryGuestDirectory) {
    let store = MemorySnapshotStore::new();
    let directory = MemoryGuestDirectory::new();

    let mut banquet = Area::with_size(AreaKind::Banquet, 2000.0, 1500.0);
    let mut seed = SeatingEngine::new(EngineConfig::from_env());
    seed.add_table(round_at(300.0, 300.0)).unwrap();
    banquet.tables = seed.area(AreaKind::Banquet).unwrap().tables.clone();
    store
        .save_area("w1", AreaKind::Banquet, &banquet)
        .await
        .unwrap();

    directory
        .insert("w1", vec![Guest::new("g1", "Ana"), Guest::new("g2", "Luis")])
        .await;
    (store, directory)
}

#[tokio::test]
async fn test_load_replaces_plan() {
    let (store, directory) = seeded().await;
    let mut engine = SeatingEngine::new(EngineConfig::from_env());
    engine.add_table(round_at(50.0, 50.0)).unwrap();

    engine.load(&store, &directory, "w1").await.unwrap();
    assert_eq!(engine.wedding_id(), Some("w1"));
    let banquet = engine.area(AreaKind::Banquet).unwrap();
    assert_eq!(banquet.width, 2000.0);
    assert_eq!(banquet.tables.len(), 1);
    // never saved: starts empty
    assert!(engine.area(AreaKind::Ceremony).unwrap().tables.is_empty());
    assert_eq!(engine.guests().len(), 2);
    assert!(!engine.can_undo());
    assert!(!engine.is_dirty());
}

#[tokio::test]
async fn test_persist_saves_dirty_areas_only() {
    let (store, directory) = seeded().await;
    let mut engine = SeatingEngine::new(EngineConfig::from_env());
    engine.load(&store, &directory, "w1").await.unwrap();
    let saves_before = store.save_count();

    engine.add_table(round_at(800.0, 300.0)).unwrap();
    assert_eq!(engine.dirty_areas().collect::<Vec<_>>(), vec![AreaKind::Banquet]);

    assert_eq!(engine.persist(&store).await.unwrap(), 1);
    assert_eq!(store.save_count(), saves_before + 1);
    assert!(!engine.is_dirty());
    assert!(!store.contains("w1", AreaKind::Ceremony).await);

    let stored = store.load_area("w1", AreaKind::Banquet).await.unwrap();
    assert_eq!(&stored, engine.area(AreaKind::Banquet).unwrap());

    // nothing dirty, nothing saved
    assert_eq!(engine.persist(&store).await.unwrap(), 0);
}

#[tokio::test]
async fn test_failed_save_keeps_area_dirty() {
    let (store, directory) = seeded().await;
    let mut engine = SeatingEngine::new(EngineConfig::from_env());
    engine.load(&store, &directory, "w1").await.unwrap();
    engine.add_table(round_at(800.0, 300.0)).unwrap();

    store.set_unavailable(true);
    let err = engine.persist(&store).await.unwrap_err();
    assert!(matches!(err, EngineError::Store(StoreError::Unavailable(_))));
    assert!(engine.is_dirty());

    store.set_unavailable(false);
    assert_eq!(engine.persist(&store).await.unwrap(), 1);
}

#[tokio::test]
async fn test_undo_marks_area_dirty() {
    let (store, directory) = seeded().await;
    let mut engine = SeatingEngine::new(EngineConfig::from_env());
    engine.load(&store, &directory, "w1").await.unwrap();
    engine.set_active_area(AreaKind::Ceremony);
    engine.add_table(round_at(100.0, 100.0)).unwrap();
    engine.persist(&store).await.unwrap();
    assert!(!engine.is_dirty());

    assert!(engine.undo());
    assert_eq!(engine.dirty_areas().collect::<Vec<_>>(), vec![AreaKind::Ceremony]);
}

#[tokio::test]
async fn test_failed_load_changes_nothing() {
    let (store, directory) = seeded().await;
    let mut engine = SeatingEngine::new(EngineConfig::from_env());
    engine.add_table(round_at(50.0, 50.0)).unwrap();
    let before = engine.plan().clone();

    store.set_unavailable(true);
    assert!(engine.load(&store, &directory, "w1").await.is_err());
    assert_eq!(engine.plan(), &before);
    assert!(engine.wedding_id().is_none());
}

#[tokio::test]
async fn test_persist_needs_a_wedding() {
    let store = MemorySnapshotStore::new();
    let mut engine = SeatingEngine::new(EngineConfig::from_env());
    engine.add_table(round_at(50.0, 50.0)).unwrap();
    assert!(matches!(
        engine.persist(&store).await,
        Err(EngineError::Store(StoreError::Unavailable(_)))
    ));

    let mut engine = SeatingEngine::new(EngineConfig::from_env()).with_wedding_id("w9");
    engine.add_table(round_at(50.0, 50.0)).unwrap();
    assert_eq!(engine.persist(&store).await.unwrap(), 1);
}

#[tokio::test]
async fn test_load_recomputes_auto_capacity_seats() {
    let (store, directory) = seeded().await;
    let mut stale = store.load_area("w1", AreaKind::Banquet).await.unwrap();
    assert!(stale.tables[0].auto_capacity);
    stale.tables[0].seats = 30;
    store
        .save_area("w1", AreaKind::Banquet, &stale)
        .await
        .unwrap();

    let mut engine = SeatingEngine::new(EngineConfig::from_env().with_max_seats(0));
    engine.load(&store, &directory, "w1").await.unwrap();
    let table = &engine.area(AreaKind::Banquet).unwrap().tables[0];
    // 120 cm round
    assert_eq!(table.seats, 6);
    assert!(!engine.is_dirty());
}
