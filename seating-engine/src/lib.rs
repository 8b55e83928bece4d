//! Seating plan engine
//!
//! Spatial placement of tables and guests across the ceremony and banquet
//! areas of a venue:
//!
//! - [`geometry`]: seat capacity from table shape, planar helpers
//! - [`selection`]: selected entities and marquee selection
//! - [`transform`]: move / align / distribute / rotate over a selection
//! - [`history`]: linear undo/redo over plan snapshots
//! - [`draw_mode`]: annotation drawing tools driven by pointer events
//! - [`assignment`]: local best-fit proposals, remote solver lifecycle, apply
//! - [`analyzer`]: layout score, issues and ranked suggestions
//! - [`engine`]: the [`SeatingEngine`] facade a host UI binds to
//!
//! Collaborators (snapshot store, guest directory, remote solver) are traits
//! in [`store`] and [`solver`] with in-memory and HTTP implementations.

pub mod analyzer;
pub mod assignment;
pub mod core;
pub mod draw_mode;
pub mod engine;
pub mod geometry;
pub mod history;
pub mod logger;
pub mod plan;
pub mod selection;
pub mod solver;
pub mod store;
pub mod transform;

// Re-exports
pub use analyzer::{LayoutAnalysis, LayoutIssueCode, Priority, Rating, SuggestionType, analyze};
pub use assignment::{RemoteStatus, RemoteTicket};
pub use crate::core::{
    ChangeReason, EngineConfig, EngineError, EngineEvent, EngineResult, SolverError, StoreError,
};
pub use draw_mode::{DrawEffect, DrawMode, PointerEvent};
pub use engine::SeatingEngine;
pub use history::History;
pub use plan::BanquetLayout;
pub use selection::EntityRef;
pub use solver::{AssignmentSolver, HttpAssignmentSolver, SolverResponse};
pub use store::{GuestDirectory, MemoryGuestDirectory, MemorySnapshotStore, SnapshotStore};
pub use transform::{AlignDirection, DistributeDirection};
