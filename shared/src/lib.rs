//! Shared types for the seating planner
//!
//! Plain data model (areas, tables, annotations, guests, assignment
//! proposals) and the unified error-code system. Everything here is
//! serde-serializable so a host can exchange plan data with the engine.

pub mod error;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use types::{Point, Rect};
