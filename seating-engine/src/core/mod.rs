//! Engine core: configuration, error taxonomy and change notification

pub mod config;
pub mod error;
pub mod events;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult, SolverError, StoreError};
pub use events::{ChangeReason, EngineEvent, EventBus};
