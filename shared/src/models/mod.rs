//! Data models
//!
//! Shared between the engine, its collaborators (snapshot store, remote
//! solver) and the host UI. Table and annotation ids are snowflake `i64`s;
//! guest ids are opaque strings owned by the guest directory.

pub mod annotation;
pub mod area;
pub mod assignment;
pub mod guest;
pub mod table;

// Re-exports
pub use annotation::*;
pub use area::*;
pub use assignment::*;
pub use guest::*;
pub use table::*;
