use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{AnnotationId, AreaKind, GuestId, TableId};
use thiserror::Error;

/// Remote assignment solver failures
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SolverError {
    #[error("Solver unreachable: {0}")]
    Network(String),

    #[error("Solver timed out")]
    Timeout,

    #[error("Malformed solver response: {0}")]
    MalformedResponse(String),

    #[error("Solver rejected the request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for SolverError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_decode() {
            Self::MalformedResponse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Snapshot store failures
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Area {area} not found for wedding {wedding_id}")]
    NotFound { wedding_id: String, area: AreaKind },

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Engine errors
///
/// Every command that fails leaves the plan untouched and pushes no
/// history entry.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    #[error("Table {0} computes its seats automatically")]
    SeatsAutoManaged(TableId),

    #[error("Table {table_id} cannot seat {seats}: maximum is {max}")]
    SeatsExceedMaximum {
        table_id: TableId,
        seats: u32,
        max: u32,
    },

    #[error("Invalid table dimensions")]
    InvalidDimensions,

    #[error("Table is locked: {0}")]
    TableLocked(TableId),

    #[error("Annotation not found: {0}")]
    AnnotationNotFound(AnnotationId),

    #[error("Proposal is stale: table {0} no longer exists")]
    ProposalStale(TableId),

    #[error("Proposal targets area {expected} but the plan has no such area")]
    AreaMissing { expected: AreaKind },

    #[error("Guest not found: {0}")]
    GuestNotFound(GuestId),

    #[error("Guest {guest_id} is already seated at table {table_id}")]
    GuestAlreadyAssigned { guest_id: GuestId, table_id: TableId },

    #[error("Table {table_id} would seat {required} of {seats}")]
    TableOverCapacity {
        table_id: TableId,
        required: u32,
        seats: u32,
    },

    #[error("No assignment proposal available")]
    ProposalNotFound,

    #[error("Layout of {tables} tables exceeds the limit of {max}")]
    LayoutTooLarge { tables: usize, max: usize },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for engine commands
pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Unified error code for the host UI
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::TableNotFound(_) => ErrorCode::TableNotFound,
            Self::SeatsAutoManaged(_) => ErrorCode::SeatsAutoManaged,
            Self::SeatsExceedMaximum { .. } => ErrorCode::SeatsExceedMaximum,
            Self::InvalidDimensions => ErrorCode::InvalidDimensions,
            Self::TableLocked(_) => ErrorCode::TableLocked,
            Self::AnnotationNotFound(_) => ErrorCode::AnnotationNotFound,
            Self::ProposalStale(_) | Self::AreaMissing { .. } => ErrorCode::ProposalStale,
            Self::GuestNotFound(_) => ErrorCode::GuestNotFound,
            Self::GuestAlreadyAssigned { .. } => ErrorCode::GuestAlreadyAssigned,
            Self::TableOverCapacity { .. } => ErrorCode::TableOverCapacity,
            Self::ProposalNotFound => ErrorCode::ProposalNotFound,
            Self::LayoutTooLarge { .. } => ErrorCode::ValueOutOfRange,
            Self::Solver(e) => match e {
                SolverError::Network(_) => ErrorCode::SolverNetwork,
                SolverError::Timeout => ErrorCode::SolverTimeout,
                SolverError::MalformedResponse(_) => ErrorCode::SolverMalformedResponse,
                SolverError::Rejected(_) => ErrorCode::SolverRejected,
            },
            Self::Store(StoreError::NotFound { .. }) => ErrorCode::StoreLoadFailed,
            Self::Store(_) => ErrorCode::StoreSaveFailed,
        }
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let code = err.code();
        let message = err.to_string();
        let app = AppError::with_message(code, message);
        match err {
            EngineError::TableNotFound(id)
            | EngineError::SeatsAutoManaged(id)
            | EngineError::TableLocked(id)
            | EngineError::ProposalStale(id) => app.with_detail("table_id", id),
            EngineError::SeatsExceedMaximum { table_id, max, .. } => app
                .with_detail("table_id", table_id)
                .with_detail("max", max),
            EngineError::AnnotationNotFound(id) => app.with_detail("annotation_id", id),
            EngineError::GuestNotFound(guest_id) => app.with_detail("guest_id", guest_id),
            EngineError::GuestAlreadyAssigned { guest_id, table_id } => app
                .with_detail("guest_id", guest_id)
                .with_detail("table_id", table_id),
            EngineError::TableOverCapacity {
                table_id, seats, ..
            } => app
                .with_detail("table_id", table_id)
                .with_detail("seats", seats),
            EngineError::LayoutTooLarge { tables, max } => app
                .with_detail("tables", tables)
                .with_detail("max", max),
            EngineError::Store(ref e) => {
                tracing::error!(error = %e, "Store error surfaced to host");
                app
            }
            _ => app,
        }
    }
}
