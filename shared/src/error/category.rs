//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the leading digit of the error code:
/// - 0xxx: General errors
/// - 1xxx: Table errors
/// - 3xxx: Annotation errors
/// - 4xxx: Assignment errors
/// - 5xxx: Solver errors
/// - 6xxx: Store errors
/// - 9xxx: System errors
///
/// Unassigned ranges count as general.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Table errors (1xxx)
    Table,
    /// Annotation / draw errors (3xxx)
    Annotation,
    /// Assignment errors (4xxx)
    Assignment,
    /// Remote solver errors (5xxx)
    Solver,
    /// Snapshot store errors (6xxx)
    Store,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            1000..2000 => Self::Table,
            3000..4000 => Self::Annotation,
            4000..5000 => Self::Assignment,
            5000..6000 => Self::Solver,
            6000..7000 => Self::Store,
            9000.. => Self::System,
            _ => Self::General,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Table => "table",
            Self::Annotation => "annotation",
            Self::Assignment => "assignment",
            Self::Solver => "solver",
            Self::Store => "store",
            Self::System => "system",
        }
    }

    /// Whether the caller may simply re-issue the request
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Solver | Self::Store)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}
