//! Unified error codes for the seating planner
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Table errors
//! - 3xxx: Annotation / draw errors
//! - 4xxx: Assignment errors
//! - 5xxx: Remote solver errors
//! - 6xxx: Snapshot store errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values so a host UI can match on
/// them without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Table ====================
    /// Table not found in the area
    TableNotFound = 1001,
    /// Seats cannot be edited while auto capacity is on
    SeatsAutoManaged = 1002,
    /// Seat override exceeds the global per-table maximum
    SeatsExceedMaximum = 1003,
    /// Table dimensions are not positive
    InvalidDimensions = 1004,
    /// Table is locked
    TableLocked = 1005,

    // ==================== 3xxx: Annotation ====================
    /// Annotation not found in the area
    AnnotationNotFound = 3001,

    // ==================== 4xxx: Assignment ====================
    /// Proposal references a table that no longer exists
    ProposalStale = 4001,
    /// Guest not found in the directory
    GuestNotFound = 4002,
    /// Guest already seated at another table
    GuestAlreadyAssigned = 4003,
    /// Applying would overfill a table
    TableOverCapacity = 4004,
    /// No proposal available
    ProposalNotFound = 4005,

    // ==================== 5xxx: Solver ====================
    /// Remote solver unreachable
    SolverNetwork = 5001,
    /// Remote solver timed out
    SolverTimeout = 5002,
    /// Remote solver returned an unusable response
    SolverMalformedResponse = 5003,
    /// Remote solver rejected the request
    SolverRejected = 5004,

    // ==================== 6xxx: Store ====================
    /// Loading an area failed
    StoreLoadFailed = 6001,
    /// Saving an area failed
    StoreSaveFailed = 6002,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Table
            ErrorCode::TableNotFound => "Table not found",
            ErrorCode::SeatsAutoManaged => "Seats are computed automatically for this table",
            ErrorCode::SeatsExceedMaximum => "Seats exceed the per-table maximum",
            ErrorCode::InvalidDimensions => "Table dimensions must be positive",
            ErrorCode::TableLocked => "Table is locked",

            // Annotation
            ErrorCode::AnnotationNotFound => "Annotation not found",

            // Assignment
            ErrorCode::ProposalStale => "Proposal references a table that no longer exists",
            ErrorCode::GuestNotFound => "Guest not found",
            ErrorCode::GuestAlreadyAssigned => "Guest is already seated at another table",
            ErrorCode::TableOverCapacity => "Table would exceed its capacity",
            ErrorCode::ProposalNotFound => "No assignment proposal available",

            // Solver
            ErrorCode::SolverNetwork => "Assignment solver is unreachable",
            ErrorCode::SolverTimeout => "Assignment solver timed out",
            ErrorCode::SolverMalformedResponse => "Assignment solver returned a malformed response",
            ErrorCode::SolverRejected => "Assignment solver rejected the request",

            // Store
            ErrorCode::StoreLoadFailed => "Failed to load seating area",
            ErrorCode::StoreSaveFailed => "Failed to save seating area",

            // System
            ErrorCode::InternalError => "Internal error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            5 => Ok(ErrorCode::InvalidRequest),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Table
            1001 => Ok(ErrorCode::TableNotFound),
            1002 => Ok(ErrorCode::SeatsAutoManaged),
            1003 => Ok(ErrorCode::SeatsExceedMaximum),
            1004 => Ok(ErrorCode::InvalidDimensions),
            1005 => Ok(ErrorCode::TableLocked),

            // Annotation
            3001 => Ok(ErrorCode::AnnotationNotFound),

            // Assignment
            4001 => Ok(ErrorCode::ProposalStale),
            4002 => Ok(ErrorCode::GuestNotFound),
            4003 => Ok(ErrorCode::GuestAlreadyAssigned),
            4004 => Ok(ErrorCode::TableOverCapacity),
            4005 => Ok(ErrorCode::ProposalNotFound),

            // Solver
            5001 => Ok(ErrorCode::SolverNetwork),
            5002 => Ok(ErrorCode::SolverTimeout),
            5003 => Ok(ErrorCode::SolverMalformedResponse),
            5004 => Ok(ErrorCode::SolverRejected),

            // Store
            6001 => Ok(ErrorCode::StoreLoadFailed),
            6002 => Ok(ErrorCode::StoreSaveFailed),

            // System
            9001 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ValueOutOfRange.code(), 8);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::TableNotFound.code(), 1001);
        assert_eq!(ErrorCode::SeatsExceedMaximum.code(), 1003);
        assert_eq!(ErrorCode::AnnotationNotFound.code(), 3001);
        assert_eq!(ErrorCode::ProposalStale.code(), 4001);
        assert_eq!(ErrorCode::SolverTimeout.code(), 5002);
        assert_eq!(ErrorCode::StoreSaveFailed.code(), 6002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(2), Ok(ErrorCode::ValidationFailed));
        assert_eq!(ErrorCode::try_from(4003), Ok(ErrorCode::GuestAlreadyAssigned));
        assert_eq!(ErrorCode::try_from(5003), Ok(ErrorCode::SolverMalformedResponse));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(4), Err(InvalidErrorCode(4)));
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
        assert_eq!(
            InvalidErrorCode(7777).to_string(),
            "invalid error code: 7777"
        );
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::TableLocked).unwrap();
        assert_eq!(json, "1005");
        let code: ErrorCode = serde_json::from_str("3001").unwrap();
        assert_eq!(code, ErrorCode::AnnotationNotFound);
        assert!(serde_json::from_str::<ErrorCode>("1999").is_err());
    }

    #[test]
    fn test_every_code_roundtrips_through_u16() {
        let all = [
            ErrorCode::ValidationFailed,
            ErrorCode::NotFound,
            ErrorCode::InvalidRequest,
            ErrorCode::ValueOutOfRange,
            ErrorCode::TableNotFound,
            ErrorCode::SeatsAutoManaged,
            ErrorCode::SeatsExceedMaximum,
            ErrorCode::InvalidDimensions,
            ErrorCode::TableLocked,
            ErrorCode::AnnotationNotFound,
            ErrorCode::ProposalStale,
            ErrorCode::GuestNotFound,
            ErrorCode::GuestAlreadyAssigned,
            ErrorCode::TableOverCapacity,
            ErrorCode::ProposalNotFound,
            ErrorCode::SolverNetwork,
            ErrorCode::SolverTimeout,
            ErrorCode::SolverMalformedResponse,
            ErrorCode::SolverRejected,
            ErrorCode::StoreLoadFailed,
            ErrorCode::StoreSaveFailed,
            ErrorCode::InternalError,
        ];
        for code in all {
            assert_eq!(ErrorCode::try_from(u16::from(code)), Ok(code));
            assert!(!code.message().is_empty());
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::TableNotFound), "1001");
    }
}
