//! Application-wide error types.

use thiserror::Error;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
///
/// Module-level errors (`CalcError`, `LifecycleError`, `AllocationError`)
/// convert into this envelope at the API boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed input (negative quantity, out-of-range percent, ...).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Illegal `(state, event)` pair for a document.
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// Allocation batch exceeds the remaining credit.
    #[error("Insufficient credit: {0}")]
    InsufficientCredit(String),

    /// Allocation batch contains no positive proposals.
    #[error("Empty allocation: {0}")]
    EmptyAllocation(String),

    /// Version token mismatch (concurrent mutation detected by the caller).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::InvalidTransition(_) | Self::Conflict(_) => 409,
            Self::InsufficientCredit(_) | Self::EmptyAllocation(_) => 422,
            Self::NotFound(_) => 404,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidTransition(_) => "INVALID_TRANSITION",
            Self::InsufficientCredit(_) => "INSUFFICIENT_CREDIT",
            Self::EmptyAllocation(_) => "EMPTY_ALLOCATION",
            Self::Conflict(_) => "CONFLICT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AppError::Validation(String::new()).status_code(), 400);
        assert_eq!(
            AppError::InvalidTransition(String::new()).status_code(),
            409
        );
        assert_eq!(
            AppError::InsufficientCredit(String::new()).status_code(),
            422
        );
        assert_eq!(AppError::EmptyAllocation(String::new()).status_code(), 422);
        assert_eq!(AppError::Conflict(String::new()).status_code(), 409);
        assert_eq!(AppError::NotFound(String::new()).status_code(), 404);
        assert_eq!(AppError::Internal(String::new()).status_code(), 500);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            AppError::Validation(String::new()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            AppError::InvalidTransition(String::new()).error_code(),
            "INVALID_TRANSITION"
        );
        assert_eq!(
            AppError::InsufficientCredit(String::new()).error_code(),
            "INSUFFICIENT_CREDIT"
        );
        assert_eq!(
            AppError::EmptyAllocation(String::new()).error_code(),
            "EMPTY_ALLOCATION"
        );
        assert_eq!(AppError::Conflict(String::new()).error_code(), "CONFLICT");
        assert_eq!(AppError::NotFound(String::new()).error_code(), "NOT_FOUND");
        assert_eq!(
            AppError::Internal(String::new()).error_code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            AppError::Validation("msg".into()).to_string(),
            "Validation error: msg"
        );
        assert_eq!(
            AppError::InvalidTransition("msg".into()).to_string(),
            "Invalid transition: msg"
        );
        assert_eq!(
            AppError::InsufficientCredit("msg".into()).to_string(),
            "Insufficient credit: msg"
        );
    }
}
