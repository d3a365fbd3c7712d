//! Lifecycle error types and non-fatal warnings.

use rust_decimal::Decimal;
use thiserror::Error;

use finch_shared::AppError;

use crate::calc::CalcError;
use crate::document::types::{DocumentFamily, DocumentVersion};
use crate::document::DocumentError;

/// Errors that can occur during lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
    /// Attempted a `(state, event)` pair with no explicit transition row.
    #[error("Invalid {family} transition: cannot {event} from {from}")]
    InvalidTransition {
        /// The document family.
        family: DocumentFamily,
        /// The current status name.
        from: &'static str,
        /// The attempted event name.
        event: &'static str,
    },

    /// A reason is required for this action but was not provided.
    #[error("{action} reason is required")]
    ReasonRequired {
        /// The action that requires a reason.
        action: &'static str,
    },

    /// The caller's version token no longer matches the document.
    #[error("Stale document version: expected {expected}, found {actual}")]
    StaleVersion {
        /// The version the caller presented.
        expected: DocumentVersion,
        /// The document's current version.
        actual: DocumentVersion,
    },

    /// A payment or refund amount must be strictly positive.
    #[error("{action} amount must be positive, got {amount}")]
    NonPositiveAmount {
        /// The action being performed.
        action: &'static str,
        /// The rejected amount.
        amount: Decimal,
    },

    /// A payment exceeded the document's amount due.
    #[error("Payment {amount} exceeds amount due {due}")]
    PaymentExceedsAmountDue {
        /// The attempted payment.
        amount: Decimal,
        /// The amount still due.
        due: Decimal,
    },

    /// A date offset fell outside the supported calendar range.
    #[error("{action}: offset of {days} days is outside the calendar range")]
    DateOverflow {
        /// The action being performed.
        action: &'static str,
        /// The offending offset in days.
        days: i64,
    },

    /// The document's line items failed validation as a set.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The document's line items failed recomputation.
    #[error(transparent)]
    Calc(#[from] CalcError),
}

impl From<LifecycleError> for AppError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidTransition { .. } => Self::InvalidTransition(err.to_string()),
            LifecycleError::StaleVersion { .. } => Self::Conflict(err.to_string()),
            LifecycleError::ReasonRequired { .. }
            | LifecycleError::NonPositiveAmount { .. }
            | LifecycleError::PaymentExceedsAmountDue { .. }
            | LifecycleError::DateOverflow { .. }
            | LifecycleError::Document(_)
            | LifecycleError::Calc(_) => Self::Validation(err.to_string()),
        }
    }
}

/// A non-fatal clamp applied during a transition.
///
/// Surfaced to the caller but never aborting the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampWarning {
    /// The action whose amount was clamped.
    pub action: &'static str,
    /// The amount originally requested.
    pub requested: Decimal,
    /// The cap the amount was truncated to.
    pub cap: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invalid_transition_display() {
        let err = LifecycleError::InvalidTransition {
            family: DocumentFamily::Bill,
            from: "paid",
            event: "receive",
        };
        assert_eq!(err.to_string(), "Invalid bill transition: cannot receive from paid");
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = LifecycleError::InvalidTransition {
            family: DocumentFamily::Estimate,
            from: "converted",
            event: "send",
        }
        .into();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(err.status_code(), 409);

        let err: AppError = LifecycleError::StaleVersion {
            expected: DocumentVersion(1),
            actual: DocumentVersion(2),
        }
        .into();
        assert_eq!(err.error_code(), "CONFLICT");

        let err: AppError = LifecycleError::NonPositiveAmount {
            action: "payment",
            amount: dec!(0),
        }
        .into();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }
}
