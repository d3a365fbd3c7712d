//! Allocation errors.

use rust_decimal::Decimal;
use thiserror::Error;

use finch_shared::types::InvoiceId;
use finch_shared::AppError;

use crate::lifecycle::LifecycleError;

/// Errors that reject an allocation batch as a whole.
///
/// No batch is ever partially applied: a failed validation leaves zero
/// application records behind.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AllocationError {
    /// A proposal carried a negative requested amount.
    #[error("Requested amount {amount} for invoice {invoice} is negative")]
    NegativeAmount {
        /// The invoice the proposal targets.
        invoice: InvoiceId,
        /// The rejected amount.
        amount: Decimal,
    },

    /// The same invoice appeared more than once in the batch.
    #[error("Invoice {invoice} appears more than once in the batch")]
    DuplicateInvoice {
        /// The invoice proposed twice.
        invoice: InvoiceId,
    },

    /// The batch contained no positive proposals.
    #[error("Allocation batch contains no positive proposals")]
    EmptyAllocation,

    /// The batch requested more credit than remains on the note.
    #[error("Requested {requested} exceeds remaining credit {remaining}")]
    InsufficientCredit {
        /// The batch's total requested amount, after per-proposal clamps.
        requested: Decimal,
        /// The credit still available on the note.
        remaining: Decimal,
    },

    /// The credit note's status or version rejected the application.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

impl From<AllocationError> for AppError {
    fn from(err: AllocationError) -> Self {
        match err {
            AllocationError::NegativeAmount { .. } | AllocationError::DuplicateInvoice { .. } => {
                Self::Validation(err.to_string())
            }
            AllocationError::EmptyAllocation => Self::EmptyAllocation(err.to_string()),
            AllocationError::InsufficientCredit { .. } => Self::InsufficientCredit(err.to_string()),
            AllocationError::Lifecycle(inner) => inner.into(),
        }
    }
}
