//! Calculation errors and non-fatal warnings.

use rust_decimal::Decimal;
use thiserror::Error;

use finch_shared::AppError;

/// Validation errors for monetary computations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalcError {
    /// Line quantity must be strictly positive.
    #[error("Line quantity must be positive, got {0}")]
    NonPositiveQuantity(Decimal),

    /// Unit price must not be negative.
    #[error("Unit price must not be negative, got {0}")]
    NegativeUnitPrice(Decimal),

    /// A percentage fell outside `[0, 100]`.
    #[error("{field} must be between 0 and 100, got {value}")]
    PercentOutOfRange {
        /// The offending field name.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// A fixed header discount must not be negative.
    #[error("Fixed header discount must not be negative, got {0}")]
    NegativeDiscount(Decimal),
}

impl From<CalcError> for AppError {
    fn from(err: CalcError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Non-fatal warnings surfaced alongside computed totals.
///
/// A warning never aborts the operation; the clamped value is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalcWarning {
    /// A fixed header discount exceeded the discountable base and was capped.
    HeaderDiscountClamped {
        /// The raw discount value requested.
        requested: Decimal,
        /// The cap it was truncated to.
        cap: Decimal,
    },

    /// The computed total was negative and was clamped to zero.
    TotalClamped {
        /// The raw (negative) total before clamping.
        raw: Decimal,
    },
}
