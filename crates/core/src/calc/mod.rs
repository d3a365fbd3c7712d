//! Line item and document totals computation.
//!
//! # Rounding policy
//!
//! Line amounts are computed at full decimal precision. Rounding to the
//! currency's minor unit (banker's rounding) happens once, when line amounts
//! are aggregated into document totals. This avoids compounding per-line
//! rounding error and applies uniformly to every document family.
//!
//! # Modules
//!
//! - `line` - Per-line gross/discount/tax/net computation
//! - `totals` - Document-level aggregation and header discounts
//! - `error` - Calculation errors and non-fatal warnings

pub mod error;
pub mod line;
pub mod totals;

#[cfg(test)]
mod props;

pub use error::{CalcError, CalcWarning};
pub use line::{compute_line, LineAmounts, LineInput};
pub use totals::{
    amount_due, compute_totals, remaining_credit, DocumentTotals, HeaderDiscount, TotalsOutcome,
};
