//! Per-line monetary computation.
//!
//! Discount is applied before tax: tax is computed on the post-discount
//! base. Changing this order is an observable behavior change.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calc::error::CalcError;

/// Raw inputs for a single line computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineInput {
    /// Quantity, strictly positive.
    pub quantity: Decimal,
    /// Unit price, non-negative.
    pub unit_price: Decimal,
    /// Line discount percentage in `[0, 100]`.
    pub discount_percent: Decimal,
    /// Tax percentage in `[0, 100]`, applied after the discount.
    pub tax_percent: Decimal,
}

/// Amounts derived from a line's inputs, at full decimal precision.
///
/// Never stored independently of recomputation; rounding happens only
/// when lines are aggregated into document totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAmounts {
    /// `quantity × unit_price`, before any discount.
    pub gross: Decimal,
    /// `gross × discount_percent / 100`.
    pub discount: Decimal,
    /// `gross − discount`, the base tax is computed on.
    pub taxable: Decimal,
    /// `taxable × tax_percent / 100`.
    pub tax: Decimal,
    /// `taxable + tax`.
    pub net: Decimal,
}

/// Computes a line's gross, discount, taxable, tax, and net amounts.
///
/// # Errors
///
/// Returns a [`CalcError`] when the quantity is not strictly positive,
/// the unit price is negative, or a percentage falls outside `[0, 100]`.
/// Zero-quantity lines are rejected here, not silently zeroed.
pub fn compute_line(input: &LineInput) -> Result<LineAmounts, CalcError> {
    if input.quantity <= Decimal::ZERO {
        return Err(CalcError::NonPositiveQuantity(input.quantity));
    }
    if input.unit_price < Decimal::ZERO {
        return Err(CalcError::NegativeUnitPrice(input.unit_price));
    }
    validate_percent("discount_percent", input.discount_percent)?;
    validate_percent("tax_percent", input.tax_percent)?;

    let gross = input.quantity * input.unit_price;
    let discount = gross * input.discount_percent / Decimal::ONE_HUNDRED;
    let taxable = gross - discount;
    let tax = taxable * input.tax_percent / Decimal::ONE_HUNDRED;
    let net = taxable + tax;

    Ok(LineAmounts {
        gross,
        discount,
        taxable,
        tax,
        net,
    })
}

fn validate_percent(field: &'static str, value: Decimal) -> Result<(), CalcError> {
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(CalcError::PercentOutOfRange { field, value });
    }
    Ok(())
}
