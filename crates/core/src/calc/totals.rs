//! Document-level totals aggregation.
//!
//! Rounding to the currency minor unit happens here, once, on each
//! aggregated component. The grand total is computed from the rounded
//! components so the reported figures always reconcile exactly.
//!
//! Header discounts never retroactively reduce tax: tax is summed from
//! the per-line post-discount bases. This mirrors the line-level
//! tax-after-discount rule applied consistently.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finch_shared::types::{Currency, Percent};

use crate::calc::error::{CalcError, CalcWarning};
use crate::calc::line::LineAmounts;

/// A discount applied to the whole document, after line-level discounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HeaderDiscount {
    /// No header discount.
    #[default]
    None,
    /// A percentage of the post-line-discount base.
    Percentage(Percent),
    /// A fixed amount, capped so the total cannot go negative.
    Fixed(Decimal),
}

/// Aggregated document totals, rounded to the currency's minor unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    /// Sum of line gross amounts, before any discount.
    pub subtotal: Decimal,
    /// Sum of per-line discounts.
    pub line_discount_total: Decimal,
    /// Effective header discount amount after capping.
    pub header_discount_amount: Decimal,
    /// Sum of per-line taxes.
    pub tax_total: Decimal,
    /// `subtotal − line_discount_total − header_discount_amount + tax_total`,
    /// clamped at zero.
    pub total: Decimal,
}

/// Totals plus any non-fatal warnings raised while computing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TotalsOutcome {
    /// The computed totals.
    pub totals: DocumentTotals,
    /// Clamp warnings, surfaced to the caller but never aborting.
    pub warnings: Vec<CalcWarning>,
}

/// Aggregates line amounts into document totals and applies the header
/// discount.
///
/// Pure and idempotent: calling it twice on the same inputs yields
/// identical results.
///
/// # Errors
///
/// Returns [`CalcError::NegativeDiscount`] when a fixed header discount
/// is negative. Percentage discounts are range-checked at construction
/// by [`Percent`].
pub fn compute_totals(
    lines: &[LineAmounts],
    header_discount: &HeaderDiscount,
    currency: Currency,
) -> Result<TotalsOutcome, CalcError> {
    let mut warnings = Vec::new();

    let subtotal = currency.round(lines.iter().map(|l| l.gross).sum());
    let line_discount_total = currency.round(lines.iter().map(|l| l.discount).sum());
    let tax_total = currency.round(lines.iter().map(|l| l.tax).sum());

    // The base the header discount applies to.
    let base = subtotal - line_discount_total;

    let header_discount_amount = match header_discount {
        HeaderDiscount::None => Decimal::ZERO,
        HeaderDiscount::Percentage(pct) => currency.round(pct.of(base)),
        HeaderDiscount::Fixed(raw) => {
            if raw.is_sign_negative() {
                return Err(CalcError::NegativeDiscount(*raw));
            }
            let rounded = currency.round(*raw);
            if rounded > base {
                warnings.push(CalcWarning::HeaderDiscountClamped {
                    requested: rounded,
                    cap: base,
                });
                base
            } else {
                rounded
            }
        }
    };

    let raw_total = base - header_discount_amount + tax_total;
    let total = if raw_total.is_sign_negative() {
        warnings.push(CalcWarning::TotalClamped { raw: raw_total });
        Decimal::ZERO
    } else {
        raw_total
    };

    Ok(TotalsOutcome {
        totals: DocumentTotals {
            subtotal,
            line_discount_total,
            header_discount_amount,
            tax_total,
            total,
        },
        warnings,
    })
}

/// Amount still owed on a payable document, clamped at zero.
#[must_use]
pub fn amount_due(total: Decimal, amount_paid: Decimal) -> Decimal {
    (total - amount_paid).max(Decimal::ZERO)
}

/// Credit remaining on a credit note after applications and refunds,
/// clamped at zero.
#[must_use]
pub fn remaining_credit(total: Decimal, applied: Decimal, refunded: Decimal) -> Decimal {
    (total - applied - refunded).max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::line::{compute_line, LineInput};
    use rust_decimal_macros::dec;

    fn amounts(quantity: Decimal, price: Decimal, discount: Decimal, tax: Decimal) -> LineAmounts {
        compute_line(&LineInput {
            quantity,
            unit_price: price,
            discount_percent: discount,
            tax_percent: tax,
        })
        .unwrap()
    }

    #[test]
    fn test_single_line_totals() {
        let lines = vec![amounts(dec!(2), dec!(100), dec!(10), dec!(8))];
        let outcome = compute_totals(&lines, &HeaderDiscount::None, Currency::Usd).unwrap();
        let t = outcome.totals;
        assert_eq!(t.subtotal, dec!(200.00));
        assert_eq!(t.line_discount_total, dec!(20.00));
        assert_eq!(t.tax_total, dec!(14.40));
        assert_eq!(t.header_discount_amount, dec!(0));
        assert_eq!(t.total, dec!(194.40));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_rounding_at_aggregation_only() {
        // Each line carries 9.999 of discount; the rounded aggregate is
        // 20.00, not 2 × 10.00 computed from pre-rounded lines.
        let lines = vec![
            amounts(dec!(3), dec!(10), dec!(33.33), dec!(0)),
            amounts(dec!(3), dec!(10), dec!(33.33), dec!(0)),
        ];
        let outcome = compute_totals(&lines, &HeaderDiscount::None, Currency::Usd).unwrap();
        assert_eq!(outcome.totals.line_discount_total, dec!(20.00));
        assert_eq!(outcome.totals.total, dec!(40.00));
    }

    #[test]
    fn test_header_percentage_discount() {
        // base 180, 10% header discount = 18; tax stays 14.40
        let lines = vec![amounts(dec!(2), dec!(100), dec!(10), dec!(8))];
        let discount = HeaderDiscount::Percentage(Percent::new(dec!(10)).unwrap());
        let outcome = compute_totals(&lines, &discount, Currency::Usd).unwrap();
        assert_eq!(outcome.totals.header_discount_amount, dec!(18.00));
        assert_eq!(outcome.totals.tax_total, dec!(14.40));
        assert_eq!(outcome.totals.total, dec!(176.40));
    }

    #[test]
    fn test_header_fixed_discount() {
        let lines = vec![amounts(dec!(1), dec!(500), dec!(0), dec!(0))];
        let outcome =
            compute_totals(&lines, &HeaderDiscount::Fixed(dec!(50)), Currency::Usd).unwrap();
        assert_eq!(outcome.totals.header_discount_amount, dec!(50.00));
        assert_eq!(outcome.totals.total, dec!(450.00));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_header_fixed_discount_clamped() {
        // subtotal 500, fixed discount 600: clamp to 500, total 0, warn
        let lines = vec![amounts(dec!(1), dec!(500), dec!(0), dec!(0))];
        let outcome =
            compute_totals(&lines, &HeaderDiscount::Fixed(dec!(600)), Currency::Usd).unwrap();
        assert_eq!(outcome.totals.header_discount_amount, dec!(500.00));
        assert_eq!(outcome.totals.total, dec!(0));
        assert_eq!(
            outcome.warnings,
            vec![CalcWarning::HeaderDiscountClamped {
                requested: dec!(600.00),
                cap: dec!(500.00),
            }]
        );
    }

    #[test]
    fn test_header_discount_does_not_reduce_tax() {
        // Tax is summed from per-line bases; a 100% header discount
        // leaves the reported tax untouched.
        let lines = vec![amounts(dec!(1), dec!(100), dec!(0), dec!(10))];
        let discount = HeaderDiscount::Percentage(Percent::new(dec!(100)).unwrap());
        let outcome = compute_totals(&lines, &discount, Currency::Usd).unwrap();
        assert_eq!(outcome.totals.tax_total, dec!(10.00));
        assert_eq!(outcome.totals.total, dec!(10.00));
    }

    #[test]
    fn test_negative_fixed_discount_rejected() {
        let lines = vec![amounts(dec!(1), dec!(100), dec!(0), dec!(0))];
        let result = compute_totals(&lines, &HeaderDiscount::Fixed(dec!(-5)), Currency::Usd);
        assert_eq!(result, Err(CalcError::NegativeDiscount(dec!(-5))));
    }

    #[test]
    fn test_empty_lines() {
        let outcome = compute_totals(&[], &HeaderDiscount::None, Currency::Usd).unwrap();
        assert_eq!(outcome.totals.subtotal, dec!(0));
        assert_eq!(outcome.totals.total, dec!(0));
    }

    #[test]
    fn test_idempotence() {
        let lines = vec![
            amounts(dec!(2), dec!(100), dec!(10), dec!(8)),
            amounts(dec!(1), dec!(33.33), dec!(5), dec!(21)),
        ];
        let discount = HeaderDiscount::Fixed(dec!(25));
        let first = compute_totals(&lines, &discount, Currency::Usd).unwrap();
        let second = compute_totals(&lines, &discount, Currency::Usd).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_decimal_currency() {
        let lines = vec![amounts(dec!(3), dec!(333.4), dec!(0), dec!(0))];
        let outcome = compute_totals(&lines, &HeaderDiscount::None, Currency::Jpy).unwrap();
        // 1000.2 rounds to the whole yen
        assert_eq!(outcome.totals.subtotal, dec!(1000));
        assert_eq!(outcome.totals.total, dec!(1000));
    }

    #[test]
    fn test_amount_due() {
        assert_eq!(amount_due(dec!(100), dec!(40)), dec!(60));
        assert_eq!(amount_due(dec!(100), dec!(100)), dec!(0));
        // Overpayment clamps at zero
        assert_eq!(amount_due(dec!(100), dec!(120)), dec!(0));
    }

    #[test]
    fn test_remaining_credit() {
        assert_eq!(remaining_credit(dec!(150), dec!(100), dec!(20)), dec!(30));
        assert_eq!(remaining_credit(dec!(150), dec!(150), dec!(0)), dec!(0));
        assert_eq!(remaining_credit(dec!(150), dec!(100), dec!(60)), dec!(0));
    }
}
