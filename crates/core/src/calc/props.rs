//! Property-based tests for the calculators.

use proptest::prelude::*;
use rust_decimal::Decimal;

use finch_shared::types::{Currency, Percent};

use crate::calc::line::{compute_line, LineInput};
use crate::calc::totals::{compute_totals, HeaderDiscount};

/// Strategy for positive quantities (0.01 ..= 10_000.00).
fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..=1_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for non-negative unit prices (0.00 ..= 100_000.00).
fn arb_unit_price() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000_000).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for percentages in [0, 100].
fn arb_percent() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|n| Decimal::new(n, 2))
}

fn arb_line() -> impl Strategy<Value = LineInput> {
    (arb_quantity(), arb_unit_price(), arb_percent(), arb_percent()).prop_map(
        |(quantity, unit_price, discount_percent, tax_percent)| LineInput {
            quantity,
            unit_price,
            discount_percent,
            tax_percent,
        },
    )
}

fn arb_header_discount() -> impl Strategy<Value = HeaderDiscount> {
    prop_oneof![
        Just(HeaderDiscount::None),
        arb_percent().prop_map(|p| HeaderDiscount::Percentage(Percent::new(p).unwrap())),
        // Deliberately allow fixed discounts far beyond any plausible total
        (0i64..=100_000_000).prop_map(|n| HeaderDiscount::Fixed(Decimal::new(n, 2))),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// net = quantity × price × (1 − d/100) × (1 + t/100), exactly.
    #[test]
    fn prop_line_net_identity(input in arb_line()) {
        let amounts = compute_line(&input).unwrap();
        let hundred = Decimal::ONE_HUNDRED;
        let expected = input.quantity * input.unit_price
            * (Decimal::ONE - input.discount_percent / hundred)
            * (Decimal::ONE + input.tax_percent / hundred);
        prop_assert_eq!(amounts.net, expected);
    }

    /// Every derived line amount is non-negative and taxable = gross − discount.
    #[test]
    fn prop_line_amounts_consistent(input in arb_line()) {
        let amounts = compute_line(&input).unwrap();
        prop_assert!(amounts.gross >= Decimal::ZERO);
        prop_assert!(amounts.discount >= Decimal::ZERO);
        prop_assert!(amounts.discount <= amounts.gross);
        prop_assert_eq!(amounts.taxable, amounts.gross - amounts.discount);
        prop_assert_eq!(amounts.net, amounts.taxable + amounts.tax);
    }

    /// The grand total never goes negative, even under adversarial
    /// fixed header discounts.
    #[test]
    fn prop_total_never_negative(
        lines in prop::collection::vec(arb_line(), 0..8),
        discount in arb_header_discount(),
    ) {
        let amounts: Vec<_> = lines.iter().map(|l| compute_line(l).unwrap()).collect();
        let outcome = compute_totals(&amounts, &discount, Currency::Usd).unwrap();
        prop_assert!(outcome.totals.total >= Decimal::ZERO);
    }

    /// The reported components always reconcile with the reported total
    /// (up to the zero clamp).
    #[test]
    fn prop_totals_reconcile(
        lines in prop::collection::vec(arb_line(), 0..8),
        discount in arb_header_discount(),
    ) {
        let amounts: Vec<_> = lines.iter().map(|l| compute_line(l).unwrap()).collect();
        let t = compute_totals(&amounts, &discount, Currency::Usd).unwrap().totals;
        let reconstructed =
            t.subtotal - t.line_discount_total - t.header_discount_amount + t.tax_total;
        prop_assert_eq!(t.total, reconstructed.max(Decimal::ZERO));
    }

    /// compute_totals is a pure function: identical inputs, identical outputs.
    #[test]
    fn prop_totals_idempotent(
        lines in prop::collection::vec(arb_line(), 0..8),
        discount in arb_header_discount(),
    ) {
        let amounts: Vec<_> = lines.iter().map(|l| compute_line(l).unwrap()).collect();
        let first = compute_totals(&amounts, &discount, Currency::Usd).unwrap();
        let second = compute_totals(&amounts, &discount, Currency::Usd).unwrap();
        prop_assert_eq!(first, second);
    }
}
