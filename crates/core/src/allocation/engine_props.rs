//! Property-based checks for the allocation engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use finch_shared::types::InvoiceId;

use crate::allocation::engine::{allocate, AllocationProposal};
use crate::allocation::error::AllocationError;

fn money_amount() -> impl Strategy<Value = Decimal> {
    // Two decimal places, up to 1M, like real invoice amounts.
    (0u64..=100_000_000).prop_map(|cents| Decimal::new(cents as i64, 2))
}

fn proposals() -> impl Strategy<Value = Vec<AllocationProposal>> {
    prop::collection::vec(
        (money_amount(), money_amount()).prop_map(|(amount_due, requested)| AllocationProposal {
            invoice: InvoiceId::new(),
            amount_due,
            requested,
        }),
        0..8,
    )
}

proptest! {
    /// A successful batch never applies more than was available, and the
    /// remainder accounts for every applied cent exactly.
    #[test]
    fn prop_allocation_conserves_credit(
        remaining in money_amount(),
        proposals in proposals(),
    ) {
        if let Ok(outcome) = allocate(remaining, &proposals) {
            let total: Decimal = outcome.allocations.iter().map(|a| a.amount).sum();
            prop_assert_eq!(total, outcome.total_applied);
            prop_assert!(outcome.total_applied <= remaining);
            prop_assert_eq!(outcome.remaining_after, remaining - outcome.total_applied);
            prop_assert!(outcome.remaining_after >= Decimal::ZERO);
        }
    }

    /// Every accepted allocation respects its proposal's cap.
    #[test]
    fn prop_allocations_respect_per_proposal_cap(
        remaining in money_amount(),
        proposals in proposals(),
    ) {
        if let Ok(outcome) = allocate(remaining, &proposals) {
            for allocation in &outcome.allocations {
                let proposal = proposals
                    .iter()
                    .find(|p| p.invoice == allocation.invoice)
                    .unwrap();
                prop_assert!(allocation.amount > Decimal::ZERO);
                prop_assert!(allocation.amount <= proposal.amount_due.min(remaining));
            }
        }
    }

    /// Failure modes leave nothing applied: the same inputs either
    /// produce a full outcome or one of the batch-level errors.
    #[test]
    fn prop_failures_are_total(
        remaining in money_amount(),
        proposals in proposals(),
    ) {
        match allocate(remaining, &proposals) {
            Ok(_) => {}
            Err(AllocationError::EmptyAllocation | AllocationError::InsufficientCredit { .. }) => {}
            Err(err) => prop_assert!(false, "unexpected error for non-negative input: {err}"),
        }
    }
}
