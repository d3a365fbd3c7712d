//! Side-effect descriptors emitted by state transitions.
//!
//! A side effect is a value describing an external mutation (inventory,
//! ledger, counterparty balance) that the engine requests but never
//! performs. Callers execute each descriptor exactly once.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finch_shared::types::{AccountId, CustomerId, LineItemId, ProductId, VendorId};

/// The kind of side effect a transition row triggers.
///
/// Rows carry the kind; the family services expand it into concrete
/// [`SideEffect`] values using the document's amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Post issuance effects: inventory in, counterparty balance up.
    Issue,
    /// Record a payment against the document.
    Payment,
    /// Apply credit to invoices.
    ApplyCredit,
    /// Refund unapplied credit.
    Refund,
    /// Settle an approved expense against the ledger.
    Settle,
    /// Reverse whatever portion of prior effects is still outstanding.
    ReverseOutstanding,
}

/// A counterparty reference on a balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counterparty {
    /// A vendor (payable side).
    Vendor(VendorId),
    /// A customer (receivable side).
    Customer(CustomerId),
}

/// An external mutation requested by a transition.
///
/// Balance deltas follow one sign convention: a positive delta increases
/// what the counterparty is owed (vendor bill received, customer credit
/// opened); payments, applications, refunds, and voids are negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffect {
    /// Change an inventory-tracked product's on-hand quantity.
    AdjustInventory {
        /// The line the adjustment originates from.
        line: LineItemId,
        /// The product whose quantity changes.
        product: ProductId,
        /// The quantity delta (positive = increase).
        delta: Decimal,
    },
    /// Post a balanced journal entry.
    PostJournalEntry {
        /// The account to debit.
        debit_account: AccountId,
        /// The account to credit.
        credit_account: AccountId,
        /// The entry amount, rounded to the document currency's minor unit.
        amount: Decimal,
    },
    /// Adjust a counterparty's outstanding balance.
    UpdateCounterpartyBalance {
        /// The vendor or customer affected.
        counterparty: Counterparty,
        /// The balance delta.
        delta: Decimal,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_effect_serialization_tags() {
        let effect = SideEffect::UpdateCounterpartyBalance {
            counterparty: Counterparty::Vendor(VendorId::new()),
            delta: dec!(100),
        };
        let json = serde_json::to_value(&effect).unwrap();
        assert_eq!(json["kind"], "update_counterparty_balance");
    }
}
