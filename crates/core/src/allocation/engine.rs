//! Credit-to-invoice allocation.
//!
//! `allocate` is the pure batch validator: it clamps, filters, and either
//! accepts the whole batch or rejects it with nothing applied. `apply`
//! wraps it for a concrete credit note, producing application records and
//! the note's status transition in one outcome.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use finch_shared::types::{CreditApplicationId, CreditNoteId, InvoiceId};

use crate::allocation::error::AllocationError;
use crate::document::credit_note::CreditNote;
use crate::document::types::DocumentVersion;
use crate::lifecycle::credit_note::{CreditNoteEvent, CreditNoteStatus, CREDIT_NOTE_TABLE};
use crate::lifecycle::effects::{Counterparty, SideEffect};
use crate::lifecycle::error::ClampWarning;
use crate::lifecycle::machine::{check_version, Target};

/// One proposed application of credit to an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationProposal {
    /// The invoice to apply credit to.
    pub invoice: InvoiceId,
    /// The invoice's current amount due, as known to the caller.
    pub amount_due: Decimal,
    /// The credit amount requested for this invoice.
    pub requested: Decimal,
}

/// One accepted allocation within a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// The invoice credit is applied to.
    pub invoice: InvoiceId,
    /// The amount applied, after clamping.
    pub amount: Decimal,
}

/// The result of validating an allocation batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationOutcome {
    /// The accepted allocations, in proposal order, zero amounts dropped.
    pub allocations: Vec<Allocation>,
    /// Sum of all accepted amounts.
    pub total_applied: Decimal,
    /// Credit remaining on the note after the batch.
    pub remaining_after: Decimal,
    /// Clamps applied to individual proposals.
    pub warnings: Vec<ClampWarning>,
}

/// An immutable record of credit applied to an invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditApplication {
    /// Unique identifier.
    pub id: CreditApplicationId,
    /// The credit note the amount was drawn from.
    pub credit_note: CreditNoteId,
    /// The invoice the amount was applied to.
    pub invoice: InvoiceId,
    /// The applied amount.
    pub amount: Decimal,
    /// When the application was made.
    pub applied_at: DateTime<Utc>,
}

/// The result of applying a batch against a concrete credit note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// One application record per accepted allocation.
    pub applications: Vec<CreditApplication>,
    /// Sum of all applied amounts.
    pub total_applied: Decimal,
    /// Credit remaining on the note after the batch.
    pub remaining_after: Decimal,
    /// The note's status after the batch.
    pub new_status: CreditNoteStatus,
    /// Side effects for the caller to execute.
    pub effects: Vec<SideEffect>,
    /// The version the note must be persisted with.
    pub next_version: DocumentVersion,
    /// Clamps applied to individual proposals.
    pub warnings: Vec<ClampWarning>,
}

/// Validates an allocation batch against the available credit.
///
/// Each proposal is clamped to `min(remaining_credit, amount_due)` before
/// validation; the caller's own clamping is advisory only, since the cap
/// can change between form and submission. Each invoice may appear at
/// most once, so the per-invoice cap cannot be split across entries.
/// Zero proposals are dropped silently. The batch is accepted or
/// rejected as a whole.
///
/// # Errors
///
/// - [`AllocationError::NegativeAmount`] for any negative request.
/// - [`AllocationError::DuplicateInvoice`] when an invoice appears twice.
/// - [`AllocationError::EmptyAllocation`] when no positive proposals remain.
/// - [`AllocationError::InsufficientCredit`] when the clamped batch total
///   exceeds the remaining credit; nothing is applied.
pub fn allocate(
    remaining_credit: Decimal,
    proposals: &[AllocationProposal],
) -> Result<AllocationOutcome, AllocationError> {
    let mut allocations = Vec::new();
    let mut warnings = Vec::new();
    let mut seen = HashSet::new();

    for proposal in proposals {
        if proposal.requested < Decimal::ZERO {
            return Err(AllocationError::NegativeAmount {
                invoice: proposal.invoice,
                amount: proposal.requested,
            });
        }
        if !seen.insert(proposal.invoice) {
            return Err(AllocationError::DuplicateInvoice {
                invoice: proposal.invoice,
            });
        }
        if proposal.requested.is_zero() {
            continue;
        }
        let cap = remaining_credit.min(proposal.amount_due);
        let amount = if proposal.requested > cap {
            warn!(invoice = %proposal.invoice, requested = %proposal.requested, %cap, "allocation clamped");
            warnings.push(ClampWarning {
                action: "apply_credit",
                requested: proposal.requested,
                cap,
            });
            cap
        } else {
            proposal.requested
        };
        if amount.is_zero() {
            continue;
        }
        allocations.push(Allocation {
            invoice: proposal.invoice,
            amount,
        });
    }

    if allocations.is_empty() {
        return Err(AllocationError::EmptyAllocation);
    }

    let total_applied: Decimal = allocations.iter().map(|a| a.amount).sum();
    if total_applied > remaining_credit {
        return Err(AllocationError::InsufficientCredit {
            requested: total_applied,
            remaining: remaining_credit,
        });
    }

    Ok(AllocationOutcome {
        allocations,
        total_applied,
        remaining_after: remaining_credit - total_applied,
        warnings,
    })
}

/// Applies an allocation batch against a credit note.
///
/// Validates via [`allocate`], fires the note's apply transition, and
/// returns application records plus the balance effect. The caller
/// persists all of it atomically, bumping `applied_total` by
/// `total_applied`.
///
/// # Errors
///
/// Batch validation errors from [`allocate`], plus lifecycle errors when
/// the note's status forbids application or the version token is stale.
pub fn apply(
    note: &CreditNote,
    version: DocumentVersion,
    proposals: &[AllocationProposal],
    applied_at: DateTime<Utc>,
) -> Result<ApplyOutcome, AllocationError> {
    check_version(note.version, version).map_err(AllocationError::Lifecycle)?;

    let remaining = note
        .remaining_credit()
        .map_err(crate::lifecycle::LifecycleError::from)?;
    let outcome = allocate(remaining, proposals)?;

    let event = if outcome.remaining_after > Decimal::ZERO {
        CreditNoteEvent::ApplyPartial
    } else {
        CreditNoteEvent::ApplyFull
    };
    let row = CREDIT_NOTE_TABLE
        .fire(note.status, event)
        .map_err(AllocationError::Lifecycle)?;
    let new_status = match row.target {
        Target::State(s) => s,
        Target::Deleted => unreachable!("apply rows never target deletion"),
    };

    let applications = outcome
        .allocations
        .iter()
        .map(|allocation| CreditApplication {
            id: CreditApplicationId::new(),
            credit_note: note.id,
            invoice: allocation.invoice,
            amount: allocation.amount,
            applied_at,
        })
        .collect();

    debug!(
        credit_note = %note.id,
        total_applied = %outcome.total_applied,
        remaining_after = %outcome.remaining_after,
        status = %new_status,
        "credit applied"
    );
    Ok(ApplyOutcome {
        applications,
        total_applied: outcome.total_applied,
        remaining_after: outcome.remaining_after,
        new_status,
        effects: vec![SideEffect::UpdateCounterpartyBalance {
            counterparty: Counterparty::Customer(note.customer),
            delta: -outcome.total_applied,
        }],
        next_version: note.version.next(),
        warnings: outcome.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::line_item::LineItem;
    use finch_shared::types::{Currency, CustomerId};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn proposal(amount_due: Decimal, requested: Decimal) -> AllocationProposal {
        AllocationProposal {
            invoice: InvoiceId::new(),
            amount_due,
            requested,
        }
    }

    #[test]
    fn test_batch_exceeding_remaining_credit_fails_whole() {
        let proposals = [proposal(dec!(100), dec!(100)), proposal(dec!(80), dec!(80))];
        let err = allocate(dec!(150), &proposals).unwrap_err();
        assert_eq!(
            err,
            AllocationError::InsufficientCredit {
                requested: dec!(180),
                remaining: dec!(150),
            }
        );
    }

    #[test]
    fn test_successful_batch() {
        let proposals = [proposal(dec!(100), dec!(100)), proposal(dec!(80), dec!(40))];
        let outcome = allocate(dec!(150), &proposals).unwrap();
        assert_eq!(outcome.total_applied, dec!(140));
        assert_eq!(outcome.remaining_after, dec!(10));
        assert_eq!(outcome.allocations.len(), 2);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_requested_clamped_to_amount_due() {
        let proposals = [proposal(dec!(60), dec!(90))];
        let outcome = allocate(dec!(150), &proposals).unwrap();
        assert_eq!(outcome.allocations[0].amount, dec!(60));
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].cap, dec!(60));
    }

    #[test]
    fn test_requested_clamped_to_remaining_credit() {
        let proposals = [proposal(dec!(500), dec!(500))];
        let outcome = allocate(dec!(150), &proposals).unwrap();
        assert_eq!(outcome.allocations[0].amount, dec!(150));
        assert_eq!(outcome.remaining_after, dec!(0));
    }

    #[test]
    fn test_zero_proposals_dropped_silently() {
        let proposals = [proposal(dec!(100), dec!(0)), proposal(dec!(80), dec!(30))];
        let outcome = allocate(dec!(150), &proposals).unwrap();
        assert_eq!(outcome.allocations.len(), 1);
        assert_eq!(outcome.total_applied, dec!(30));
    }

    #[test]
    fn test_all_zero_batch_fails() {
        let proposals = [proposal(dec!(100), dec!(0))];
        assert_eq!(
            allocate(dec!(150), &proposals).unwrap_err(),
            AllocationError::EmptyAllocation
        );
        assert_eq!(
            allocate(dec!(150), &[]).unwrap_err(),
            AllocationError::EmptyAllocation
        );
    }

    #[test]
    fn test_duplicate_invoice_rejected() {
        // Two entries for one invoice could otherwise apply twice its
        // amount due while each passes the per-proposal cap.
        let invoice = InvoiceId::new();
        let proposals = [
            AllocationProposal { invoice, amount_due: dec!(60), requested: dec!(60) },
            AllocationProposal { invoice, amount_due: dec!(60), requested: dec!(60) },
        ];
        assert_eq!(
            allocate(dec!(200), &proposals).unwrap_err(),
            AllocationError::DuplicateInvoice { invoice }
        );
    }

    #[test]
    fn test_negative_request_fails() {
        let proposals = [proposal(dec!(100), dec!(-5))];
        assert!(matches!(
            allocate(dec!(150), &proposals).unwrap_err(),
            AllocationError::NegativeAmount { amount, .. } if amount == dec!(-5)
        ));
    }

    fn open_note(total: Decimal) -> CreditNote {
        let mut note = CreditNote::draft(
            "CN-0001",
            CustomerId::new(),
            Currency::Usd,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        );
        note.line_items.push(LineItem::new("return", dec!(1), total));
        note.status = CreditNoteStatus::Open;
        note.version = DocumentVersion(1);
        note
    }

    #[test]
    fn test_apply_partial_leaves_note_partially_applied() {
        let note = open_note(dec!(150));
        let proposals = [proposal(dec!(100), dec!(100))];
        let outcome = apply(&note, note.version, &proposals, Utc::now()).unwrap();

        assert_eq!(outcome.new_status, CreditNoteStatus::PartiallyApplied);
        assert_eq!(outcome.total_applied, dec!(100));
        assert_eq!(outcome.remaining_after, dec!(50.00));
        assert_eq!(outcome.applications.len(), 1);
        assert_eq!(outcome.applications[0].credit_note, note.id);
        assert!(matches!(
            outcome.effects[0],
            SideEffect::UpdateCounterpartyBalance { delta, .. } if delta == dec!(-100)
        ));
        assert_eq!(outcome.next_version, DocumentVersion(2));
    }

    #[test]
    fn test_apply_full_consumes_note() {
        let note = open_note(dec!(150));
        let proposals = [proposal(dec!(200), dec!(150))];
        let outcome = apply(&note, note.version, &proposals, Utc::now()).unwrap();
        assert_eq!(outcome.new_status, CreditNoteStatus::Applied);
        assert_eq!(outcome.remaining_after, dec!(0));
    }

    #[test]
    fn test_apply_rejects_draft_note() {
        let mut note = open_note(dec!(150));
        note.status = CreditNoteStatus::Draft;
        let proposals = [proposal(dec!(100), dec!(50))];
        assert!(matches!(
            apply(&note, note.version, &proposals, Utc::now()),
            Err(AllocationError::Lifecycle(_))
        ));
    }

    #[test]
    fn test_apply_rejects_stale_version() {
        let note = open_note(dec!(150));
        let proposals = [proposal(dec!(100), dec!(50))];
        assert!(matches!(
            apply(&note, DocumentVersion(7), &proposals, Utc::now()),
            Err(AllocationError::Lifecycle(
                crate::lifecycle::LifecycleError::StaleVersion { .. }
            ))
        ));
    }
}
