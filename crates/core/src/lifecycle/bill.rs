//! Bill lifecycle: statuses, transition table, and service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calc::amount_due;
use crate::document::bill::Bill;
use crate::document::validate_line_items;
use crate::document::types::{DocumentFamily, DocumentVersion};
use crate::lifecycle::effects::{Counterparty, EffectKind, SideEffect};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::machine::{
    check_version, EventKind, StateKind, Target, Transition, TransitionOutcome, TransitionTable,
};

/// Bill status in the payable lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    /// Being drafted; fully editable.
    Draft,
    /// Goods received; inventory and vendor balance posted.
    Received,
    /// Some payment recorded, balance outstanding.
    PartiallyPaid,
    /// Fully paid (terminal).
    Paid,
    /// Due date passed with a balance outstanding.
    Overdue,
    /// Voided (terminal).
    Void,
}

impl BillStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Received => "received",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "received" => Some(Self::Received),
            "partially_paid" => Some(Self::PartiallyPaid),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

impl std::fmt::Display for BillStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateKind for BillStatus {
    fn name(self) -> &'static str {
        self.as_str()
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Void)
    }
}

/// Bill lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillEvent {
    /// Modify header fields or line items.
    Edit,
    /// Mark goods received; posts issuance effects.
    Receive,
    /// Record a payment that leaves a balance outstanding.
    PaymentPartial,
    /// Record a payment that settles the bill.
    PaymentFull,
    /// Background: due date passed with a balance outstanding.
    MarkOverdue,
    /// Void the bill, reversing outstanding effects.
    Void,
    /// Hard-delete; legal only from draft.
    Delete,
}

impl EventKind for BillEvent {
    fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Receive => "receive",
            Self::PaymentPartial | Self::PaymentFull => "record_payment",
            Self::MarkOverdue => "mark_overdue",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }
}

/// The bill transition table. Every legal `(state, event)` pair is a row.
#[rustfmt::skip]
static BILL_ROWS: &[Transition<BillStatus, BillEvent>] = &[
    Transition { from: BillStatus::Draft, event: BillEvent::Edit, target: Target::State(BillStatus::Draft), effect: None },
    Transition { from: BillStatus::Draft, event: BillEvent::Receive, target: Target::State(BillStatus::Received), effect: Some(EffectKind::Issue) },
    Transition { from: BillStatus::Draft, event: BillEvent::Void, target: Target::State(BillStatus::Void), effect: None },
    Transition { from: BillStatus::Draft, event: BillEvent::Delete, target: Target::Deleted, effect: None },
    Transition { from: BillStatus::Received, event: BillEvent::PaymentPartial, target: Target::State(BillStatus::PartiallyPaid), effect: Some(EffectKind::Payment) },
    Transition { from: BillStatus::Received, event: BillEvent::PaymentFull, target: Target::State(BillStatus::Paid), effect: Some(EffectKind::Payment) },
    Transition { from: BillStatus::Received, event: BillEvent::MarkOverdue, target: Target::State(BillStatus::Overdue), effect: None },
    Transition { from: BillStatus::Received, event: BillEvent::Void, target: Target::State(BillStatus::Void), effect: Some(EffectKind::ReverseOutstanding) },
    Transition { from: BillStatus::PartiallyPaid, event: BillEvent::PaymentPartial, target: Target::State(BillStatus::PartiallyPaid), effect: Some(EffectKind::Payment) },
    Transition { from: BillStatus::PartiallyPaid, event: BillEvent::PaymentFull, target: Target::State(BillStatus::Paid), effect: Some(EffectKind::Payment) },
    Transition { from: BillStatus::PartiallyPaid, event: BillEvent::MarkOverdue, target: Target::State(BillStatus::Overdue), effect: None },
    Transition { from: BillStatus::PartiallyPaid, event: BillEvent::Void, target: Target::State(BillStatus::Void), effect: Some(EffectKind::ReverseOutstanding) },
    Transition { from: BillStatus::Overdue, event: BillEvent::PaymentPartial, target: Target::State(BillStatus::PartiallyPaid), effect: Some(EffectKind::Payment) },
    Transition { from: BillStatus::Overdue, event: BillEvent::PaymentFull, target: Target::State(BillStatus::Paid), effect: Some(EffectKind::Payment) },
    Transition { from: BillStatus::Overdue, event: BillEvent::Void, target: Target::State(BillStatus::Void), effect: Some(EffectKind::ReverseOutstanding) },
];

/// The bill transition table.
pub static BILL_TABLE: TransitionTable<BillStatus, BillEvent> =
    TransitionTable::new(DocumentFamily::Bill, BILL_ROWS);

/// Action flags derived mechanically from the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillPermissions {
    /// Whether the bill may be edited.
    pub allow_edit: bool,
    /// Whether the bill may be hard-deleted.
    pub allow_delete: bool,
    /// Whether goods may be marked received.
    pub allow_receive: bool,
    /// Whether a payment may be recorded.
    pub allow_record_payment: bool,
    /// Whether the bill may be voided.
    pub allow_void: bool,
}

/// Stateless service for bill lifecycle transitions.
pub struct BillLifecycle;

impl BillLifecycle {
    /// Permission flags for a status, derived solely from the table.
    #[must_use]
    pub fn permissions_for(status: BillStatus) -> BillPermissions {
        BillPermissions {
            allow_edit: BILL_TABLE.allows(status, BillEvent::Edit),
            allow_delete: BILL_TABLE.allows(status, BillEvent::Delete),
            allow_receive: BILL_TABLE.allows(status, BillEvent::Receive),
            allow_record_payment: BILL_TABLE.allows(status, BillEvent::PaymentPartial)
                || BILL_TABLE.allows(status, BillEvent::PaymentFull),
            allow_void: BILL_TABLE.allows(status, BillEvent::Void),
        }
    }

    /// Validates that the bill may be edited and bumps the version.
    pub fn edit(
        bill: &Bill,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<BillStatus>, LifecycleError> {
        check_version(bill.version, version)?;
        let row = BILL_TABLE.fire(bill.status, BillEvent::Edit)?;
        Ok(TransitionOutcome::plain(
            target_state(row),
            bill.version.next(),
        ))
    }

    /// Marks goods received, posting inventory and vendor-balance effects.
    pub fn receive(
        bill: &Bill,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<BillStatus>, LifecycleError> {
        check_version(bill.version, version)?;
        let row = BILL_TABLE.fire(bill.status, BillEvent::Receive)?;
        validate_line_items(&bill.line_items)?;

        let total = bill.totals()?.totals.total;
        let mut effects = inventory_effects(bill, Decimal::ONE);
        effects.push(SideEffect::UpdateCounterpartyBalance {
            counterparty: Counterparty::Vendor(bill.vendor),
            delta: total,
        });

        debug!(bill = %bill.id, %total, "bill received");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects,
            next_version: bill.version.next(),
            warnings: Vec::new(),
        })
    }

    /// Records a payment; a full payment settles the bill.
    pub fn record_payment(
        bill: &Bill,
        version: DocumentVersion,
        amount: Decimal,
    ) -> Result<TransitionOutcome<BillStatus>, LifecycleError> {
        check_version(bill.version, version)?;
        if amount <= Decimal::ZERO {
            return Err(LifecycleError::NonPositiveAmount {
                action: "payment",
                amount,
            });
        }

        let due = bill.amount_due()?;
        if amount > due {
            return Err(LifecycleError::PaymentExceedsAmountDue { amount, due });
        }

        let event = if amount == due {
            BillEvent::PaymentFull
        } else {
            BillEvent::PaymentPartial
        };
        let row = BILL_TABLE.fire(bill.status, event)?;

        debug!(bill = %bill.id, %amount, %due, "bill payment recorded");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects: vec![SideEffect::UpdateCounterpartyBalance {
                counterparty: Counterparty::Vendor(bill.vendor),
                delta: -amount,
            }],
            next_version: bill.version.next(),
            warnings: Vec::new(),
        })
    }

    /// Voids the bill, reversing effects proportionally to what is still
    /// outstanding. Voiding a draft posts nothing to reverse.
    pub fn void(
        bill: &Bill,
        version: DocumentVersion,
        reason: &str,
    ) -> Result<TransitionOutcome<BillStatus>, LifecycleError> {
        check_version(bill.version, version)?;
        if reason.trim().is_empty() {
            return Err(LifecycleError::ReasonRequired { action: "Void" });
        }
        let row = BILL_TABLE.fire(bill.status, BillEvent::Void)?;

        let effects = if row.effect == Some(EffectKind::ReverseOutstanding) {
            reverse_outstanding_effects(bill)?
        } else {
            Vec::new()
        };

        debug!(bill = %bill.id, reason, "bill voided");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects,
            next_version: bill.version.next(),
            warnings: Vec::new(),
        })
    }

    /// Validates a hard delete; legal only from draft.
    pub fn delete(bill: &Bill, version: DocumentVersion) -> Result<(), LifecycleError> {
        check_version(bill.version, version)?;
        let row = BILL_TABLE.fire(bill.status, BillEvent::Delete)?;
        debug_assert_eq!(row.target, Target::Deleted);
        Ok(())
    }

    /// Background reconciliation: marks the bill overdue when the due
    /// date has passed with a balance outstanding. Returns `None` when
    /// no transition applies.
    pub fn reconcile(
        bill: &Bill,
        today: NaiveDate,
    ) -> Result<Option<TransitionOutcome<BillStatus>>, LifecycleError> {
        if !BILL_TABLE.allows(bill.status, BillEvent::MarkOverdue) {
            return Ok(None);
        }
        if today <= bill.due_date || bill.amount_due()? <= Decimal::ZERO {
            return Ok(None);
        }
        let row = BILL_TABLE.fire(bill.status, BillEvent::MarkOverdue)?;
        Ok(Some(TransitionOutcome::plain(
            target_state(row),
            bill.version.next(),
        )))
    }
}

fn target_state(row: &Transition<BillStatus, BillEvent>) -> BillStatus {
    match row.target {
        Target::State(s) => s,
        Target::Deleted => unreachable!("delete rows are handled by BillLifecycle::delete"),
    }
}

/// Inventory adjustments for tracked lines, scaled by `factor`.
fn inventory_effects(bill: &Bill, factor: Decimal) -> Vec<SideEffect> {
    bill.line_items
        .iter()
        .filter(|line| line.inventory_tracked)
        .filter_map(|line| {
            line.product.map(|product| SideEffect::AdjustInventory {
                line: line.id,
                product,
                delta: line.quantity * factor,
            })
        })
        .collect()
}

/// Reversal effects proportional to the unpaid fraction of the bill.
fn reverse_outstanding_effects(bill: &Bill) -> Result<Vec<SideEffect>, LifecycleError> {
    let total = bill.totals()?.totals.total;
    if total.is_zero() {
        return Ok(Vec::new());
    }
    let due = amount_due(total, bill.amount_paid);
    let ratio = due / total;

    let mut effects = inventory_effects(bill, -ratio);
    effects.push(SideEffect::UpdateCounterpartyBalance {
        counterparty: Counterparty::Vendor(bill.vendor),
        delta: -due,
    });
    Ok(effects)
}
