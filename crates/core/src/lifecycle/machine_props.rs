//! Property-based structural checks for the family transition tables.

use proptest::prelude::*;
use proptest::sample::select;

use crate::lifecycle::bill::{BillEvent, BillStatus, BILL_TABLE};
use crate::lifecycle::credit_note::{CreditNoteEvent, CreditNoteStatus, CREDIT_NOTE_TABLE};
use crate::lifecycle::estimate::{EstimateEvent, EstimateStatus, ESTIMATE_TABLE};
use crate::lifecycle::expense::{ExpenseEvent, ExpenseStatus, EXPENSE_TABLE};
use crate::lifecycle::machine::{EventKind, StateKind, Target, TransitionTable};

const BILL_STATUSES: &[BillStatus] = &[
    BillStatus::Draft,
    BillStatus::Received,
    BillStatus::PartiallyPaid,
    BillStatus::Paid,
    BillStatus::Overdue,
    BillStatus::Void,
];
const BILL_EVENTS: &[BillEvent] = &[
    BillEvent::Edit,
    BillEvent::Receive,
    BillEvent::PaymentPartial,
    BillEvent::PaymentFull,
    BillEvent::MarkOverdue,
    BillEvent::Void,
    BillEvent::Delete,
];

const CREDIT_NOTE_STATUSES: &[CreditNoteStatus] = &[
    CreditNoteStatus::Draft,
    CreditNoteStatus::Open,
    CreditNoteStatus::PartiallyApplied,
    CreditNoteStatus::Applied,
    CreditNoteStatus::Void,
];
const CREDIT_NOTE_EVENTS: &[CreditNoteEvent] = &[
    CreditNoteEvent::Edit,
    CreditNoteEvent::Open,
    CreditNoteEvent::ApplyPartial,
    CreditNoteEvent::ApplyFull,
    CreditNoteEvent::Refund,
    CreditNoteEvent::Void,
    CreditNoteEvent::Delete,
];

const ESTIMATE_STATUSES: &[EstimateStatus] = &[
    EstimateStatus::Draft,
    EstimateStatus::Sent,
    EstimateStatus::Viewed,
    EstimateStatus::Accepted,
    EstimateStatus::Rejected,
    EstimateStatus::Expired,
    EstimateStatus::Converted,
    EstimateStatus::Void,
];
const ESTIMATE_EVENTS: &[EstimateEvent] = &[
    EstimateEvent::Edit,
    EstimateEvent::Send,
    EstimateEvent::View,
    EstimateEvent::Accept,
    EstimateEvent::Reject,
    EstimateEvent::Expire,
    EstimateEvent::Convert,
    EstimateEvent::Void,
    EstimateEvent::Delete,
];

const EXPENSE_STATUSES: &[ExpenseStatus] = &[
    ExpenseStatus::Draft,
    ExpenseStatus::PendingApproval,
    ExpenseStatus::Approved,
    ExpenseStatus::Rejected,
    ExpenseStatus::Paid,
    ExpenseStatus::Reimbursed,
    ExpenseStatus::Void,
];
const EXPENSE_EVENTS: &[ExpenseEvent] = &[
    ExpenseEvent::Edit,
    ExpenseEvent::Submit,
    ExpenseEvent::Approve,
    ExpenseEvent::Reject,
    ExpenseEvent::MarkPaid,
    ExpenseEvent::MarkReimbursed,
    ExpenseEvent::Void,
    ExpenseEvent::Delete,
];

/// Structural invariants every family table must hold.
fn check_table<S: StateKind, E: EventKind>(table: &TransitionTable<S, E>, draft: S) {
    let rows = table.rows();
    for (i, row) in rows.iter().enumerate() {
        // No duplicate (from, event) pairs: the first match wins in
        // `fire`, so a duplicate would be a silently dead row.
        for other in &rows[i + 1..] {
            assert!(
                !(other.from == row.from && other.event == row.event),
                "duplicate row for ({}, {})",
                row.from.name(),
                row.event.name()
            );
        }
        assert!(
            !row.from.is_terminal(),
            "terminal state {} has an outgoing row",
            row.from.name()
        );
        if row.target == Target::Deleted {
            assert!(
                row.from == draft,
                "delete row from non-draft state {}",
                row.from.name()
            );
        }
        if let Target::State(to) = row.target {
            if to.is_terminal() {
                assert!(
                    rows.iter().all(|r| r.from != to),
                    "terminal state {} is re-entered and also exited",
                    to.name()
                );
            }
        }
    }
}

#[test]
fn test_bill_table_structure() {
    check_table(&BILL_TABLE, BillStatus::Draft);
}

#[test]
fn test_credit_note_table_structure() {
    check_table(&CREDIT_NOTE_TABLE, CreditNoteStatus::Draft);
}

#[test]
fn test_estimate_table_structure() {
    check_table(&ESTIMATE_TABLE, EstimateStatus::Draft);
}

#[test]
fn test_expense_table_structure() {
    check_table(&EXPENSE_TABLE, ExpenseStatus::Draft);
}

proptest! {
    /// `fire` succeeds exactly when an explicit row exists; everything
    /// else is an invalid transition, with no wildcard fallthrough.
    #[test]
    fn prop_bill_fire_matches_rows(
        status in select(BILL_STATUSES),
        event in select(BILL_EVENTS),
    ) {
        prop_assert_eq!(BILL_TABLE.fire(status, event).is_ok(), BILL_TABLE.allows(status, event));
    }

    #[test]
    fn prop_credit_note_fire_matches_rows(
        status in select(CREDIT_NOTE_STATUSES),
        event in select(CREDIT_NOTE_EVENTS),
    ) {
        prop_assert_eq!(
            CREDIT_NOTE_TABLE.fire(status, event).is_ok(),
            CREDIT_NOTE_TABLE.allows(status, event)
        );
    }

    #[test]
    fn prop_estimate_fire_matches_rows(
        status in select(ESTIMATE_STATUSES),
        event in select(ESTIMATE_EVENTS),
    ) {
        prop_assert_eq!(
            ESTIMATE_TABLE.fire(status, event).is_ok(),
            ESTIMATE_TABLE.allows(status, event)
        );
    }

    #[test]
    fn prop_expense_fire_matches_rows(
        status in select(EXPENSE_STATUSES),
        event in select(EXPENSE_EVENTS),
    ) {
        prop_assert_eq!(
            EXPENSE_TABLE.fire(status, event).is_ok(),
            EXPENSE_TABLE.allows(status, event)
        );
    }

    /// Terminal states never allow any event.
    #[test]
    fn prop_terminal_states_are_frozen(event in select(BILL_EVENTS)) {
        prop_assert!(!BILL_TABLE.allows(BillStatus::Paid, event));
        prop_assert!(!BILL_TABLE.allows(BillStatus::Void, event));
    }
}
