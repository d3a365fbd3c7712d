//! Expense lifecycle: statuses, transition table, and service.
//!
//! Expenses flow through an approval step before settlement. Settlement
//! lands on `Paid` for vendor-paid claims and `Reimbursed` for
//! employee-reimbursable ones; nothing posts to the ledger before then.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::document::expense::Expense;
use crate::document::types::{DocumentFamily, DocumentVersion};
use crate::document::validate_line_items;
use crate::lifecycle::effects::{EffectKind, SideEffect};
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::machine::{
    check_version, EventKind, StateKind, Target, Transition, TransitionOutcome, TransitionTable,
};

/// Expense status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    /// Being drafted; fully editable.
    Draft,
    /// Submitted, awaiting an approval decision.
    PendingApproval,
    /// Approved; awaiting settlement.
    Approved,
    /// Declined; editable and resubmittable.
    Rejected,
    /// Settled by paying the vendor (terminal).
    Paid,
    /// Settled by reimbursing the employee (terminal).
    Reimbursed,
    /// Voided (terminal).
    Void,
}

impl ExpenseStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
            Self::Reimbursed => "reimbursed",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "pending_approval" => Some(Self::PendingApproval),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            "paid" => Some(Self::Paid),
            "reimbursed" => Some(Self::Reimbursed),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateKind for ExpenseStatus {
    fn name(self) -> &'static str {
        self.as_str()
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Paid | Self::Reimbursed | Self::Void)
    }
}

/// Expense lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseEvent {
    /// Modify header fields or line items.
    Edit,
    /// Submit the expense for approval.
    Submit,
    /// Approve the submitted expense.
    Approve,
    /// Decline the submitted expense; a reason is required.
    Reject,
    /// Settle by paying the vendor.
    MarkPaid,
    /// Settle by reimbursing the employee.
    MarkReimbursed,
    /// Void the expense.
    Void,
    /// Hard-delete; legal only from draft.
    Delete,
}

impl EventKind for ExpenseEvent {
    fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::MarkPaid | Self::MarkReimbursed => "mark_paid",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }
}

/// The expense transition table.
#[rustfmt::skip]
static EXPENSE_ROWS: &[Transition<ExpenseStatus, ExpenseEvent>] = &[
    Transition { from: ExpenseStatus::Draft, event: ExpenseEvent::Edit, target: Target::State(ExpenseStatus::Draft), effect: None },
    Transition { from: ExpenseStatus::Draft, event: ExpenseEvent::Submit, target: Target::State(ExpenseStatus::PendingApproval), effect: None },
    Transition { from: ExpenseStatus::Draft, event: ExpenseEvent::Void, target: Target::State(ExpenseStatus::Void), effect: None },
    Transition { from: ExpenseStatus::Draft, event: ExpenseEvent::Delete, target: Target::Deleted, effect: None },
    Transition { from: ExpenseStatus::PendingApproval, event: ExpenseEvent::Approve, target: Target::State(ExpenseStatus::Approved), effect: None },
    Transition { from: ExpenseStatus::PendingApproval, event: ExpenseEvent::Reject, target: Target::State(ExpenseStatus::Rejected), effect: None },
    Transition { from: ExpenseStatus::PendingApproval, event: ExpenseEvent::Void, target: Target::State(ExpenseStatus::Void), effect: None },
    Transition { from: ExpenseStatus::Approved, event: ExpenseEvent::MarkPaid, target: Target::State(ExpenseStatus::Paid), effect: Some(EffectKind::Settle) },
    Transition { from: ExpenseStatus::Approved, event: ExpenseEvent::MarkReimbursed, target: Target::State(ExpenseStatus::Reimbursed), effect: Some(EffectKind::Settle) },
    Transition { from: ExpenseStatus::Approved, event: ExpenseEvent::Void, target: Target::State(ExpenseStatus::Void), effect: None },
    // Rejected expenses can be fixed up and resubmitted.
    Transition { from: ExpenseStatus::Rejected, event: ExpenseEvent::Edit, target: Target::State(ExpenseStatus::Rejected), effect: None },
    Transition { from: ExpenseStatus::Rejected, event: ExpenseEvent::Submit, target: Target::State(ExpenseStatus::PendingApproval), effect: None },
    Transition { from: ExpenseStatus::Rejected, event: ExpenseEvent::Void, target: Target::State(ExpenseStatus::Void), effect: None },
];

/// The expense transition table.
pub static EXPENSE_TABLE: TransitionTable<ExpenseStatus, ExpenseEvent> =
    TransitionTable::new(DocumentFamily::Expense, EXPENSE_ROWS);

/// Action flags derived mechanically from the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpensePermissions {
    /// Whether the expense may be edited.
    pub allow_edit: bool,
    /// Whether the expense may be hard-deleted.
    pub allow_delete: bool,
    /// Whether the expense may be submitted for approval.
    pub allow_submit: bool,
    /// Whether the approval decision (approve or reject) may be recorded.
    pub allow_decide: bool,
    /// Whether the expense may be settled.
    pub allow_mark_paid: bool,
    /// Whether the expense may be voided.
    pub allow_void: bool,
}

/// Stateless service for expense lifecycle transitions.
pub struct ExpenseLifecycle;

impl ExpenseLifecycle {
    /// Permission flags for a status, derived solely from the table.
    #[must_use]
    pub fn permissions_for(status: ExpenseStatus) -> ExpensePermissions {
        ExpensePermissions {
            allow_edit: EXPENSE_TABLE.allows(status, ExpenseEvent::Edit),
            allow_delete: EXPENSE_TABLE.allows(status, ExpenseEvent::Delete),
            allow_submit: EXPENSE_TABLE.allows(status, ExpenseEvent::Submit),
            allow_decide: EXPENSE_TABLE.allows(status, ExpenseEvent::Approve)
                || EXPENSE_TABLE.allows(status, ExpenseEvent::Reject),
            allow_mark_paid: EXPENSE_TABLE.allows(status, ExpenseEvent::MarkPaid)
                || EXPENSE_TABLE.allows(status, ExpenseEvent::MarkReimbursed),
            allow_void: EXPENSE_TABLE.allows(status, ExpenseEvent::Void),
        }
    }

    /// Validates that the expense may be edited and bumps the version.
    pub fn edit(
        expense: &Expense,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<ExpenseStatus>, LifecycleError> {
        check_version(expense.version, version)?;
        let row = EXPENSE_TABLE.fire(expense.status, ExpenseEvent::Edit)?;
        Ok(TransitionOutcome::plain(
            target_state(row),
            expense.version.next(),
        ))
    }

    /// Submits the expense for approval.
    pub fn submit(
        expense: &Expense,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<ExpenseStatus>, LifecycleError> {
        check_version(expense.version, version)?;
        let row = EXPENSE_TABLE.fire(expense.status, ExpenseEvent::Submit)?;
        validate_line_items(&expense.line_items)?;
        debug!(expense = %expense.id, "expense submitted");
        Ok(TransitionOutcome::plain(
            target_state(row),
            expense.version.next(),
        ))
    }

    /// Approves the submitted expense.
    pub fn approve(
        expense: &Expense,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<ExpenseStatus>, LifecycleError> {
        check_version(expense.version, version)?;
        let row = EXPENSE_TABLE.fire(expense.status, ExpenseEvent::Approve)?;
        debug!(expense = %expense.id, "expense approved");
        Ok(TransitionOutcome::plain(
            target_state(row),
            expense.version.next(),
        ))
    }

    /// Declines the submitted expense. A reason is required.
    pub fn reject(
        expense: &Expense,
        version: DocumentVersion,
        reason: &str,
    ) -> Result<TransitionOutcome<ExpenseStatus>, LifecycleError> {
        check_version(expense.version, version)?;
        if reason.trim().is_empty() {
            return Err(LifecycleError::ReasonRequired { action: "Reject" });
        }
        let row = EXPENSE_TABLE.fire(expense.status, ExpenseEvent::Reject)?;
        debug!(expense = %expense.id, reason, "expense rejected");
        Ok(TransitionOutcome::plain(
            target_state(row),
            expense.version.next(),
        ))
    }

    /// Settles the approved expense. Reimbursable claims land on
    /// `Reimbursed`, others on `Paid`. When a payment account is known,
    /// one journal entry per categorized line is emitted.
    pub fn mark_paid(
        expense: &Expense,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<ExpenseStatus>, LifecycleError> {
        check_version(expense.version, version)?;
        let event = if expense.is_reimbursable {
            ExpenseEvent::MarkReimbursed
        } else {
            ExpenseEvent::MarkPaid
        };
        let row = EXPENSE_TABLE.fire(expense.status, event)?;

        let mut effects = Vec::new();
        if let Some(payment_account) = expense.payment_account {
            for line in &expense.line_items {
                if let Some(account) = line.account {
                    let net = expense.currency.round(line.amounts()?.net);
                    effects.push(SideEffect::PostJournalEntry {
                        debit_account: account,
                        credit_account: payment_account,
                        amount: net,
                    });
                }
            }
        }

        debug!(expense = %expense.id, status = %target_state(row), "expense settled");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects,
            next_version: expense.version.next(),
            warnings: Vec::new(),
        })
    }

    /// Voids the expense. A reason is required for auditability.
    pub fn void(
        expense: &Expense,
        version: DocumentVersion,
        reason: &str,
    ) -> Result<TransitionOutcome<ExpenseStatus>, LifecycleError> {
        check_version(expense.version, version)?;
        if reason.trim().is_empty() {
            return Err(LifecycleError::ReasonRequired { action: "Void" });
        }
        let row = EXPENSE_TABLE.fire(expense.status, ExpenseEvent::Void)?;
        debug!(expense = %expense.id, reason, "expense voided");
        Ok(TransitionOutcome::plain(
            target_state(row),
            expense.version.next(),
        ))
    }

    /// Validates a hard delete; legal only from draft.
    pub fn delete(expense: &Expense, version: DocumentVersion) -> Result<(), LifecycleError> {
        check_version(expense.version, version)?;
        let row = EXPENSE_TABLE.fire(expense.status, ExpenseEvent::Delete)?;
        debug_assert_eq!(row.target, Target::Deleted);
        Ok(())
    }
}

fn target_state(row: &Transition<ExpenseStatus, ExpenseEvent>) -> ExpenseStatus {
    match row.target {
        Target::State(s) => s,
        Target::Deleted => unreachable!("delete rows are handled by ExpenseLifecycle::delete"),
    }
}
