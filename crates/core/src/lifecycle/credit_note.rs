//! Credit note lifecycle: statuses, transition table, and service.
//!
//! Applications are driven by the allocation engine; this module owns
//! the status rules, opening, refunds, and voiding. Voiding cancels only
//! the unapplied remainder: applied and refunded amounts stay on record.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::document::credit_note::CreditNote;
use crate::document::types::{DocumentFamily, DocumentVersion};
use crate::document::validate_line_items;
use crate::lifecycle::effects::{Counterparty, EffectKind, SideEffect};
use crate::lifecycle::error::{ClampWarning, LifecycleError};
use crate::lifecycle::machine::{
    check_version, EventKind, StateKind, Target, Transition, TransitionOutcome, TransitionTable,
};

/// Credit note status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditNoteStatus {
    /// Being drafted; fully editable.
    Draft,
    /// Issued; full credit available.
    Open,
    /// Some credit applied or refunded, remainder available.
    PartiallyApplied,
    /// Credit fully consumed (terminal).
    Applied,
    /// Voided (terminal).
    Void,
}

impl CreditNoteStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Open => "open",
            Self::PartiallyApplied => "partially_applied",
            Self::Applied => "applied",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "open" => Some(Self::Open),
            "partially_applied" => Some(Self::PartiallyApplied),
            "applied" => Some(Self::Applied),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

impl std::fmt::Display for CreditNoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateKind for CreditNoteStatus {
    fn name(self) -> &'static str {
        self.as_str()
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Applied | Self::Void)
    }
}

/// Credit note lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditNoteEvent {
    /// Modify header fields or line items.
    Edit,
    /// Issue the credit note, making the credit available.
    Open,
    /// Apply credit, leaving a remainder.
    ApplyPartial,
    /// Apply credit, consuming the remainder.
    ApplyFull,
    /// Refund unapplied credit; the status does not change.
    Refund,
    /// Void the unapplied remainder.
    Void,
    /// Hard-delete; legal only from draft.
    Delete,
}

impl EventKind for CreditNoteEvent {
    fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Open => "open",
            Self::ApplyPartial | Self::ApplyFull => "apply",
            Self::Refund => "refund",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }
}

/// The credit note transition table.
#[rustfmt::skip]
static CREDIT_NOTE_ROWS: &[Transition<CreditNoteStatus, CreditNoteEvent>] = &[
    Transition { from: CreditNoteStatus::Draft, event: CreditNoteEvent::Edit, target: Target::State(CreditNoteStatus::Draft), effect: None },
    Transition { from: CreditNoteStatus::Draft, event: CreditNoteEvent::Open, target: Target::State(CreditNoteStatus::Open), effect: Some(EffectKind::Issue) },
    Transition { from: CreditNoteStatus::Draft, event: CreditNoteEvent::Void, target: Target::State(CreditNoteStatus::Void), effect: None },
    Transition { from: CreditNoteStatus::Draft, event: CreditNoteEvent::Delete, target: Target::Deleted, effect: None },
    Transition { from: CreditNoteStatus::Open, event: CreditNoteEvent::ApplyPartial, target: Target::State(CreditNoteStatus::PartiallyApplied), effect: Some(EffectKind::ApplyCredit) },
    Transition { from: CreditNoteStatus::Open, event: CreditNoteEvent::ApplyFull, target: Target::State(CreditNoteStatus::Applied), effect: Some(EffectKind::ApplyCredit) },
    Transition { from: CreditNoteStatus::Open, event: CreditNoteEvent::Refund, target: Target::State(CreditNoteStatus::Open), effect: Some(EffectKind::Refund) },
    Transition { from: CreditNoteStatus::Open, event: CreditNoteEvent::Void, target: Target::State(CreditNoteStatus::Void), effect: Some(EffectKind::ReverseOutstanding) },
    Transition { from: CreditNoteStatus::PartiallyApplied, event: CreditNoteEvent::ApplyPartial, target: Target::State(CreditNoteStatus::PartiallyApplied), effect: Some(EffectKind::ApplyCredit) },
    Transition { from: CreditNoteStatus::PartiallyApplied, event: CreditNoteEvent::ApplyFull, target: Target::State(CreditNoteStatus::Applied), effect: Some(EffectKind::ApplyCredit) },
    Transition { from: CreditNoteStatus::PartiallyApplied, event: CreditNoteEvent::Refund, target: Target::State(CreditNoteStatus::PartiallyApplied), effect: Some(EffectKind::Refund) },
    Transition { from: CreditNoteStatus::PartiallyApplied, event: CreditNoteEvent::Void, target: Target::State(CreditNoteStatus::Void), effect: Some(EffectKind::ReverseOutstanding) },
];

/// The credit note transition table.
pub static CREDIT_NOTE_TABLE: TransitionTable<CreditNoteStatus, CreditNoteEvent> =
    TransitionTable::new(DocumentFamily::CreditNote, CREDIT_NOTE_ROWS);

/// Action flags derived mechanically from the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNotePermissions {
    /// Whether the credit note may be edited.
    pub allow_edit: bool,
    /// Whether the credit note may be hard-deleted.
    pub allow_delete: bool,
    /// Whether the credit note may be opened.
    pub allow_open: bool,
    /// Whether credit may be applied to invoices.
    pub allow_apply: bool,
    /// Whether unapplied credit may be refunded.
    pub allow_refund: bool,
    /// Whether the credit note may be voided.
    pub allow_void: bool,
}

/// Stateless service for credit note lifecycle transitions.
pub struct CreditNoteLifecycle;

impl CreditNoteLifecycle {
    /// Permission flags for a status, derived solely from the table.
    #[must_use]
    pub fn permissions_for(status: CreditNoteStatus) -> CreditNotePermissions {
        CreditNotePermissions {
            allow_edit: CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::Edit),
            allow_delete: CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::Delete),
            allow_open: CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::Open),
            allow_apply: CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::ApplyPartial)
                || CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::ApplyFull),
            allow_refund: CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::Refund),
            allow_void: CREDIT_NOTE_TABLE.allows(status, CreditNoteEvent::Void),
        }
    }

    /// Validates that the credit note may be edited and bumps the version.
    pub fn edit(
        note: &CreditNote,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<CreditNoteStatus>, LifecycleError> {
        check_version(note.version, version)?;
        let row = CREDIT_NOTE_TABLE.fire(note.status, CreditNoteEvent::Edit)?;
        Ok(TransitionOutcome::plain(
            target_state(row),
            note.version.next(),
        ))
    }

    /// Opens the credit note, making the full credit available.
    pub fn open(
        note: &CreditNote,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<CreditNoteStatus>, LifecycleError> {
        check_version(note.version, version)?;
        let row = CREDIT_NOTE_TABLE.fire(note.status, CreditNoteEvent::Open)?;
        validate_line_items(&note.line_items)?;

        let total = note.totals()?.totals.total;
        debug!(credit_note = %note.id, %total, "credit note opened");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects: vec![SideEffect::UpdateCounterpartyBalance {
                counterparty: Counterparty::Customer(note.customer),
                delta: total,
            }],
            next_version: note.version.next(),
            warnings: Vec::new(),
        })
    }

    /// Refunds unapplied credit. The status does not change; the refund
    /// amount is clamped to the remaining credit with a warning.
    pub fn refund(
        note: &CreditNote,
        version: DocumentVersion,
        amount: Decimal,
    ) -> Result<TransitionOutcome<CreditNoteStatus>, LifecycleError> {
        check_version(note.version, version)?;
        if amount <= Decimal::ZERO {
            return Err(LifecycleError::NonPositiveAmount {
                action: "refund",
                amount,
            });
        }
        let row = CREDIT_NOTE_TABLE.fire(note.status, CreditNoteEvent::Refund)?;

        let remaining = note.remaining_credit()?;
        let mut warnings = Vec::new();
        let refunded = if amount > remaining {
            warn!(credit_note = %note.id, %amount, %remaining, "refund clamped to remaining credit");
            warnings.push(ClampWarning {
                action: "refund",
                requested: amount,
                cap: remaining,
            });
            remaining
        } else {
            amount
        };

        debug!(credit_note = %note.id, %refunded, "credit refunded");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects: vec![SideEffect::UpdateCounterpartyBalance {
                counterparty: Counterparty::Customer(note.customer),
                delta: -refunded,
            }],
            next_version: note.version.next(),
            warnings,
        })
    }

    /// Voids the credit note, cancelling only the unapplied remainder.
    pub fn void(
        note: &CreditNote,
        version: DocumentVersion,
        reason: &str,
    ) -> Result<TransitionOutcome<CreditNoteStatus>, LifecycleError> {
        check_version(note.version, version)?;
        if reason.trim().is_empty() {
            return Err(LifecycleError::ReasonRequired { action: "Void" });
        }
        let row = CREDIT_NOTE_TABLE.fire(note.status, CreditNoteEvent::Void)?;

        let effects = if row.effect == Some(EffectKind::ReverseOutstanding) {
            let remaining = note.remaining_credit()?;
            if remaining.is_zero() {
                Vec::new()
            } else {
                vec![SideEffect::UpdateCounterpartyBalance {
                    counterparty: Counterparty::Customer(note.customer),
                    delta: -remaining,
                }]
            }
        } else {
            Vec::new()
        };

        debug!(credit_note = %note.id, reason, "credit note voided");
        Ok(TransitionOutcome {
            new_status: target_state(row),
            effects,
            next_version: note.version.next(),
            warnings: Vec::new(),
        })
    }

    /// Validates a hard delete; legal only from draft.
    pub fn delete(note: &CreditNote, version: DocumentVersion) -> Result<(), LifecycleError> {
        check_version(note.version, version)?;
        let row = CREDIT_NOTE_TABLE.fire(note.status, CreditNoteEvent::Delete)?;
        debug_assert_eq!(row.target, Target::Deleted);
        Ok(())
    }

    /// The status after an application leaves `remaining` credit.
    #[must_use]
    pub fn status_after_application(remaining: Decimal) -> CreditNoteStatus {
        if remaining > Decimal::ZERO {
            CreditNoteStatus::PartiallyApplied
        } else {
            CreditNoteStatus::Applied
        }
    }
}

fn target_state(row: &Transition<CreditNoteStatus, CreditNoteEvent>) -> CreditNoteStatus {
    match row.target {
        Target::State(s) => s,
        Target::Deleted => unreachable!("delete rows are handled by CreditNoteLifecycle::delete"),
    }
}
