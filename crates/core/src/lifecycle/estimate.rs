//! Estimate lifecycle: statuses, transition table, and service.
//!
//! Estimates carry no financial effects; they only gate which actions are
//! available and when an offer lapses. Expiry is driven by a pure
//! `reconcile` pass fed the current date by the caller.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use finch_shared::config::DocumentConfig;
use finch_shared::types::InvoiceId;

use crate::document::estimate::Estimate;
use crate::document::types::{DocumentFamily, DocumentVersion};
use crate::document::validate_line_items;
use crate::lifecycle::error::LifecycleError;
use crate::lifecycle::machine::{
    check_version, EventKind, StateKind, Target, Transition, TransitionOutcome, TransitionTable,
};

/// Estimate status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    /// Being drafted; fully editable.
    Draft,
    /// Sent to the customer.
    Sent,
    /// Opened by the customer.
    Viewed,
    /// Accepted by the customer.
    Accepted,
    /// Declined by the customer.
    Rejected,
    /// The offer lapsed before a decision.
    Expired,
    /// Converted into an invoice (terminal).
    Converted,
    /// Voided (terminal).
    Void,
}

impl EstimateStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Viewed => "viewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
            Self::Converted => "converted",
            Self::Void => "void",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "viewed" => Some(Self::Viewed),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "expired" => Some(Self::Expired),
            "converted" => Some(Self::Converted),
            "void" => Some(Self::Void),
            _ => None,
        }
    }
}

impl std::fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl StateKind for EstimateStatus {
    fn name(self) -> &'static str {
        self.as_str()
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Converted | Self::Void)
    }
}

/// Estimate lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateEvent {
    /// Modify header fields or line items.
    Edit,
    /// Send the estimate to the customer.
    Send,
    /// The customer opened the estimate.
    View,
    /// The customer accepted the offer.
    Accept,
    /// The customer declined the offer.
    Reject,
    /// The offer lapsed (background, fired by `reconcile`).
    Expire,
    /// Convert the accepted estimate into an invoice.
    Convert,
    /// Void the estimate.
    Void,
    /// Hard-delete; legal only from draft.
    Delete,
}

impl EventKind for EstimateEvent {
    fn name(self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::Send => "send",
            Self::View => "view",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Expire => "expire",
            Self::Convert => "convert",
            Self::Void => "void",
            Self::Delete => "delete",
        }
    }
}

/// The estimate transition table.
#[rustfmt::skip]
static ESTIMATE_ROWS: &[Transition<EstimateStatus, EstimateEvent>] = &[
    Transition { from: EstimateStatus::Draft, event: EstimateEvent::Edit, target: Target::State(EstimateStatus::Draft), effect: None },
    Transition { from: EstimateStatus::Draft, event: EstimateEvent::Send, target: Target::State(EstimateStatus::Sent), effect: None },
    Transition { from: EstimateStatus::Draft, event: EstimateEvent::Void, target: Target::State(EstimateStatus::Void), effect: None },
    Transition { from: EstimateStatus::Draft, event: EstimateEvent::Delete, target: Target::Deleted, effect: None },
    Transition { from: EstimateStatus::Sent, event: EstimateEvent::View, target: Target::State(EstimateStatus::Viewed), effect: None },
    Transition { from: EstimateStatus::Sent, event: EstimateEvent::Accept, target: Target::State(EstimateStatus::Accepted), effect: None },
    Transition { from: EstimateStatus::Sent, event: EstimateEvent::Reject, target: Target::State(EstimateStatus::Rejected), effect: None },
    Transition { from: EstimateStatus::Sent, event: EstimateEvent::Expire, target: Target::State(EstimateStatus::Expired), effect: None },
    Transition { from: EstimateStatus::Sent, event: EstimateEvent::Void, target: Target::State(EstimateStatus::Void), effect: None },
    Transition { from: EstimateStatus::Viewed, event: EstimateEvent::Accept, target: Target::State(EstimateStatus::Accepted), effect: None },
    Transition { from: EstimateStatus::Viewed, event: EstimateEvent::Reject, target: Target::State(EstimateStatus::Rejected), effect: None },
    Transition { from: EstimateStatus::Viewed, event: EstimateEvent::Expire, target: Target::State(EstimateStatus::Expired), effect: None },
    Transition { from: EstimateStatus::Viewed, event: EstimateEvent::Void, target: Target::State(EstimateStatus::Void), effect: None },
    Transition { from: EstimateStatus::Accepted, event: EstimateEvent::Convert, target: Target::State(EstimateStatus::Converted), effect: None },
    Transition { from: EstimateStatus::Accepted, event: EstimateEvent::Void, target: Target::State(EstimateStatus::Void), effect: None },
    Transition { from: EstimateStatus::Rejected, event: EstimateEvent::Void, target: Target::State(EstimateStatus::Void), effect: None },
    Transition { from: EstimateStatus::Expired, event: EstimateEvent::Void, target: Target::State(EstimateStatus::Void), effect: None },
];

/// The estimate transition table.
pub static ESTIMATE_TABLE: TransitionTable<EstimateStatus, EstimateEvent> =
    TransitionTable::new(DocumentFamily::Estimate, ESTIMATE_ROWS);

/// Action flags derived mechanically from the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimatePermissions {
    /// Whether the estimate may be edited.
    pub allow_edit: bool,
    /// Whether the estimate may be hard-deleted.
    pub allow_delete: bool,
    /// Whether the estimate may be sent.
    pub allow_send: bool,
    /// Whether the customer decision (accept or reject) may be recorded.
    pub allow_decide: bool,
    /// Whether the estimate may be converted into an invoice.
    pub allow_convert: bool,
    /// Whether the estimate may be voided.
    pub allow_void: bool,
}

/// Stateless service for estimate lifecycle transitions.
pub struct EstimateLifecycle;

impl EstimateLifecycle {
    /// Permission flags for a status, derived solely from the table.
    #[must_use]
    pub fn permissions_for(status: EstimateStatus) -> EstimatePermissions {
        EstimatePermissions {
            allow_edit: ESTIMATE_TABLE.allows(status, EstimateEvent::Edit),
            allow_delete: ESTIMATE_TABLE.allows(status, EstimateEvent::Delete),
            allow_send: ESTIMATE_TABLE.allows(status, EstimateEvent::Send),
            allow_decide: ESTIMATE_TABLE.allows(status, EstimateEvent::Accept)
                || ESTIMATE_TABLE.allows(status, EstimateEvent::Reject),
            allow_convert: ESTIMATE_TABLE.allows(status, EstimateEvent::Convert),
            allow_void: ESTIMATE_TABLE.allows(status, EstimateEvent::Void),
        }
    }

    /// Validates that the estimate may be edited and bumps the version.
    pub fn edit(
        estimate: &Estimate,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<EstimateStatus>, LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Edit)?;
        Ok(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }

    /// Sends the estimate. When no expiration date is set, one is assigned
    /// `config.estimate_expiry_days` after the issue date.
    pub fn send(
        estimate: &Estimate,
        version: DocumentVersion,
        config: &DocumentConfig,
    ) -> Result<(TransitionOutcome<EstimateStatus>, NaiveDate), LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Send)?;
        validate_line_items(&estimate.line_items)?;

        let expiration = match estimate.expiration_date {
            Some(date) => date,
            None => {
                let days = config.estimate_expiry_days;
                let offset = u64::try_from(days).map_err(|_| LifecycleError::DateOverflow {
                    action: "send",
                    days,
                })?;
                estimate
                    .issue_date
                    .checked_add_days(Days::new(offset))
                    .ok_or(LifecycleError::DateOverflow {
                        action: "send",
                        days,
                    })?
            }
        };

        debug!(estimate = %estimate.id, %expiration, "estimate sent");
        Ok((
            TransitionOutcome::plain(target_state(row), estimate.version.next()),
            expiration,
        ))
    }

    /// Records that the customer opened the estimate.
    pub fn view(
        estimate: &Estimate,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<EstimateStatus>, LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::View)?;
        Ok(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }

    /// Records the customer accepting the offer.
    pub fn accept(
        estimate: &Estimate,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<EstimateStatus>, LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Accept)?;
        debug!(estimate = %estimate.id, "estimate accepted");
        Ok(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }

    /// Records the customer declining the offer.
    pub fn reject(
        estimate: &Estimate,
        version: DocumentVersion,
    ) -> Result<TransitionOutcome<EstimateStatus>, LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Reject)?;
        debug!(estimate = %estimate.id, "estimate rejected");
        Ok(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }

    /// Converts the accepted estimate, recording the invoice it became.
    pub fn convert(
        estimate: &Estimate,
        version: DocumentVersion,
        invoice: InvoiceId,
    ) -> Result<TransitionOutcome<EstimateStatus>, LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Convert)?;
        debug!(estimate = %estimate.id, %invoice, "estimate converted");
        Ok(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }

    /// Voids the estimate. A reason is required for auditability.
    pub fn void(
        estimate: &Estimate,
        version: DocumentVersion,
        reason: &str,
    ) -> Result<TransitionOutcome<EstimateStatus>, LifecycleError> {
        check_version(estimate.version, version)?;
        if reason.trim().is_empty() {
            return Err(LifecycleError::ReasonRequired { action: "Void" });
        }
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Void)?;
        debug!(estimate = %estimate.id, reason, "estimate voided");
        Ok(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }

    /// Validates a hard delete; legal only from draft.
    pub fn delete(estimate: &Estimate, version: DocumentVersion) -> Result<(), LifecycleError> {
        check_version(estimate.version, version)?;
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Delete)?;
        debug_assert_eq!(row.target, Target::Deleted);
        Ok(())
    }

    /// Expires the estimate when the offer has lapsed as of `today`.
    /// Returns `None` when no transition applies. Idempotent.
    #[must_use]
    pub fn reconcile(
        estimate: &Estimate,
        today: NaiveDate,
    ) -> Option<TransitionOutcome<EstimateStatus>> {
        let expiration = estimate.expiration_date?;
        if today <= expiration {
            return None;
        }
        let row = ESTIMATE_TABLE.fire(estimate.status, EstimateEvent::Expire).ok()?;
        debug!(estimate = %estimate.id, %expiration, "estimate expired");
        Some(TransitionOutcome::plain(
            target_state(row),
            estimate.version.next(),
        ))
    }
}

fn target_state(row: &Transition<EstimateStatus, EstimateEvent>) -> EstimateStatus {
    match row.target {
        Target::State(s) => s,
        Target::Deleted => unreachable!("delete rows are handled by EstimateLifecycle::delete"),
    }
}
