//! Credit notes (accounts receivable credits).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finch_shared::types::{CreditNoteId, Currency, CustomerId, InvoiceId};

use crate::calc::{compute_totals, remaining_credit, CalcError, HeaderDiscount, TotalsOutcome};
use crate::document::line_item::LineItem;
use crate::document::types::DocumentVersion;
use crate::lifecycle::credit_note::CreditNoteStatus;

/// A credit note issued to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNote {
    /// Unique identifier.
    pub id: CreditNoteId,
    /// Human-facing document number (uniqueness enforced server-side).
    pub document_number: String,
    /// The customer the credit belongs to.
    pub customer: CustomerId,
    /// The invoice this credit note was raised against, if any.
    pub linked_invoice: Option<InvoiceId>,
    /// Current lifecycle status.
    pub status: CreditNoteStatus,
    /// Document currency.
    pub currency: Currency,
    /// Date the credit note was issued.
    pub issue_date: NaiveDate,
    /// Owned line items.
    pub line_items: Vec<LineItem>,
    /// Header-level discount.
    pub header_discount: HeaderDiscount,
    /// Credit consumed by applications; mutated only by `apply`.
    pub applied_total: Decimal,
    /// Credit consumed by refunds; tracked separately from applications.
    pub refunded_total: Decimal,
    /// Optimistic-concurrency token.
    pub version: DocumentVersion,
}

impl CreditNote {
    /// Creates a draft credit note with no lines.
    #[must_use]
    pub fn draft(
        document_number: impl Into<String>,
        customer: CustomerId,
        currency: Currency,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id: CreditNoteId::new(),
            document_number: document_number.into(),
            customer,
            linked_invoice: None,
            status: CreditNoteStatus::Draft,
            currency,
            issue_date,
            line_items: Vec::new(),
            header_discount: HeaderDiscount::None,
            applied_total: Decimal::ZERO,
            refunded_total: Decimal::ZERO,
            version: DocumentVersion::INITIAL,
        }
    }

    /// Recomputes the credit note's totals from its line items.
    pub fn totals(&self) -> Result<TotalsOutcome, CalcError> {
        let amounts = self
            .line_items
            .iter()
            .map(LineItem::amounts)
            .collect::<Result<Vec<_>, _>>()?;
        compute_totals(&amounts, &self.header_discount, self.currency)
    }

    /// Total minus applied and refunded amounts, clamped at zero.
    pub fn remaining_credit(&self) -> Result<Decimal, CalcError> {
        Ok(remaining_credit(
            self.totals()?.totals.total,
            self.applied_total,
            self.refunded_total,
        ))
    }
}
