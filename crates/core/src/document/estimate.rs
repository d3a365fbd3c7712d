//! Estimates (quotes offered to customers).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use finch_shared::types::{Currency, CustomerId, EstimateId, InvoiceId};

use crate::calc::{compute_totals, CalcError, HeaderDiscount, TotalsOutcome};
use crate::document::line_item::LineItem;
use crate::document::types::DocumentVersion;
use crate::lifecycle::estimate::EstimateStatus;

/// An estimate offered to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    /// Unique identifier.
    pub id: EstimateId,
    /// Human-facing document number (uniqueness enforced server-side).
    pub document_number: String,
    /// The customer the estimate is offered to.
    pub customer: CustomerId,
    /// Current lifecycle status.
    pub status: EstimateStatus,
    /// Document currency.
    pub currency: Currency,
    /// Date the estimate was issued.
    pub issue_date: NaiveDate,
    /// Date the offer lapses; assigned on send when absent.
    pub expiration_date: Option<NaiveDate>,
    /// The invoice this estimate was converted into, if any.
    pub converted_invoice: Option<InvoiceId>,
    /// Owned line items.
    pub line_items: Vec<LineItem>,
    /// Header-level discount.
    pub header_discount: HeaderDiscount,
    /// Optimistic-concurrency token.
    pub version: DocumentVersion,
}

impl Estimate {
    /// Creates a draft estimate with no lines.
    #[must_use]
    pub fn draft(
        document_number: impl Into<String>,
        customer: CustomerId,
        currency: Currency,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id: EstimateId::new(),
            document_number: document_number.into(),
            customer,
            status: EstimateStatus::Draft,
            currency,
            issue_date,
            expiration_date: None,
            converted_invoice: None,
            line_items: Vec::new(),
            header_discount: HeaderDiscount::None,
            version: DocumentVersion::INITIAL,
        }
    }

    /// Recomputes the estimate's totals from its line items.
    pub fn totals(&self) -> Result<TotalsOutcome, CalcError> {
        let amounts = self
            .line_items
            .iter()
            .map(LineItem::amounts)
            .collect::<Result<Vec<_>, _>>()?;
        compute_totals(&amounts, &self.header_discount, self.currency)
    }
}
