//! Vendor bills (accounts payable).

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finch_shared::config::DocumentConfig;
use finch_shared::types::{BillId, Currency, VendorId};
use finch_shared::AppError;

use crate::calc::{amount_due, compute_totals, CalcError, HeaderDiscount, TotalsOutcome};
use crate::document::line_item::LineItem;
use crate::document::types::DocumentVersion;
use crate::lifecycle::bill::BillStatus;

/// A vendor bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Unique identifier.
    pub id: BillId,
    /// Human-facing document number (uniqueness enforced server-side).
    pub document_number: String,
    /// The vendor the bill is payable to.
    pub vendor: VendorId,
    /// Current lifecycle status.
    pub status: BillStatus,
    /// Document currency.
    pub currency: Currency,
    /// Date the bill was issued.
    pub issue_date: NaiveDate,
    /// Date payment falls due.
    pub due_date: NaiveDate,
    /// Owned line items; order is significant for display only.
    pub line_items: Vec<LineItem>,
    /// Header-level discount.
    pub header_discount: HeaderDiscount,
    /// Total paid so far; mutated only by payment and void operations.
    pub amount_paid: Decimal,
    /// Optimistic-concurrency token.
    pub version: DocumentVersion,
}

impl Bill {
    /// Creates a draft bill with no lines.
    #[must_use]
    pub fn draft(
        document_number: impl Into<String>,
        vendor: VendorId,
        currency: Currency,
        issue_date: NaiveDate,
        due_date: NaiveDate,
    ) -> Self {
        Self {
            id: BillId::new(),
            document_number: document_number.into(),
            vendor,
            status: BillStatus::Draft,
            currency,
            issue_date,
            due_date,
            line_items: Vec::new(),
            header_discount: HeaderDiscount::None,
            amount_paid: Decimal::ZERO,
            version: DocumentVersion::INITIAL,
        }
    }

    /// Creates a draft bill with the configured default currency and a
    /// due date derived from the configured net payment terms.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the configured currency is not
    /// supported or the net terms fall outside the calendar range.
    pub fn draft_with_terms(
        document_number: impl Into<String>,
        vendor: VendorId,
        issue_date: NaiveDate,
        config: &DocumentConfig,
    ) -> Result<Self, AppError> {
        let currency = config.default_currency()?;
        let days = config.net_terms_days;
        let offset = u64::try_from(days)
            .map_err(|_| AppError::Validation(format!("net terms of {days} days are invalid")))?;
        let due_date = issue_date
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| {
                AppError::Validation(format!("net terms of {days} days are invalid"))
            })?;
        Ok(Self::draft(
            document_number,
            vendor,
            currency,
            issue_date,
            due_date,
        ))
    }

    /// Recomputes the bill's totals from its line items.
    pub fn totals(&self) -> Result<TotalsOutcome, CalcError> {
        let amounts = self
            .line_items
            .iter()
            .map(LineItem::amounts)
            .collect::<Result<Vec<_>, _>>()?;
        compute_totals(&amounts, &self.header_discount, self.currency)
    }

    /// Total minus amount paid, clamped at zero.
    pub fn amount_due(&self) -> Result<Decimal, CalcError> {
        Ok(amount_due(self.totals()?.totals.total, self.amount_paid))
    }
}
