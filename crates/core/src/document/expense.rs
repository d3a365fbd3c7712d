//! Expense claims.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finch_shared::types::{AccountId, Currency, ExpenseId, VendorId};

use crate::calc::{amount_due, compute_totals, CalcError, HeaderDiscount, TotalsOutcome};
use crate::document::line_item::LineItem;
use crate::document::types::DocumentVersion;
use crate::lifecycle::expense::ExpenseStatus;

/// An expense claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// Unique identifier.
    pub id: ExpenseId,
    /// Human-facing document number (uniqueness enforced server-side).
    pub document_number: String,
    /// The vendor the expense was paid to.
    pub vendor: VendorId,
    /// Current lifecycle status.
    pub status: ExpenseStatus,
    /// Document currency.
    pub currency: Currency,
    /// Date the expense was incurred.
    pub issue_date: NaiveDate,
    /// Whether settlement reimburses an employee rather than paying the vendor.
    pub is_reimbursable: bool,
    /// The account settlement is paid from, when known.
    pub payment_account: Option<AccountId>,
    /// Reason recorded on the last rejection, if any.
    pub rejection_reason: Option<String>,
    /// Owned line items.
    pub line_items: Vec<LineItem>,
    /// Header-level discount.
    pub header_discount: HeaderDiscount,
    /// Total paid so far; mutated only by settlement and void operations.
    pub amount_paid: Decimal,
    /// Optimistic-concurrency token.
    pub version: DocumentVersion,
}

impl Expense {
    /// Creates a draft expense with no lines.
    #[must_use]
    pub fn draft(
        document_number: impl Into<String>,
        vendor: VendorId,
        currency: Currency,
        issue_date: NaiveDate,
    ) -> Self {
        Self {
            id: ExpenseId::new(),
            document_number: document_number.into(),
            vendor,
            status: ExpenseStatus::Draft,
            currency,
            issue_date,
            is_reimbursable: false,
            payment_account: None,
            rejection_reason: None,
            line_items: Vec::new(),
            header_discount: HeaderDiscount::None,
            amount_paid: Decimal::ZERO,
            version: DocumentVersion::INITIAL,
        }
    }

    /// Recomputes the expense's totals from its line items.
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
