//! Document line items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use finch_shared::types::{AccountId, LineItemId, ProductId};

use crate::calc::{compute_line, CalcError, LineAmounts, LineInput};

/// A single line on a financial document.
///
/// Monetary amounts are derived via [`LineItem::amounts`], never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Unique identifier for the line.
    pub id: LineItemId,
    /// Human-readable description.
    pub description: String,
    /// Quantity, strictly positive.
    pub quantity: Decimal,
    /// Unit price, non-negative.
    pub unit_price: Decimal,
    /// Line discount percentage in `[0, 100]`.
    pub discount_percent: Decimal,
    /// Tax percentage in `[0, 100]`.
    pub tax_percent: Decimal,
    /// Optional product reference.
    pub product: Option<ProductId>,
    /// Optional account reference.
    pub account: Option<AccountId>,
    /// Whether the referenced product's inventory is tracked.
    pub inventory_tracked: bool,
}

impl LineItem {
    /// Creates a line with no discount, tax, or references.
    #[must_use]
    pub fn new(description: impl Into<String>, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            id: LineItemId::new(),
            description: description.into(),
            quantity,
            unit_price,
            discount_percent: Decimal::ZERO,
            tax_percent: Decimal::ZERO,
            product: None,
            account: None,
            inventory_tracked: false,
        }
    }

    /// The calculator inputs for this line.
    #[must_use]
    pub const fn input(&self) -> LineInput {
        LineInput {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_percent: self.discount_percent,
            tax_percent: self.tax_percent,
        }
    }

    /// Validates the line's inputs without computing amounts.
    pub fn validate(&self) -> Result<(), CalcError> {
        self.amounts().map(|_| ())
    }

    /// Computes the line's derived amounts at full precision.
    pub fn amounts(&self) -> Result<LineAmounts, CalcError> {
        compute_line(&self.input())
    }
}
