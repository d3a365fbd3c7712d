//! Financial document model.
//!
//! A document exclusively owns its line items; it holds non-owning
//! references to a counterparty and optionally to a linked document
//! (credit note → invoice, estimate → converted invoice). Derived
//! amounts are always recomputed from the line items, never stored.
//!
//! # Modules
//!
//! - `line_item` - Line items and their validation
//! - `types` - Document family and optimistic-concurrency version token
//! - `bill`, `credit_note`, `estimate`, `expense` - Per-family documents

pub mod bill;
pub mod credit_note;
pub mod estimate;
pub mod expense;
pub mod line_item;
pub mod types;

use thiserror::Error;

use finch_shared::AppError;

use crate::calc::CalcError;

pub use bill::Bill;
pub use credit_note::CreditNote;
pub use estimate::Estimate;
pub use expense::Expense;
pub use line_item::LineItem;
pub use types::{DocumentFamily, DocumentVersion};

/// Document-level validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// A document must carry at least one line item.
    #[error("Document must have at least one line item")]
    NoLineItems,

    /// A line item failed validation.
    #[error("Line {index}: {source}")]
    Line {
        /// Zero-based position of the offending line.
        index: usize,
        /// The underlying calculation error.
        source: CalcError,
    },
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Validates a document's line items as a set.
///
/// # Errors
///
/// Returns [`DocumentError::NoLineItems`] for an empty document, or the
/// first failing line with its position.
pub fn validate_line_items(lines: &[LineItem]) -> Result<(), DocumentError> {
    if lines.is_empty() {
        return Err(DocumentError::NoLineItems);
    }
    for (index, line) in lines.iter().enumerate() {
        line.validate()
            .map_err(|source| DocumentError::Line { index, source })?;
    }
    Ok(())
}
