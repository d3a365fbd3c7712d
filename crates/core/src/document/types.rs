//! Document family and concurrency token types.

use serde::{Deserialize, Serialize};

/// The four document families the engine manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFamily {
    /// Vendor bill (accounts payable).
    Bill,
    /// Credit note (accounts receivable credit).
    CreditNote,
    /// Estimate / quote.
    Estimate,
    /// Expense claim.
    Expense,
}

impl DocumentFamily {
    /// Returns the string representation of the family.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bill => "bill",
            Self::CreditNote => "credit_note",
            Self::Estimate => "estimate",
            Self::Expense => "expense",
        }
    }

    /// All families, in display order.
    pub const ALL: [Self; 4] = [Self::Bill, Self::CreditNote, Self::Estimate, Self::Expense];
}

impl std::fmt::Display for DocumentFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optimistic-concurrency token for a document.
///
/// The engine performs no locking. Every mutating operation takes the
/// version the caller read and fails with a conflict when it no longer
/// matches the document, so the persistence layer can serialize
/// mutations (compare-and-swap on this value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentVersion(pub u64);

impl DocumentVersion {
    /// The version of a freshly created document.
    pub const INITIAL: Self = Self(0);

    /// The version after one more mutation.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for DocumentVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_as_str() {
        assert_eq!(DocumentFamily::Bill.as_str(), "bill");
        assert_eq!(DocumentFamily::CreditNote.as_str(), "credit_note");
        assert_eq!(DocumentFamily::Estimate.as_str(), "estimate");
        assert_eq!(DocumentFamily::Expense.as_str(), "expense");
    }

    #[test]
    fn test_version_advances() {
        let v = DocumentVersion::INITIAL;
        assert_eq!(v.next(), DocumentVersion(1));
        assert_eq!(v.next().next(), DocumentVersion(2));
    }
}
