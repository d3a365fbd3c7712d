//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `BillId` where an `InvoiceId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(BillId, "Unique identifier for a vendor bill.");
typed_id!(CreditNoteId, "Unique identifier for a credit note.");
typed_id!(EstimateId, "Unique identifier for an estimate.");
typed_id!(ExpenseId, "Unique identifier for an expense.");
typed_id!(InvoiceId, "Unique identifier for a customer invoice.");
typed_id!(LineItemId, "Unique identifier for a document line item.");
typed_id!(
    CreditApplicationId,
    "Unique identifier for a credit-to-invoice application record."
);
typed_id!(VendorId, "Unique identifier for a vendor.");
typed_id!(CustomerId, "Unique identifier for a customer.");
typed_id!(ProductId, "Unique identifier for a product.");
typed_id!(AccountId, "Unique identifier for a chart of accounts entry.");
