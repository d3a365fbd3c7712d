//! Document status state machines.
//!
//! One generic table-driven machine (`machine`) with a static transition
//! table per document family. Every legal `(status, event)` pair is an
//! explicit row; anything absent is an `InvalidTransition`. Action
//! permissions are derived from the tables, never hand-maintained.
//!
//! # Modules
//!
//! - `machine` - Generic transition table, outcome, and version check
//! - `effects` - Side-effect descriptors emitted by transitions
//! - `bill` - Accounts payable bills
//! - `credit_note` - Customer credits
//! - `estimate` - Quotes offered to customers
//! - `expense` - Expense claims with an approval step
//! - `error` - Lifecycle errors and clamp warnings

pub mod bill;
pub mod credit_note;
pub mod effects;
pub mod error;
pub mod estimate;
pub mod expense;
pub mod machine;

#[cfg(test)]
mod machine_props;

pub use bill::{BillLifecycle, BillPermissions, BillStatus};
pub use credit_note::{CreditNoteLifecycle, CreditNotePermissions, CreditNoteStatus};
pub use effects::{Counterparty, EffectKind, SideEffect};
pub use error::{ClampWarning, LifecycleError};
pub use estimate::{EstimateLifecycle, EstimatePermissions, EstimateStatus};
pub use expense::{ExpenseLifecycle, ExpensePermissions, ExpenseStatus};
pub use machine::{Target, Transition, TransitionOutcome, TransitionTable};
