//! Credit allocation engine.
//!
//! Applies credit note balances to open invoices in all-or-nothing
//! batches. Validation is pure; the persistence layer executes the
//! returned records and effects exactly once.

pub mod engine;
pub mod error;

#[cfg(test)]
mod engine_props;

pub use engine::{
    allocate, apply, Allocation, AllocationOutcome, AllocationProposal, ApplyOutcome,
    CreditApplication,
};
pub use error::AllocationError;
