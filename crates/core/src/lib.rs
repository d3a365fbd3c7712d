//! Core business logic for Finch.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `calc` - Line item and document totals computation
//! - `document` - Financial document model (bills, credit notes, estimates, expenses)
//! - `lifecycle` - Per-family status state machines and side-effect descriptors
//! - `allocation` - Credit-to-invoice allocation engine
//! - `numbering` - Advisory document number sequencing
//!
//! # Concurrency contract
//!
//! The engine is synchronous and performs no I/O. It does not arbitrate
//! concurrent mutation of a single document: every mutating operation takes
//! the caller's [`document::DocumentVersion`] token and fails with a conflict
//! when it does not match, so the persistence layer can enforce
//! at-most-one-concurrent-mutation semantics.

pub mod allocation;
pub mod calc;
pub mod document;
pub mod lifecycle;
pub mod numbering;
