//! Document number sequencing.
//!
//! Advisory only: the sequencer pre-fills a candidate number per family;
//! server-side uniqueness is authoritative and a rejected suggestion is
//! absorbed via `resync` with no other side effects.

pub mod sequencer;

pub use sequencer::NumberSequencer;
