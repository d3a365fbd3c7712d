//! Generic table-driven state machine.
//!
//! Each document family supplies a static transition table; legality,
//! permission flags, and exhaustiveness testing all derive from the same
//! rows. Any `(state, event)` pair without an explicit row is illegal --
//! there are no wildcard transitions.

use crate::document::types::{DocumentFamily, DocumentVersion};
use crate::lifecycle::effects::{EffectKind, SideEffect};
use crate::lifecycle::error::{ClampWarning, LifecycleError};

/// A document status usable in a transition table.
pub trait StateKind: Copy + Eq + std::fmt::Debug + 'static {
    /// Snake-case name used in errors and serialization.
    fn name(self) -> &'static str;

    /// Terminal states forbid all further transitions and edits.
    fn is_terminal(self) -> bool;
}

/// A lifecycle event usable in a transition table.
pub trait EventKind: Copy + Eq + std::fmt::Debug + 'static {
    /// Snake-case name used in errors and permission flags.
    fn name(self) -> &'static str;
}

/// Where a transition lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target<S> {
    /// Move to another (or the same) status.
    State(S),
    /// Hard-delete the document; legal only from the initial draft state.
    Deleted,
}

/// One explicit `(state, event) → target` row.
#[derive(Debug, Clone, Copy)]
pub struct Transition<S: 'static, E: 'static> {
    /// The state the document must currently be in.
    pub from: S,
    /// The event being fired.
    pub event: E,
    /// The resulting state or deletion.
    pub target: Target<S>,
    /// The side-effect obligation this row triggers, if any.
    pub effect: Option<EffectKind>,
}

/// A family's complete transition table.
#[derive(Debug)]
pub struct TransitionTable<S: 'static, E: 'static> {
    family: DocumentFamily,
    rows: &'static [Transition<S, E>],
}

impl<S: StateKind, E: EventKind> TransitionTable<S, E> {
    /// Wraps a static row slice.
    #[must_use]
    pub const fn new(family: DocumentFamily, rows: &'static [Transition<S, E>]) -> Self {
        Self { family, rows }
    }

    /// The family this table governs.
    #[must_use]
    pub const fn family(&self) -> DocumentFamily {
        self.family
    }

    /// All rows, for permission derivation and table tests.
    #[must_use]
    pub const fn rows(&self) -> &'static [Transition<S, E>] {
        self.rows
    }

    /// Looks up the row for `(from, event)`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::InvalidTransition`] when no explicit
    /// row matches.
    pub fn fire(&self, from: S, event: E) -> Result<&'static Transition<S, E>, LifecycleError> {
        self.rows
            .iter()
            .find(|row| row.from == from && row.event == event)
            .ok_or(LifecycleError::InvalidTransition {
                family: self.family,
                from: from.name(),
                event: event.name(),
            })
    }

    /// Whether `(from, event)` has an explicit row.
    #[must_use]
    pub fn allows(&self, from: S, event: E) -> bool {
        self.rows
            .iter()
            .any(|row| row.from == from && row.event == event)
    }
}

/// The result of a successful state transition.
///
/// The engine never executes the side effects itself; the caller's
/// persistence layer must apply them exactly once, together with the
/// status and version change, in one atomic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome<S> {
    /// The document's status after the transition.
    pub new_status: S,
    /// Side-effect obligations delegated to external collaborators.
    pub effects: Vec<SideEffect>,
    /// The version the document must be persisted with.
    pub next_version: DocumentVersion,
    /// Non-fatal clamp warnings raised during the transition.
    pub warnings: Vec<ClampWarning>,
}

impl<S> TransitionOutcome<S> {
    /// An outcome with no effects and no warnings.
    #[must_use]
    pub fn plain(new_status: S, next_version: DocumentVersion) -> Self {
        Self {
            new_status,
            effects: Vec::new(),
            next_version,
            warnings: Vec::new(),
        }
    }
}

/// Verifies the caller's version token against the document's.
///
/// # Errors
///
/// Returns [`LifecycleError::StaleVersion`] on mismatch.
pub fn check_version(
    actual: DocumentVersion,
    expected: DocumentVersion,
) -> Result<(), LifecycleError> {
    if actual == expected {
        Ok(())
    } else {
        Err(LifecycleError::StaleVersion { expected, actual })
    }
}
