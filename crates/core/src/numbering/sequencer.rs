//! Per-family document number sequencer.

use tracing::debug;

use finch_shared::config::NumberingConfig;

use crate::document::types::DocumentFamily;

/// Generates zero-padded document number candidates per family.
///
/// Counters live in memory and advance independently per family. The
/// suggestion is advisory; when the server renumbers a document, the
/// caller feeds the authoritative sequence back via [`resync`].
///
/// [`resync`]: NumberSequencer::resync
#[derive(Debug, Clone)]
pub struct NumberSequencer {
    config: NumberingConfig,
    counters: [u32; DocumentFamily::ALL.len()],
}

impl NumberSequencer {
    /// Creates a sequencer with all counters at zero.
    #[must_use]
    pub fn new(config: NumberingConfig) -> Self {
        Self {
            config,
            counters: [0; DocumentFamily::ALL.len()],
        }
    }

    /// The configured prefix for a family.
    #[must_use]
    pub fn prefix(&self, family: DocumentFamily) -> &str {
        match family {
            DocumentFamily::Bill => &self.config.bill_prefix,
            DocumentFamily::CreditNote => &self.config.credit_note_prefix,
            DocumentFamily::Estimate => &self.config.estimate_prefix,
            DocumentFamily::Expense => &self.config.expense_prefix,
        }
    }

    /// Advances the family's counter and returns the next candidate.
    pub fn next(&mut self, family: DocumentFamily) -> String {
        let counter = &mut self.counters[family as usize];
        *counter = counter.saturating_add(1);
        let number = self.format(family, self.counters[family as usize]);
        debug!(family = %family, %number, "number suggested");
        number
    }

    /// The candidate `next` would return, without advancing.
    #[must_use]
    pub fn peek(&self, family: DocumentFamily) -> String {
        self.format(family, self.counters[family as usize].saturating_add(1))
    }

    /// Accepts the server's authoritative numbering after a collision.
    ///
    /// Counters never move backwards: a stale `highest_seen` is ignored.
    pub fn resync(&mut self, family: DocumentFamily, highest_seen: u32) {
        let counter = &mut self.counters[family as usize];
        if highest_seen > *counter {
            debug!(family = %family, highest_seen, "sequencer resynced");
            *counter = highest_seen;
        }
    }

    /// Extracts the sequence component of a document number, if it
    /// carries the family's prefix and a numeric tail.
    #[must_use]
    pub fn sequence_of(&self, number: &str, family: DocumentFamily) -> Option<u32> {
        number
            .strip_prefix(self.prefix(family))
            .and_then(|tail| tail.parse().ok())
    }

    fn format(&self, family: DocumentFamily, sequence: u32) -> String {
        format!(
            "{}{:0width$}",
            self.prefix(family),
            sequence,
            width = self.config.pad_width
        )
    }
}
