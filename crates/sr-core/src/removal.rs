//! Removal Engine
//!
//! Turns a candidate set into one removal pass and the amount it adds to the
//! session tally.
//!
//! The tally approximates Shorts hidden, not DOM nodes removed: disguised and
//! notification matches count one each, individual Short tiles still in the
//! document count one each, and containers count nothing on their own. The
//! tile probe is independent of the candidate identities, so a tile can be
//! counted on top of the card that holds it.

use log::warn;
use serde::Serialize;

use crate::host::Document;
use crate::matcher::CandidateSet;
use crate::registry::{SelectorKey, SelectorRegistry};

/// Outcome of one removal pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RemovalOutcome {
    /// Element references handed to the engine, duplicates included
    pub matched: usize,
    /// Elements this pass actually detached
    pub detached: usize,
    /// Amount to add to the session tally
    pub counted: u64,
}

pub struct RemovalEngine<'a> {
    registry: &'a SelectorRegistry,
}

impl<'a> RemovalEngine<'a> {
    pub fn new(registry: &'a SelectorRegistry) -> Self {
        Self { registry }
    }

    /// Count, then detach every candidate that is still attached.
    pub fn remove_all<D: Document>(&self, doc: &mut D, candidates: CandidateSet<D::Node>) -> RemovalOutcome {
        if candidates.is_empty() {
            return RemovalOutcome::default();
        }

        // Tiles are probed before anything is detached
        let counted = self.single_items(doc) + candidates.countable() as u64;

        let elements = candidates.into_flat();
        let matched = elements.len();
        let detached = elements.iter().filter(|el| doc.remove(el)).count();

        RemovalOutcome {
            matched,
            detached,
            counted,
        }
    }

    fn single_items<D: Document>(&self, doc: &D) -> u64 {
        let Some(selector) = self.registry.selector(SelectorKey::SingleItem) else {
            return 0;
        };

        match doc.query_all(&selector) {
            Ok(items) => items.len() as u64,
            Err(e) => {
                warn!("Single item probe failed, not counted: {}", e);
                0
            }
        }
    }
}

// =============================================================================
// Tally
// =============================================================================

/// Cumulative count of removed Shorts for the page session. Never decreases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RemovalTally(u64);

impl RemovalTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `count`, returning the new total.
    pub fn add(&mut self, count: u64) -> u64 {
        self.0 = self.0.saturating_add(count);
        self.0
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}
