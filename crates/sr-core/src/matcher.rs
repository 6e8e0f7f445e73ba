//! Element Matcher
//!
//! Independent detection strategies. Each one turns registry patterns into an
//! ordered list of element handles; the removal engine decides what happens to
//! them. An empty result is the normal case on most pages, and a strategy whose
//! host query fails contributes nothing for the pass instead of aborting it.

use log::{debug, warn};

use crate::host::{Document, HostError};
use crate::page::PageContext;
use crate::registry::{SelectorKey, SelectorRegistry};
use crate::types::{Strategy, StrategySet};

// =============================================================================
// Candidate Set
// =============================================================================

/// Matched elements per strategy, in discovery order. Lives for one pass.
#[derive(Debug, Clone)]
pub struct CandidateSet<N> {
    entries: Vec<(Strategy, Vec<N>)>,
}

impl<N> Default for CandidateSet<N> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<N> CandidateSet<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the matches of one strategy.
    pub fn push(&mut self, strategy: Strategy, nodes: Vec<N>) {
        self.entries.push((strategy, nodes));
    }

    /// Matches recorded for `strategy`.
    pub fn get(&self, strategy: Strategy) -> &[N] {
        self.entries
            .iter()
            .find(|(s, _)| *s == strategy)
            .map_or(&[][..], |(_, nodes)| nodes.as_slice())
    }

    /// Total element references across all strategies, duplicates included.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|(_, nodes)| nodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// References contributed by countable strategies.
    pub fn countable(&self) -> usize {
        self.entries
            .iter()
            .filter(|(strategy, _)| strategy.is_countable())
            .map(|(_, nodes)| nodes.len())
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Strategy, &[N])> {
        self.entries.iter().map(|(strategy, nodes)| (*strategy, nodes.as_slice()))
    }

    /// Flatten into one list, preserving discovery order without dedup.
    pub fn into_flat(self) -> Vec<N> {
        let mut flat = Vec::with_capacity(self.len());
        for (_, nodes) in self.entries {
            flat.extend(nodes);
        }
        flat
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Runs the enabled detection strategies against a document.
pub struct ElementMatcher<'a> {
    registry: &'a SelectorRegistry,
    strategies: StrategySet,
}

impl<'a> ElementMatcher<'a> {
    pub fn new(registry: &'a SelectorRegistry, strategies: StrategySet) -> Self {
        Self { registry, strategies }
    }

    /// Collect candidates for one pass.
    pub fn collect<D: Document>(&self, doc: &D, ctx: &PageContext) -> CandidateSet<D::Node> {
        let mut set = CandidateSet::new();

        for strategy in Strategy::ALL {
            if !self.strategies.enables(strategy) {
                continue;
            }

            let nodes = match self.run(strategy, doc, ctx) {
                Ok(nodes) => nodes,
                Err(e) => {
                    warn!("Strategy '{}' skipped for this pass: {}", strategy.name(), e);
                    Vec::new()
                }
            };

            if !nodes.is_empty() {
                debug!("Strategy '{}' matched {} element(s)", strategy.name(), nodes.len());
            }
            set.push(strategy, nodes);
        }

        set
    }

    /// Run a single strategy.
    pub fn run<D: Document>(
        &self,
        strategy: Strategy,
        doc: &D,
        ctx: &PageContext,
    ) -> Result<Vec<D::Node>, HostError> {
        match strategy {
            Strategy::BasicContainers => self.basic_containers(doc, ctx),
            Strategy::Chips => self.chips(doc),
            Strategy::Sidebar => self.sidebar_entries(doc),
            Strategy::Disguised => self.widened(doc, SelectorKey::DisguisedMarker, SelectorKey::DisguisedContainer),
            Strategy::Notifications => {
                self.widened(doc, SelectorKey::NotificationLink, SelectorKey::NotificationContainer)
            }
        }
    }

    /// Direct matches of the dedicated containers. The suggested carousel is
    /// acceptable on the history page and left alone there.
    fn basic_containers<D: Document>(&self, doc: &D, ctx: &PageContext) -> Result<Vec<D::Node>, HostError> {
        let mut keys = vec![
            SelectorKey::HomePageContainer,
            SelectorKey::ShortsContainer,
            SelectorKey::ResultsPageShelf,
            SelectorKey::ChannelTab,
        ];
        if !ctx.is_history_page() {
            keys.push(SelectorKey::SuggestedCarousel);
        }

        match self.registry.selector_for(&keys) {
            Some(selector) => doc.query_all(&selector),
            None => Ok(Vec::new()),
        }
    }

    /// Chips whose label reads as the category, widened to the chip wrapper.
    fn chips<D: Document>(&self, doc: &D) -> Result<Vec<D::Node>, HostError> {
        let (Some(label_selector), Some(container_selector)) = (
            self.registry.selector(SelectorKey::ChipLabel),
            self.registry.selector(SelectorKey::ChipContainer),
        ) else {
            return Ok(Vec::new());
        };

        let label = self.registry.label().to_lowercase();
        let mut chips = Vec::new();

        for node in doc.query_all(&label_selector)? {
            if doc.text(&node).trim().to_lowercase() != label {
                continue;
            }
            if let Some(chip) = doc.closest(&node, &container_selector)? {
                chips.push(chip);
            }
        }

        Ok(chips)
    }

    /// Navigation entries that contain the category link.
    fn sidebar_entries<D: Document>(&self, doc: &D) -> Result<Vec<D::Node>, HostError> {
        let (Some(entry_selector), Some(link_selector)) = (
            self.registry.selector(SelectorKey::SidebarEntry),
            self.registry.selector(SelectorKey::SidebarLink),
        ) else {
            return Ok(Vec::new());
        };

        let mut entries = Vec::new();
        for entry in doc.query_all(&entry_selector)? {
            if !doc.query_within(&entry, &link_selector)?.is_empty() {
                entries.push(entry);
            }
        }

        Ok(entries)
    }

    /// Match `marker` elements and widen each to its `container` ancestor.
    /// Markers without such an ancestor are dropped.
    fn widened<D: Document>(
        &self,
        doc: &D,
        marker: SelectorKey,
        container: SelectorKey,
    ) -> Result<Vec<D::Node>, HostError> {
        let (Some(marker_selector), Some(container_selector)) =
            (self.registry.selector(marker), self.registry.selector(container))
        else {
            return Ok(Vec::new());
        };

        let mut widened = Vec::new();
        for node in doc.query_all(&marker_selector)? {
            if let Some(ancestor) = doc.closest(&node, &container_selector)? {
                widened.push(ancestor);
            }
        }

        Ok(widened)
    }
}
