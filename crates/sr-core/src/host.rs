//! Host interfaces
//!
//! The engine consumes four browser primitives: tree queries, navigation,
//! timers and mutation notifications. Each is a trait so the same engine runs
//! against `web-sys` in the extension and against parsed HTML offline.

use std::time::Duration;

use crate::page::Location;
use crate::types::TimerTicket;

/// Failure reported by a host primitive.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("Query failed for '{selector}': {reason}")]
    Query { selector: String, reason: String },
    #[error("Mutation subscription failed: {0}")]
    Subscribe(String),
    #[error("Navigation failed: {0}")]
    Navigation(String),
    #[error("Timer failed: {0}")]
    Timer(String),
}

/// Query and detach access to the live document tree.
pub trait Document {
    /// Handle to an element of the tree.
    type Node: Clone;

    /// All elements matching `selector`, in document order.
    fn query_all(&self, selector: &str) -> Result<Vec<Self::Node>, HostError>;

    /// Descendants of `scope` (excluding `scope`) matching `selector`.
    fn query_within(&self, scope: &Self::Node, selector: &str) -> Result<Vec<Self::Node>, HostError>;

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: &Self::Node, selector: &str) -> Result<Option<Self::Node>, HostError>;

    /// Text content of `node`.
    fn text(&self, node: &Self::Node) -> String;

    /// Detach `node`. Returns false if it was already detached.
    fn remove(&mut self, node: &Self::Node) -> bool;
}

/// Current location and location replacement.
pub trait Navigation {
    fn location(&self) -> Location;

    /// Navigate to `url` without adding a history entry.
    fn replace(&mut self, url: &str) -> Result<(), HostError>;
}

/// One-shot timers. The host reports a fired timer by passing its ticket to
/// [`crate::FilterController::on_timer`].
pub trait Timers {
    fn schedule(&mut self, ticket: TimerTicket, delay: Duration) -> Result<(), HostError>;

    /// Cancel a scheduled timer. Unknown or already fired tickets are ignored.
    fn cancel(&mut self, ticket: TimerTicket);
}

/// Mutation notifications for the whole document subtree. The host reports a
/// batch by calling [`crate::FilterController::on_mutations`].
pub trait MutationSource {
    /// Subscribe to child-list changes anywhere under the document.
    fn observe_subtree(&mut self) -> Result<(), HostError>;
}

/// Everything the controller needs from its environment.
pub trait Host: Document + Navigation + Timers + MutationSource {}

impl<T: Document + Navigation + Timers + MutationSource> Host for T {}
