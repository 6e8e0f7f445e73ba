//! Shared type definitions for ShortsRemover
//!
//! Strategy identifiers, timer tickets and the per-pass scan report.

use serde::{Deserialize, Serialize};

use crate::redirect::RedirectOutcome;

// =============================================================================
// Strategies
// =============================================================================

/// Detection strategy, in the order the matcher runs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Dedicated Shorts containers, shelves, carousels and the channel tab
    BasicContainers,
    /// "Shorts" filter chip in the horizontal chip bar
    Chips,
    /// Sidebar / mini-guide navigation entries
    Sidebar,
    /// Generic video cards carrying a Shorts badge
    Disguised,
    /// Notification entries pointing at a Shorts route
    Notifications,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::BasicContainers,
        Strategy::Chips,
        Strategy::Sidebar,
        Strategy::Disguised,
        Strategy::Notifications,
    ];

    /// Whether each match of this strategy counts toward the session tally.
    ///
    /// Only strategies that match one Short per element are countable;
    /// container removal is structural cleanup.
    #[inline]
    pub fn is_countable(self) -> bool {
        matches!(self, Strategy::Disguised | Strategy::Notifications)
    }

    /// Bit in a [`StrategySet`].
    pub fn flag(self) -> StrategySet {
        match self {
            Strategy::BasicContainers => StrategySet::BASIC_CONTAINERS,
            Strategy::Chips => StrategySet::CHIPS,
            Strategy::Sidebar => StrategySet::SIDEBAR,
            Strategy::Disguised => StrategySet::DISGUISED,
            Strategy::Notifications => StrategySet::NOTIFICATIONS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::BasicContainers => "basic_containers",
            Strategy::Chips => "chips",
            Strategy::Sidebar => "sidebar",
            Strategy::Disguised => "disguised",
            Strategy::Notifications => "notifications",
        }
    }
}

bitflags::bitflags! {
    /// Set of enabled detection strategies.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct StrategySet: u8 {
        const BASIC_CONTAINERS = 1 << 0;
        const CHIPS = 1 << 1;
        const SIDEBAR = 1 << 2;
        const DISGUISED = 1 << 3;
        const NOTIFICATIONS = 1 << 4;

        /// Every strategy
        const ALL = Self::BASIC_CONTAINERS.bits()
            | Self::CHIPS.bits()
            | Self::SIDEBAR.bits()
            | Self::DISGUISED.bits()
            | Self::NOTIFICATIONS.bits();
    }
}

impl Default for StrategySet {
    fn default() -> Self {
        Self::ALL
    }
}

impl StrategySet {
    #[inline]
    pub fn enables(self, strategy: Strategy) -> bool {
        self.contains(strategy.flag())
    }
}

// =============================================================================
// Timers
// =============================================================================

/// What a scheduled timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTask {
    /// Debounced scan after a mutation burst
    Scan,
    /// Delayed navigation away from a forbidden page
    Redirect,
}

/// Identifies one scheduled timer.
///
/// The host hands the ticket back to the controller when the timer fires.
/// Sequence numbers are per task, so a ticket is unique for the controller's
/// lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerTicket {
    pub task: TimerTask,
    pub seq: u64,
}

impl TimerTicket {
    pub fn new(task: TimerTask, seq: u64) -> Self {
        Self { task, seq }
    }
}

// =============================================================================
// Scan Report
// =============================================================================

/// Result of one scan pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScanReport {
    /// The location is not on the filtered site
    OffSite,
    /// Forbidden page: matching skipped, redirect guard consulted
    Redirect { outcome: RedirectOutcome },
    /// Regular page: candidates matched and removed
    Filtered {
        /// Element references collected across all strategies
        matched: usize,
        /// Elements actually detached by this pass
        detached: usize,
        /// Amount added to the tally by this pass
        counted: u64,
        /// Cumulative session tally after this pass
        tally: u64,
    },
}

impl ScanReport {
    /// Amount this pass added to the tally.
    pub fn counted(&self) -> u64 {
        match self {
            ScanReport::Filtered { counted, .. } => *counted,
            _ => 0,
        }
    }
}
