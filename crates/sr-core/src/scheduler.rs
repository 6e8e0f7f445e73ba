//! Mutation Scheduler
//!
//! Debounces mutation bursts into scans. Every notification re-arms the timer,
//! so only the trailing notification of a burst survives and exactly one scan
//! runs once the page has been quiet for the debounce window.

use std::time::Duration;

use log::{debug, warn};

use crate::host::{MutationSource, Timers};
use crate::types::{TimerTask, TimerTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pending(TimerTicket),
    Fired,
}

pub struct MutationScheduler {
    window: Duration,
    state: DebounceState,
    next_seq: u64,
    observing: bool,
}

impl MutationScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
            next_seq: 0,
            observing: false,
        }
    }

    /// Subscribe to document mutations. On failure the engine keeps the
    /// result of the initial scan and gets no reactive updates.
    pub fn start<M: MutationSource>(&mut self, source: &mut M) -> bool {
        if self.observing {
            return true;
        }
        match source.observe_subtree() {
            Ok(()) => {
                self.observing = true;
                true
            }
            Err(e) => {
                warn!("Failed to start observer: {}", e);
                false
            }
        }
    }

    /// A mutation batch arrived: restart the debounce timer.
    pub fn notify<T: Timers>(&mut self, timers: &mut T) {
        self.cancel_pending(timers);

        let ticket = TimerTicket::new(TimerTask::Scan, self.next_seq);
        self.next_seq += 1;

        match timers.schedule(ticket, self.window) {
            Ok(()) => self.state = DebounceState::Pending(ticket),
            Err(e) => warn!("Failed to schedule scan: {}", e),
        }
    }

    /// Drop the pending scan, if any.
    pub fn cancel_pending<T: Timers>(&mut self, timers: &mut T) {
        if let DebounceState::Pending(ticket) = self.state {
            timers.cancel(ticket);
            self.state = DebounceState::Idle;
        }
    }

    /// A scan timer fired. Returns true if the scan should run; superseded
    /// tickets return false.
    pub fn fire(&mut self, ticket: TimerTicket) -> bool {
        match self.state {
            DebounceState::Pending(pending) if pending == ticket => {
                self.state = DebounceState::Fired;
                true
            }
            _ => {
                debug!("Ignoring superseded scan timer {}", ticket.seq);
                false
            }
        }
    }

    #[inline]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    #[inline]
    pub fn is_observing(&self) -> bool {
        self.observing
    }
}
