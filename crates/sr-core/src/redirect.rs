//! Redirect Controller
//!
//! One-shot guard for leaving pages that are entirely Shorts. The first
//! detection arms a delayed location replace; every later detection is a
//! no-op. Once armed the guard never returns to idle: the navigation is
//! expected to unload the page, and if the host cancels it the guard stays
//! latched for the rest of the session.

use std::time::Duration;

use log::{info, warn};
use serde::Serialize;

use crate::config::SiteProfile;
use crate::host::{Navigation, Timers};
use crate::page::{ForbiddenPage, Location};
use crate::types::{TimerTask, TimerTicket};

/// What a redirect request did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RedirectOutcome {
    /// A delayed redirect was scheduled
    Armed { target: String },
    /// A redirect is already scheduled
    AlreadyPending,
    /// The redirect already ran
    Latched,
    /// The host refused the timer; the guard stays idle
    ArmFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GuardState {
    Idle,
    Pending { ticket: TimerTicket, target: String },
    Fired,
}

pub struct RedirectController {
    delay: Duration,
    state: GuardState,
    next_seq: u64,
}

impl RedirectController {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            state: GuardState::Idle,
            next_seq: 0,
        }
    }

    /// Arm the redirect away from `page` unless one is already pending or done.
    pub fn request<T: Timers>(
        &mut self,
        page: ForbiddenPage,
        location: &Location,
        site: &SiteProfile,
        timers: &mut T,
    ) -> RedirectOutcome {
        match self.state {
            GuardState::Pending { .. } => return RedirectOutcome::AlreadyPending,
            GuardState::Fired => return RedirectOutcome::Latched,
            GuardState::Idle => {}
        }

        let target = redirect_target(page, location, site);
        let ticket = TimerTicket::new(TimerTask::Redirect, self.next_seq);
        self.next_seq += 1;

        if let Err(e) = timers.schedule(ticket, self.delay) {
            warn!("Failed to schedule redirect: {}", e);
            return RedirectOutcome::ArmFailed;
        }

        info!("Shorts page detected, redirecting to {} in {}ms", target, self.delay.as_millis());
        self.state = GuardState::Pending {
            ticket,
            target: target.clone(),
        };
        RedirectOutcome::Armed { target }
    }

    /// Handle a fired redirect timer. Returns true if navigation was attempted.
    pub fn fire<N: Navigation>(&mut self, ticket: TimerTicket, nav: &mut N) -> bool {
        let target = match &self.state {
            GuardState::Pending { ticket: pending, target } if *pending == ticket => target.clone(),
            _ => return false,
        };

        self.state = GuardState::Fired;
        if let Err(e) = nav.replace(&target) {
            warn!("Redirect to {} failed, not retrying: {}", target, e);
        }
        true
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, GuardState::Pending { .. })
    }

    /// True once a redirect has been armed; never resets.
    #[inline]
    pub fn is_latched(&self) -> bool {
        self.state != GuardState::Idle
    }
}

/// Where to go from a forbidden page: the site home for the dedicated player,
/// the channel itself for a channel's Shorts tab.
///
/// Computed from the location at arming time, not when the timer fires.
pub fn redirect_target(page: ForbiddenPage, location: &Location, site: &SiteProfile) -> String {
    match page {
        ForbiddenPage::ContentPage => site.home_url.clone(),
        ForbiddenPage::ChannelSection => {
            let stripped = location
                .path
                .strip_suffix(site.content_route.as_str())
                .unwrap_or(&location.path);
            if stripped.is_empty() {
                "/".to_string()
            } else {
                stripped.to_string()
            }
        }
    }
}
