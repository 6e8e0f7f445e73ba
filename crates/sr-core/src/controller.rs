//! Filter Controller
//!
//! The façade a page session talks to. It owns the host, the matching
//! components and all session state (tally, redirect guard, debounce timer),
//! so one instance per page load is the whole engine.
//!
//! Host events map onto three entry points:
//!
//! - [`FilterController::init`] once the content script runs
//! - [`FilterController::on_mutations`] for each mutation batch
//! - [`FilterController::on_timer`] when a scheduled ticket fires

use log::{debug, info};
use serde::Serialize;

use crate::config::EngineConfig;
use crate::host::Host;
use crate::matcher::ElementMatcher;
use crate::page::PageClassifier;
use crate::redirect::RedirectController;
use crate::registry::SelectorRegistry;
use crate::removal::{RemovalEngine, RemovalTally};
use crate::scheduler::MutationScheduler;
use crate::types::{ScanReport, TimerTask, TimerTicket};

/// Result of [`FilterController::init`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitOutcome {
    /// Initial scan ran; `observing` is false if the mutation subscription failed
    Started { report: ScanReport, observing: bool },
    /// `init` already ran for this page
    AlreadyStarted,
    /// Not on the filtered site; nothing was done
    OffSite,
}

pub struct FilterController<H: Host> {
    host: H,
    config: EngineConfig,
    registry: SelectorRegistry,
    scheduler: MutationScheduler,
    redirect: RedirectController,
    tally: RemovalTally,
    started: bool,
}

impl<H: Host> FilterController<H> {
    pub fn new(host: H, config: EngineConfig, registry: SelectorRegistry) -> Self {
        Self {
            scheduler: MutationScheduler::new(config.debounce_window()),
            redirect: RedirectController::new(config.redirect_delay()),
            host,
            config,
            registry,
            tally: RemovalTally::new(),
            started: false,
        }
    }

    /// Controller with the built-in config and YouTube registry.
    pub fn with_defaults(host: H) -> Self {
        Self::new(host, EngineConfig::default(), SelectorRegistry::youtube())
    }

    /// Scan once and start reacting to mutations. Later calls are no-ops.
    pub fn init(&mut self) -> InitOutcome {
        if self.started {
            return InitOutcome::AlreadyStarted;
        }

        let location = self.host.location();
        if !PageClassifier::new(&self.config.site, &location).is_filtered_domain() {
            debug!("Not on {}, staying idle", self.config.site.host);
            return InitOutcome::OffSite;
        }

        let report = self.scan();
        let observing = self.scheduler.start(&mut self.host);
        self.started = true;

        InitOutcome::Started { report, observing }
    }

    /// One classify → (redirect | match-and-remove) pass.
    pub fn scan(&mut self) -> ScanReport {
        let location = self.host.location();
        let classifier = PageClassifier::new(&self.config.site, &location);
        if !classifier.is_filtered_domain() {
            return ScanReport::OffSite;
        }

        let ctx = classifier.context();
        if let Some(page) = ctx.forbidden {
            let outcome = self.redirect.request(page, &location, &self.config.site, &mut self.host);
            return ScanReport::Redirect { outcome };
        }

        let candidates = ElementMatcher::new(&self.registry, self.config.strategies).collect(&self.host, &ctx);
        let outcome = RemovalEngine::new(&self.registry).remove_all(&mut self.host, candidates);

        let tally = self.tally.add(outcome.counted);
        if outcome.counted > 0 {
            info!("{}", diagnostic_line(tally, self.config.emphasis_threshold));
        }

        ScanReport::Filtered {
            matched: outcome.matched,
            detached: outcome.detached,
            counted: outcome.counted,
            tally,
        }
    }

    /// The host observed a mutation batch.
    pub fn on_mutations(&mut self) {
        self.scheduler.notify(&mut self.host);
    }

    /// A scheduled ticket fired. Returns the scan report if a scan ran.
    pub fn on_timer(&mut self, ticket: TimerTicket) -> Option<ScanReport> {
        match ticket.task {
            TimerTask::Scan => {
                if self.scheduler.fire(ticket) {
                    Some(self.scan())
                } else {
                    None
                }
            }
            TimerTask::Redirect => {
                self.redirect.fire(ticket, &mut self.host);
                None
            }
        }
    }

    /// Cumulative Shorts removed this session.
    pub fn tally(&self) -> u64 {
        self.tally.get()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirect.is_latched()
    }

    pub fn is_observing(&self) -> bool {
        self.scheduler.is_observing()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &SelectorRegistry {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

/// Diagnostic line for a pass that removed something.
pub fn diagnostic_line(tally: u64, emphasis_threshold: u64) -> String {
    let mut line = format!("Shorts removed for your focus! Total removed in this session: {}", tally);
    if tally > emphasis_threshold {
        line.push_str(" (That's A LOT!)");
    }
    line
}
