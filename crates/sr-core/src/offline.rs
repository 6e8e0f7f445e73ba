//! Offline host
//!
//! Runs the engine against a parsed HTML snapshot with a virtual clock. Timers
//! fire only when the clock is advanced, mutation notifications are delivered
//! by the caller, and navigations are recorded instead of performed: the
//! location and document stay as they were, as if the host had cancelled the
//! unload.

use std::time::Duration;

use ego_tree::NodeId;

use crate::controller::FilterController;
use crate::host::{Document, HostError, MutationSource, Navigation, Timers};
use crate::html::HtmlDocument;
use crate::page::Location;
use crate::types::{ScanReport, TimerTicket};

pub struct OfflineHost {
    document: HtmlDocument,
    location: Location,
    now: Duration,
    /// Scheduled tickets with their due time, in scheduling order
    timers: Vec<(TimerTicket, Duration)>,
    navigations: Vec<String>,
    subscriptions: usize,
    subscription_error: Option<String>,
}

impl OfflineHost {
    pub fn new(html: &str, href: &str) -> Self {
        Self {
            document: HtmlDocument::parse(html),
            location: Location::from_href(href),
            now: Duration::ZERO,
            timers: Vec::new(),
            navigations: Vec::new(),
            subscriptions: 0,
            subscription_error: None,
        }
    }

    /// Make every mutation subscription attempt fail with `reason`.
    pub fn with_subscription_error(mut self, reason: &str) -> Self {
        self.subscription_error = Some(reason.to_string());
        self
    }

    pub fn document(&self) -> &HtmlDocument {
        &self.document
    }

    /// Swap in a new page body, as a client-side route change would.
    pub fn set_document(&mut self, html: &str) {
        self.document = HtmlDocument::parse(html);
    }

    pub fn set_location(&mut self, href: &str) {
        self.location = Location::from_href(href);
    }

    /// URLs passed to `replace`, in order.
    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn is_observing(&self) -> bool {
        self.subscriptions > 0
    }

    pub fn subscriptions(&self) -> usize {
        self.subscriptions
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending_timers(&self) -> Vec<TimerTicket> {
        self.timers.iter().map(|(ticket, _)| *ticket).collect()
    }

    /// Pop the earliest timer due at or before `deadline`, moving the clock to it.
    fn pop_due(&mut self, deadline: Duration) -> Option<TimerTicket> {
        let (idx, _) = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, (_, due))| *due <= deadline)
            .min_by_key(|(idx, (_, due))| (*due, *idx))?;
        let (ticket, due) = self.timers.remove(idx);
        self.now = due;
        Some(ticket)
    }
}

impl Document for OfflineHost {
    type Node = NodeId;

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
        self.document.query_all(selector)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>, HostError> {
        self.document.query_within(scope, selector)
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Result<Option<NodeId>, HostError> {
        self.document.closest(node, selector)
    }

    fn text(&self, node: &NodeId) -> String {
        self.document.text(node)
    }

    fn remove(&mut self, node: &NodeId) -> bool {
        self.document.remove(node)
    }
}

impl Navigation for OfflineHost {
    fn location(&self) -> Location {
        self.location.clone()
    }

    fn replace(&mut self, url: &str) -> Result<(), HostError> {
        self.navigations.push(url.to_string());
        Ok(())
    }
}

impl Timers for OfflineHost {
    fn schedule(&mut self, ticket: TimerTicket, delay: Duration) -> Result<(), HostError> {
        self.timers.push((ticket, self.now + delay));
        Ok(())
    }

    fn cancel(&mut self, ticket: TimerTicket) {
        self.timers.retain(|(t, _)| *t != ticket);
    }
}

impl MutationSource for OfflineHost {
    fn observe_subtree(&mut self) -> Result<(), HostError> {
        if let Some(reason) = &self.subscription_error {
            return Err(HostError::Subscribe(reason.clone()));
        }
        self.subscriptions += 1;
        Ok(())
    }
}

/// A home feed with `cards` video cards, every fourth one a disguised Short,
/// plus a sidebar, a chip bar and a Shorts shelf.
pub fn synthetic_page(cards: usize) -> String {
    let mut html = String::with_capacity(cards * 160 + 1024);
    html.push_str("<html><body><ytd-guide-renderer>");
    for title in ["Home", "Shorts", "Subscriptions"] {
        html.push_str(&format!(
            "<ytd-guide-entry-renderer><a title=\"{title}\" href=\"/\">{title}</a></ytd-guide-entry-renderer>"
        ));
    }
    html.push_str("</ytd-guide-renderer><div id=\"chips\">");
    for label in ["All", "Shorts", "Music"] {
        html.push_str(&format!(
            "<yt-chip-cloud-chip-renderer><chip-shape><button><div>{label}</div></button></chip-shape></yt-chip-cloud-chip-renderer>"
        ));
    }
    html.push_str("</div><div id=\"contents\"><div is-shorts=\"\">");
    for _ in 0..8 {
        html.push_str("<ytm-shorts-lockup-view-model></ytm-shorts-lockup-view-model>");
    }
    html.push_str("</div>");
    for i in 0..cards {
        if i % 4 == 0 {
            html.push_str(&format!(
                "<ytd-video-renderer data-i=\"{i}\"><a href=\"/shorts/{i}\"></a><badge-shape aria-label=\"Shorts\"></badge-shape></ytd-video-renderer>"
            ));
        } else {
            html.push_str(&format!(
                "<ytd-video-renderer data-i=\"{i}\"><a href=\"/watch?v={i}\"></a><badge-shape aria-label=\"New\"></badge-shape></ytd-video-renderer>"
            ));
        }
    }
    html.push_str("</div></body></html>");
    html
}

impl FilterController<OfflineHost> {
    /// Advance the virtual clock by `by`, firing due timers in order.
    /// Returns the reports of the scans that ran.
    pub fn advance(&mut self, by: Duration) -> Vec<ScanReport> {
        let deadline = self.host().now() + by;
        let mut reports = Vec::new();

        while let Some(ticket) = self.host_mut().pop_due(deadline) {
            if let Some(report) = self.on_timer(ticket) {
                reports.push(report);
            }
        }

        self.host_mut().now = deadline;
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimerTask;

    #[test]
    fn test_timers_fire_in_due_order() {
        let mut host = OfflineHost::new("<div></div>", "https://www.youtube.com/");
        let late = TimerTicket::new(TimerTask::Redirect, 0);
        let early = TimerTicket::new(TimerTask::Scan, 0);
        host.schedule(late, Duration::from_millis(1000)).expect("schedule");
        host.schedule(early, Duration::from_millis(600)).expect("schedule");

        assert_eq!(host.pop_due(Duration::from_millis(500)), None);
        assert_eq!(host.pop_due(Duration::from_millis(2000)), Some(early));
        assert_eq!(host.now(), Duration::from_millis(600));
        assert_eq!(host.pop_due(Duration::from_millis(2000)), Some(late));
        assert!(host.pending_timers().is_empty());
    }

    #[test]
    fn test_synthetic_page_scan() {
        let page = synthetic_page(8);
        let mut ctl = FilterController::with_defaults(OfflineHost::new(&page, "https://www.youtube.com/"));
        let report = ctl.scan();
        // shelf + chip + sidebar entry + 2 disguised cards; 8 tiles + 2 cards counted
        assert_eq!(report, ScanReport::Filtered { matched: 5, detached: 5, counted: 10, tally: 10 });
        assert_eq!(ctl.host().document().count("ytd-video-renderer"), 6);
        assert_eq!(ctl.host().document().count("yt-chip-cloud-chip-renderer"), 2);
    }

    #[test]
    fn test_cancel_and_navigation_record() {
        let mut host = OfflineHost::new("<div></div>", "https://www.youtube.com/shorts/a");
        let ticket = TimerTicket::new(TimerTask::Scan, 3);
        host.schedule(ticket, Duration::from_millis(10)).expect("schedule");
        host.cancel(ticket);
        assert!(host.pending_timers().is_empty());

        host.replace("https://www.youtube.com").expect("replace");
        assert_eq!(host.navigations(), ["https://www.youtube.com"]);
        assert_eq!(host.location().path, "/shorts/a");
    }
}
