//! Browser tests for the web-sys host. Run with `wasm-pack test --headless --firefox`.

#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use sr_core::{
    Document, ElementMatcher, PageContext, RemovalEngine, SelectorRegistry, Strategy, StrategySet, TimerTask,
    TimerTicket, Timers,
};
use sr_wasm::BrowserHost;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const FEED: &str = r#"
    <ytd-guide-entry-renderer><a title="Shorts"></a></ytd-guide-entry-renderer>
    <ytd-video-renderer><badge-shape aria-label="Shorts"></badge-shape></ytd-video-renderer>
    <ytd-video-renderer><badge-shape aria-label="Shorts"></badge-shape></ytd-video-renderer>
    <ytd-video-renderer><badge-shape aria-label="Shorts"></badge-shape></ytd-video-renderer>
    <ytd-video-renderer id="keep"></ytd-video-renderer>
"#;

fn load(html: &str) -> BrowserHost {
    let document = web_sys::window().unwrap().document().unwrap();
    document.body().unwrap().set_inner_html(html);
    BrowserHost::new().unwrap()
}

#[wasm_bindgen_test]
fn removes_disguised_cards_and_sidebar_entry() {
    let mut host = load(FEED);
    let registry = SelectorRegistry::youtube();

    let candidates = ElementMatcher::new(&registry, StrategySet::ALL).collect(&host, &PageContext::default());
    assert_eq!(candidates.get(Strategy::Disguised).len(), 3);
    assert_eq!(candidates.get(Strategy::Sidebar).len(), 1);

    let outcome = RemovalEngine::new(&registry).remove_all(&mut host, candidates);
    assert_eq!(outcome.detached, 4);
    assert_eq!(outcome.counted, 3);
    assert_eq!(host.query_all("ytd-video-renderer").unwrap().len(), 1);
}

#[wasm_bindgen_test]
fn remove_twice_is_a_noop() {
    let mut host = load("<div id='shelf'></div>");
    let shelf = host.query_all("#shelf").unwrap().remove(0);
    assert!(host.remove(&shelf));
    assert!(!host.remove(&shelf));
}

#[wasm_bindgen_test]
fn invalid_selector_is_reported() {
    let host = load("<div></div>");
    assert!(host.query_all("div[[").is_err());
}

#[wasm_bindgen_test]
fn cancelled_timers_release_their_callbacks() {
    let mut host = load("<div></div>");
    let first = TimerTicket::new(TimerTask::Scan, 1);
    let second = TimerTicket::new(TimerTask::Scan, 2);

    host.schedule(first, Duration::from_millis(600)).unwrap();
    assert_eq!(host.pending_timers(), 1);

    // A debounce re-arm: cancel the pending ticket, schedule the next one
    host.cancel(first);
    host.schedule(second, Duration::from_millis(600)).unwrap();
    assert_eq!(host.pending_timers(), 1);

    host.cancel(second);
    host.cancel(second);
    assert_eq!(host.pending_timers(), 0);
}
