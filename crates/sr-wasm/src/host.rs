//! Browser host over `web-sys`

use std::collections::HashMap;
use std::time::Duration;

use js_sys::{Array, Function};
use sr_core::{Document, HostError, Location, MutationSource, Navigation, TimerTicket, Timers};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, MutationObserver, MutationObserverInit, NodeList, Window};

type MutationCallback = Closure<dyn FnMut(Array, MutationObserver)>;
type TimerCallback = Closure<dyn FnMut()>;

pub struct BrowserHost {
    window: Window,
    document: web_sys::Document,
    /// Native handles of scheduled timers with their callbacks
    timers: HashMap<TimerTicket, (i32, TimerCallback)>,
    /// Callback of the last timer that fired. It may still be on the stack
    /// when settled, so it is dropped on the next settle instead.
    spent: Option<TimerCallback>,
    /// Kept alive for the page session
    observer: Option<(MutationObserver, MutationCallback)>,
}

impl BrowserHost {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No global window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("Window has no document"))?;

        Ok(Self {
            window,
            document,
            timers: HashMap::new(),
            spent: None,
            observer: None,
        })
    }

    /// Timers scheduled and not yet fired or cancelled.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Forget a timer that already fired.
    fn settle_timer(&mut self, ticket: TimerTicket) {
        if let Some((_, callback)) = self.timers.remove(&ticket) {
            self.spent = Some(callback);
        }
    }
}

fn js_reason(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

fn query_error(selector: &str, err: JsValue) -> HostError {
    HostError::Query {
        selector: selector.to_string(),
        reason: js_reason(&err),
    }
}

fn elements(list: NodeList) -> Vec<Element> {
    let mut found = Vec::with_capacity(list.length() as usize);
    for i in 0..list.length() {
        if let Some(el) = list.item(i).and_then(|node| node.dyn_into::<Element>().ok()) {
            found.push(el);
        }
    }
    found
}

impl Document for BrowserHost {
    type Node = Element;

    fn query_all(&self, selector: &str) -> Result<Vec<Element>, HostError> {
        self.document
            .query_selector_all(selector)
            .map(elements)
            .map_err(|e| query_error(selector, e))
    }

    fn query_within(&self, scope: &Element, selector: &str) -> Result<Vec<Element>, HostError> {
        scope
            .query_selector_all(selector)
            .map(elements)
            .map_err(|e| query_error(selector, e))
    }

    fn closest(&self, node: &Element, selector: &str) -> Result<Option<Element>, HostError> {
        node.closest(selector).map_err(|e| query_error(selector, e))
    }

    fn text(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn remove(&mut self, node: &Element) -> bool {
        if !node.is_connected() {
            return false;
        }
        node.remove();
        true
    }
}

impl Navigation for BrowserHost {
    fn location(&self) -> Location {
        let location = self.window.location();
        Location::new(
            location.host().unwrap_or_default().to_ascii_lowercase(),
            location.pathname().unwrap_or_default(),
        )
    }

    fn replace(&mut self, url: &str) -> Result<(), HostError> {
        self.window
            .location()
            .replace(url)
            .map_err(|e| HostError::Navigation(js_reason(&e)))
    }
}

impl Timers for BrowserHost {
    fn schedule(&mut self, ticket: TimerTicket, delay: Duration) -> Result<(), HostError> {
        let callback: TimerCallback = Closure::new(move || {
            crate::with_controller(|controller| {
                controller.on_timer(ticket);
                controller.host_mut().settle_timer(ticket);
            });
        });

        let timeout = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        let handle = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref::<Function>(), timeout)
            .map_err(|e| HostError::Timer(js_reason(&e)))?;

        if let Some((stale, _)) = self.timers.insert(ticket, (handle, callback)) {
            self.window.clear_timeout_with_handle(stale);
        }
        Ok(())
    }

    fn cancel(&mut self, ticket: TimerTicket) {
        // A cleared timeout never calls back; its closure goes with it.
        if let Some((handle, _callback)) = self.timers.remove(&ticket) {
            self.window.clear_timeout_with_handle(handle);
        }
    }
}

impl MutationSource for BrowserHost {
    fn observe_subtree(&mut self) -> Result<(), HostError> {
        if self.observer.is_some() {
            return Ok(());
        }

        let callback: MutationCallback = Closure::new(|_records: Array, _observer: MutationObserver| {
            crate::with_controller(|controller| controller.on_mutations());
        });

        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())
            .map_err(|e| HostError::Subscribe(js_reason(&e)))?;

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);

        observer
            .observe_with_options(&self.document, &options)
            .map_err(|e| HostError::Subscribe(js_reason(&e)))?;

        self.observer = Some((observer, callback));
        Ok(())
    }
}
