//! WebAssembly bindings for ShortsRemover
//!
//! The content script calls [`init`] once per page. The controller then lives
//! in a thread-local for the rest of the page session; mutation and timer
//! callbacks reach it through [`with_controller`].

use std::cell::RefCell;

use sr_core::{EngineConfig, FilterController, InitOutcome, SelectorRegistry};
use wasm_bindgen::prelude::*;

mod host;
mod logger;

pub use host::BrowserHost;

thread_local! {
    /// One controller per page (wasm is single-threaded).
    static CONTROLLER: RefCell<Option<FilterController<BrowserHost>>> = const { RefCell::new(None) };
}

/// Start filtering the current page.
///
/// `registry_json` and `config_json` override the built-in selector table and
/// engine settings. Returns `true` if this call started the engine, `false` if
/// it was already running or the page is not on the filtered site.
#[wasm_bindgen]
pub fn init(registry_json: Option<String>, config_json: Option<String>) -> Result<bool, JsValue> {
    logger::install(log::LevelFilter::Info);

    if is_started() {
        return Ok(false);
    }

    let registry = match registry_json {
        Some(text) => SelectorRegistry::from_json(&text)
            .map_err(|e| JsValue::from_str(&format!("Failed to load registry: {}", e)))?,
        None => SelectorRegistry::youtube(),
    };
    let config = match config_json {
        Some(text) => EngineConfig::from_json(&text)
            .map_err(|e| JsValue::from_str(&format!("Failed to load config: {}", e)))?,
        None => EngineConfig::default(),
    };

    let host = BrowserHost::new()?;

    CONTROLLER.with(|cell| {
        let mut slot = cell
            .try_borrow_mut()
            .map_err(|_| JsValue::from_str("Controller is busy"))?;
        let controller = slot.get_or_insert_with(|| FilterController::new(host, config, registry));
        Ok(matches!(controller.init(), InitOutcome::Started { .. }))
    })
}

#[wasm_bindgen]
pub fn is_started() -> bool {
    CONTROLLER.with(|cell| {
        cell.try_borrow()
            .map(|slot| slot.as_ref().is_some_and(|c| c.is_started()))
            .unwrap_or(false)
    })
}

/// Shorts removed in this page session.
#[wasm_bindgen]
pub fn removed_count() -> f64 {
    CONTROLLER.with(|cell| {
        cell.try_borrow()
            .ok()
            .and_then(|slot| slot.as_ref().map(|c| c.tally() as f64))
            .unwrap_or(0.0)
    })
}

/// Run `f` against the page controller, if there is one.
///
/// Host callbacks only fire from the event loop, never while the controller is
/// borrowed; a busy controller drops the event.
pub(crate) fn with_controller(f: impl FnOnce(&mut FilterController<BrowserHost>)) {
    CONTROLLER.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(controller) = slot.as_mut() {
                f(controller);
            }
        }
        Err(_) => log::warn!("Controller busy, dropping host event"),
    });
}
