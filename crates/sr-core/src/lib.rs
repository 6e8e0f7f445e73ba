//! ShortsRemover Core Library
//!
//! This crate provides the detection-and-removal engine that keeps YouTube Shorts
//! out of a live page. It never touches the browser directly: every tree query,
//! navigation and timer goes through the traits in [`host`], so the same engine
//! runs inside the extension (see `sr-wasm`) and against saved HTML snapshots.
//!
//! # Architecture
//!
//! A scan pass classifies the current location first. Pages that are entirely
//! Shorts get a single delayed redirect; every other page goes through the
//! element matcher, whose candidates are handed to the removal engine. The
//! mutation scheduler re-runs the pass after each settled burst of DOM changes.
//!
//! # Modules
//!
//! - `registry`: versioned table of structural selectors per strategy
//! - `config`: engine settings (site profile, delays, strategy toggles)
//! - `url`: allocation-free location parsing
//! - `page`: page classification
//! - `matcher`: detection strategies
//! - `removal`: merge, count and detach
//! - `redirect`: one-shot redirect guard
//! - `scheduler`: debounced mutation scheduling
//! - `controller`: the façade owning all of the above
//! - `host`: traits for the consumed browser primitives
//! - `html` / `offline` (feature `html`): scraper-backed document and host

pub mod config;
pub mod controller;
pub mod host;
pub mod matcher;
pub mod page;
pub mod redirect;
pub mod registry;
pub mod removal;
pub mod scheduler;
pub mod types;
pub mod url;

#[cfg(feature = "html")]
pub mod html;
#[cfg(feature = "html")]
pub mod offline;

// Re-export commonly used types
pub use config::{ConfigError, EngineConfig, SiteProfile};
pub use controller::{FilterController, InitOutcome};
pub use host::{Document, Host, HostError, MutationSource, Navigation, Timers};
pub use matcher::{CandidateSet, ElementMatcher};
pub use page::{ForbiddenPage, Location, PageContext};
pub use registry::{RegistryError, SelectorKey, SelectorRegistry};
pub use removal::{RemovalEngine, RemovalOutcome, RemovalTally};
pub use types::{ScanReport, Strategy, StrategySet, TimerTask, TimerTicket};
