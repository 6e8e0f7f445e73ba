//! Selector Registry
//!
//! Versioned table of structural patterns, keyed by the role each pattern
//! plays in a detection strategy. YouTube ships several markup variants for the
//! same logical element, so every key maps to one pattern or a list of them.
//!
//! The built-in table is [`SelectorRegistry::youtube`]; a JSON document with the
//! same shape can replace it without touching the matcher:
//!
//! ```json
//! {
//!   "version": 1,
//!   "label": "Shorts",
//!   "selectors": {
//!     "sidebar_entry": ["ytd-guide-entry-renderer", "ytd-mini-guide-entry-renderer"],
//!     "sidebar_link": "a[title='Shorts']"
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Registry format version understood by this build.
pub const REGISTRY_VERSION: u32 = 1;

/// Error type for registry loading.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Invalid registry JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported registry version: {0}")]
    UnsupportedVersion(u32),
    #[error("Empty category label")]
    EmptyLabel,
    #[error("Empty pattern for key '{0}'")]
    EmptyPattern(&'static str),
    #[error("Invalid selector for key '{key}': {pattern} ({reason})")]
    InvalidSelector {
        key: &'static str,
        pattern: String,
        reason: String,
    },
}

// =============================================================================
// Keys
// =============================================================================

/// Role of a pattern within the detection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorKey {
    /// Home feed Shorts shelf
    HomePageContainer,
    /// Inner container of the Shorts shelf
    ShortsContainer,
    /// Search results grid shelf
    ResultsPageShelf,
    /// "Shorts" tab on a channel page
    ChannelTab,
    /// Suggested Shorts carousel (allowed on the history page)
    SuggestedCarousel,
    /// Text-bearing node inside a filter chip
    ChipLabel,
    /// Filter chip wrapper to remove
    ChipContainer,
    /// Sidebar and mini-guide entries
    SidebarEntry,
    /// Link marking a sidebar entry as the Shorts entry
    SidebarLink,
    /// Badge that gives away a disguised Short
    DisguisedMarker,
    /// Generic video card wrapping a disguised Short
    DisguisedContainer,
    /// Notification link targeting a Shorts route
    NotificationLink,
    /// Notification entry to remove
    NotificationContainer,
    /// Individual Short tile, used only for the removal tally
    SingleItem,
}

impl SelectorKey {
    pub const ALL: [SelectorKey; 14] = [
        SelectorKey::HomePageContainer,
        SelectorKey::ShortsContainer,
        SelectorKey::ResultsPageShelf,
        SelectorKey::ChannelTab,
        SelectorKey::SuggestedCarousel,
        SelectorKey::ChipLabel,
        SelectorKey::ChipContainer,
        SelectorKey::SidebarEntry,
        SelectorKey::SidebarLink,
        SelectorKey::DisguisedMarker,
        SelectorKey::DisguisedContainer,
        SelectorKey::NotificationLink,
        SelectorKey::NotificationContainer,
        SelectorKey::SingleItem,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SelectorKey::HomePageContainer => "home_page_container",
            SelectorKey::ShortsContainer => "shorts_container",
            SelectorKey::ResultsPageShelf => "results_page_shelf",
            SelectorKey::ChannelTab => "channel_tab",
            SelectorKey::SuggestedCarousel => "suggested_carousel",
            SelectorKey::ChipLabel => "chip_label",
            SelectorKey::ChipContainer => "chip_container",
            SelectorKey::SidebarEntry => "sidebar_entry",
            SelectorKey::SidebarLink => "sidebar_link",
            SelectorKey::DisguisedMarker => "disguised_marker",
            SelectorKey::DisguisedContainer => "disguised_container",
            SelectorKey::NotificationLink => "notification_link",
            SelectorKey::NotificationContainer => "notification_container",
            SelectorKey::SingleItem => "single_item",
        }
    }
}

/// One pattern or a list of alternatives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn as_slice(&self) -> &[String] {
        match self {
            Patterns::One(pattern) => std::slice::from_ref(pattern),
            Patterns::Many(patterns) => patterns,
        }
    }
}

impl From<&str> for Patterns {
    fn from(pattern: &str) -> Self {
        Patterns::One(pattern.to_string())
    }
}

impl From<&[&str]> for Patterns {
    fn from(patterns: &[&str]) -> Self {
        Patterns::Many(patterns.iter().map(|p| p.to_string()).collect())
    }
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorRegistry {
    version: u32,
    /// Category label matched against chip text
    label: String,
    selectors: BTreeMap<SelectorKey, Patterns>,
}

impl Default for SelectorRegistry {
    fn default() -> Self {
        Self::youtube()
    }
}

impl SelectorRegistry {
    /// Built-in table for the current YouTube desktop and mobile markup.
    pub fn youtube() -> Self {
        let table: [(SelectorKey, Patterns); 14] = [
            (SelectorKey::HomePageContainer, "div [is-shorts]".into()),
            (SelectorKey::ShortsContainer, "#shorts-inner-container".into()),
            (SelectorKey::ResultsPageShelf, "grid-shelf-view-model".into()),
            (SelectorKey::ChannelTab, "yt-tab-shape[tab-title='Shorts']".into()),
            (SelectorKey::SuggestedCarousel, "ytd-reel-shelf-renderer".into()),
            (SelectorKey::ChipLabel, "yt-chip-cloud-chip-renderer chip-shape button div".into()),
            (SelectorKey::ChipContainer, "yt-chip-cloud-chip-renderer".into()),
            (
                SelectorKey::SidebarEntry,
                (&["ytd-guide-entry-renderer", "ytd-mini-guide-entry-renderer"][..]).into(),
            ),
            (SelectorKey::SidebarLink, "a[title='Shorts']".into()),
            (SelectorKey::DisguisedMarker, "badge-shape[aria-label='Shorts']".into()),
            (SelectorKey::DisguisedContainer, "ytd-video-renderer".into()),
            (SelectorKey::NotificationLink, "ytd-notification-renderer a[href^='/shorts']".into()),
            (SelectorKey::NotificationContainer, "ytd-notification-renderer".into()),
            (
                SelectorKey::SingleItem,
                (&["ytm-shorts-lockup-view-model", "ytd-reel-video-renderer"][..]).into(),
            ),
        ];

        Self {
            version: REGISTRY_VERSION,
            label: "Shorts".to_string(),
            selectors: table.into_iter().collect(),
        }
    }

    /// Parse and validate a registry from JSON.
    pub fn from_json(text: &str) -> Result<Self, RegistryError> {
        let registry: SelectorRegistry = serde_json::from_str(text)?;
        registry.validate()?;
        Ok(registry)
    }

    pub fn to_json_pretty(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural checks. Selector syntax is checked by
    /// [`crate::html::validate_registry`] when the `html` feature is on.
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.version != REGISTRY_VERSION {
            return Err(RegistryError::UnsupportedVersion(self.version));
        }
        if self.label.trim().is_empty() {
            return Err(RegistryError::EmptyLabel);
        }
        for (key, patterns) in &self.selectors {
            if patterns.as_slice().is_empty() || patterns.as_slice().iter().any(|p| p.trim().is_empty()) {
                return Err(RegistryError::EmptyPattern(key.name()));
            }
        }
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Patterns registered for `key`; empty when the key is absent.
    pub fn patterns(&self, key: SelectorKey) -> &[String] {
        match self.selectors.get(&key) {
            Some(patterns) => patterns.as_slice(),
            None => &[],
        }
    }

    /// Patterns for `key` joined into one selector list, or `None` when absent.
    pub fn selector(&self, key: SelectorKey) -> Option<String> {
        self.selector_for(&[key])
    }

    /// Patterns of several keys joined into one selector list.
    pub fn selector_for(&self, keys: &[SelectorKey]) -> Option<String> {
        let joined = keys
            .iter()
            .flat_map(|key| self.patterns(*key))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if joined.is_empty() { None } else { Some(joined) }
    }

    /// Replace the patterns of one key.
    pub fn with_patterns(mut self, key: SelectorKey, patterns: impl Into<Patterns>) -> Self {
        self.selectors.insert(key, patterns.into());
        self
    }

    /// Drop a key, disabling the strategies that need it.
    pub fn without(mut self, key: SelectorKey) -> Self {
        self.selectors.remove(&key);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (SelectorKey, &[String])> {
        self.selectors.iter().map(|(key, patterns)| (*key, patterns.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_is_complete() {
        let registry = SelectorRegistry::youtube();
        assert!(registry.validate().is_ok());
        for key in SelectorKey::ALL {
            assert!(!registry.patterns(key).is_empty(), "missing {}", key.name());
        }
        assert_eq!(registry.label(), "Shorts");
    }

    #[test]
    fn test_selector_joins_alternatives() {
        let registry = SelectorRegistry::youtube();
        assert_eq!(
            registry.selector(SelectorKey::SidebarEntry).as_deref(),
            Some("ytd-guide-entry-renderer, ytd-mini-guide-entry-renderer")
        );
        assert_eq!(
            registry
                .selector_for(&[SelectorKey::ShortsContainer, SelectorKey::ResultsPageShelf])
                .as_deref(),
            Some("#shorts-inner-container, grid-shelf-view-model")
        );
    }

    #[test]
    fn test_missing_key_is_empty() {
        let registry = SelectorRegistry::youtube().without(SelectorKey::ChannelTab);
        assert!(registry.patterns(SelectorKey::ChannelTab).is_empty());
        assert_eq!(registry.selector(SelectorKey::ChannelTab), None);
        assert!(registry.validate().is_ok());
    }

    #[test]
    fn test_json_accepts_pattern_or_list() {
        let registry = SelectorRegistry::from_json(
            r#"{
                "version": 1,
                "label": "Shorts",
                "selectors": {
                    "sidebar_entry": ["ytd-guide-entry-renderer", "ytd-mini-guide-entry-renderer"],
                    "sidebar_link": "a[title='Shorts']"
                }
            }"#,
        )
        .expect("registry should parse");

        assert_eq!(registry.patterns(SelectorKey::SidebarEntry).len(), 2);
        assert_eq!(registry.patterns(SelectorKey::SidebarLink), ["a[title='Shorts']"]);
        assert!(registry.patterns(SelectorKey::ChipLabel).is_empty());
    }

    #[test]
    fn test_builtin_survives_json() {
        let registry = SelectorRegistry::youtube();
        let json = registry.to_json_pretty().expect("serialize");
        assert!(json.contains("\"notification_link\""));
        assert_eq!(SelectorRegistry::from_json(&json).expect("parse"), registry);
    }

    #[test]
    fn test_rejects_bad_registries() {
        assert!(matches!(
            SelectorRegistry::from_json(r#"{"version": 2, "label": "Shorts", "selectors": {}}"#),
            Err(RegistryError::UnsupportedVersion(2))
        ));
        assert!(matches!(
            SelectorRegistry::from_json(r#"{"version": 1, "label": "", "selectors": {}}"#),
            Err(RegistryError::EmptyLabel)
        ));
        assert!(matches!(
            SelectorRegistry::from_json(r#"{"version": 1, "label": "Shorts", "selectors": {"chip_label": []}}"#),
            Err(RegistryError::EmptyPattern("chip_label"))
        ));
        assert!(matches!(
            SelectorRegistry::from_json(r#"{"version": 1, "label": "Shorts", "selectors": {"bogus": "div"}}"#),
            Err(RegistryError::Json(_))
        ));
    }
}
