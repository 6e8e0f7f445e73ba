//! Engine configuration
//!
//! Defaults reproduce the extension's built-in behavior; a JSON document can
//! override any subset of fields.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::StrategySet;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Site-specific location rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteProfile {
    /// Substring the location host must contain
    pub host: String,
    /// Route of the dedicated content page; also the channel-tab suffix
    pub content_route: String,
    /// Route of the watch-history view
    pub history_route: String,
    /// Redirect target when leaving the dedicated content page
    pub home_url: String,
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self {
            host: "youtube.com".to_string(),
            content_route: "/shorts".to_string(),
            history_route: "/feed/history".to_string(),
            home_url: "https://www.youtube.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub site: SiteProfile,
    /// Quiet period after the last mutation before a scan runs
    pub debounce_window_ms: u64,
    /// Delay before leaving a forbidden page
    pub redirect_delay_ms: u64,
    /// Tally above which the diagnostic line gets an emphasis marker
    pub emphasis_threshold: u64,
    pub strategies: StrategySet,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            site: SiteProfile::default(),
            debounce_window_ms: 600,
            redirect_delay_ms: 1000,
            emphasis_threshold: 1000,
            strategies: StrategySet::ALL,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config. Missing fields keep their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site.host.trim().is_empty() {
            return Err(ConfigError::Invalid("site.host must not be empty".to_string()));
        }
        if self.site.home_url.trim().is_empty() {
            return Err(ConfigError::Invalid("site.home_url must not be empty".to_string()));
        }
        let route = self.site.content_route.as_str();
        if !route.is_empty() && (!route.starts_with('/') || route.trim_end_matches('/').is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "site.content_route must be a path below the site root, got '{}'",
                route
            )));
        }
        if self.debounce_window_ms == 0 {
            return Err(ConfigError::Invalid("debounce_window_ms must be positive".to_string()));
        }
        Ok(())
    }

    #[inline]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    #[inline]
    pub fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce_window(), Duration::from_millis(600));
        assert_eq!(config.redirect_delay(), Duration::from_millis(1000));
        assert_eq!(config.emphasis_threshold, 1000);
        assert_eq!(config.site.content_route, "/shorts");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"debounce_window_ms": 300, "site": {"host": "youtube-nocookie.com"}}"#)
            .expect("config should parse");
        assert_eq!(config.debounce_window_ms, 300);
        assert_eq!(config.site.host, "youtube-nocookie.com");
        assert_eq!(config.site.content_route, "/shorts");
        assert_eq!(config.redirect_delay_ms, 1000);
        assert_eq!(config.strategies, StrategySet::ALL);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            EngineConfig::from_json(r#"{"debounce_window_ms": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{"site": {"host": " "}}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(EngineConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_content_route_must_not_cover_the_home_page() {
        for route in ["/", "//", "shorts"] {
            let json = format!(r#"{{"site": {{"content_route": "{}"}}}}"#, route);
            assert!(
                matches!(EngineConfig::from_json(&json), Err(ConfigError::Invalid(_))),
                "route {:?} should be rejected",
                route
            );
        }

        let config = EngineConfig::from_json(r#"{"site": {"content_route": "/reels"}}"#).expect("config should parse");
        assert_eq!(config.site.content_route, "/reels");
    }
}
