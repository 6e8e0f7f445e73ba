//! Page classification
//!
//! Everything here is a pure function of the current location and the
//! configured [`SiteProfile`]. The resulting [`PageContext`] is recomputed on
//! every scan and never cached.

use serde::Serialize;

use crate::config::SiteProfile;
use crate::url::{extract_host, extract_path};

/// Current navigation location as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Location {
    pub host: String,
    pub path: String,
}

impl Location {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
        }
    }

    /// Build a location from an absolute href.
    pub fn from_href(href: &str) -> Self {
        Self {
            host: extract_host(href).unwrap_or("").to_ascii_lowercase(),
            path: extract_path(href).to_string(),
        }
    }
}

/// Kind of page whose entire content is Shorts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ForbiddenPage {
    /// The dedicated Shorts player ("/shorts/...")
    ContentPage,
    /// A channel's Shorts tab ("/@channel/shorts")
    ChannelSection,
}

/// Page-context flags derived from the location for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PageContext {
    pub forbidden: Option<ForbiddenPage>,
    pub history: bool,
}

impl PageContext {
    #[inline]
    pub fn is_forbidden_page(&self) -> bool {
        self.forbidden.is_some()
    }

    #[inline]
    pub fn is_forbidden_shorts_page(&self) -> bool {
        self.forbidden == Some(ForbiddenPage::ContentPage)
    }

    #[inline]
    pub fn is_channel_shorts_section(&self) -> bool {
        self.forbidden == Some(ForbiddenPage::ChannelSection)
    }

    #[inline]
    pub fn is_history_page(&self) -> bool {
        self.history
    }
}

/// Classifies a location against a site profile.
pub struct PageClassifier<'a> {
    site: &'a SiteProfile,
    location: &'a Location,
}

impl<'a> PageClassifier<'a> {
    pub fn new(site: &'a SiteProfile, location: &'a Location) -> Self {
        Self { site, location }
    }

    /// True iff the host belongs to the filtered site.
    pub fn is_filtered_domain(&self) -> bool {
        !self.site.host.is_empty() && self.location.host.contains(self.site.host.as_str())
    }

    /// True iff the whole page is Shorts content.
    pub fn is_forbidden_page(&self) -> bool {
        self.forbidden_page().is_some()
    }

    /// True iff the path is the watch-history view.
    pub fn is_history_page(&self) -> bool {
        !self.site.history_route.is_empty()
            && self.location.path.contains(self.site.history_route.as_str())
    }

    /// Which forbidden page this is, if any. A path that is both (exactly the
    /// content route) is the content page.
    pub fn forbidden_page(&self) -> Option<ForbiddenPage> {
        let route = self.site.content_route.as_str();
        if route.is_empty() {
            return None;
        }

        let path = self.location.path.as_str();
        if path.starts_with(route) {
            Some(ForbiddenPage::ContentPage)
        } else if path.ends_with(route) {
            Some(ForbiddenPage::ChannelSection)
        } else {
            None
        }
    }

    pub fn context(&self) -> PageContext {
        PageContext {
            forbidden: self.forbidden_page(),
            history: self.is_history_page(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(href: &str) -> (bool, PageContext) {
        let site = SiteProfile::default();
        let location = Location::from_href(href);
        let classifier = PageClassifier::new(&site, &location);
        (classifier.is_filtered_domain(), classifier.context())
    }

    #[test]
    fn test_filtered_domain() {
        assert!(classify("https://www.youtube.com/").0);
        assert!(classify("https://m.YouTube.com/feed/subscriptions").0);
        assert!(!classify("https://example.com/shorts/abc").0);
        assert!(!classify("https://vimeo.com/").0);
    }

    #[test]
    fn test_forbidden_pages() {
        let (_, ctx) = classify("https://www.youtube.com/shorts/dQw4w9WgXcQ");
        assert!(ctx.is_forbidden_shorts_page());
        assert!(!ctx.is_channel_shorts_section());

        let (_, ctx) = classify("https://www.youtube.com/@somechannel/shorts");
        assert!(ctx.is_channel_shorts_section());
        assert!(ctx.is_forbidden_page());

        // Exactly the route: the content page wins
        let (_, ctx) = classify("https://www.youtube.com/shorts");
        assert_eq!(ctx.forbidden, Some(ForbiddenPage::ContentPage));

        let (_, ctx) = classify("https://www.youtube.com/@somechannel/videos");
        assert!(!ctx.is_forbidden_page());

        let (_, ctx) = classify("https://www.youtube.com/watch?v=shorts");
        assert!(!ctx.is_forbidden_page());
    }

    #[test]
    fn test_history_page() {
        let (_, ctx) = classify("https://www.youtube.com/feed/history");
        assert!(ctx.is_history_page());
        assert!(!ctx.is_forbidden_page());

        let (_, ctx) = classify("https://www.youtube.com/feed/subscriptions");
        assert!(!ctx.is_history_page());
    }

    #[test]
    fn test_empty_routes_never_match() {
        let site = SiteProfile {
            content_route: String::new(),
            history_route: String::new(),
            ..SiteProfile::default()
        };
        let location = Location::new("www.youtube.com", "/shorts/abc");
        let classifier = PageClassifier::new(&site, &location);
        assert!(!classifier.is_forbidden_page());
        assert!(!classifier.is_history_page());
    }
}
