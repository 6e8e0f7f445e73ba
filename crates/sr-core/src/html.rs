//! Parsed HTML document
//!
//! A [`Document`] over `scraper`'s tree, used for offline scans of saved pages
//! and for tests. Detaching a node unlinks it from the tree, so later queries
//! no longer see it, exactly like `Element.remove()` in the browser.

use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

use crate::host::{Document, HostError};
use crate::registry::{RegistryError, SelectorRegistry};

pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    pub fn parse(text: &str) -> Self {
        Self {
            html: Html::parse_document(text),
        }
    }

    /// Serialize the current tree.
    pub fn to_html(&self) -> String {
        self.html.html()
    }

    /// Number of attached elements matching `selector` (0 for invalid selectors).
    pub fn count(&self, selector: &str) -> usize {
        self.query_all(selector).map_or(0, |nodes| nodes.len())
    }

    pub fn tag_name(&self, node: &NodeId) -> String {
        self.element(node)
            .map(|el| el.value().name().to_string())
            .unwrap_or_default()
    }

    pub fn attr(&self, node: &NodeId, name: &str) -> Option<String> {
        self.element(node)?.value().attr(name).map(str::to_string)
    }

    /// Whether `node` is still reachable from the document root.
    pub fn is_attached(&self, node: &NodeId) -> bool {
        let root = self.html.tree.root().id();
        match self.html.tree.get(*node) {
            Some(n) => n.id() == root || n.ancestors().any(|a| a.id() == root),
            None => false,
        }
    }

    fn element(&self, node: &NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(*node).and_then(ElementRef::wrap)
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HostError> {
    Selector::parse(selector).map_err(|e| HostError::Query {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Strict descendants of `scope` matching `selector`, in document order.
fn descendants_matching(scope: ElementRef<'_>, selector: &Selector) -> Vec<NodeId> {
    scope
        .select(selector)
        .map(|el| el.id())
        .filter(|id| *id != scope.id())
        .collect()
}

impl Document for HtmlDocument {
    type Node = NodeId;

    fn query_all(&self, selector: &str) -> Result<Vec<NodeId>, HostError> {
        let selector = parse_selector(selector)?;
        // Html::select walks every node in the arena, detached ones included,
        // so traverse from the root element instead.
        let root = self.html.root_element();
        let mut found: Vec<NodeId> = Vec::new();
        if selector.matches(&root) {
            found.push(root.id());
        }
        found.extend(descendants_matching(root, &selector));
        Ok(found)
    }

    fn query_within(&self, scope: &NodeId, selector: &str) -> Result<Vec<NodeId>, HostError> {
        let selector = parse_selector(selector)?;
        Ok(match self.element(scope) {
            Some(scope) => descendants_matching(scope, &selector),
            None => Vec::new(),
        })
    }

    fn closest(&self, node: &NodeId, selector: &str) -> Result<Option<NodeId>, HostError> {
        let selector = parse_selector(selector)?;
        let Some(start) = self.html.tree.get(*node) else {
            return Ok(None);
        };

        let found = std::iter::once(start)
            .chain(start.ancestors())
            .filter_map(ElementRef::wrap)
            .find(|el| selector.matches(el))
            .map(|el| el.id());
        Ok(found)
    }

    fn text(&self, node: &NodeId) -> String {
        self.element(node)
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    fn remove(&mut self, node: &NodeId) -> bool {
        if !self.is_attached(node) {
            return false;
        }
        match self.html.tree.get_mut(*node) {
            Some(mut n) => {
                n.detach();
                true
            }
            None => false,
        }
    }
}

/// Check that every registry pattern parses as a CSS selector.
pub fn validate_registry(registry: &SelectorRegistry) -> Result<(), RegistryError> {
    registry.validate()?;
    for (key, patterns) in registry.iter() {
        for pattern in patterns {
            if let Err(e) = Selector::parse(pattern) {
                return Err(RegistryError::InvalidSelector {
                    key: key.name(),
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_and_closest() {
        let doc = HtmlDocument::parse(r#"<ytd-video-renderer id="card"><div><span class="badge">Shorts</span></div></ytd-video-renderer>"#);
        let badges = doc.query_all("span.badge").expect("query");
        assert_eq!(badges.len(), 1);
        assert_eq!(doc.text(&badges[0]), "Shorts");

        let card = doc.closest(&badges[0], "ytd-video-renderer").expect("closest");
        assert_eq!(card.and_then(|c| doc.attr(&c, "id")).as_deref(), Some("card"));

        // Inclusive of the node itself
        let itself = doc.closest(&badges[0], "span").expect("closest");
        assert_eq!(itself, Some(badges[0]));

        assert_eq!(doc.closest(&badges[0], "ytd-notification-renderer").expect("closest"), None);
    }

    #[test]
    fn test_query_within_excludes_scope() {
        let doc = HtmlDocument::parse("<section id='outer'><section id='inner'></section></section>");
        let outer = doc.query_all("#outer").expect("query")[0];
        let found = doc.query_within(&outer, "section").expect("query");
        assert_eq!(found.len(), 1);
        assert_eq!(doc.attr(&found[0], "id").as_deref(), Some("inner"));
    }

    #[test]
    fn test_remove_detaches_once() {
        let mut doc = HtmlDocument::parse("<div id='shelf'><p id='tile'></p></div>");
        let shelf = doc.query_all("#shelf").expect("query")[0];
        let tile = doc.query_all("#tile").expect("query")[0];

        assert!(doc.remove(&shelf));
        assert!(!doc.remove(&shelf));
        // Inside a detached subtree counts as detached
        assert!(!doc.is_attached(&tile));
        assert!(!doc.remove(&tile));
        assert_eq!(doc.count("p"), 0);
        assert!(!doc.to_html().contains("shelf"));
    }

    #[test]
    fn test_invalid_selector_is_a_query_error() {
        let doc = HtmlDocument::parse("<div></div>");
        assert!(matches!(doc.query_all("div[["), Err(HostError::Query { .. })));
        assert_eq!(doc.count("div[["), 0);
    }

    #[test]
    fn test_validate_registry() {
        assert!(validate_registry(&SelectorRegistry::youtube()).is_ok());

        let broken = SelectorRegistry::youtube().with_patterns(crate::registry::SelectorKey::ChipLabel, "chip-shape >");
        assert!(matches!(
            validate_registry(&broken),
            Err(RegistryError::InvalidSelector { key: "chip_label", .. })
        ));
    }
}
