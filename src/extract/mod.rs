//! Link extraction strategies and dispatcher
//!
//! Four strategies share one capability: given page content, produce
//! candidate child URLs with a resource type and target depth. Navigational
//! links descend one level; same-page subresources (images, stylesheets,
//! scripts) stay at the parent's depth. The resource types are fixed and
//! exhaustively known, so dispatch is by explicit field access rather than
//! open-ended plugin discovery.

mod css;
mod extractor;
mod html;
mod images;
mod js;

pub use css::StylesheetStrategy;
pub use extractor::LinkExtractor;
pub use html::HtmlLinkStrategy;
pub use images::ImageStrategy;
pub use js::ScriptStrategy;

use crate::model::CrawledPage;

/// The kind of resource a candidate URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Link,
    Image,
    BackgroundImage,
    Stylesheet,
    Script,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Link => "link",
            ResourceKind::Image => "image",
            ResourceKind::BackgroundImage => "background_image",
            ResourceKind::Stylesheet => "css",
            ResourceKind::Script => "javascript",
        }
    }
}

/// A candidate URL discovered on a page
#[derive(Debug, Clone)]
pub struct ExtractedLink {
    /// Normalized absolute URL
    pub url: String,
    pub kind: ResourceKind,
    /// Depth at which the crawler should fetch this URL
    pub depth: u32,
}

/// Shared capability of the four extraction strategies
///
/// Implementations silently skip malformed markup (log and continue) rather
/// than aborting extraction.
pub trait LinkStrategy {
    /// Stable strategy name used in logs
    fn name(&self) -> &'static str;

    /// Whether this strategy can process the given content type
    fn supports(&self, content_type: Option<&str>) -> bool;

    /// Extracts candidate URLs from page content
    fn extract(
        &self,
        content: &str,
        page: &CrawledPage,
        base_url: &str,
        follow_external: bool,
    ) -> Vec<ExtractedLink>;
}

/// All four strategies accept the same HTML-ish content types
pub(crate) fn supports_html(content_type: Option<&str>) -> bool {
    match content_type {
        Some(ct) => {
            let lower = ct.to_lowercase();
            lower.contains("text/html") || lower.contains("application/xhtml+xml")
        }
        None => false,
    }
}
