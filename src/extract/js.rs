use crate::extract::{supports_html, ExtractedLink, LinkStrategy, ResourceKind};
use crate::model::CrawledPage;
use crate::url::{is_valid, normalize, resolve};
use scraper::{Html, Selector};

/// Extracts script URLs from `<script src>` tags
///
/// Scripts are same-page subresources; child depth equals parent depth.
pub struct ScriptStrategy;

impl LinkStrategy for ScriptStrategy {
    fn name(&self) -> &'static str {
        "javascript"
    }

    fn supports(&self, content_type: Option<&str>) -> bool {
        supports_html(content_type)
    }

    fn extract(
        &self,
        content: &str,
        page: &CrawledPage,
        base_url: &str,
        follow_external: bool,
    ) -> Vec<ExtractedLink> {
        let document = Html::parse_document(content);
        let mut links = Vec::new();

        let Ok(selector) = Selector::parse("script[src]") else {
            return links;
        };

        for element in document.select(&selector) {
            let Some(src) = element.value().attr("src") else {
                continue;
            };

            let absolute = resolve(src, &page.url);
            let normalized = normalize(&absolute);

            if is_valid(&normalized, base_url, follow_external) {
                links.push(ExtractedLink {
                    url: normalized,
                    kind: ResourceKind::Script,
                    depth: page.depth,
                });
            }
        }

        links
    }
}
