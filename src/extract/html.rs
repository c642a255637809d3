use crate::extract::{supports_html, ExtractedLink, LinkStrategy, ResourceKind};
use crate::model::CrawledPage;
use crate::url::{is_valid, normalize, resolve};
use scraper::{Html, Selector};

/// Extracts navigational links from `<a href>` anchors
///
/// Child depth is the parent depth plus one.
pub struct HtmlLinkStrategy;

impl LinkStrategy for HtmlLinkStrategy {
    fn name(&self) -> &'static str {
        "html_links"
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

        let Ok(selector) = Selector::parse("a[href]") else {
            return links;
        };

        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };

            let absolute = resolve(href, &page.url);
            let normalized = normalize(&absolute);

            if is_valid(&normalized, base_url, follow_external) {
                links.push(ExtractedLink {
                    url: normalized,
                    kind: ResourceKind::Link,
                    depth: page.depth + 1,
                });
            }
        }

        links
    }
}
