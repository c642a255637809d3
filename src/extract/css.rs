use crate::extract::{supports_html, ExtractedLink, LinkStrategy, ResourceKind};
use crate::model::CrawledPage;
use crate::url::{is_valid, normalize, resolve};
use scraper::{Html, Selector};

/// Extracts stylesheet URLs from `<link rel="stylesheet" href>` tags
///
/// Stylesheets are same-page subresources; child depth equals parent depth.
pub struct StylesheetStrategy;

impl LinkStrategy for StylesheetStrategy {
    fn name(&self) -> &'static str {
        "css"
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

        let Ok(selector) = Selector::parse(r#"link[rel="stylesheet"][href]"#) else {
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
                    kind: ResourceKind::Stylesheet,
                    depth: page.depth,
                });
            }
        }

        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> CrawledPage {
        let mut p = CrawledPage::new("https://example.com/page".to_string(), 3, "t".into());
        p.content_type = Some("text/html".to_string());
        p
    }

    #[test]
    fn test_extracts_stylesheets_at_parent_depth() {
        let html = r#"<link rel="stylesheet" href="/main.css">
                      <link rel="icon" href="/favicon.ico">"#;
        let links = StylesheetStrategy.extract(html, &page(), "https://example.com", false);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://example.com/main.css");
        assert_eq!(links[0].depth, 3);
        assert_eq!(links[0].kind, ResourceKind::Stylesheet);
    }

    #[test]
    fn test_protocol_relative_href() {
        let html = r#"<link rel="stylesheet" href="//cdn.example.com/a.css">"#;
        let links = StylesheetStrategy.extract(html, &page(), "https://example.com", true);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://cdn.example.com/a.css");
    }
}
