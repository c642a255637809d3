use crate::extract::{supports_html, ExtractedLink, LinkStrategy, ResourceKind};
use crate::model::CrawledPage;
use crate::url::{is_valid, normalize, resolve};
use regex::Regex;
use scraper::{Html, Selector};

/// Extracts image URLs: `<img src>` plus CSS background images
///
/// Background images are mined with regexes over the raw markup (inline
/// `style` attributes, `<style>` blocks, and stylesheet contents handed in by
/// the dispatcher). The regexes are heuristic and may both over- and
/// under-match; they mirror the coverage the archive has always had.
/// Images are same-page subresources, so child depth equals parent depth.
pub struct ImageStrategy {
    inline_style: Regex,
    style_block: Regex,
    background_image: Regex,
    background_shorthand: Regex,
}

impl ImageStrategy {
    pub fn new() -> Self {
        Self {
            inline_style: Regex::new(
                r#"(?i)style\s*=\s*["'][^"']*background-image\s*:\s*url\(["']?([^)"'\s]+)["']?\)[^"']*["']"#,
            )
            .expect("static pattern"),
            style_block: Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("static pattern"),
            background_image: Regex::new(
                r#"(?i)background-image\s*:\s*url\(["']?([^)"'\s]+)["']?\)"#,
            )
            .expect("static pattern"),
            background_shorthand: Regex::new(
                r#"(?i)background\s*:\s*[^;]*url\(["']?([^)"'\s]+)["']?\)[^;]*"#,
            )
            .expect("static pattern"),
        }
    }

    /// Extracts background-image URLs from raw CSS content
    ///
    /// Also used by the dispatcher on stylesheet bodies fetched over HTTP.
    pub fn extract_from_css(
        &self,
        css: &str,
        css_url: &str,
        base_url: &str,
        depth: u32,
        follow_external: bool,
    ) -> Vec<ExtractedLink> {
        let mut links = Vec::new();

        for captures in self.background_image.captures_iter(css) {
            if let Some(link) =
                self.candidate(&captures[1], css_url, base_url, depth, follow_external)
            {
                links.push(link);
            }
        }

        for captures in self.background_shorthand.captures_iter(css) {
            if let Some(link) =
                self.candidate(&captures[1], css_url, base_url, depth, follow_external)
            {
                links.push(link);
            }
        }

        links
    }

    fn candidate(
        &self,
        image_url: &str,
        page_url: &str,
        base_url: &str,
        depth: u32,
        follow_external: bool,
    ) -> Option<ExtractedLink> {
        let trimmed = image_url.trim();
        if trimmed.is_empty() || trimmed.starts_with("data:") {
            return None;
        }

        let absolute = resolve(trimmed, page_url);
        let normalized = normalize(&absolute);

        if is_valid(&normalized, base_url, follow_external) {
            Some(ExtractedLink {
                url: normalized,
                kind: ResourceKind::BackgroundImage,
                depth,
            })
        } else {
            None
        }
    }
}

impl Default for ImageStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkStrategy for ImageStrategy {
    fn name(&self) -> &'static str {
        "images"
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
        let mut links = Vec::new();

        // <img src> tags
        let document = Html::parse_document(content);
        if let Ok(selector) = Selector::parse("img[src]") {
            for element in document.select(&selector) {
                let Some(src) = element.value().attr("src") else {
                    continue;
                };

                let absolute = resolve(src, &page.url);
                let normalized = normalize(&absolute);

                if is_valid(&normalized, base_url, follow_external) {
                    links.push(ExtractedLink {
                        url: normalized,
                        kind: ResourceKind::Image,
                        depth: page.depth,
                    });
                }
            }
        }

        // Inline style="background-image: url(...)" attributes
        for captures in self.inline_style.captures_iter(content) {
            if let Some(link) =
                self.candidate(&captures[1], &page.url, base_url, page.depth, follow_external)
            {
                links.push(link);
            }
        }

        // <style> block contents
        for block in self.style_block.captures_iter(content) {
            links.extend(self.extract_from_css(
                &block[1],
                &page.url,
                base_url,
                page.depth,
                follow_external,
            ));
        }

        links
    }
}
