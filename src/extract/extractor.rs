use crate::content::is_gzip;
use crate::extract::{
    ExtractedLink, HtmlLinkStrategy, ImageStrategy, LinkStrategy, ScriptStrategy,
    StylesheetStrategy,
};
use crate::model::{CrawlOptions, CrawledPage};
use flate2::read::GzDecoder;
use std::collections::HashSet;
use std::io::Read;
use std::time::Duration;
use tracing::{debug, warn};

/// Runs the extraction strategies over a fetched page and merges the results
///
/// Subresource strategies are gated on the request options; anchors are
/// always extracted. Stylesheet bodies are additionally fetched and mined
/// for background images when both images and stylesheets are enabled.
pub struct LinkExtractor {
    html: HtmlLinkStrategy,
    images: ImageStrategy,
    css: StylesheetStrategy,
    js: ScriptStrategy,
    /// Client for stylesheet re-fetches; `None` disables the mining pass
    client: Option<reqwest::Client>,
}

impl LinkExtractor {
    pub fn new(client: Option<reqwest::Client>) -> Self {
        Self {
            html: HtmlLinkStrategy,
            images: ImageStrategy::new(),
            css: StylesheetStrategy,
            js: ScriptStrategy,
            client,
        }
    }

    /// Extracts every candidate URL from a captured page
    ///
    /// Duplicate URLs keep the first occurrence, so a URL seen both as an
    /// anchor and a subresource is queued once at the anchor's depth.
    pub async fn extract_links_from_page(
        &self,
        page: &CrawledPage,
        raw_content: &[u8],
        options: &CrawlOptions,
        base_url: &str,
    ) -> Vec<ExtractedLink> {
        let content = decode_body(raw_content);
        let follow_external = options.follow_external_links;
        let mut links = Vec::new();

        if self.html.supports(page.content_type.as_deref()) {
            links.extend(self.html.extract(&content, page, base_url, follow_external));
        }

        if options.include_images && self.images.supports(page.content_type.as_deref()) {
            links.extend(self.images.extract(&content, page, base_url, follow_external));
        }

        let mut stylesheets = Vec::new();
        if options.include_css && self.css.supports(page.content_type.as_deref()) {
            stylesheets = self.css.extract(&content, page, base_url, follow_external);
            links.extend(stylesheets.iter().cloned());
        }

        if options.include_js && self.js.supports(page.content_type.as_deref()) {
            links.extend(self.js.extract(&content, page, base_url, follow_external));
        }

        // Background images referenced from external stylesheets are only
        // discoverable by reading the stylesheet body itself.
        if options.include_images && options.include_css {
            for stylesheet in &stylesheets {
                links.extend(
                    self.mine_stylesheet(&stylesheet.url, stylesheet.depth, base_url, follow_external)
                        .await,
                );
            }
        }

        let mut seen = HashSet::new();
        links.retain(|link| seen.insert(link.url.clone()));

        debug!(
            url = %page.url,
            count = links.len(),
            "extracted candidate links"
        );

        links
    }

    async fn mine_stylesheet(
        &self,
        css_url: &str,
        depth: u32,
        base_url: &str,
        follow_external: bool,
    ) -> Vec<ExtractedLink> {
        let Some(client) = &self.client else {
            return Vec::new();
        };

        let response = match client
            .get(css_url)
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %css_url, error = %e, "stylesheet fetch failed");
                return Vec::new();
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!(url = %css_url, status = %response.status(), "skipping stylesheet");
            return Vec::new();
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %css_url, error = %e, "stylesheet body read failed");
                return Vec::new();
            }
        };

        self.images
            .extract_from_css(&body, css_url, base_url, depth, follow_external)
    }
}

/// Decodes a response body into text, inflating if it is still gzip
///
/// Bodies occasionally arrive gzip-compressed despite transparent response
/// decompression, so the magic bytes are probed before treating the buffer
/// as text.
fn decode_body(raw: &[u8]) -> String {
    if is_gzip(raw) {
        let mut decoder = GzDecoder::new(raw);
        let mut inflated = Vec::new();
        if decoder.read_to_end(&mut inflated).is_ok() {
            return String::from_utf8_lossy(&inflated).into_owned();
        }
        warn!("gzip body failed to inflate, falling back to raw bytes");
    }
    String::from_utf8_lossy(raw).into_owned()
}
