//! Crawl orchestration
//!
//! Owns the breadth-first frontier for one request: dedup by normalized URL,
//! depth and page-count bounds, exclusion rules, capture, link extraction,
//! and per-page persistence with a degradation chain.

use crate::content::{is_gzip, is_html_content, is_text_content, sanitize_for_json};
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::model::{CrawlOptions, CrawlRequest, CrawledPage, PageStatus};
use crate::extract::LinkExtractor;
use crate::storage::{RequestStore, SqliteStore};
use crate::url::{base_url, glob_match, normalize};
use flate2::read::GzDecoder;
use scraper::{Html, Selector};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Maximum length of a page title taken from markup
const MAX_TITLE_LENGTH: usize = 500;

/// Body captured for a page, kept in memory for archive assembly
#[derive(Debug, Clone)]
pub struct CapturedContent {
    pub content: String,
    pub headers: Vec<(String, String)>,
    pub status_code: u16,
}

/// Everything a finished crawl hands to the archive builder
#[derive(Debug)]
pub struct CrawlOutcome {
    /// Every crawled page in visit order, successes and failures alike
    pub pages: Vec<CrawledPage>,
    /// Captured bodies keyed by normalized URL (text content types only)
    pub contents: HashMap<String, CapturedContent>,
}

/// Drives the breadth-first crawl for a single request
pub struct CrawlOrchestrator {
    client: reqwest::Client,
    extractor: LinkExtractor,
    storage: Arc<Mutex<SqliteStore>>,
}

impl CrawlOrchestrator {
    pub fn new(storage: Arc<Mutex<SqliteStore>>, user_agent: &str) -> crate::Result<Self> {
        let client = build_http_client(user_agent)?;
        let extractor = LinkExtractor::new(Some(client.clone()));
        Ok(Self {
            client,
            extractor,
            storage,
        })
    }

    /// Crawls the request's seed URL breadth-first within its limits
    ///
    /// Every fetched URL produces exactly one page row and counts against
    /// `max_pages`, whether it succeeded or not. Skipped URLs (already
    /// visited, too deep, excluded) consume nothing.
    pub async fn crawl(&self, request: &CrawlRequest) -> crate::Result<CrawlOutcome> {
        let seed = normalize(&request.url);
        let base = base_url(&seed);

        let mut visited: HashSet<String> = HashSet::new();
        let mut queued: HashSet<String> = HashSet::new();
        let mut frontier: VecDeque<(String, u32)> = VecDeque::new();
        let mut pages: Vec<CrawledPage> = Vec::new();
        let mut contents: HashMap<String, CapturedContent> = HashMap::new();

        queued.insert(seed.clone());
        frontier.push_back((seed, 0));

        info!(
            request_id = request.id,
            url = %request.url,
            max_depth = request.max_depth,
            max_pages = request.max_pages,
            "starting crawl"
        );

        while let Some((url, depth)) = frontier.pop_front() {
            if pages.len() >= request.max_pages as usize {
                break;
            }
            if visited.contains(&url) {
                continue;
            }
            if depth > request.max_depth {
                debug!(url = %url, depth, "skipping, beyond depth limit");
                continue;
            }
            if is_excluded(&url, &request.options) {
                debug!(url = %url, "skipping, excluded");
                continue;
            }

            visited.insert(url.clone());

            let page = self.capture(&url, depth, &mut contents).await;

            if page.is_successful() && is_html_content(page.content_type.as_deref()) {
                if let Some(captured) = contents.get(&url) {
                    let links = self
                        .extractor
                        .extract_links_from_page(
                            &page,
                            captured.content.as_bytes(),
                            &request.options,
                            &base,
                        )
                        .await;

                    for link in links {
                        if !visited.contains(&link.url) && !queued.contains(&link.url) {
                            queued.insert(link.url.clone());
                            frontier.push_back((link.url, link.depth));
                        }
                    }
                }
            }

            self.persist(request.id, &page);
            pages.push(page);

            if request.crawl_delay_ms > 0 && !frontier.is_empty() {
                tokio::time::sleep(Duration::from_millis(request.crawl_delay_ms)).await;
            }
        }

        let successes = pages.iter().filter(|p| p.is_successful()).count();
        info!(
            request_id = request.id,
            total = pages.len(),
            successes,
            "crawl finished"
        );

        Ok(CrawlOutcome { pages, contents })
    }

    /// Fetches one URL and builds its page record
    async fn capture(
        &self,
        url: &str,
        depth: u32,
        contents: &mut HashMap<String, CapturedContent>,
    ) -> CrawledPage {
        let mut page = CrawledPage::new(url.to_string(), depth, hostname_title(url));

        match fetch_url(&self.client, url).await {
            FetchResult::Response {
                status_code,
                content_type,
                headers,
                body,
                response_time_ms,
            } => {
                page.http_status = Some(status_code);
                page.content_type = content_type;
                page.content_length = Some(body.len() as u64);
                page.headers = headers.clone();
                page.response_time_ms = Some(response_time_ms);

                if !(200..300).contains(&status_code) {
                    page.status = PageStatus::Error;
                    page.error_message = Some(format!("HTTP {}", status_code));
                    warn!(url = %url, status = status_code, "page returned error status");
                    return page;
                }

                page.status = PageStatus::Success;

                if is_text_content(page.content_type.as_deref()) {
                    let text = decode_body(&body);

                    if is_html_content(page.content_type.as_deref()) {
                        if let Some(title) = extract_title(&text) {
                            page.title = title;
                        }
                    }

                    page.content = Some(text.clone());
                    contents.insert(
                        url.to_string(),
                        CapturedContent {
                            content: text,
                            headers,
                            status_code,
                        },
                    );
                }

                debug!(url = %url, status = status_code, depth, "captured page");
            }
            FetchResult::TransportError {
                error,
                response_time_ms,
            } => {
                page.status = PageStatus::Error;
                page.error_message = Some(error.clone());
                page.response_time_ms = Some(response_time_ms);
                warn!(url = %url, error = %error, "fetch failed");
            }
        }

        page
    }

    /// Saves a page row, degrading on failure
    ///
    /// First retry replaces the row with a minimal error record; if that
    /// also fails the page survives only in memory for archive assembly.
    fn persist(&self, request_id: i64, page: &CrawledPage) {
        let result = self
            .storage
            .lock()
            .unwrap()
            .save_page(request_id, page);

        let Err(e) = result else {
            return;
        };
        warn!(url = %page.url, error = %e, "page save failed, retrying with reduced record");

        let mut fallback = CrawledPage::new(page.url.clone(), page.depth, "Error".to_string());
        fallback.status = PageStatus::Error;
        fallback.error_message = Some(format!("Database save error: {}", e));

        if let Err(e) = self
            .storage
            .lock()
            .unwrap()
            .save_page(request_id, &fallback)
        {
            error!(url = %page.url, error = %e, "page could not be persisted, keeping in memory only");
        }
    }
}

fn is_excluded(url: &str, options: &CrawlOptions) -> bool {
    options.exclude_urls.iter().any(|u| u == url)
        || options
            .exclude_patterns
            .iter()
            .any(|pattern| glob_match(pattern, url))
}

/// Inflates a body that is still gzip-compressed after transport decoding
fn decode_body(body: &[u8]) -> String {
    if is_gzip(body) {
        let mut decoder = GzDecoder::new(body);
        let mut inflated = Vec::new();
        if decoder.read_to_end(&mut inflated).is_ok() {
            return String::from_utf8_lossy(&inflated).into_owned();
        }
        warn!("gzip page body failed to inflate");
    }
    String::from_utf8_lossy(body).into_owned()
}

/// Pulls the `<title>` text out of an HTML document
fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;
    let raw = element.text().collect::<String>();
    let title = sanitize_for_json(raw.trim(), MAX_TITLE_LENGTH);
    if title.is_empty() {
        None
    } else {
        Some(title)
    }
}

/// Fallback page title: the URL's hostname
fn hostname_title(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}
