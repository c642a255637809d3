//! Core data model: crawl requests, options, and captured pages

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states of a crawl request
///
/// Transitions: `Pending -> Processing -> Completed | Failed`. Every
/// processing attempt ends in a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl RequestStatus {
    pub fn to_db_string(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Processing => "processing",
            RequestStatus::Completed => "completed",
            RequestStatus::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(RequestStatus::Pending),
            "processing" => Some(RequestStatus::Processing),
            "completed" => Some(RequestStatus::Completed),
            "failed" => Some(RequestStatus::Failed),
            _ => None,
        }
    }
}

/// Per-page capture outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Success,
    Error,
    Skipped,
}

impl PageStatus {
    pub fn to_db_string(self) -> &'static str {
        match self {
            PageStatus::Success => "success",
            PageStatus::Error => "error",
            PageStatus::Skipped => "skipped",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "success" => Some(PageStatus::Success),
            "error" => Some(PageStatus::Error),
            "skipped" => Some(PageStatus::Skipped),
            _ => None,
        }
    }
}

/// Crawl behavior options
///
/// Every recognized field is enumerated with a documented default; unknown
/// keys are rejected at deserialization time rather than silently ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct CrawlOptions {
    /// Follow links to hosts other than the seed's (default: false)
    #[serde(default)]
    pub follow_external_links: bool,

    /// Capture `<img>` and CSS background images (default: true)
    #[serde(default = "default_true")]
    pub include_images: bool,

    /// Capture linked stylesheets (default: true)
    #[serde(default = "default_true", rename = "includeCSS")]
    pub include_css: bool,

    /// Capture external scripts (default: true)
    #[serde(default = "default_true", rename = "includeJS")]
    pub include_js: bool,

    /// Exact normalized URLs to skip (default: empty)
    #[serde(default)]
    pub exclude_urls: Vec<String>,

    /// Glob patterns (`*`/`?`) of normalized URLs to skip (default: empty)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            follow_external_links: false,
            include_images: true,
            include_css: true,
            include_js: true,
            exclude_urls: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// A request to archive a site, created once by the submitter
///
/// Immutable except for status, timestamps, file, and error fields, which
/// only the processing pipeline mutates.
#[derive(Debug, Clone)]
pub struct CrawlRequest {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub max_depth: u32,
    pub max_pages: u32,
    pub crawl_delay_ms: u64,
    pub options: CrawlOptions,
    pub user_agent: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub file_path: Option<String>,
    pub file_size: Option<u64>,
    pub error_message: Option<String>,
}

/// Parameters for submitting a new crawl request
#[derive(Debug, Clone)]
pub struct NewCrawlRequest {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub max_depth: u32,
    pub max_pages: u32,
    pub crawl_delay_ms: u64,
    pub options: CrawlOptions,
    pub user_agent: String,
}

/// A single captured page, owned by its request
///
/// One page exists per unique normalized URL per request.
#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub url: String,
    pub depth: u32,
    pub title: String,
    pub http_status: Option<u16>,
    pub content_type: Option<String>,
    pub content_length: Option<u64>,
    pub status: PageStatus,
    pub error_message: Option<String>,
    /// Raw content, stored for text content types only
    pub content: Option<String>,
    /// Response headers in arrival order, replayed into the WARC record
    pub headers: Vec<(String, String)>,
    pub response_time_ms: Option<u64>,
    pub crawled_at: DateTime<Utc>,
}

impl CrawledPage {
    pub fn new(url: String, depth: u32, title: String) -> Self {
        Self {
            url,
            depth,
            title,
            http_status: None,
            content_type: None,
            content_length: None,
            status: PageStatus::Error,
            error_message: None,
            content: None,
            headers: Vec::new(),
            response_time_ms: None,
            crawled_at: Utc::now(),
        }
    }

    pub fn is_successful(&self) -> bool {
        self.status == PageStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = CrawlOptions::default();
        assert!(!options.follow_external_links);
        assert!(options.include_images);
        assert!(options.include_css);
        assert!(options.include_js);
        assert!(options.exclude_urls.is_empty());
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: CrawlOptions =
            serde_json::from_str(r#"{"followExternalLinks":true,"includeJS":false}"#).unwrap();
        assert!(options.follow_external_links);
        assert!(!options.include_js);
        assert!(options.include_images);
    }

    #[test]
    fn test_options_reject_unknown_keys() {
        let result = serde_json::from_str::<CrawlOptions>(r#"{"includeVideos":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            RequestStatus::Pending,
            RequestStatus::Processing,
            RequestStatus::Completed,
            RequestStatus::Failed,
        ] {
            assert_eq!(
                RequestStatus::from_db_string(status.to_db_string()),
                Some(status)
            );
        }
        assert_eq!(RequestStatus::from_db_string("bogus"), None);
    }

    #[test]
    fn test_page_status_round_trip() {
        for status in [PageStatus::Success, PageStatus::Error, PageStatus::Skipped] {
            assert_eq!(PageStatus::from_db_string(status.to_db_string()), Some(status));
        }
    }
}
