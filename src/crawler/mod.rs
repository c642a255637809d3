//! Breadth-first crawler
//!
//! The fetcher wraps HTTP concerns (client construction, timeouts, error
//! classification); the orchestrator owns the frontier and dedup state and
//! drives fetch, capture, extraction, and persistence for one request.

mod fetcher;
mod orchestrator;

pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use orchestrator::{CapturedContent, CrawlOrchestrator, CrawlOutcome};
