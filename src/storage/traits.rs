//! Storage trait and error types

use crate::model::{CrawlRequest, CrawledPage, NewCrawlRequest, RequestStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Request not found: {0}")]
    RequestNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Page counts for one request
#[derive(Debug, Clone, Copy, Default)]
pub struct PageStats {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Persistence operations for crawl requests and their pages
pub trait RequestStore {
    /// Creates a pending request and returns its ID
    fn create_request(&mut self, request: &NewCrawlRequest) -> StorageResult<i64>;

    /// Gets a request by ID
    fn get_request(&self, request_id: i64) -> StorageResult<CrawlRequest>;

    /// Lists requests, optionally filtered by status, newest first
    fn list_requests(&self, status: Option<RequestStatus>) -> StorageResult<Vec<CrawlRequest>>;

    /// Returns the oldest pending request, if any
    fn next_pending(&self) -> StorageResult<Option<CrawlRequest>>;

    /// Moves a request to `processing` and stamps `started_at`
    fn mark_processing(&mut self, request_id: i64) -> StorageResult<()>;

    /// Moves a request to `completed` with its archive location
    fn mark_completed(&mut self, request_id: i64, file_path: &str, file_size: u64)
        -> StorageResult<()>;

    /// Moves a request to `failed` with an error message
    fn mark_failed(&mut self, request_id: i64, error_message: &str) -> StorageResult<()>;

    /// Upserts one page row for a request, keyed by URL
    fn save_page(&mut self, request_id: i64, page: &CrawledPage) -> StorageResult<()>;

    /// Gets all pages for a request in insertion order
    fn get_pages(&self, request_id: i64) -> StorageResult<Vec<CrawledPage>>;

    /// Gets page counts for a request
    fn page_stats(&self, request_id: i64) -> StorageResult<PageStats>;

    /// Deletes a request and its pages; returns the archive path if one was
    /// recorded
    fn delete_request(&mut self, request_id: i64) -> StorageResult<Option<String>>;

    /// Counts processing requests whose `started_at` is older than the
    /// threshold
    fn count_stuck_requests(&self, threshold_minutes: u64) -> StorageResult<u64>;

    /// Returns stuck processing requests to `pending`; returns how many
    /// were reset
    fn reset_stuck_requests(&mut self, threshold_minutes: u64) -> StorageResult<u64>;
}
