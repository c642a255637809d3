//! Request lifecycle facade
//!
//! Ties submission, processing, and administration together over one shared
//! store. Processing guarantees a terminal status: every attempt ends in
//! `completed` or `failed`, never a dangling `processing` row.

use crate::config::Config;
use crate::crawler::CrawlOrchestrator;
use crate::model::{CrawlOptions, CrawlRequest, NewCrawlRequest, RequestStatus};
use crate::storage::{PageStats, RequestStore, SqliteStore, StorageError};
use crate::wacz::WaczBuilder;
use crate::{ConfigError, WaczError};
use rand::seq::SliceRandom;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{error, info, warn};

const MAX_DEPTH_LIMIT: u32 = 10;
const MAX_PAGES_LIMIT: u32 = 10_000;
const MIN_CRAWL_DELAY_MS: u64 = 500;
const MAX_CRAWL_DELAY_MS: u64 = 30_000;

/// User-supplied parameters for a new archive request
#[derive(Debug, Clone)]
pub struct Submission {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub max_depth: u32,
    pub max_pages: u32,
    pub crawl_delay_ms: u64,
    pub options: CrawlOptions,
}

/// Entry point for submitting and processing archive requests
pub struct WaczGenerator {
    config: Config,
    storage: Arc<Mutex<SqliteStore>>,
}

impl WaczGenerator {
    pub fn new(config: Config) -> crate::Result<Self> {
        let store = SqliteStore::new(Path::new(&config.storage.database_path))?;
        Ok(Self {
            config,
            storage: Arc::new(Mutex::new(store)),
        })
    }

    /// Builds a generator over an existing store (for testing)
    pub fn with_storage(config: Config, storage: Arc<Mutex<SqliteStore>>) -> Self {
        Self { config, storage }
    }

    /// Validates and enqueues a new request, returning its ID
    pub fn submit(&self, submission: Submission) -> crate::Result<i64> {
        validate_submission(&submission)?;

        let user_agent = self
            .config
            .crawler
            .user_agents
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                WaczError::Config(ConfigError::Validation(
                    "no user agents configured".to_string(),
                ))
            })?;

        let request = NewCrawlRequest {
            url: submission.url,
            title: submission.title,
            description: submission.description,
            max_depth: submission.max_depth,
            max_pages: submission.max_pages,
            crawl_delay_ms: submission.crawl_delay_ms,
            options: submission.options,
            user_agent,
        };

        let id = self.storage.lock().unwrap().create_request(&request)?;
        info!(request_id = id, url = %request.url, "request submitted");
        Ok(id)
    }

    /// Processes one request end to end
    ///
    /// Always leaves the request in a terminal state; the original error is
    /// returned after the status is recorded.
    pub async fn process_request(&self, request_id: i64) -> crate::Result<CrawlRequest> {
        let current = self
            .storage
            .lock()
            .unwrap()
            .get_request(request_id)
            .map_err(map_not_found(request_id))?;
        // Only pending requests may be picked up; stuck ones go back to
        // pending through the reclaim path first
        if current.status != RequestStatus::Pending {
            return Err(WaczError::RequestNotPending {
                id: request_id,
                status: current.status.to_db_string(),
            });
        }

        self.storage.lock().unwrap().mark_processing(request_id)?;
        let request = self.storage.lock().unwrap().get_request(request_id)?;

        info!(request_id, url = %request.url, "processing request");

        match self.execute(&request).await {
            Ok((path, size)) => {
                self.storage.lock().unwrap().mark_completed(
                    request_id,
                    &path.to_string_lossy(),
                    size,
                )?;
                info!(request_id, path = %path.display(), "request completed");
                Ok(self.storage.lock().unwrap().get_request(request_id)?)
            }
            Err(e) => {
                error!(request_id, error = %e, "request failed");
                if let Err(mark_err) = self
                    .storage
                    .lock()
                    .unwrap()
                    .mark_failed(request_id, &e.to_string())
                {
                    error!(request_id, error = %mark_err, "could not record failure");
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, request: &CrawlRequest) -> crate::Result<(PathBuf, u64)> {
        let orchestrator = CrawlOrchestrator::new(self.storage.clone(), &request.user_agent)?;
        let outcome = orchestrator.crawl(request).await?;

        // An archive with no successful capture is useless; fail the request
        if !outcome.pages.iter().any(|p| p.is_successful()) {
            return Err(WaczError::ZeroPages {
                url: request.url.clone(),
            });
        }

        let builder = WaczBuilder::new(&self.config);
        builder.build(request, &outcome.pages, &outcome.contents).await
    }

    /// Polls for pending requests forever, reclaiming stuck ones on the way
    pub async fn run_worker(&self) -> crate::Result<()> {
        let poll = Duration::from_millis(self.config.worker.poll_interval_ms);
        info!(
            poll_ms = self.config.worker.poll_interval_ms,
            "worker started"
        );

        loop {
            let reclaimed = self
                .storage
                .lock()
                .unwrap()
                .reset_stuck_requests(self.config.worker.stuck_timeout_minutes)?;
            if reclaimed > 0 {
                warn!(count = reclaimed, "reclaimed stuck requests");
            }

            let next = self.storage.lock().unwrap().next_pending()?;
            match next {
                Some(request) => {
                    // Failures are terminal per request; the worker moves on
                    let _ = self.process_request(request.id).await;
                }
                None => tokio::time::sleep(poll).await,
            }
        }
    }

    /// Gets a request with its page counts
    pub fn status(&self, request_id: i64) -> crate::Result<(CrawlRequest, PageStats)> {
        let storage = self.storage.lock().unwrap();
        let request = storage
            .get_request(request_id)
            .map_err(map_not_found(request_id))?;
        let stats = storage.page_stats(request_id)?;
        Ok((request, stats))
    }

    /// Lists requests, optionally filtered by status
    pub fn list(&self, status: Option<RequestStatus>) -> crate::Result<Vec<CrawlRequest>> {
        Ok(self.storage.lock().unwrap().list_requests(status)?)
    }

    /// Deletes a request, its pages, and its archive file
    pub fn delete(&self, request_id: i64) -> crate::Result<()> {
        let file_path = self
            .storage
            .lock()
            .unwrap()
            .delete_request(request_id)
            .map_err(map_not_found(request_id))?;

        if let Some(path) = file_path {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(path = %path, error = %e, "archive file could not be removed");
            }
        }

        info!(request_id, "request deleted");
        Ok(())
    }

    /// Returns stuck processing requests to the queue
    ///
    /// With `dry_run` the count is reported without changing anything.
    pub fn reset_stuck(&self, threshold_minutes: Option<u64>, dry_run: bool) -> crate::Result<u64> {
        let threshold = threshold_minutes.unwrap_or(self.config.worker.stuck_timeout_minutes);
        let mut storage = self.storage.lock().unwrap();

        let count = if dry_run {
            storage.count_stuck_requests(threshold)?
        } else {
            storage.reset_stuck_requests(threshold)?
        };
        Ok(count)
    }
}

fn map_not_found(request_id: i64) -> impl FnOnce(StorageError) -> WaczError {
    move |e| match e {
        StorageError::RequestNotFound(_) => WaczError::RequestNotFound(request_id),
        other => WaczError::Storage(other),
    }
}

fn validate_submission(submission: &Submission) -> crate::Result<()> {
    let parsed = url::Url::parse(&submission.url)
        .map_err(|e| validation(format!("invalid URL: {}", e)))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(validation(format!(
            "unsupported URL scheme: {}",
            parsed.scheme()
        )));
    }
    if submission.title.trim().is_empty() {
        return Err(validation("title must not be empty".to_string()));
    }
    if !(1..=MAX_DEPTH_LIMIT).contains(&submission.max_depth) {
        return Err(validation(format!(
            "max depth must be between 1 and {}",
            MAX_DEPTH_LIMIT
        )));
    }
    if !(1..=MAX_PAGES_LIMIT).contains(&submission.max_pages) {
        return Err(validation(format!(
            "max pages must be between 1 and {}",
            MAX_PAGES_LIMIT
        )));
    }
    if !(MIN_CRAWL_DELAY_MS..=MAX_CRAWL_DELAY_MS).contains(&submission.crawl_delay_ms) {
        return Err(validation(format!(
            "crawl delay must be between {} and {} ms",
            MIN_CRAWL_DELAY_MS, MAX_CRAWL_DELAY_MS
        )));
    }
    Ok(())
}

fn validation(message: String) -> WaczError {
    WaczError::Config(ConfigError::Validation(message))
}
