//! SQLite implementation of the request store

use crate::model::{
    CrawlOptions, CrawlRequest, CrawledPage, NewCrawlRequest, PageStatus, RequestStatus,
};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{PageStats, RequestStore, StorageError, StorageResult};
use chrono::{DateTime, Duration, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens or creates a database at the given path
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

const REQUEST_COLUMNS: &str = "id, url, title, description, max_depth, max_pages, crawl_delay_ms,
    options, user_agent, status, created_at, started_at, completed_at, file_path, file_size,
    error_message";

const PAGE_COLUMNS: &str = "url, depth, title, http_status, content_type, content_length,
    status, error_message, content, headers, response_time_ms, crawled_at";

fn parse_datetime(value: String) -> rusqlite::Result<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<CrawlRequest> {
    let options_json: String = row.get(7)?;
    let started_at: Option<String> = row.get(11)?;
    let completed_at: Option<String> = row.get(12)?;

    Ok(CrawlRequest {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        max_depth: row.get(4)?,
        max_pages: row.get(5)?,
        crawl_delay_ms: row.get(6)?,
        options: serde_json::from_str::<CrawlOptions>(&options_json).unwrap_or_default(),
        user_agent: row.get(8)?,
        status: RequestStatus::from_db_string(&row.get::<_, String>(9)?)
            .unwrap_or(RequestStatus::Pending),
        created_at: parse_datetime(row.get(10)?)?,
        started_at: started_at.map(parse_datetime).transpose()?,
        completed_at: completed_at.map(parse_datetime).transpose()?,
        file_path: row.get(13)?,
        file_size: row.get(14)?,
        error_message: row.get(15)?,
    })
}

fn map_page(row: &Row<'_>) -> rusqlite::Result<CrawledPage> {
    let headers_json: String = row.get(9)?;

    Ok(CrawledPage {
        url: row.get(0)?,
        depth: row.get(1)?,
        title: row.get(2)?,
        http_status: row.get(3)?,
        content_type: row.get(4)?,
        content_length: row.get(5)?,
        status: PageStatus::from_db_string(&row.get::<_, String>(6)?)
            .unwrap_or(PageStatus::Error),
        error_message: row.get(7)?,
        content: row.get(8)?,
        headers: serde_json::from_str(&headers_json).unwrap_or_default(),
        response_time_ms: row.get(10)?,
        crawled_at: parse_datetime(row.get(11)?)?,
    })
}

impl RequestStore for SqliteStore {
    fn create_request(&mut self, request: &NewCrawlRequest) -> StorageResult<i64> {
        let options = serde_json::to_string(&request.options)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO wacz_requests
             (url, title, description, max_depth, max_pages, crawl_delay_ms, options,
              user_agent, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                request.url,
                request.title,
                request.description,
                request.max_depth,
                request.max_pages,
                request.crawl_delay_ms,
                options,
                request.user_agent,
                RequestStatus::Pending.to_db_string(),
                now,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_request(&self, request_id: i64) -> StorageResult<CrawlRequest> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM wacz_requests WHERE id = ?1",
            REQUEST_COLUMNS
        ))?;

        stmt.query_row(params![request_id], map_request)
            .map_err(|_| StorageError::RequestNotFound(request_id))
    }

    fn list_requests(&self, status: Option<RequestStatus>) -> StorageResult<Vec<CrawlRequest>> {
        let requests = match status {
            Some(status) => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM wacz_requests WHERE status = ?1 ORDER BY id DESC",
                    REQUEST_COLUMNS
                ))?;
                let rows = stmt.query_map(params![status.to_db_string()], map_request)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = self.conn.prepare(&format!(
                    "SELECT {} FROM wacz_requests ORDER BY id DESC",
                    REQUEST_COLUMNS
                ))?;
                let rows = stmt.query_map([], map_request)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };

        Ok(requests)
    }

    fn next_pending(&self) -> StorageResult<Option<CrawlRequest>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM wacz_requests WHERE status = ?1 ORDER BY id ASC LIMIT 1",
            REQUEST_COLUMNS
        ))?;

        let request = stmt
            .query_row(params![RequestStatus::Pending.to_db_string()], map_request)
            .optional()?;

        Ok(request)
    }

    fn mark_processing(&mut self, request_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE wacz_requests SET status = ?1, started_at = ?2 WHERE id = ?3",
            params![RequestStatus::Processing.to_db_string(), now, request_id],
        )?;

        if changed == 0 {
            return Err(StorageError::RequestNotFound(request_id));
        }
        Ok(())
    }

    fn mark_completed(
        &mut self,
        request_id: i64,
        file_path: &str,
        file_size: u64,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE wacz_requests
             SET status = ?1, completed_at = ?2, file_path = ?3, file_size = ?4,
                 error_message = NULL
             WHERE id = ?5",
            params![
                RequestStatus::Completed.to_db_string(),
                now,
                file_path,
                file_size,
                request_id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RequestNotFound(request_id));
        }
        Ok(())
    }

    fn mark_failed(&mut self, request_id: i64, error_message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE wacz_requests SET status = ?1, completed_at = ?2, error_message = ?3
             WHERE id = ?4",
            params![
                RequestStatus::Failed.to_db_string(),
                now,
                error_message,
                request_id,
            ],
        )?;

        if changed == 0 {
            return Err(StorageError::RequestNotFound(request_id));
        }
        Ok(())
    }

    fn save_page(&mut self, request_id: i64, page: &CrawledPage) -> StorageResult<()> {
        let headers = serde_json::to_string(&page.headers)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        self.conn.execute(
            "INSERT OR REPLACE INTO crawled_pages
             (request_id, url, depth, title, http_status, content_type, content_length,
              status, error_message, content, headers, response_time_ms, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                request_id,
                page.url,
                page.depth,
                page.title,
                page.http_status,
                page.content_type,
                page.content_length,
                page.status.to_db_string(),
                page.error_message,
                page.content,
                headers,
                page.response_time_ms,
                page.crawled_at.to_rfc3339(),
            ],
        )?;

        Ok(())
    }

    fn get_pages(&self, request_id: i64) -> StorageResult<Vec<CrawledPage>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM crawled_pages WHERE request_id = ?1 ORDER BY id ASC",
            PAGE_COLUMNS
        ))?;

        let pages = stmt
            .query_map(params![request_id], map_page)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pages)
    }

    fn page_stats(&self, request_id: i64) -> StorageResult<PageStats> {
        let mut stmt = self.conn.prepare(
            "SELECT status, COUNT(*) FROM crawled_pages WHERE request_id = ?1 GROUP BY status",
        )?;

        let mut stats = PageStats::default();
        let rows = stmt.query_map(params![request_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
        })?;

        for row in rows {
            let (status, count) = row?;
            let count = count as u64;
            stats.total += count;
            match PageStatus::from_db_string(&status) {
                Some(PageStatus::Success) => stats.successful += count,
                _ => stats.failed += count,
            }
        }

        Ok(stats)
    }

    fn delete_request(&mut self, request_id: i64) -> StorageResult<Option<String>> {
        let file_path: Option<String> = self
            .conn
            .query_row(
                "SELECT file_path FROM wacz_requests WHERE id = ?1",
                params![request_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::RequestNotFound(request_id))?;

        self.conn.execute(
            "DELETE FROM crawled_pages WHERE request_id = ?1",
            params![request_id],
        )?;
        self.conn.execute(
            "DELETE FROM wacz_requests WHERE id = ?1",
            params![request_id],
        )?;

        Ok(file_path)
    }

    fn count_stuck_requests(&self, threshold_minutes: u64) -> StorageResult<u64> {
        let cutoff = (Utc::now() - Duration::minutes(threshold_minutes as i64)).to_rfc3339();
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM wacz_requests WHERE status = ?1 AND started_at < ?2",
            params![RequestStatus::Processing.to_db_string(), cutoff],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn reset_stuck_requests(&mut self, threshold_minutes: u64) -> StorageResult<u64> {
        let cutoff = (Utc::now() - Duration::minutes(threshold_minutes as i64)).to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE wacz_requests
             SET status = ?1, started_at = NULL, error_message = NULL
             WHERE status = ?2 AND started_at < ?3",
            params![
                RequestStatus::Pending.to_db_string(),
                RequestStatus::Processing.to_db_string(),
                cutoff,
            ],
        )?;
        Ok(changed as u64)
    }
}
