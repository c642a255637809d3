//! Database schema definitions

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Archive requests
CREATE TABLE IF NOT EXISTS wacz_requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT,
    max_depth INTEGER NOT NULL,
    max_pages INTEGER NOT NULL,
    crawl_delay_ms INTEGER NOT NULL,
    options TEXT NOT NULL,
    user_agent TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL,
    started_at TEXT,
    completed_at TEXT,
    file_path TEXT,
    file_size INTEGER,
    error_message TEXT
);

CREATE INDEX IF NOT EXISTS idx_requests_status ON wacz_requests(status);
CREATE INDEX IF NOT EXISTS idx_requests_created ON wacz_requests(created_at);

-- Pages captured per request, one row per unique normalized URL
CREATE TABLE IF NOT EXISTS crawled_pages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    request_id INTEGER NOT NULL REFERENCES wacz_requests(id) ON DELETE CASCADE,
    url TEXT NOT NULL,
    depth INTEGER NOT NULL,
    title TEXT NOT NULL,
    http_status INTEGER,
    content_type TEXT,
    content_length INTEGER,
    status TEXT NOT NULL,
    error_message TEXT,
    content TEXT,
    headers TEXT NOT NULL,
    response_time_ms INTEGER,
    crawled_at TEXT NOT NULL,
    UNIQUE(request_id, url)
);

CREATE INDEX IF NOT EXISTS idx_pages_request ON crawled_pages(request_id);
CREATE INDEX IF NOT EXISTS idx_pages_status ON crawled_pages(status);
"#;

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ["wacz_requests", "crawled_pages"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "Table {} should exist", table);
        }
    }
}
