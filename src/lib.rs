//! Waczgen: a WACZ web archive generator
//!
//! This crate crawls a seed URL breadth-first within configurable limits and
//! packages the captured pages into a WACZ-compliant archive: a ZIP containing
//! gzip-compressed WARC records, a CDXJ index, a page manifest, and a signed
//! package descriptor.

pub mod config;
pub mod content;
pub mod crawler;
pub mod extract;
pub mod generator;
pub mod model;
pub mod storage;
pub mod url;
pub mod wacz;

use thiserror::Error;

/// Main error type for waczgen operations
#[derive(Debug, Error)]
pub enum WaczError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Request not found: {0}")]
    RequestNotFound(i64),

    #[error("Request {id} is not pending (status: {status})")]
    RequestNotPending { id: i64, status: &'static str },

    #[error("Failed to retrieve any pages from {url}")]
    ZeroPages { url: String },

    #[error("Archive build error: {0}")]
    ArchiveBuild(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for waczgen operations
pub type Result<T> = std::result::Result<T, WaczError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use generator::WaczGenerator;
pub use model::{CrawlOptions, CrawlRequest, CrawledPage, PageStatus, RequestStatus};
