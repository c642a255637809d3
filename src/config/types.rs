use serde::Deserialize;

/// Main configuration structure for waczgen
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub wacz: WaczConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            output: OutputConfig::default(),
            wacz: WaczConfig::default(),
            worker: WorkerConfig::default(),
            crawler: CrawlerConfig::default(),
        }
    }
}

/// Request/page store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Archive output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory where finished .wacz files are written
    #[serde(rename = "output-dir", default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// WACZ package metadata
#[derive(Debug, Clone, Deserialize)]
pub struct WaczConfig {
    /// Software name recorded in warcinfo, datapackage, and digest records
    #[serde(rename = "software-name", default = "default_software_name")]
    pub software_name: String,

    /// WACZ specification version recorded in the descriptor
    #[serde(rename = "version", default = "default_wacz_version")]
    pub version: String,
}

impl Default for WaczConfig {
    fn default() -> Self {
        Self {
            software_name: default_software_name(),
            version: default_wacz_version(),
        }
    }
}

/// Worker and lease-reclaim configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Minutes after which a `processing` request is considered stuck
    #[serde(rename = "stuck-timeout-minutes", default = "default_stuck_timeout")]
    pub stuck_timeout_minutes: u64,

    /// How often the worker polls for pending requests (milliseconds)
    #[serde(rename = "poll-interval-ms", default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            stuck_timeout_minutes: default_stuck_timeout(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// Crawler identity configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-agent strings; one is chosen at random per request
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agents: default_user_agents(),
        }
    }
}

fn default_database_path() -> String {
    "./waczgen.db".to_string()
}

fn default_output_dir() -> String {
    "./wacz".to_string()
}

fn default_software_name() -> String {
    "waczgen/1.0".to_string()
}

fn default_wacz_version() -> String {
    "1.1.1".to_string()
}

fn default_stuck_timeout() -> u64 {
    30
}

fn default_poll_interval() -> u64 {
    5000
}

fn default_user_agents() -> Vec<String> {
    vec![
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15".to_string(),
        "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0".to_string(),
    ]
}
