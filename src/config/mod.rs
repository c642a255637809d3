//! Configuration loading and validation
//!
//! Configuration is a TOML file describing the store location, the archive
//! output directory, WACZ metadata, and worker behavior. Per-request crawl
//! limits arrive with each submitted request, not here.

mod parser;
mod types;
mod validation;

pub use parser::load_config;
pub use types::{Config, CrawlerConfig, OutputConfig, StorageConfig, WaczConfig, WorkerConfig};
pub use validation::validate;
