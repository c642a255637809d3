use crate::config::types::Config;
use crate::ConfigError;

/// Validates a parsed configuration
///
/// Checks that paths are non-empty, the WACZ metadata is usable, and the
/// worker settings are within sane bounds.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.storage.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "storage.database-path must not be empty".to_string(),
        ));
    }

    if config.output.output_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "output.output-dir must not be empty".to_string(),
        ));
    }

    if config.wacz.software_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "wacz.software-name must not be empty".to_string(),
        ));
    }

    if config.wacz.version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "wacz.version must not be empty".to_string(),
        ));
    }

    if config.worker.stuck_timeout_minutes == 0 {
        return Err(ConfigError::Validation(
            "worker.stuck-timeout-minutes must be at least 1".to_string(),
        ));
    }

    if config.worker.poll_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "worker.poll-interval-ms must be at least 1".to_string(),
        ));
    }

    if config.crawler.user_agents.is_empty() {
        return Err(ConfigError::Validation(
            "crawler.user-agents must contain at least one entry".to_string(),
        ));
    }

    if config
        .crawler
        .user_agents
        .iter()
        .any(|ua| ua.trim().is_empty())
    {
        return Err(ConfigError::Validation(
            "crawler.user-agents must not contain empty entries".to_string(),
        ));
    }

    Ok(())
}
