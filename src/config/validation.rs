//! Configuration validation
//!
//! A configuration that parses is not necessarily usable; this module
//! rejects configurations the harvester could not run against.

use crate::config::types::Config;
use crate::ConfigError;
use std::collections::HashSet;
use url::Url;

/// Validates a parsed configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source(config)?;
    validate_harvest(config)?;
    validate_boards(config)?;
    validate_output(config)?;
    Ok(())
}

fn validate_source(config: &Config) -> Result<(), ConfigError> {
    let url = Url::parse(&config.source.base_url)
        .map_err(|_| ConfigError::InvalidUrl(config.source.base_url.clone()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(config.source.base_url.clone()));
    }

    if config.source.sector_keywords.iter().any(|k| k.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "sector-keywords must not contain empty entries".to_string(),
        ));
    }

    Ok(())
}

fn validate_harvest(config: &Config) -> Result<(), ConfigError> {
    if config.harvest.max_pages_per_unit == 0 {
        return Err(ConfigError::Validation(
            "max-pages-per-unit must be at least 1".to_string(),
        ));
    }

    if config.harvest.page_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "page-timeout must be at least 1 second".to_string(),
        ));
    }

    if config.retry.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry max-attempts must be at least 1".to_string(),
        ));
    }

    if config.schedule.interval_hours == 0 {
        return Err(ConfigError::Validation(
            "schedule interval-hours must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_boards(config: &Config) -> Result<(), ConfigError> {
    if config.board.is_empty() {
        return Err(ConfigError::Validation(
            "at least one [[board]] entry is required".to_string(),
        ));
    }

    let mut seen_ids = HashSet::new();
    for entry in &config.board {
        if entry.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "board {} has an empty name",
                entry.id
            )));
        }
        if !seen_ids.insert(entry.id) {
            return Err(ConfigError::Validation(format!(
                "duplicate board id {}",
                entry.id
            )));
        }
    }

    Ok(())
}

fn validate_output(config: &Config) -> Result<(), ConfigError> {
    if config.output.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    if config.output.export_dir.trim().is_empty() {
        return Err(ConfigError::Validation(
            "export-dir must not be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::*;

    fn base_config() -> Config {
        Config {
            harvest: HarvestConfig {
                max_pages_per_unit: 20,
                inter_board_delay_ms: 2000,
                page_timeout_secs: 30,
            },
            source: SourceConfig {
                base_url: "https://www.argaam.com/ar/company/shariahcompaniesbyinstitution"
                    .to_string(),
                user_agent: "sanad/1.0".to_string(),
                sector_keywords: vec!["البنوك".to_string()],
            },
            retry: RetryConfig::default(),
            output: OutputConfig {
                database_path: "./sanad.db".to_string(),
                export_dir: "./exports".to_string(),
            },
            schedule: ScheduleConfig::default(),
            board: vec![BoardEntry {
                id: 1,
                name: "الراجحي المالية".to_string(),
                name_en: None,
            }],
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = base_config();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut config = base_config();
        config.source.base_url = "ftp://example.com/listing".to_string();
        assert!(matches!(validate(&config), Err(ConfigError::InvalidUrl(_))));
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = base_config();
        config.harvest.max_pages_per_unit = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_no_boards_rejected() {
        let mut config = base_config();
        config.board.clear();
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_duplicate_board_ids_rejected() {
        let mut config = base_config();
        let duplicate = config.board[0].clone();
        config.board.push(duplicate);
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_zero_retry_attempts_rejected() {
        let mut config = base_config();
        config.retry.max_attempts = 0;
        assert!(matches!(validate(&config), Err(ConfigError::Validation(_))));
    }
}
