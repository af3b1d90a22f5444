use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded on run log rows so a change of configuration between runs is
/// detectable after the fact.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const VALID_CONFIG: &str = r#"
[harvest]
max-pages-per-unit = 10
inter-board-delay = 500
page-timeout = 15

[source]
base-url = "https://www.argaam.com/ar/company/shariahcompaniesbyinstitution"

[retry]
max-attempts = 2
delay = 100

[output]
database-path = "./sanad.db"
export-dir = "./exports"

[schedule]
interval-hours = 12

[[board]]
id = 1
name = "الراجحي المالية"
name-en = "Al Rajhi Financial"

[[board]]
id = 6
name = "البلاد المالية"
"#;

    #[test]
    fn test_load_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.harvest.max_pages_per_unit, 10);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.schedule.interval_hours, 12);
        assert_eq!(config.board.len(), 2);
        assert_eq!(config.board[0].name, "الراجحي المالية");
        assert_eq!(config.board[1].name_en, None);
    }

    #[test]
    fn test_defaults_applied() {
        let minimal = r#"
[harvest]

[source]
base-url = "https://www.argaam.com/ar/company/shariahcompaniesbyinstitution"

[output]
database-path = "./sanad.db"
export-dir = "./exports"

[[board]]
id = 1
name = "board"
"#;
        let file = create_temp_config(minimal);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.harvest.max_pages_per_unit, 20);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.schedule.interval_hours, 24);
        assert_eq!(config.source.sector_keywords.len(), 4);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_malformed_toml() {
        let file = create_temp_config("not [valid toml");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_config_hash_stable() {
        let file = create_temp_config(VALID_CONFIG);
        let first = compute_config_hash(file.path()).unwrap();
        let second = compute_config_hash(file.path()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }
}
