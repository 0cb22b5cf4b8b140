use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::types::Config;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

impl Config {
    /// Returns the path to the configuration file.
    ///
    /// Uses `reimburse-rate/config.toml` under `dirs::config_dir()`,
    /// falling back to the current directory.
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("reimburse-rate").join("config.toml")
    }

    /// Loads configuration from the default config file.
    ///
    /// A missing file yields `Config::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Config::default());
        }

        Self::load_from(&path)
    }

    /// Loads and validates configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// Checks:
    /// - The debounce window is not zero
    /// - The decimal separator is exactly one non-digit, non-space character
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sync.debounce_ms == 0 {
            return Err(ConfigError::ValidationError {
                message: "sync.debounce_ms must be greater than zero".to_string(),
            });
        }

        let separator = &self.locale.decimal_separator;
        let mut chars = separator.chars();
        let valid = match (chars.next(), chars.next()) {
            (Some(c), None) => !c.is_ascii_digit() && !c.is_whitespace(),
            _ => false,
        };
        if !valid {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "locale.decimal_separator must be a single non-digit character, got '{}'",
                    separator
                ),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_from_reads_all_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(
            temp_dir.path(),
            r#"
[sync]
debounce_ms = 250

[locale]
decimal_separator = ","

[logging]
filter = "debug"
"#,
        );

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.sync.debounce_ms, 250);
        assert_eq!(config.decimal_separator(), ',');
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn test_load_from_empty_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = write_config(temp_dir.path(), "invalid { toml }");
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load_from(&temp_dir.path().join("missing.toml")),
            Err(ConfigError::ReadError { .. })
        ));
    }
}
