use serde::{Deserialize, Serialize};

/// Root configuration container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub locale: LocaleConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Timing of outbound rate updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Quiet period before a rate edit is sent (default: 1000).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Number formatting of the active locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleConfig {
    /// Decimal separator glyph, a single character (default: ".").
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset (default: "info").
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_decimal_separator() -> String {
    ".".to_string()
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self {
            decimal_separator: default_decimal_separator(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl Config {
    /// The configured decimal separator, `.` if none is set.
    pub fn decimal_separator(&self) -> char {
        self.locale.decimal_separator.chars().next().unwrap_or('.')
    }
}
