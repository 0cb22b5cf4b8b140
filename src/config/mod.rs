//! Application configuration: debounce timing, locale and logging.

mod loader;
mod types;

pub use loader::ConfigError;
pub use types::{Config, LocaleConfig, LoggingConfig, SyncConfig};
