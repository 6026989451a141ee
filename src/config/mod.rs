pub mod env;
mod loader;

pub use env::{AppConfig, ConfigError, DirectoryConfig, JunkSignalConfig, LoggingConfig};
pub use loader::load_config;
