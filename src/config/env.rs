use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub directories: DirectoryConfig,
    pub logging: LoggingConfig,
    pub signals: JunkSignalConfig,
}

#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub logs_dir: String,
    pub data_dir: String,
    pub db_filename: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_file: String,
}

#[derive(Debug, Clone)]
pub struct JunkSignalConfig {
    pub refresh_interval: Duration,
    pub seller_penalty_threshold: u32,
    pub seller_penalty_per_report: f64,
    pub seller_penalty_cap: f64,
    pub learned_keyword_penalty: f64,
    pub store_timeout: Duration,
    pub catalog_lookup_limit: u32,
}

impl Default for JunkSignalConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(30 * 60),
            seller_penalty_threshold: 3,
            seller_penalty_per_report: 0.05,
            seller_penalty_cap: 0.20,
            learned_keyword_penalty: 0.15,
            store_timeout: Duration::from_secs(5),
            catalog_lookup_limit: 500,
        }
    }
}

impl JunkSignalConfig {
    /// Rejects zero intervals, zero limits and penalties that are negative or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval.is_zero() {
            return Err(invalid("JUNK_REFRESH_INTERVAL_SECS", self.refresh_interval));
        }
        if self.store_timeout.is_zero() {
            return Err(invalid("JUNK_STORE_TIMEOUT_MS", self.store_timeout));
        }
        if self.seller_penalty_threshold == 0 {
            return Err(invalid("JUNK_SELLER_PENALTY_THRESHOLD", self.seller_penalty_threshold));
        }
        if self.catalog_lookup_limit == 0 {
            return Err(invalid("CATALOG_LOOKUP_LIMIT", self.catalog_lookup_limit));
        }
        let penalties = [
            ("JUNK_SELLER_PENALTY_PER_REPORT", self.seller_penalty_per_report),
            ("JUNK_SELLER_PENALTY_CAP", self.seller_penalty_cap),
            ("JUNK_LEARNED_KEYWORD_PENALTY", self.learned_keyword_penalty),
        ];
        for (key, value) in penalties {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(key, value));
            }
        }
        Ok(())
    }
}

fn invalid(key: &'static str, value: impl std::fmt::Debug) -> ConfigError {
    ConfigError::Invalid(key, format!("{value:?}"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}
