use std::{env, str::FromStr, time::Duration};

use super::env::{AppConfig, ConfigError, DirectoryConfig, JunkSignalConfig, LoggingConfig};

pub fn load_config() -> Result<AppConfig, ConfigError> {
    AppConfig::from_env()
}

impl AppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let directories = DirectoryConfig {
            logs_dir: env::var("LOGS_DIR").unwrap_or_else(|_| "logs".to_string()),
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
            db_filename: env::var("DB_FILENAME").unwrap_or_else(|_| "deals.db".to_string()),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "junk-signal.log".to_string()),
        };

        Ok(Self {
            directories,
            logging,
            signals: JunkSignalConfig::from_env()?,
        })
    }
}

impl JunkSignalConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            refresh_interval: parse_var::<u64>("JUNK_REFRESH_INTERVAL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.refresh_interval),
            seller_penalty_threshold: parse_var("JUNK_SELLER_PENALTY_THRESHOLD")?
                .unwrap_or(defaults.seller_penalty_threshold),
            seller_penalty_per_report: parse_var("JUNK_SELLER_PENALTY_PER_REPORT")?
                .unwrap_or(defaults.seller_penalty_per_report),
            seller_penalty_cap: parse_var("JUNK_SELLER_PENALTY_CAP")?
                .unwrap_or(defaults.seller_penalty_cap),
            learned_keyword_penalty: parse_var("JUNK_LEARNED_KEYWORD_PENALTY")?
                .unwrap_or(defaults.learned_keyword_penalty),
            store_timeout: parse_var::<u64>("JUNK_STORE_TIMEOUT_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.store_timeout),
            catalog_lookup_limit: parse_var("CATALOG_LOOKUP_LIMIT")?
                .unwrap_or(defaults.catalog_lookup_limit),
        };
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(key, value)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = JunkSignalConfig::default();
        assert_eq!(cfg.refresh_interval, Duration::from_secs(1800));
        assert_eq!(cfg.seller_penalty_threshold, 3);
        assert!((cfg.seller_penalty_per_report - 0.05).abs() < 1e-12);
        assert!((cfg.seller_penalty_cap - 0.20).abs() < 1e-12);
        assert!((cfg.learned_keyword_penalty - 0.15).abs() < 1e-12);
        assert_eq!(cfg.catalog_lookup_limit, 500);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(JunkSignalConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_refresh_interval_is_rejected() {
        let cfg = JunkSignalConfig {
            refresh_interval: Duration::ZERO,
            ..JunkSignalConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::Invalid("JUNK_REFRESH_INTERVAL_SECS", _))
        ));
    }

    #[test]
    fn negative_or_nan_penalties_are_rejected() {
        let negative_cap = JunkSignalConfig {
            seller_penalty_cap: -0.1,
            ..JunkSignalConfig::default()
        };
        assert!(matches!(
            negative_cap.validate(),
            Err(ConfigError::Invalid("JUNK_SELLER_PENALTY_CAP", _))
        ));

        let negative_keyword = JunkSignalConfig {
            learned_keyword_penalty: -0.15,
            ..JunkSignalConfig::default()
        };
        assert!(matches!(
            negative_keyword.validate(),
            Err(ConfigError::Invalid("JUNK_LEARNED_KEYWORD_PENALTY", _))
        ));

        let nan_per_report = JunkSignalConfig {
            seller_penalty_per_report: f64::NAN,
            ..JunkSignalConfig::default()
        };
        assert!(nan_per_report.validate().is_err());
    }

    #[test]
    fn zero_threshold_and_limits_are_rejected() {
        let zero_threshold = JunkSignalConfig {
            seller_penalty_threshold: 0,
            ..JunkSignalConfig::default()
        };
        assert!(zero_threshold.validate().is_err());

        let zero_timeout = JunkSignalConfig {
            store_timeout: Duration::ZERO,
            ..JunkSignalConfig::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn parse_var_rejects_garbage() {
        env::set_var("JUNK_TEST_ONLY_GARBAGE", "three");
        let parsed = parse_var::<u32>("JUNK_TEST_ONLY_GARBAGE");
        assert!(matches!(parsed, Err(ConfigError::Invalid("JUNK_TEST_ONLY_GARBAGE", _))));
        env::remove_var("JUNK_TEST_ONLY_GARBAGE");
    }

    #[test]
    fn parse_var_treats_blank_as_unset() {
        env::set_var("JUNK_TEST_ONLY_BLANK", "  ");
        let parsed = parse_var::<u32>("JUNK_TEST_ONLY_BLANK").unwrap();
        assert_eq!(parsed, None);
        env::remove_var("JUNK_TEST_ONLY_BLANK");
    }
}
