//! Configuration types and loading

use serde::{Deserialize, Serialize};

/// Main console configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ConsoleConfig {
    /// Engine REST endpoint
    pub engine: EngineConfig,

    /// Defaults applied to every table view
    pub tables: TableDefaults,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct EngineConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TableDefaults {
    /// Page size a table starts with
    pub default_page_size: u32,
    /// Choices offered by the page size selector
    pub page_size_options: Vec<u32>,
    /// Mirror filter values into the query string
    pub sync_with_url: bool,
    /// Mirror sort state into the query string
    pub sync_sort_with_url: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                base_url: "http://localhost:8080/engine-rest".to_string(),
            },
            tables: TableDefaults::default(),
            logging: LoggingConfig {
                filter: "info,oc_tables=debug".to_string(),
            },
        }
    }
}

impl Default for TableDefaults {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            page_size_options: vec![10, 20, 50, 100],
            sync_with_url: true,
            sync_sort_with_url: true,
        }
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

impl From<ConfigError> for crate::error::ConsoleError {
    fn from(err: ConfigError) -> Self {
        crate::error::ConsoleError::Config(err.to_string())
    }
}

impl ConsoleConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("OC_ENGINE_URL") {
            config.engine.base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(size) = lookup("OC_DEFAULT_PAGE_SIZE") {
            config.tables.default_page_size = parse_page_size("OC_DEFAULT_PAGE_SIZE", &size)?;
        }
        if let Some(options) = lookup("OC_PAGE_SIZE_OPTIONS") {
            config.tables.page_size_options = options
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_page_size("OC_PAGE_SIZE_OPTIONS", s))
                .collect::<Result<Vec<_>, _>>()?;
        }
        if let Some(v) = lookup("OC_SYNC_WITH_URL") {
            config.tables.sync_with_url = parse_bool("OC_SYNC_WITH_URL", &v)?;
        }
        if let Some(v) = lookup("OC_SYNC_SORT_WITH_URL") {
            config.tables.sync_sort_with_url = parse_bool("OC_SYNC_SORT_WITH_URL", &v)?;
        }

        if let Some(filter) = lookup("OC_LOG") {
            config.logging.filter = filter;
        }

        if !config
            .tables
            .page_size_options
            .contains(&config.tables.default_page_size)
        {
            tracing::debug!(
                page_size = config.tables.default_page_size,
                "default page size is not one of the selectable options"
            );
        }

        Ok(config)
    }
}

fn parse_page_size(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "page size must be positive".to_string(),
        }),
        Ok(n) => Ok(n),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ConsoleConfig::default();
        assert_eq!(config.tables.default_page_size, 10);
        assert!(config.tables.sync_with_url);
        assert!(config.tables.sync_sort_with_url);
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = ConsoleConfig::from_vars(vars(&[
            ("OC_ENGINE_URL", "https://engine.example.com/rest/"),
            ("OC_DEFAULT_PAGE_SIZE", "50"),
            ("OC_PAGE_SIZE_OPTIONS", "25, 50,100"),
            ("OC_SYNC_SORT_WITH_URL", "no"),
        ]))
        .unwrap();

        assert_eq!(config.engine.base_url, "https://engine.example.com/rest");
        assert_eq!(config.tables.default_page_size, 50);
        assert_eq!(config.tables.page_size_options, vec![25, 50, 100]);
        assert!(config.tables.sync_with_url);
        assert!(!config.tables.sync_sort_with_url);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = ConsoleConfig::from_vars(vars(&[("OC_DEFAULT_PAGE_SIZE", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "OC_DEFAULT_PAGE_SIZE"));

        let err = ConsoleConfig::from_vars(vars(&[("OC_SYNC_WITH_URL", "maybe")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "OC_SYNC_WITH_URL"));
    }
}
