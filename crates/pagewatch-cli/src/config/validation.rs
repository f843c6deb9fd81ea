use url::Url;

use crate::config::{CheckConfig, HistoryConfig};
use crate::error::ConfigError;

/// Validate an http(s) or other absolute URL.
pub fn validate_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim()).map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        hint: format!("Must be an absolute URL such as https://example.com/ ({e})"),
    })
}

impl CheckConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_url.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "target_url".to_string(),
                hint: "Set MONITOR_TARGET_URL, PAGEWATCH_CHECK__TARGET_URL, [check] target_url, or pass --url".to_string(),
            });
        }
        validate_url("target_url", &self.target_url)?;

        if self.nav_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "nav_timeout_ms".to_string(),
                value: "0".to_string(),
                hint: "Navigation needs a positive timeout in milliseconds".to_string(),
            });
        }

        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent".to_string(),
                value: String::new(),
                hint: "Leave it unset to use the default user agent".to_string(),
            });
        }

        Ok(())
    }
}

impl HistoryConfig {
    /// Validate configuration for logical consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max".to_string(),
                value: "0".to_string(),
                hint: "Keep at least one entry (default 720)".to_string(),
            });
        }

        if self.history_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingField {
                field: "history_path".to_string(),
                hint: "Set HISTORY_PATH or pass --history".to_string(),
            });
        }

        if let Some(source) = self.source() {
            let lower = source.to_ascii_lowercase();
            if lower.starts_with("http://") || lower.starts_with("https://") {
                validate_url("source", source)?;
            }
        }

        Ok(())
    }
}
