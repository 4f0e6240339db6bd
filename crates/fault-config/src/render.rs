//! API rendering defaults.

use fault_core::{DEFAULT_HTTP_STATUS, DetailLevel};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default HTTP status for errors that do not carry one.
const fn default_http_status_code() -> u16 {
    DEFAULT_HTTP_STATUS
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RenderConfig {
    /// How much of an error is exposed in API responses (0, 1 or 2).
    #[serde(default)]
    pub detail_level: DetailLevel,

    /// Status used when an error has no `http_status_code` of its own.
    #[serde(default = "default_http_status_code")]
    pub default_http_status_code: u16,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::default(),
            default_http_status_code: default_http_status_code(),
        }
    }
}

impl RenderConfig {
    /// Reject statuses outside the HTTP range.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `default_http_status_code` is
    /// not in `100..=599`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(100..=599).contains(&self.default_http_status_code) {
            return Err(ConfigError::InvalidValue {
                field: "render.default_http_status_code".into(),
                reason: format!(
                    "{} is not an HTTP status (expected 100..=599)",
                    self.default_http_status_code
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = RenderConfig::default();
        assert_eq!(config.detail_level, DetailLevel::Minimal);
        assert_eq!(config.default_http_status_code, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn out_of_range_status_is_rejected() {
        let config = RenderConfig {
            default_http_status_code: 42,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
