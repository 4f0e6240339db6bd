//! Errors raised while loading Faultline configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML layer or `FAULTLINE_*` variable could not be read into
    /// [`FaultConfig`](crate::FaultConfig).
    #[error("Faultline configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A section lacks the values an operation needs, e.g. `[service]`
    /// without a `name` when building a kernel.
    #[error("Section [{section}] is not configured")]
    NotConfigured { section: String },

    /// A value parsed but is out of range, e.g. `render.default_http_status_code`.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_section_and_field() {
        let missing = ConfigError::NotConfigured {
            section: "service".into(),
        };
        assert_eq!(missing.to_string(), "Section [service] is not configured");

        let invalid = ConfigError::InvalidValue {
            field: "render.default_http_status_code".into(),
            reason: "must be between 100 and 599".into(),
        };
        assert!(invalid.to_string().starts_with("Invalid value for render.default_http_status_code"));
    }
}
