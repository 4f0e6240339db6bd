//! # fault-config
//!
//! Layered configuration loading for Faultline using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`FAULTLINE_*` prefix, `__` as separator)
//! 2. Project-level `.faultline/config.toml`
//! 3. User-level `~/.config/faultline/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `FAULTLINE_SERVICE__NAME` -> `service.name`,
//! `FAULTLINE_RENDER__DETAIL_LEVEL` -> `render.detail_level`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use fault_config::FaultConfig;
//!
//! let config = FaultConfig::load_with_dotenv().expect("config");
//! if config.service.is_configured() {
//!     println!("errors are attributed to {}", config.service.name);
//! }
//! ```

mod error;
mod render;
mod service;

pub use error::ConfigError;
pub use render::RenderConfig;
pub use service::ServiceConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of environment variables read by [`FaultConfig::figment`].
pub const ENV_PREFIX: &str = "FAULTLINE_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FaultConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl FaultConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`load_with_dotenv`](Self::load_with_dotenv)
    /// if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed or a value
    /// has the wrong type, and `ConfigError::InvalidValue` if validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".faultline/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render.validate()
    }

    /// The service name, or `NotConfigured` if none is set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` when `service.name` is blank.
    pub fn require_service_name(&self) -> Result<&str, ConfigError> {
        if self.service.is_configured() {
            Ok(self.service.name.trim())
        } else {
            Err(ConfigError::NotConfigured {
                section: "service".into(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("faultline").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) or current dir looking
    /// for a `.env` file. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // Walk up at most 3 levels (crate -> crates/ -> workspace root)
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        // Fallback: try current directory
        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fault_core::{DetailLevel, Environment};

    #[test]
    fn default_config_loads() {
        let config = FaultConfig::default();
        assert!(!config.service.is_configured());
        assert_eq!(config.service.environment, Environment::Production);
        assert_eq!(config.render.detail_level, DetailLevel::Minimal);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: FaultConfig = FaultConfig::figment().extract()?;
            assert!(!config.service.is_configured());
            assert_eq!(config.render.default_http_status_code, 500);
            Ok(())
        });
    }

    #[test]
    fn unnamed_service_is_not_configured() {
        let config = FaultConfig::default();
        assert!(matches!(
            config.require_service_name(),
            Err(ConfigError::NotConfigured { .. })
        ));
    }
}
