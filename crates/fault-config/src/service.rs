//! Identity of the service that raises errors.

use fault_core::Environment;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Name written to the `service` field of every error this process raises.
    #[serde(default)]
    pub name: String,

    /// Deployment environment. Anything but `production` may expose details
    /// and stack traces at detail level 1 and above.
    #[serde(default)]
    pub environment: Environment,

    /// Fixed trace id. Empty means one is generated per kernel.
    #[serde(default)]
    pub trace_id: String,
}

impl ServiceConfig {
    /// Check if the service has a name.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_not_configured() {
        let config = ServiceConfig::default();
        assert!(!config.is_configured());
        assert!(config.environment.is_production());
    }

    #[test]
    fn blank_name_is_not_configured() {
        let config = ServiceConfig {
            name: "   ".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn configured_when_named() {
        let config = ServiceConfig {
            name: "billing".into(),
            ..Default::default()
        };
        assert!(config.is_configured());
    }
}
