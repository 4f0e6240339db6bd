//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var and cwd manipulation.

use fault_config::{ConfigError, FaultConfig};
use fault_core::{DetailLevel, Environment};
use figment::{
    Figment, Jail,
    providers::{Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;

#[test]
fn loads_service_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[service]
name = "billing"
environment = "staging"
trace_id = "fixed-trace"
"#,
        )?;

        let config: FaultConfig = Figment::from(Serialized::defaults(FaultConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.service.name, "billing");
        assert_eq!(config.service.environment, Environment::Staging);
        assert_eq!(config.service.trace_id, "fixed-trace");
        assert!(config.service.is_configured());
        Ok(())
    });
}

#[test]
fn loads_render_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r"
[render]
detail_level = 2
default_http_status_code = 503
",
        )?;

        let config: FaultConfig = Figment::from(Serialized::defaults(FaultConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.render.detail_level, DetailLevel::Verbose);
        assert_eq!(config.render.default_http_status_code, 503);
        Ok(())
    });
}

#[test]
fn partial_section_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[service]\nname = \"search\"\n")?;

        let config: FaultConfig = Figment::from(Serialized::defaults(FaultConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.service.name, "search");
        assert_eq!(config.service.environment, Environment::Production);
        assert_eq!(config.render.default_http_status_code, 500);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_load() {
    Jail::expect_with(|jail| {
        jail.create_dir(".faultline")?;
        jail.create_file(
            ".faultline/config.toml",
            "[service]\nname = \"from-project\"\nenvironment = \"dev\"\n",
        )?;

        let config = FaultConfig::load().expect("config loads");
        assert_eq!(config.service.name, "from-project");
        assert_eq!(config.service.environment, Environment::Development);
        Ok(())
    });
}

#[test]
fn invalid_detail_level_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.create_dir(".faultline")?;
        jail.create_file(".faultline/config.toml", "[render]\ndetail_level = 9\n")?;

        let result = FaultConfig::load();
        assert!(matches!(result, Err(ConfigError::Figment(_))));
        Ok(())
    });
}

#[test]
fn out_of_range_status_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_dir(".faultline")?;
        jail.create_file(
            ".faultline/config.toml",
            "[render]\ndefault_http_status_code = 999\n",
        )?;

        let result = FaultConfig::load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}
