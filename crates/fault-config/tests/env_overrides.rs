use fault_config::FaultConfig;
use fault_core::{DetailLevel, Environment};
use figment::Jail;

#[test]
fn env_vars_fill_config_values() {
    Jail::expect_with(|jail| {
        jail.set_env("FAULTLINE_SERVICE__NAME", "from-env");
        jail.set_env("FAULTLINE_SERVICE__ENVIRONMENT", "testing");
        jail.set_env("FAULTLINE_RENDER__DETAIL_LEVEL", "1");

        let config = FaultConfig::load().expect("config loads");
        assert_eq!(config.service.name, "from-env");
        assert_eq!(config.service.environment, Environment::Testing);
        assert_eq!(config.render.detail_level, DetailLevel::Normal);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".faultline")?;
        jail.create_file(
            ".faultline/config.toml",
            "[render]\ndefault_http_status_code = 502\n",
        )?;
        jail.set_env("FAULTLINE_RENDER__DEFAULT_HTTP_STATUS_CODE", "503");

        let config = FaultConfig::load().expect("config loads");
        assert_eq!(config.render.default_http_status_code, 503);
        Ok(())
    });
}

#[test]
fn unlisted_environment_name_loads_as_non_production() {
    Jail::expect_with(|jail| {
        jail.set_env("FAULTLINE_SERVICE__ENVIRONMENT", "qa");

        let config = FaultConfig::load().expect("config loads");
        assert_eq!(config.service.environment, Environment::Other("qa".into()));
        assert!(!config.service.environment.is_production());
        Ok(())
    });
}
