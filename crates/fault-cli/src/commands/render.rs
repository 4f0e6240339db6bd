use anyhow::Context;
use fault_config::FaultConfig;
use fault_core::{DetailLevel, Environment};

use crate::cli::{GlobalFlags, RenderArgs};
use crate::input;
use crate::output::output;

/// Handle `faultline render`.
pub fn handle(args: &RenderArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let error = input::load(&args.input)?;
    let (level, environment) = resolve(args)?;
    tracing::debug!(%level, %environment, "rendering envelope");
    output(&error.api_response(level, &environment), flags.format)
}

/// Flags win; anything not given comes from configuration.
fn resolve(args: &RenderArgs) -> anyhow::Result<(DetailLevel, Environment)> {
    if let (Some(level), Some(environment)) = (args.level, &args.env) {
        return Ok((level, environment.clone()));
    }
    let config = FaultConfig::load_with_dotenv().context("failed to load configuration")?;
    Ok((
        args.level.unwrap_or(config.render.detail_level),
        args.env.clone().unwrap_or(config.service.environment),
    ))
}
