use anyhow::Context;
use fault_config::FaultConfig;
use fault_kernel::ErrorKernel;

use crate::cli::{CreateArgs, GlobalFlags};
use crate::output::output;

/// Handle `faultline create`.
pub fn handle(args: &CreateArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut config = FaultConfig::load_with_dotenv().context("failed to load configuration")?;
    if let Some(service) = &args.service {
        config.service.name.clone_from(service);
    }

    let mut kernel = ErrorKernel::from_config(&config)
        .context("a service name is required (set service.name or pass --service)")?;
    if let Some(trace_id) = &args.trace_id {
        kernel = kernel.with_trace_id(trace_id.as_str())?;
    }

    let error = kernel
        .create_error(args.code.as_str(), args.message.as_str(), args.status)
        .context("invalid error")?;
    tracing::debug!(code = error.error_code(), trace_id = kernel.trace_id(), "created error");
    output(&error.to_envelope(), flags.format)
}
