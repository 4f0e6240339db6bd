use fault_core::wire::envelope_schema;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `faultline schema`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&envelope_schema(), flags.format)
}
