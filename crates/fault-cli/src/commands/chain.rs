use serde_json::json;

use crate::cli::{GlobalFlags, InputArgs};
use crate::input;
use crate::output::output;

/// Handle `faultline chain`.
pub fn handle(args: &InputArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let error = input::load(args)?;
    let root = error.root_cause();
    let messages = error.all_messages();
    let value = json!({
        "depth": messages.len(),
        "messages": messages,
        "root_cause": {
            "code": root.error_code(),
            "message": root.message(),
        },
    });
    output(&value, flags.format)
}
