//! Trace id generation.

use chrono::Utc;

const TRACE_ID_BYTES: usize = 16;

/// Generate a 32-character lowercase hex trace id from the OS random source.
///
/// If the OS source is unavailable, falls back to an id derived from the
/// current time and process id. Such ids are unique enough for correlation
/// but not unpredictable.
#[must_use]
pub fn generate_trace_id() -> String {
    let mut bytes = [0u8; TRACE_ID_BYTES];
    match getrandom::fill(&mut bytes) {
        Ok(()) => bytes.iter().map(|b| format!("{b:02x}")).collect(),
        Err(error) => {
            tracing::warn!(%error, "OS random source unavailable; using time-based trace id");
            fallback_trace_id()
        }
    }
}

fn fallback_trace_id() -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{:024x}{:08x}", nanos, std::process::id())
}
