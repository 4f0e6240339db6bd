//! Stack trace capture.
//!
//! A captured stack is `["Thrown in <file> on line <line>", frame...]`. The
//! location comes from `#[track_caller]`, so the first line always exists;
//! frame lines follow only when the runtime has backtraces enabled
//! (`RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`).

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::Location;

/// Capture the stack at the caller's location.
#[track_caller]
#[must_use]
pub fn capture() -> Vec<String> {
    capture_at(Location::caller())
}

/// Capture the stack, attributing it to `location`.
#[must_use]
pub fn capture_at(location: &Location<'_>) -> Vec<String> {
    with_backtrace(location, &Backtrace::capture())
}

/// Format an already captured backtrace, attributing it to `location`.
#[must_use]
pub fn with_backtrace(location: &Location<'_>, backtrace: &Backtrace) -> Vec<String> {
    let mut frames = vec![thrown_in(location)];
    if backtrace.status() == BacktraceStatus::Captured {
        frames.extend(
            backtrace
                .to_string()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string),
        );
    }
    frames
}

fn thrown_in(location: &Location<'_>) -> String {
    format!(
        "Thrown in {} on line {}",
        location.file(),
        location.line()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_names_the_caller() {
        let line = line!() + 1;
        let frames = capture();
        assert_eq!(
            frames[0],
            format!("Thrown in {} on line {line}", file!())
        );
    }

    #[test]
    fn disabled_backtrace_yields_location_only() {
        let frames = with_backtrace(Location::caller(), &Backtrace::disabled());
        assert_eq!(frames.len(), 1);
        assert!(frames[0].starts_with("Thrown in "));
    }
}
