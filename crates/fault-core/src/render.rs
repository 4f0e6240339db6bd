//! Rendering payloads for API consumers and for humans.
//!
//! [`ErrorPayload::render_for_api`] is the one place where the detail level
//! and the deployment environment interact:
//!
//! | level | fields |
//! |---|---|
//! | 0 | `code`, `message`, `service`, `http_status_code` |
//! | ≥1 | + `timestamp`, `trace_id`, `exception_type`, rendered `inner_error` |
//! | ≥1, non-production | + `details` (when present), `stack_trace` |
//!
//! In production, `details` and `stack_trace` never appear.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::payload::ErrorPayload;

// ---------------------------------------------------------------------------
// DetailLevel
// ---------------------------------------------------------------------------

/// How much of a payload is exposed in a rendered response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DetailLevel {
    /// Code, message, service and status only.
    #[default]
    Minimal,
    Normal,
    Verbose,
}

impl DetailLevel {
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::Minimal => 0,
            Self::Normal => 1,
            Self::Verbose => 2,
        }
    }
}

/// Detail level outside `0..=2`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid detail level '{0}': expected 0, 1 or 2")]
pub struct InvalidDetailLevel(pub String);

impl TryFrom<u8> for DetailLevel {
    type Error = InvalidDetailLevel;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(Self::Minimal),
            1 => Ok(Self::Normal),
            2 => Ok(Self::Verbose),
            other => Err(InvalidDetailLevel(other.to_string())),
        }
    }
}

impl From<DetailLevel> for u8 {
    fn from(level: DetailLevel) -> Self {
        level.as_u8()
    }
}

impl FromStr for DetailLevel {
    type Err = InvalidDetailLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| InvalidDetailLevel(s.to_string()))
            .and_then(Self::try_from)
    }
}

impl fmt::Display for DetailLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Deployment environment of the rendering service.
///
/// Names other than the four well-known ones are kept as [`Environment::Other`];
/// only `production` hides sensitive fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Environment {
    #[default]
    Production,
    Staging,
    Development,
    Testing,
    /// Any other deployment name, lowercased.
    Other(String),
}

impl Environment {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Production => "production",
            Self::Staging => "staging",
            Self::Development => "development",
            Self::Testing => "testing",
            Self::Other(name) => name,
        }
    }

    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl From<&str> for Environment {
    /// Blank names mean production.
    fn from(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "production" | "prod" => Self::Production,
            "staging" | "stage" => Self::Staging,
            "development" | "dev" => Self::Development,
            "testing" | "test" => Self::Testing,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for Environment {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<Environment> for String {
    fn from(environment: Environment) -> Self {
        match environment {
            Environment::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// API rendering
// ---------------------------------------------------------------------------

impl ErrorPayload {
    /// Render the error body for an API response. Never fails; optional
    /// fields that are absent render as `null` or are omitted.
    #[must_use]
    pub fn render_for_api(&self, level: DetailLevel, environment: &Environment) -> Map<String, Value> {
        let include_sensitive = !environment.is_production() && level > DetailLevel::Minimal;

        let mut body = Map::new();
        body.insert("code".into(), Value::String(self.error_code().to_string()));
        body.insert("message".into(), Value::String(self.message().to_string()));
        body.insert("service".into(), text_or_null(self.service()));
        body.insert(
            "http_status_code".into(),
            self.http_status_code().map_or(Value::Null, Value::from),
        );

        if level == DetailLevel::Minimal {
            return body;
        }

        body.insert(
            "timestamp".into(),
            Value::String(self.timestamp().to_string()),
        );
        body.insert("trace_id".into(), text_or_null(self.trace_id()));
        body.insert("exception_type".into(), text_or_null(self.exception_type()));

        if include_sensitive {
            if let Some(details) = self.details() {
                body.insert("details".into(), Value::Object(details.clone()));
            }
            body.insert(
                "stack_trace".into(),
                self.stack_trace().map_or(Value::Null, |frames| {
                    Value::Array(frames.iter().cloned().map(Value::String).collect())
                }),
            );
        }

        if let Some(inner) = self.inner_error() {
            body.insert(
                "inner_error".into(),
                Value::Object(inner.render_for_api(level, environment)),
            );
        }

        body
    }

    /// The rendered body wrapped in the `{"error": ...}` envelope.
    #[must_use]
    pub fn api_envelope(&self, level: DetailLevel, environment: &Environment) -> Value {
        let mut envelope = Map::new();
        envelope.insert(
            "error".into(),
            Value::Object(self.render_for_api(level, environment)),
        );
        Value::Object(envelope)
    }
}

fn text_or_null(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.to_string()))
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

/// Write the chain starting at `payload`, one summary per payload, joined by
/// `Caused by:` markers. `verbose` switches to the multi-line field dump.
pub(crate) fn write_text(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    payload: &ErrorPayload,
    verbose: bool,
) -> fmt::Result {
    for (index, link) in payload.chain().enumerate() {
        if index > 0 {
            f.write_str("\nCaused by: ")?;
        }
        let label = if index == 0 { label } else { "ServiceError" };
        if verbose {
            write_dump(f, label, link)?;
        } else {
            write_summary(f, label, link)?;
        }
    }
    Ok(())
}

fn write_summary(f: &mut fmt::Formatter<'_>, label: &str, payload: &ErrorPayload) -> fmt::Result {
    write!(
        f,
        "{label} [{}]: '{}' (Service: '{}', HTTP Status Code: {}",
        payload.error_code(),
        payload.message(),
        payload.service().unwrap_or("-"),
        Optional(payload.http_status_code()),
    )?;
    if let Some(frame) = payload.stack_trace().and_then(<[String]>::first) {
        write!(f, ", {frame}")?;
    }
    f.write_str(")")
}

fn write_dump(f: &mut fmt::Formatter<'_>, label: &str, payload: &ErrorPayload) -> fmt::Result {
    writeln!(f, "{label} [{}]: {}", payload.error_code(), payload.message())?;
    writeln!(f, "  service: {}", payload.service().unwrap_or("-"))?;
    writeln!(f, "  http_status_code: {}", Optional(payload.http_status_code()))?;
    writeln!(f, "  timestamp: {}", payload.timestamp())?;
    writeln!(f, "  trace_id: {}", payload.trace_id().unwrap_or("-"))?;
    write!(
        f,
        "  exception_type: {}",
        payload.exception_type().unwrap_or("-")
    )?;
    if let Some(details) = payload.details() {
        write!(f, "\n  details: {}", Value::Object(details.clone()))?;
    }
    if let Some(frames) = payload.stack_trace() {
        f.write_str("\n  stack_trace:")?;
        for frame in frames {
            write!(f, "\n    {frame}")?;
        }
    }
    Ok(())
}

struct Optional<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => value.fmt(f),
            None => f.write_str("-"),
        }
    }
}
