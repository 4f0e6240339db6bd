//! The structured error payload.
//!
//! An [`ErrorPayload`] is the data describing one error occurrence: message,
//! code, provenance, and an optional owned cause. Payloads are built once
//! (directly, parsed from a map, or derived from a native failure) and are
//! not mutated afterwards, apart from the crate-internal back-fill of fields
//! that were absent at construction.
//!
//! The cause chain is an owned `Option<Box<ErrorPayload>>`, so a payload can
//! never reference one of its ancestors and every chain is finite.

use std::iter::FusedIterator;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::codes::ErrorCode;
use crate::errors::MalformedPayload;

/// Most payloads a cause chain may hold, counting the outermost one. Parsing
/// rejects deeper input; building and converting drop the innermost links.
pub const MAX_CHAIN_DEPTH: usize = 32;

/// Current time in ISO 8601 form, e.g. `2026-02-08T12:00:00+00:00`.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// One error occurrence, including its cause chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    message: String,
    error_code: String,
    service: Option<String>,
    timestamp: String,
    trace_id: Option<String>,
    exception_type: Option<String>,
    details: Option<Map<String, Value>>,
    inner_error: Option<Box<ErrorPayload>>,
    stack_trace: Option<Vec<String>>,
    http_status_code: Option<u16>,
}

impl ErrorPayload {
    /// Build a payload from its two required fields. The timestamp is set to
    /// the current time; every other field starts absent.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPayload::EmptyField`] if `message` or `error_code`
    /// is empty.
    pub fn new(
        message: impl Into<String>,
        error_code: impl Into<String>,
    ) -> Result<Self, MalformedPayload> {
        let message = message.into();
        let error_code = error_code.into();
        if message.is_empty() {
            return Err(MalformedPayload::EmptyField("message"));
        }
        if error_code.is_empty() {
            return Err(MalformedPayload::EmptyField("code"));
        }
        Ok(Self::from_parts(message, error_code))
    }

    /// Build a payload for a known code. An empty message falls back to the
    /// code's default message, so this cannot fail.
    #[must_use]
    pub fn for_code(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            code.default_message().to_string()
        } else {
            message
        };
        Self::from_parts(message, code.as_str().to_string())
    }

    /// Caller guarantees both strings are non-empty.
    pub(crate) fn from_parts(message: String, error_code: String) -> Self {
        debug_assert!(!message.is_empty() && !error_code.is_empty());
        Self {
            message,
            error_code,
            service: None,
            timestamp: now_timestamp(),
            trace_id: None,
            exception_type: None,
            details: None,
            inner_error: None,
            stack_trace: None,
            http_status_code: None,
        }
    }

    // -----------------------------------------------------------------------
    // Construction-time setters
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Replace the construction timestamp (e.g. when relaying a remote error).
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    #[must_use]
    pub fn with_exception_type(mut self, exception_type: impl Into<String>) -> Self {
        self.exception_type = Some(exception_type.into());
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.details = Some(details);
        self
    }

    /// Attach the payload of the failure that caused this one.
    ///
    /// Links of `inner` beyond [`MAX_CHAIN_DEPTH`] are dropped, innermost
    /// first, so every chain built here parses back.
    #[must_use]
    pub fn with_inner_error(mut self, mut inner: Self) -> Self {
        inner.truncate_chain(MAX_CHAIN_DEPTH - 1);
        self.inner_error = Some(Box::new(inner));
        self
    }

    /// Keep only the first `links` payloads of the chain (at least one).
    fn truncate_chain(&mut self, links: usize) {
        if links <= 1 {
            self.inner_error = None;
        } else if let Some(inner) = self.inner_error.as_deref_mut() {
            inner.truncate_chain(links - 1);
        }
    }

    #[must_use]
    pub fn with_stack_trace(mut self, frames: Vec<String>) -> Self {
        self.stack_trace = Some(frames);
        self
    }

    /// `0` means "unset" and leaves the status absent.
    #[must_use]
    pub fn with_http_status_code(mut self, status: u16) -> Self {
        self.http_status_code = (status != 0).then_some(status);
        self
    }

    // -----------------------------------------------------------------------
    // One-time enrichment (fills only what is absent)
    // -----------------------------------------------------------------------

    pub(crate) fn fill_service(&mut self, service: &str) {
        if self.service.is_none() && !service.is_empty() {
            self.service = Some(service.to_string());
        }
    }

    pub(crate) fn fill_trace_id(&mut self, trace_id: &str) {
        if self.trace_id.is_none() && !trace_id.is_empty() {
            self.trace_id = Some(trace_id.to_string());
        }
    }

    pub(crate) fn fill_exception_type(&mut self, exception_type: &str) {
        if self.exception_type.is_none() {
            self.exception_type = Some(exception_type.to_string());
        }
    }

    pub(crate) const fn has_stack_trace(&self) -> bool {
        self.stack_trace.is_some()
    }

    pub(crate) fn fill_stack_trace(&mut self, frames: Vec<String>) {
        if self.stack_trace.is_none() {
            self.stack_trace = Some(frames);
        }
    }

    pub(crate) const fn fill_http_status_code(&mut self, status: u16) {
        if self.http_status_code.is_none() && status != 0 {
            self.http_status_code = Some(status);
        }
    }

    /// A non-zero caller-supplied status always wins over the embedded one.
    pub(crate) const fn override_http_status_code(&mut self, status: u16) {
        if status != 0 {
            self.http_status_code = Some(status);
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn error_code(&self) -> &str {
        &self.error_code
    }

    /// The code as an [`ErrorCode`], if it is one of the named codes.
    #[must_use]
    pub fn known_code(&self) -> Option<ErrorCode> {
        ErrorCode::parse(&self.error_code)
    }

    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    #[must_use]
    pub fn exception_type(&self) -> Option<&str> {
        self.exception_type.as_deref()
    }

    #[must_use]
    pub const fn details(&self) -> Option<&Map<String, Value>> {
        self.details.as_ref()
    }

    #[must_use]
    pub fn inner_error(&self) -> Option<&Self> {
        self.inner_error.as_deref()
    }

    #[must_use]
    pub fn stack_trace(&self) -> Option<&[String]> {
        self.stack_trace.as_deref()
    }

    #[must_use]
    pub const fn http_status_code(&self) -> Option<u16> {
        self.http_status_code
    }

    // -----------------------------------------------------------------------
    // Cause chain
    // -----------------------------------------------------------------------

    /// Iterate the chain starting with `self`, then each inner payload.
    #[must_use]
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// The last payload in the chain; `self` when there is no inner error.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        let mut current = self;
        while let Some(inner) = current.inner_error() {
            current = inner;
        }
        current
    }

    /// Messages along the chain, outermost first.
    #[must_use]
    pub fn all_messages(&self) -> Vec<&str> {
        self.chain().map(Self::message).collect()
    }

    // -----------------------------------------------------------------------
    // Map conversion
    // -----------------------------------------------------------------------

    /// Serialize to the canonical wire map. Every key is present; absent
    /// values are written as `null`.
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("message".into(), Value::String(self.message.clone()));
        map.insert("code".into(), Value::String(self.error_code.clone()));
        map.insert("service".into(), opt_string(self.service.as_ref()));
        map.insert("timestamp".into(), Value::String(self.timestamp.clone()));
        map.insert("trace_id".into(), opt_string(self.trace_id.as_ref()));
        map.insert(
            "exception_type".into(),
            opt_string(self.exception_type.as_ref()),
        );
        map.insert(
            "details".into(),
            self.details.clone().map_or(Value::Null, Value::Object),
        );
        map.insert(
            "inner_error".into(),
            self.inner_error
                .as_ref()
                .map_or(Value::Null, |inner| Value::Object(inner.to_map())),
        );
        map.insert(
            "stack_trace".into(),
            self.stack_trace.as_ref().map_or(Value::Null, |frames| {
                Value::Array(frames.iter().cloned().map(Value::String).collect())
            }),
        );
        map.insert(
            "http_status_code".into(),
            self.http_status_code.map_or(Value::Null, Value::from),
        );
        map
    }

    /// Parse a wire map, failing on the first malformed field.
    ///
    /// Accepts both naming schemes seen in the wild (`code`/`errorCode`,
    /// `trace_id`/`traceId`, and camelCase forms of the other keys). `null`
    /// is treated as absent. An `http_status_code` of `0` is treated as
    /// unset.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPayload`] if `message` or `code` is missing, empty
    /// or not text, if an optional field has the wrong type, or if the
    /// `inner_error` chain is deeper than [`MAX_CHAIN_DEPTH`].
    pub fn try_from_map(map: &Map<String, Value>) -> Result<Self, MalformedPayload> {
        Self::parse_at_depth(map, 0)
    }

    /// Lenient variant of [`try_from_map`](Self::try_from_map): malformed
    /// input yields `None`, never a partial payload.
    #[must_use]
    pub fn from_map(map: &Map<String, Value>) -> Option<Self> {
        match Self::try_from_map(map) {
            Ok(payload) => Some(payload),
            Err(error) => {
                tracing::debug!(%error, "discarding malformed error payload");
                None
            }
        }
    }

    /// Parse with an explicit strictness flag. Strict mode surfaces the
    /// error; non-strict mode maps it to `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Only in strict mode, see [`try_from_map`](Self::try_from_map).
    pub fn parse_from(
        map: &Map<String, Value>,
        strict: bool,
    ) -> Result<Option<Self>, MalformedPayload> {
        if strict {
            Self::try_from_map(map).map(Some)
        } else {
            Ok(Self::from_map(map))
        }
    }

    fn parse_at_depth(map: &Map<String, Value>, depth: usize) -> Result<Self, MalformedPayload> {
        if depth >= MAX_CHAIN_DEPTH {
            return Err(MalformedPayload::TooDeep(MAX_CHAIN_DEPTH));
        }

        let message = required_text(map, &["message"], "message")?;
        let error_code = required_text(map, &["code", "errorCode", "error_code"], "code")?;

        let inner_error = match lookup(map, &["inner_error", "innerError"]) {
            None => None,
            Some(Value::Object(inner)) => Some(Box::new(Self::parse_at_depth(inner, depth + 1)?)),
            Some(_) => {
                return Err(MalformedPayload::WrongType {
                    field: "inner_error",
                    expected: "object",
                });
            }
        };

        Ok(Self {
            message,
            error_code,
            service: optional_text(map, &["service"], "service")?,
            timestamp: optional_text(map, &["timestamp"], "timestamp")?
                .unwrap_or_else(now_timestamp),
            trace_id: optional_text(map, &["trace_id", "traceId"], "trace_id")?,
            exception_type: optional_text(
                map,
                &["exception_type", "exceptionType"],
                "exception_type",
            )?,
            details: optional_object(map, &["details"], "details")?,
            inner_error,
            stack_trace: optional_frames(map)?,
            http_status_code: optional_status(map)?,
        })
    }
}

/// Iterator over a payload's cause chain, outermost first.
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a ErrorPayload>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a ErrorPayload;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.inner_error();
        Some(current)
    }
}

impl FusedIterator for Chain<'_> {}

impl Serialize for ErrorPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ErrorPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Self::try_from_map(&map).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn opt_string(value: Option<&String>) -> Value {
    value.map_or(Value::Null, |s| Value::String(s.clone()))
}

/// First non-null value under any of `keys`.
fn lookup<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| map.get(*key).filter(|value| !value.is_null()))
}

fn required_text(
    map: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<String, MalformedPayload> {
    match optional_text(map, keys, field)? {
        None => Err(MalformedPayload::MissingField(field)),
        Some(text) if text.is_empty() => Err(MalformedPayload::EmptyField(field)),
        Some(text) => Ok(text),
    }
}

fn optional_text(
    map: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<String>, MalformedPayload> {
    match lookup(map, keys) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(MalformedPayload::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn optional_object(
    map: &Map<String, Value>,
    keys: &[&str],
    field: &'static str,
) -> Result<Option<Map<String, Value>>, MalformedPayload> {
    match lookup(map, keys) {
        None => Ok(None),
        Some(Value::Object(object)) => Ok(Some(object.clone())),
        Some(_) => Err(MalformedPayload::WrongType {
            field,
            expected: "object",
        }),
    }
}

fn optional_frames(map: &Map<String, Value>) -> Result<Option<Vec<String>>, MalformedPayload> {
    const WRONG: MalformedPayload = MalformedPayload::WrongType {
        field: "stack_trace",
        expected: "array of strings",
    };
    let Some(value) = lookup(map, &["stack_trace", "stackTrace"]) else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(WRONG);
    };
    items
        .iter()
        .map(|item| item.as_str().map(str::to_string).ok_or(WRONG))
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn optional_status(map: &Map<String, Value>) -> Result<Option<u16>, MalformedPayload> {
    let Some(value) = lookup(map, &["http_status_code", "httpStatusCode"]) else {
        return Ok(None);
    };
    let status = value
        .as_u64()
        .and_then(|n| u16::try_from(n).ok())
        .ok_or(MalformedPayload::WrongType {
            field: "http_status_code",
            expected: "integer between 0 and 65535",
        })?;
    Ok((status != 0).then_some(status))
}
