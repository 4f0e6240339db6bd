//! The raiseable error type.
//!
//! A [`ServiceError`] wraps one [`ErrorPayload`] and adds interop with native
//! Rust errors: it implements `std::error::Error`, can be built from any
//! failure (walking its `source()` chain into `inner_error`), and can carry a
//! `previous` error that is reported through `source()`. All data operations
//! delegate to the payload.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::MalformedPayload;
use crate::failure::{
    PanicFailure, UNKNOWN_FAILURE_TYPE, classify, known_type_name, short_type_name,
};
use crate::payload::{ErrorPayload, MAX_CHAIN_DEPTH};
use crate::render::{self, DetailLevel, Environment};
use crate::stack;

/// Variant name back-filled into `exception_type` by [`ServiceError::new`].
pub const SERVICE_ERROR_VARIANT: &str = "ServiceError";

/// Status used when converting failures without an explicit one.
pub const DEFAULT_HTTP_STATUS: u16 = 500;

/// A structured error raised in program control flow.
#[derive(Debug, Clone)]
pub struct ServiceError {
    payload: ErrorPayload,
    previous: Option<Arc<dyn StdError + Send + Sync + 'static>>,
}

impl ServiceError {
    /// Wrap a payload.
    ///
    /// Absent `exception_type` is back-filled with `ServiceError`; an absent
    /// stack trace is captured at the caller's location.
    #[track_caller]
    #[must_use]
    pub fn new(payload: ErrorPayload) -> Self {
        Self::construct(payload, SERVICE_ERROR_VARIANT, 0, Location::caller())
    }

    /// Like [`new`](Self::new), but a non-zero `http_status_code` overwrites
    /// whatever status the payload carries.
    #[track_caller]
    #[must_use]
    pub fn with_status(payload: ErrorPayload, http_status_code: u16) -> Self {
        Self::construct(
            payload,
            SERVICE_ERROR_VARIANT,
            http_status_code,
            Location::caller(),
        )
    }

    /// Construction path for the named constructors, which know their own
    /// variant name.
    #[track_caller]
    pub(crate) fn of_variant(payload: ErrorPayload, variant: &str, http_status_code: u16) -> Self {
        Self::construct(payload, variant, http_status_code, Location::caller())
    }

    fn construct(
        mut payload: ErrorPayload,
        variant: &str,
        http_status_code: u16,
        location: &Location<'_>,
    ) -> Self {
        payload.fill_exception_type(variant);
        if !payload.has_stack_trace() {
            payload.fill_stack_trace(stack::capture_at(location));
        }
        payload.override_http_status_code(http_status_code);
        Self {
            payload,
            previous: None,
        }
    }

    /// Re-wrap a payload taken from a chain without any back-fill.
    const fn rewrap(payload: ErrorPayload) -> Self {
        Self {
            payload,
            previous: None,
        }
    }

    // -----------------------------------------------------------------------
    // Construction-time builders
    // -----------------------------------------------------------------------

    /// Record the error this one was raised in response to. It is reported
    /// through [`source`](StdError::source) and is independent of the
    /// payload's `inner_error`.
    #[must_use]
    pub fn caused_by<E>(mut self, previous: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.previous = Some(Arc::new(previous));
        self
    }

    #[must_use]
    pub fn with_details(mut self, details: Map<String, Value>) -> Self {
        self.payload = self.payload.with_details(details);
        self
    }

    /// Attach another service error's payload as this one's cause.
    #[must_use]
    pub fn with_inner_error(mut self, inner: Self) -> Self {
        self.payload = self.payload.with_inner_error(inner.payload);
        self
    }

    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.payload = self.payload.with_trace_id(trace_id);
        self
    }

    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.payload = self.payload.with_service(service);
        self
    }

    /// Set `service` only if the payload has none.
    #[must_use]
    pub fn with_service_fallback(mut self, service: &str) -> Self {
        self.payload.fill_service(service);
        self
    }

    /// Set `trace_id` only if the payload has none.
    #[must_use]
    pub fn with_trace_id_fallback(mut self, trace_id: &str) -> Self {
        self.payload.fill_trace_id(trace_id);
        self
    }

    /// Set `http_status_code` only if the payload has none.
    #[must_use]
    pub fn with_status_fallback(mut self, http_status_code: u16) -> Self {
        self.payload.fill_http_status_code(http_status_code);
        self
    }

    // -----------------------------------------------------------------------
    // Native failure interop
    // -----------------------------------------------------------------------

    /// Convert any failure into a service error.
    ///
    /// A failure that already is a `ServiceError` is returned as is, with
    /// `service` back-filled if it was absent. Otherwise the failure is
    /// classified, its `source()` chain becomes the `inner_error` chain, and
    /// the stack is captured at the caller's location.
    #[track_caller]
    pub fn from_failure<E>(failure: E, service: &str, http_status_code: u16) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let location = Location::caller();
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(failure);
        match boxed.downcast::<Self>() {
            Ok(existing) => (*existing).with_service_fallback(service),
            Err(failure) => Self::convert(
                &*failure,
                known_type_name(&*failure).unwrap_or_else(short_type_name::<E>),
                service,
                http_status_code,
                stack::capture_at(location),
            ),
        }
    }

    /// [`from_failure`](Self::from_failure) for a borrowed, dynamically typed
    /// failure. The type name is only known for the types the classifier
    /// recognises.
    #[track_caller]
    #[must_use]
    pub fn from_failure_ref(
        failure: &(dyn StdError + 'static),
        service: &str,
        http_status_code: u16,
    ) -> Self {
        if let Some(existing) = failure.downcast_ref::<Self>() {
            return existing.clone().with_service_fallback(service);
        }
        let type_name = known_type_name(failure).unwrap_or(UNKNOWN_FAILURE_TYPE);
        Self::convert(
            failure,
            type_name,
            service,
            http_status_code,
            stack::capture(),
        )
    }

    /// Convert an `anyhow::Error`, using its captured backtrace when it has
    /// one. Context layers become levels of the `inner_error` chain.
    #[track_caller]
    pub fn from_anyhow(error: anyhow::Error, service: &str, http_status_code: u16) -> Self {
        let location = Location::caller();
        // `downcast` also sees through `.context(..)`; only pass through when
        // the service error is the outermost layer.
        let outermost: &(dyn StdError + 'static) = error.as_ref();
        let error = if outermost.is::<Self>() {
            match error.downcast::<Self>() {
                Ok(existing) => return existing.with_service_fallback(service),
                Err(error) => error,
            }
        } else {
            error
        };
        let failure: &(dyn StdError + 'static) = error.as_ref();
        let type_name = known_type_name(failure).unwrap_or(UNKNOWN_FAILURE_TYPE);
        let frames = stack::with_backtrace(location, error.backtrace());
        Self::convert(failure, type_name, service, http_status_code, frames)
    }

    /// Convert a panic payload caught with `std::panic::catch_unwind`.
    #[track_caller]
    #[must_use]
    pub fn from_panic(panic: &(dyn Any + Send), service: &str) -> Self {
        let failure = PanicFailure::from_panic_payload(panic);
        Self::convert(
            &failure,
            "Panic",
            service,
            DEFAULT_HTTP_STATUS,
            stack::capture(),
        )
    }

    fn convert(
        failure: &(dyn StdError + 'static),
        type_name: &str,
        service: &str,
        http_status_code: u16,
        frames: Vec<String>,
    ) -> Self {
        let mut payload = ErrorPayload::from_parts(
            message_of(failure, type_name),
            classify(failure).as_str().to_string(),
        )
        .with_service(service)
        .with_exception_type(type_name)
        .with_stack_trace(frames)
        .with_http_status_code(http_status_code);

        if let Some(inner) = failure
            .source()
            .and_then(|cause| cause_payload(cause, service, 1))
        {
            payload = payload.with_inner_error(inner);
        }
        Self::rewrap(payload)
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    /// Parse `{"error": {...}}` JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPayload`] if the text is not JSON, is not an
    /// object, lacks an object-valued `error` key, or the body fails
    /// [`ErrorPayload::try_from_map`].
    #[track_caller]
    pub fn try_from_json(text: &str) -> Result<Self, MalformedPayload> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| MalformedPayload::InvalidJson(e.to_string()))?;
        match value {
            Value::Object(map) => Self::try_from_envelope(&map),
            _ => Err(MalformedPayload::InvalidEnvelope(
                "JSON must be an object".into(),
            )),
        }
    }

    /// [`try_from_json`](Self::try_from_json) for raw bytes, e.g. a request
    /// body or a file read without decoding.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPayload::InvalidEncoding`] if `bytes` is not UTF-8,
    /// otherwise as [`try_from_json`](Self::try_from_json).
    #[track_caller]
    pub fn try_from_json_bytes(bytes: &[u8]) -> Result<Self, MalformedPayload> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| MalformedPayload::InvalidEncoding(e.to_string()))?;
        Self::try_from_json(text)
    }

    /// Parse an already decoded envelope map.
    ///
    /// # Errors
    ///
    /// See [`try_from_json`](Self::try_from_json).
    #[track_caller]
    pub fn try_from_envelope(envelope: &Map<String, Value>) -> Result<Self, MalformedPayload> {
        let Some(Value::Object(body)) = envelope.get("error") else {
            return Err(MalformedPayload::InvalidEnvelope(
                "\"error\" key missing or not an object".into(),
            ));
        };
        match ErrorPayload::try_from_map(body) {
            Ok(payload) => Ok(Self::new(payload)),
            Err(error) => Err(error),
        }
    }

    /// Lenient [`try_from_json`](Self::try_from_json).
    #[track_caller]
    #[must_use]
    pub fn from_json(text: &str) -> Option<Self> {
        discard_malformed(Self::try_from_json(text))
    }

    /// Lenient [`try_from_json_bytes`](Self::try_from_json_bytes).
    #[track_caller]
    #[must_use]
    pub fn from_json_bytes(bytes: &[u8]) -> Option<Self> {
        discard_malformed(Self::try_from_json_bytes(bytes))
    }

    /// Lenient [`try_from_envelope`](Self::try_from_envelope).
    #[track_caller]
    #[must_use]
    pub fn from_envelope(envelope: &Map<String, Value>) -> Option<Self> {
        discard_malformed(Self::try_from_envelope(envelope))
    }

    /// Parse JSON text with an explicit strictness flag.
    ///
    /// # Errors
    ///
    /// Only in strict mode, see [`try_from_json`](Self::try_from_json).
    #[track_caller]
    pub fn parse_json(text: &str, strict: bool) -> Result<Option<Self>, MalformedPayload> {
        if strict {
            Self::try_from_json(text).map(Some)
        } else {
            Ok(Self::from_json(text))
        }
    }

    /// Parse raw JSON bytes with an explicit strictness flag.
    ///
    /// # Errors
    ///
    /// Only in strict mode, see [`try_from_json_bytes`](Self::try_from_json_bytes).
    #[track_caller]
    pub fn parse_json_bytes(bytes: &[u8], strict: bool) -> Result<Option<Self>, MalformedPayload> {
        if strict {
            Self::try_from_json_bytes(bytes).map(Some)
        } else {
            Ok(Self::from_json_bytes(bytes))
        }
    }

    /// Parse an envelope map with an explicit strictness flag.
    ///
    /// # Errors
    ///
    /// Only in strict mode, see [`try_from_envelope`](Self::try_from_envelope).
    #[track_caller]
    pub fn parse_envelope(
        envelope: &Map<String, Value>,
        strict: bool,
    ) -> Result<Option<Self>, MalformedPayload> {
        if strict {
            Self::try_from_envelope(envelope).map(Some)
        } else {
            Ok(Self::from_envelope(envelope))
        }
    }

    // -----------------------------------------------------------------------
    // Serialization and rendering
    // -----------------------------------------------------------------------

    /// The payload's wire map (without the envelope).
    #[must_use]
    pub fn to_map(&self) -> Map<String, Value> {
        self.payload.to_map()
    }

    /// `{"error": <wire map>}`.
    #[must_use]
    pub fn to_envelope(&self) -> Value {
        let mut envelope = Map::new();
        envelope.insert("error".into(), Value::Object(self.to_map()));
        Value::Object(envelope)
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        self.to_envelope().to_string()
    }

    /// `{"error": <rendered body>}` for an API consumer.
    #[must_use]
    pub fn api_response(&self, level: DetailLevel, environment: &Environment) -> Value {
        self.payload.api_envelope(level, environment)
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[must_use]
    pub const fn payload(&self) -> &ErrorPayload {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> ErrorPayload {
        self.payload
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.payload.message()
    }

    #[must_use]
    pub fn error_code(&self) -> &str {
        self.payload.error_code()
    }

    #[must_use]
    pub fn service(&self) -> Option<&str> {
        self.payload.service()
    }

    #[must_use]
    pub fn timestamp(&self) -> &str {
        self.payload.timestamp()
    }

    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.payload.trace_id()
    }

    #[must_use]
    pub fn exception_type(&self) -> Option<&str> {
        self.payload.exception_type()
    }

    #[must_use]
    pub const fn details(&self) -> Option<&Map<String, Value>> {
        self.payload.details()
    }

    /// The inner payload, re-wrapped.
    #[must_use]
    pub fn inner_error(&self) -> Option<Self> {
        self.payload.inner_error().cloned().map(Self::rewrap)
    }

    #[must_use]
    pub fn stack_trace(&self) -> Option<&[String]> {
        self.payload.stack_trace()
    }

    #[must_use]
    pub const fn http_status_code(&self) -> Option<u16> {
        self.payload.http_status_code()
    }

    /// The last payload of the chain, re-wrapped.
    #[must_use]
    pub fn root_cause(&self) -> Self {
        Self::rewrap(self.payload.root_cause().clone())
    }

    #[must_use]
    pub fn all_messages(&self) -> Vec<&str> {
        self.payload.all_messages()
    }
}

/// Payload for one link of a native `source()` chain.
fn cause_payload(
    cause: &(dyn StdError + 'static),
    service: &str,
    depth: usize,
) -> Option<ErrorPayload> {
    if depth >= MAX_CHAIN_DEPTH {
        return None;
    }
    if let Some(existing) = cause.downcast_ref::<ServiceError>() {
        let mut payload = existing.payload.clone();
        payload.fill_service(service);
        return Some(payload);
    }

    let type_name = known_type_name(cause).unwrap_or(UNKNOWN_FAILURE_TYPE);
    let mut payload = ErrorPayload::from_parts(
        message_of(cause, type_name),
        classify(cause).as_str().to_string(),
    )
    .with_service(service)
    .with_exception_type(type_name)
    .with_http_status_code(DEFAULT_HTTP_STATUS);

    if let Some(inner) = cause
        .source()
        .and_then(|next| cause_payload(next, service, depth + 1))
    {
        payload = payload.with_inner_error(inner);
    }
    Some(payload)
}

/// Display text of a failure; the type name when that text is empty.
fn message_of(failure: &(dyn StdError + 'static), type_name: &str) -> String {
    let message = failure.to_string();
    if message.is_empty() {
        type_name.to_string()
    } else {
        message
    }
}

fn discard_malformed(result: Result<ServiceError, MalformedPayload>) -> Option<ServiceError> {
    match result {
        Ok(error) => Some(error),
        Err(error) => {
            tracing::debug!(%error, "discarding malformed error envelope");
            None
        }
    }
}

/// `{}` prints one summary line per chain link; `{:#}` prints the full
/// multi-line field dump.
impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render::write_text(f, SERVICE_ERROR_VARIANT, &self.payload, f.alternate())
    }
}

impl StdError for ServiceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.previous
            .as_deref()
            .map(|previous| previous as &(dyn StdError + 'static))
    }
}

/// Serializes as the `{"error": {...}}` envelope.
impl Serialize for ServiceError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_envelope().serialize(serializer)
    }
}
