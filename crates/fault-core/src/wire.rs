//! Wire shape of the error envelope, for JSON Schema export.
//!
//! These structs mirror what [`ErrorPayload::to_map`](crate::ErrorPayload::to_map)
//! writes. They are the schemars source of truth for external tooling and a
//! typed view for clients that only need the canonical form; the payload
//! itself is parsed by hand so it can accept legacy key names.

use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{"error": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ErrorEnvelope {
    pub error: WirePayload,
}

/// One payload in canonical key form.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct WirePayload {
    /// Human-readable description.
    pub message: String,
    /// Short machine-readable category, e.g. `access_denied`.
    pub code: String,
    /// Originating service.
    pub service: Option<String>,
    /// ISO 8601 time the error was constructed.
    pub timestamp: Option<String>,
    /// Correlation id.
    pub trace_id: Option<String>,
    /// Short type name of the originating failure.
    pub exception_type: Option<String>,
    /// Arbitrary structured context.
    pub details: Option<Map<String, Value>>,
    /// The failure that caused this one.
    pub inner_error: Option<Box<WirePayload>>,
    /// Formatted frames, `Thrown in ...` first.
    pub stack_trace: Option<Vec<String>>,
    /// Suggested transport status.
    pub http_status_code: Option<u16>,
}

/// JSON Schema of [`ErrorEnvelope`].
#[must_use]
pub fn envelope_schema() -> Value {
    serde_json::to_value(schema_for!(ErrorEnvelope)).unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorPayload, kinds};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn schema_requires_message_and_code() {
        let schema = envelope_schema();
        let text = schema.to_string();
        assert!(text.contains("\"message\""));
        assert!(text.contains("\"inner_error\""));
        assert_eq!(schema["required"], serde_json::json!(["error"]));
    }

    #[test]
    fn written_envelopes_decode_into_wire_types() {
        let err = kinds::input_validation("email is required")
            .with_service("signup")
            .with_details(json!({"field": "email"}).as_object().cloned().unwrap());
        let envelope: ErrorEnvelope = serde_json::from_str(&err.to_json()).unwrap();

        assert_eq!(envelope.error.code, "input_validation_error");
        assert_eq!(envelope.error.message, "email is required");
        assert_eq!(envelope.error.service.as_deref(), Some("signup"));
        assert_eq!(envelope.error.http_status_code, Some(400));
        assert_eq!(envelope.error.inner_error, None);
        assert_eq!(envelope.error.details, err.details().cloned());
    }

    #[test]
    fn wire_types_serialize_to_parseable_payloads() {
        let wire = WirePayload {
            message: "upstream timed out".into(),
            code: "EXCEPTION".into(),
            service: Some("gateway".into()),
            timestamp: Some("2026-02-08T12:00:00+00:00".into()),
            trace_id: Some("abc".into()),
            exception_type: None,
            details: None,
            inner_error: Some(Box::new(WirePayload {
                message: "read timed out".into(),
                code: "EXCEPTION".into(),
                service: None,
                timestamp: Some("2026-02-08T11:59:59+00:00".into()),
                trace_id: None,
                exception_type: None,
                details: None,
                inner_error: None,
                stack_trace: None,
                http_status_code: None,
            })),
            stack_trace: None,
            http_status_code: Some(504),
        };

        let value = serde_json::to_value(&wire).unwrap();
        let payload = ErrorPayload::try_from_map(value.as_object().unwrap()).unwrap();
        assert_eq!(payload.trace_id(), Some("abc"));
        assert_eq!(payload.all_messages(), vec!["upstream timed out", "read timed out"]);

        let back: WirePayload = serde_json::from_value(Value::Object(payload.to_map())).unwrap();
        assert_eq!(back, wire);
    }
}
