//! Parse-time error type for Faultline.
//!
//! `MalformedPayload` is the only error the core raises. A `ServiceError`
//! value is data describing a modeled failure; a `MalformedPayload` means an
//! external representation could not be turned into one.

use thiserror::Error;

/// An external error representation (map, JSON text, envelope) that could not
/// be parsed into an [`ErrorPayload`](crate::payload::ErrorPayload).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPayload {
    /// A required field is absent or `null`.
    #[error("Required field '{0}' not set")]
    MissingField(&'static str),

    /// A required text field is present but empty.
    #[error("Required field '{0}' is empty")]
    EmptyField(&'static str),

    /// A field is present but holds a value of the wrong JSON type.
    #[error("Field '{field}' has the wrong type: expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    /// The outer `{"error": {...}}` wrapper is missing or not an object.
    #[error("Invalid error envelope: {0}")]
    InvalidEnvelope(String),

    /// Raw input bytes are not valid UTF-8.
    #[error("Input is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    /// The input text is not valid JSON.
    #[error("Invalid JSON provided: {0}")]
    InvalidJson(String),

    /// The `inner_error` chain nests deeper than the parser accepts.
    #[error("Cause chain exceeds the maximum depth of {0}")]
    TooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_field() {
        assert_eq!(
            MalformedPayload::MissingField("message").to_string(),
            "Required field 'message' not set"
        );
        assert_eq!(
            MalformedPayload::WrongType {
                field: "details",
                expected: "object",
            }
            .to_string(),
            "Field 'details' has the wrong type: expected object"
        );
    }
}
