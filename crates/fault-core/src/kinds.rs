//! Named constructors for common service errors.
//!
//! Each returns a [`ServiceError`] pre-populated with a fixed code, HTTP
//! status and variant name. Details and causes are attached with the
//! builder methods on `ServiceError`:
//!
//! ```
//! use fault_core::kinds;
//!
//! let err = kinds::input_validation("email is required").with_trace_id("req-42");
//! assert_eq!(err.error_code(), "input_validation_error");
//! assert_eq!(err.http_status_code(), Some(400));
//! ```

use crate::codes::ErrorCode;
use crate::payload::ErrorPayload;
use crate::service_error::ServiceError;

/// Build a service error for one of the named codes. An empty message falls
/// back to the code's default message.
#[track_caller]
#[must_use]
pub fn named(code: ErrorCode, message: impl Into<String>) -> ServiceError {
    ServiceError::of_variant(
        ErrorPayload::for_code(code, message),
        code.variant_name(),
        code.default_http_status(),
    )
}

/// `access_denied`, HTTP 403.
#[track_caller]
#[must_use]
pub fn access_denied(message: impl Into<String>) -> ServiceError {
    named(ErrorCode::AccessDenied, message)
}

/// `authorization_required`, HTTP 401, with the default message.
#[track_caller]
#[must_use]
pub fn authorization_required() -> ServiceError {
    named(ErrorCode::AuthorizationRequired, "")
}

/// `authorization_required`, HTTP 401.
#[track_caller]
#[must_use]
pub fn authorization_required_with(message: impl Into<String>) -> ServiceError {
    named(ErrorCode::AuthorizationRequired, message)
}

/// `input_validation_error`, HTTP 400.
#[track_caller]
#[must_use]
pub fn input_validation(message: impl Into<String>) -> ServiceError {
    named(ErrorCode::InputValidation, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    #[test]
    fn access_denied_is_403() {
        let err = access_denied("not your document");
        assert_eq!(err.error_code(), "access_denied");
        assert_eq!(err.message(), "not your document");
        assert_eq!(err.http_status_code(), Some(403));
        assert_eq!(err.exception_type(), Some("AccessDeniedServiceError"));
    }

    #[test]
    fn authorization_required_has_default_message() {
        let err = authorization_required();
        assert_eq!(err.message(), "Authorization is required for this endpoint");
        assert_eq!(err.http_status_code(), Some(401));
        assert_eq!(
            authorization_required_with("token expired").message(),
            "token expired"
        );
    }

    #[test]
    fn input_validation_carries_details_and_cause() {
        let mut details = Map::new();
        details.insert("field".into(), json!("email"));
        let cause = access_denied("nested");
        let err = input_validation("bad email")
            .with_details(details.clone())
            .with_inner_error(cause);
        assert_eq!(err.http_status_code(), Some(400));
        assert_eq!(err.details(), Some(&details));
        assert_eq!(err.all_messages(), vec!["bad email", "nested"]);
    }

    #[test]
    fn stack_points_at_the_call_site() {
        let line = line!() + 1;
        let err = input_validation("x");
        assert_eq!(
            err.stack_trace().unwrap()[0],
            format!("Thrown in {} on line {line}", file!())
        );
    }
}
