//! Named error codes.
//!
//! The payload's `code` is free text on the wire, but every code Faultline
//! itself produces comes from this closed set. Each code carries the HTTP
//! status and the variant name its named constructor uses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Codes produced by the named constructors and by failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "access_denied")]
    AccessDenied,
    #[serde(rename = "authorization_required")]
    AuthorizationRequired,
    #[serde(rename = "input_validation_error")]
    InputValidation,
    /// The failure signals a problem with caller-supplied input.
    #[serde(rename = "INVALID_ARGUMENT")]
    InvalidArgument,
    /// The failure signals a programming or runtime fault.
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
    /// Any other failure.
    #[serde(rename = "EXCEPTION")]
    Exception,
}

impl ErrorCode {
    pub const ALL: [Self; 6] = [
        Self::AccessDenied,
        Self::AuthorizationRequired,
        Self::InputValidation,
        Self::InvalidArgument,
        Self::InternalError,
        Self::Exception,
    ];

    /// The string written to the payload's `code` field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::AuthorizationRequired => "authorization_required",
            Self::InputValidation => "input_validation_error",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Exception => "EXCEPTION",
        }
    }

    /// Map a wire code back to a known variant. Matching is exact.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn default_http_status(self) -> u16 {
        match self {
            Self::AccessDenied => 403,
            Self::AuthorizationRequired => 401,
            Self::InputValidation => 400,
            Self::InvalidArgument => 400,
            Self::InternalError | Self::Exception => 500,
        }
    }

    /// Fallback message used when a constructor receives empty text.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::AccessDenied => "Access denied",
            Self::AuthorizationRequired => "Authorization is required for this endpoint",
            Self::InputValidation => "Input validation failed",
            Self::InvalidArgument => "Invalid argument",
            Self::InternalError => "Internal error",
            Self::Exception => "Unexpected error",
        }
    }

    /// Name back-filled into `exception_type` by the named constructors.
    #[must_use]
    pub const fn variant_name(self) -> &'static str {
        match self {
            Self::AccessDenied => "AccessDeniedServiceError",
            Self::AuthorizationRequired => "AuthorizationRequiredServiceError",
            Self::InputValidation => "InputValidationServiceError",
            Self::InvalidArgument | Self::InternalError | Self::Exception => {
                crate::service_error::SERVICE_ERROR_VARIANT
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inverts_as_str() {
        for code in ErrorCode::ALL {
            assert_eq!(ErrorCode::parse(code.as_str()), Some(code));
        }
        assert_eq!(ErrorCode::parse("ACCESS_DENIED"), None);
        assert_eq!(ErrorCode::parse(""), None);
    }

    #[test]
    fn serde_uses_wire_codes() {
        let json = serde_json::to_string(&ErrorCode::InputValidation).unwrap();
        assert_eq!(json, "\"input_validation_error\"");
        let code: ErrorCode = serde_json::from_str("\"INTERNAL_ERROR\"").unwrap();
        assert_eq!(code, ErrorCode::InternalError);
    }

    #[test]
    fn named_codes_carry_their_status() {
        assert_eq!(ErrorCode::AccessDenied.default_http_status(), 403);
        assert_eq!(ErrorCode::AuthorizationRequired.default_http_status(), 401);
        assert_eq!(ErrorCode::InputValidation.default_http_status(), 400);
    }
}
