use serde::Serialize;
use serde_json::Value;

/// What a transport layer needs to answer a request with an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    /// HTTP status to set on the response.
    pub status: u16,
    /// `{"error": ...}` body, already gated by detail level and environment.
    pub body: Value,
}
