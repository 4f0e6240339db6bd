//! # fault-core
//!
//! Structured service errors for Faultline.
//!
//! This crate defines how an error is represented when it crosses a service
//! boundary:
//! - `ErrorPayload`: the serializable error record with an owned cause chain
//! - `ServiceError`: the `std::error::Error` carrier built around a payload,
//!   including conversion from native failures, panics and `anyhow` errors
//! - Named error codes and constructors (`access_denied`, ...)
//! - Detail-gated rendering for API consumers, and text rendering for logs
//! - The `{"error": {...}}` wire envelope and its JSON Schema
//!
//! ```
//! use fault_core::{DetailLevel, Environment, ServiceError};
//!
//! let failure = "12a".parse::<u32>().unwrap_err();
//! let err = ServiceError::from_failure(failure, "billing", 500);
//! assert_eq!(err.error_code(), "INVALID_ARGUMENT");
//!
//! let body = err.api_response(DetailLevel::Minimal, &Environment::Production);
//! assert_eq!(body["error"]["service"], "billing");
//! ```

pub mod codes;
pub mod errors;
pub mod failure;
pub mod kinds;
pub mod payload;
pub mod render;
pub mod service_error;
pub mod stack;
pub mod wire;

pub use codes::ErrorCode;
pub use errors::MalformedPayload;
pub use payload::{ErrorPayload, MAX_CHAIN_DEPTH};
pub use render::{DetailLevel, Environment};
pub use service_error::{DEFAULT_HTTP_STATUS, ServiceError};
