//! The per-service error kernel.

use std::any::Any;
use std::error::Error as StdError;

use fault_config::FaultConfig;
use fault_core::{
    DEFAULT_HTTP_STATUS, DetailLevel, Environment, ErrorCode, ErrorPayload, MalformedPayload,
    ServiceError, kinds,
};
use serde_json::Value;

use crate::error::KernelError;
use crate::response::ApiResponse;
use crate::trace::generate_trace_id;

/// Service-scoped defaults applied to every error a process raises.
///
/// A kernel is built once per service (or per request, when each request
/// gets its own trace id) and stamps `service`, `trace_id` and a status onto
/// errors that lack them. Rendering uses the kernel's detail level and
/// environment.
#[derive(Debug, Clone)]
pub struct ErrorKernel {
    service_name: String,
    environment: Environment,
    trace_id: String,
    default_http_status_code: u16,
    detail_level: DetailLevel,
}

impl ErrorKernel {
    /// Kernel for `service_name` with production defaults: detail level 0,
    /// status 500, and a freshly generated trace id.
    #[must_use]
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            environment: Environment::Production,
            trace_id: generate_trace_id(),
            default_http_status_code: DEFAULT_HTTP_STATUS,
            detail_level: DetailLevel::Minimal,
        }
    }

    /// Build a kernel from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `KernelError::Config` if the service has no name.
    pub fn from_config(config: &FaultConfig) -> Result<Self, KernelError> {
        let service_name = config.require_service_name()?;
        let trace_id = if config.service.trace_id.trim().is_empty() {
            generate_trace_id()
        } else {
            config.service.trace_id.trim().to_string()
        };
        Ok(Self {
            service_name: service_name.to_string(),
            environment: config.service.environment.clone(),
            trace_id,
            default_http_status_code: config.render.default_http_status_code,
            detail_level: config.render.detail_level,
        })
    }

    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    #[must_use]
    pub const fn with_detail_level(mut self, detail_level: DetailLevel) -> Self {
        self.detail_level = detail_level;
        self
    }

    #[must_use]
    pub const fn with_default_http_status_code(mut self, status: u16) -> Self {
        self.default_http_status_code = status;
        self
    }

    /// Use a trace id supplied by the caller (e.g. from an incoming request
    /// header) instead of the generated one.
    ///
    /// # Errors
    ///
    /// Returns `KernelError::EmptyTraceId` for blank ids.
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Result<Self, KernelError> {
        let trace_id = trace_id.into();
        if trace_id.trim().is_empty() {
            return Err(KernelError::EmptyTraceId);
        }
        self.trace_id = trace_id;
        Ok(self)
    }

    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    #[must_use]
    pub const fn default_http_status_code(&self) -> u16 {
        self.default_http_status_code
    }

    #[must_use]
    pub const fn detail_level(&self) -> DetailLevel {
        self.detail_level
    }

    // -----------------------------------------------------------------------
    // Creating errors
    // -----------------------------------------------------------------------

    /// Create an error stamped with this kernel's service and trace id.
    ///
    /// The status is `http_status_code` if given, else the code's own status
    /// for named codes, else the kernel default.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedPayload::EmptyField`] if `code` or `message` is
    /// empty.
    #[track_caller]
    pub fn create_error(
        &self,
        code: impl Into<String>,
        message: impl Into<String>,
        http_status_code: Option<u16>,
    ) -> Result<ServiceError, MalformedPayload> {
        let payload = ErrorPayload::new(message, code)?;
        let status = http_status_code
            .or_else(|| payload.known_code().map(ErrorCode::default_http_status))
            .unwrap_or(self.default_http_status_code);
        Ok(self.stamp(ServiceError::with_status(payload, status)))
    }

    /// Create one of the named errors, stamped with this kernel's context.
    #[track_caller]
    #[must_use]
    pub fn named(&self, code: ErrorCode, message: impl Into<String>) -> ServiceError {
        self.stamp(kinds::named(code, message))
    }

    /// Wrap a hand-built payload, filling service, trace id and status where
    /// absent.
    #[track_caller]
    #[must_use]
    pub fn wrap(&self, payload: ErrorPayload) -> ServiceError {
        self.stamp(ServiceError::new(payload))
    }

    /// Convert a native failure. Existing service errors pass through with
    /// only absent fields filled.
    #[track_caller]
    pub fn from_failure<E>(&self, failure: E, http_status_code: Option<u16>) -> ServiceError
    where
        E: StdError + Send + Sync + 'static,
    {
        let status = http_status_code.unwrap_or(self.default_http_status_code);
        self.stamp(ServiceError::from_failure(
            failure,
            &self.service_name,
            status,
        ))
    }

    #[track_caller]
    pub fn from_anyhow(&self, error: anyhow::Error, http_status_code: Option<u16>) -> ServiceError {
        let status = http_status_code.unwrap_or(self.default_http_status_code);
        self.stamp(ServiceError::from_anyhow(error, &self.service_name, status))
    }

    /// Convert a panic payload caught with `std::panic::catch_unwind`.
    #[track_caller]
    #[must_use]
    pub fn from_panic(&self, panic: &(dyn Any + Send)) -> ServiceError {
        self.stamp(ServiceError::from_panic(panic, &self.service_name))
    }

    fn stamp(&self, error: ServiceError) -> ServiceError {
        error
            .with_service_fallback(&self.service_name)
            .with_trace_id_fallback(&self.trace_id)
            .with_status_fallback(self.default_http_status_code)
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    /// `{"error": ...}` rendered at this kernel's detail level and environment.
    #[must_use]
    pub fn api_response(&self, error: &ServiceError) -> Value {
        error.api_response(self.detail_level, &self.environment)
    }

    /// Status and body for a transport layer. Logs the error: server errors
    /// at `error`, everything else at `warn`.
    #[must_use]
    pub fn respond(&self, error: &ServiceError) -> ApiResponse {
        let status = error
            .http_status_code()
            .unwrap_or(self.default_http_status_code);
        let code = error.error_code();
        let trace_id = error.trace_id().unwrap_or("-");
        let service = error.service().unwrap_or("-");

        if status >= 500 {
            tracing::error!(code, status, trace_id, service, "{}", error.message());
        } else {
            tracing::warn!(code, status, trace_id, service, "{}", error.message());
        }
        tracing::debug!("service error detail:\n{error:#}");

        ApiResponse {
            status,
            body: self.api_response(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kernel() -> ErrorKernel {
        ErrorKernel::new("orders").with_trace_id("trace-1").unwrap()
    }

    #[test]
    fn new_uses_production_defaults() {
        let kernel = ErrorKernel::new("orders");
        assert_eq!(kernel.environment(), &Environment::Production);
        assert_eq!(kernel.detail_level(), DetailLevel::Minimal);
        assert_eq!(kernel.default_http_status_code(), 500);
        assert_eq!(kernel.trace_id().len(), 32);
    }

    #[test]
    fn blank_trace_id_is_rejected() {
        assert!(matches!(
            ErrorKernel::new("orders").with_trace_id("  "),
            Err(KernelError::EmptyTraceId)
        ));
    }

    #[test]
    fn create_error_stamps_context() {
        let err = kernel().create_error("out_of_stock", "no more widgets", None).unwrap();
        assert_eq!(err.service(), Some("orders"));
        assert_eq!(err.trace_id(), Some("trace-1"));
        assert_eq!(err.http_status_code(), Some(500));
        assert_eq!(err.exception_type(), Some("ServiceError"));
    }

    #[test]
    fn create_error_status_precedence() {
        let kernel = kernel().with_default_http_status_code(502);
        let named = kernel.create_error("access_denied", "no", None).unwrap();
        assert_eq!(named.http_status_code(), Some(403));
        let explicit = kernel.create_error("access_denied", "no", Some(451)).unwrap();
        assert_eq!(explicit.http_status_code(), Some(451));
        let custom = kernel.create_error("custom", "no", None).unwrap();
        assert_eq!(custom.http_status_code(), Some(502));
    }

    #[test]
    fn create_error_rejects_empty_message() {
        assert_eq!(
            kernel().create_error("c", "", None).unwrap_err(),
            MalformedPayload::EmptyField("message")
        );
    }

    #[test]
    fn wrap_keeps_payload_values() {
        let payload = ErrorPayload::new("m", "c")
            .unwrap()
            .with_service("upstream")
            .with_trace_id("upstream-trace")
            .with_http_status_code(404);
        let err = kernel().wrap(payload);
        assert_eq!(err.service(), Some("upstream"));
        assert_eq!(err.trace_id(), Some("upstream-trace"));
        assert_eq!(err.http_status_code(), Some(404));
    }

    #[test]
    fn from_failure_stamps_trace_and_default_status() {
        let kernel = kernel().with_default_http_status_code(503);
        let err = kernel.from_failure(std::io::Error::other("socket closed"), None);
        assert_eq!(err.service(), Some("orders"));
        assert_eq!(err.trace_id(), Some("trace-1"));
        assert_eq!(err.http_status_code(), Some(503));
    }

    #[test]
    fn from_failure_passes_existing_errors_through() {
        let existing = kinds::access_denied("nope").with_trace_id("theirs");
        let err = kernel().from_failure(existing, Some(500));
        assert_eq!(err.trace_id(), Some("theirs"));
        assert_eq!(err.http_status_code(), Some(403));
        assert_eq!(err.service(), Some("orders"));
    }

    #[test]
    fn from_anyhow_and_panic() {
        let err = kernel().from_anyhow(anyhow::anyhow!("queue full"), Some(429));
        assert_eq!(err.message(), "queue full");
        assert_eq!(err.http_status_code(), Some(429));

        let caught = std::panic::catch_unwind(|| panic!("bug")).unwrap_err();
        let err = kernel().from_panic(caught.as_ref());
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
        assert_eq!(err.trace_id(), Some("trace-1"));
    }

    #[test]
    fn respond_uses_kernel_rendering() {
        let kernel = kernel()
            .with_environment(Environment::Development)
            .with_detail_level(DetailLevel::Verbose);
        let err = kernel.named(ErrorCode::InputValidation, "bad email");
        let response = kernel.respond(&err);
        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"]["trace_id"], "trace-1");
        assert!(response.body["error"]["stack_trace"].is_array());
    }

    #[test]
    fn respond_in_production_is_minimal() {
        let kernel = kernel();
        let err = kernel.wrap(ErrorPayload::new("m", "c").unwrap());
        let response = kernel.respond(&err);
        assert_eq!(response.status, 500);
        let body = response.body["error"].as_object().unwrap();
        assert_eq!(body.len(), 4);
    }

    #[test]
    fn from_config_requires_service_name() {
        let config = FaultConfig::default();
        assert!(matches!(
            ErrorKernel::from_config(&config),
            Err(KernelError::Config(_))
        ));

        let mut config = FaultConfig::default();
        config.service.name = "payments".into();
        config.service.trace_id = "cfg-trace".into();
        config.render.detail_level = DetailLevel::Normal;
        let kernel = ErrorKernel::from_config(&config).unwrap();
        assert_eq!(kernel.service_name(), "payments");
        assert_eq!(kernel.trace_id(), "cfg-trace");
        assert_eq!(kernel.detail_level(), DetailLevel::Normal);
    }
}
