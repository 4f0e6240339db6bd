//! # fault-kernel
//!
//! Service-scoped error handling for Faultline.
//!
//! An [`ErrorKernel`] holds what every error raised by one service has in
//! common (service name, trace id, environment, detail level, default
//! status). It stamps that context onto errors, converts native failures,
//! and turns a `ServiceError` into an HTTP-ready [`ApiResponse`], logging it
//! through `tracing` on the way.
//!
//! ```
//! use fault_kernel::ErrorKernel;
//!
//! let kernel = ErrorKernel::new("orders");
//! let err = kernel.from_failure(std::io::Error::other("socket closed"), None);
//! let response = kernel.respond(&err);
//! assert_eq!(response.status, 500);
//! assert_eq!(response.body["error"]["service"], "orders");
//! ```

mod error;
mod kernel;
mod response;
mod trace;

pub use error::KernelError;
pub use kernel::ErrorKernel;
pub use response::ApiResponse;
pub use trace::generate_trace_id;
