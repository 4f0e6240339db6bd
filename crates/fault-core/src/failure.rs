//! Native failure interop: classification and type names.
//!
//! Any `std::error::Error` can be turned into a payload. Classification is
//! total: every failure maps to exactly one of `INVALID_ARGUMENT`,
//! `INTERNAL_ERROR` or `EXCEPTION`.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use crate::codes::ErrorCode;

/// Fallback type name for causes whose concrete type is not known.
pub const UNKNOWN_FAILURE_TYPE: &str = "Error";

/// Last path segment of `T`'s type name, without generic arguments.
///
/// `core::num::error::ParseIntError` becomes `ParseIntError`.
#[must_use]
pub fn short_type_name<T: ?Sized>() -> &'static str {
    shorten(std::any::type_name::<T>())
}

fn shorten(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

macro_rules! first_known {
    (@name $ty:ty) => {
        short_type_name::<$ty>()
    };
    (@name $ty:ty, $name:literal) => {
        $name
    };
    ($err:expr, $($ty:ty $(as $name:literal)?),+ $(,)?) => {
        $(
            if $err.is::<$ty>() {
                return Some(first_known!(@name $ty $(, $name)?));
            }
        )+
    };
}

/// Type name of a dynamically typed failure, if it is one of the types the
/// classifier knows about. Types whose own name is just `Error` get a
/// qualified name so they stay distinct from [`UNKNOWN_FAILURE_TYPE`].
#[must_use]
pub fn known_type_name(err: &(dyn StdError + 'static)) -> Option<&'static str> {
    first_known!(
        err,
        std::num::ParseIntError,
        std::num::ParseFloatError,
        std::num::TryFromIntError,
        std::str::ParseBoolError,
        std::char::ParseCharError,
        std::net::AddrParseError,
        std::str::Utf8Error,
        std::string::FromUtf8Error,
        std::io::Error as "IoError",
        std::fmt::Error as "FmtError",
        std::cell::BorrowError,
        std::cell::BorrowMutError,
        std::alloc::LayoutError,
        chrono::ParseError,
        serde_json::Error as "JsonError",
        PanicFailure,
        crate::service_error::ServiceError,
    );
    None
}

/// Classify a failure by what it signals.
#[must_use]
pub fn classify(err: &(dyn StdError + 'static)) -> ErrorCode {
    if is_input_error(err) {
        ErrorCode::InvalidArgument
    } else if is_internal_fault(err) {
        ErrorCode::InternalError
    } else {
        ErrorCode::Exception
    }
}

fn is_input_error(err: &(dyn StdError + 'static)) -> bool {
    if let Some(io) = err.downcast_ref::<std::io::Error>() {
        return matches!(
            io.kind(),
            std::io::ErrorKind::InvalidInput | std::io::ErrorKind::InvalidData
        );
    }
    if let Some(json) = err.downcast_ref::<serde_json::Error>() {
        return !json.is_io();
    }
    err.is::<std::num::ParseIntError>()
        || err.is::<std::num::ParseFloatError>()
        || err.is::<std::num::TryFromIntError>()
        || err.is::<std::str::ParseBoolError>()
        || err.is::<std::char::ParseCharError>()
        || err.is::<std::net::AddrParseError>()
        || err.is::<std::str::Utf8Error>()
        || err.is::<std::string::FromUtf8Error>()
        || err.is::<chrono::ParseError>()
}

fn is_internal_fault(err: &(dyn StdError + 'static)) -> bool {
    err.is::<PanicFailure>()
        || err.is::<std::fmt::Error>()
        || err.is::<std::cell::BorrowError>()
        || err.is::<std::cell::BorrowMutError>()
        || err.is::<std::alloc::LayoutError>()
}

/// A panic caught with `std::panic::catch_unwind`, as a failure value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanicFailure {
    message: String,
}

impl PanicFailure {
    /// Extract the panic message from a `catch_unwind` payload. Panics raised
    /// with a non-string payload get a generic message.
    #[must_use]
    pub fn from_panic_payload(payload: &(dyn Any + Send)) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "panic with a non-string payload".to_string());
        Self { message }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for PanicFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for PanicFailure {}
