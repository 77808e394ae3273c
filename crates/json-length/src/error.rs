//! Error type shared by every length computation.

use std::fmt::Display;

use thiserror::Error;

/// Boxed error returned by the custom encoding capabilities.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Reasons a JSON length could not be determined.
///
/// Any error means "length undetermined"; no partial length is ever returned
/// alongside one.
#[derive(Debug, Error)]
pub enum LengthError {
    /// The value has no JSON representation (channels, handles, ...).
    #[error("json: unsupported type: {type_name}")]
    UnsupportedType { type_name: &'static str },

    /// The value exists but a runtime guard prevents reading it.
    #[error("json: cannot access value of type {type_name}: {reason}")]
    Inaccessible {
        type_name: &'static str,
        reason: &'static str,
    },

    /// A `MarshalJson` / `MarshalText` capability failed. The inner error is
    /// passed through untouched.
    #[error(transparent)]
    Delegated(BoxError),

    /// The value is a handle that does not refer to anything.
    #[error("json: invalid value of type {type_name}")]
    InvalidValue { type_name: &'static str },

    /// Raised by a `serde::Serialize` implementation.
    #[error("{0}")]
    Custom(String),
}

impl LengthError {
    pub(crate) fn unsupported(type_name: &'static str) -> Self {
        LengthError::UnsupportedType { type_name }
    }

    pub(crate) fn inaccessible(type_name: &'static str, reason: &'static str) -> Self {
        LengthError::Inaccessible { type_name, reason }
    }
}

impl serde::ser::Error for LengthError {
    fn custom<T: Display>(msg: T) -> Self {
        LengthError::Custom(msg.to_string())
    }
}
