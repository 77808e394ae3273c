//! Custom encoding capabilities.
//!
//! A type advertises a capability by returning `Some(self)` from the
//! matching `Measure::as_*` query. The dispatcher checks them in this order:
//! [`JsonLength`], [`NumberLiteral`], [`MarshalJson`], [`MarshalText`].

use std::borrow::Cow;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use serde_json::value::RawValue;
use thiserror::Error;

use crate::error::BoxError;
use crate::measure::Measure;

/// Reports the encoded length directly.
pub trait JsonLength {
    fn json_length(&self) -> usize;
}

/// A number already rendered as its JSON literal.
pub trait NumberLiteral {
    fn literal(&self) -> &str;
}

/// Produces the complete JSON encoding of the value.
pub trait MarshalJson {
    fn marshal_json(&self) -> Result<Cow<'_, [u8]>, BoxError>;
}

/// Produces text that is written as a JSON string.
pub trait MarshalText {
    fn marshal_text(&self) -> Result<Cow<'_, str>, BoxError>;
}

/// Arbitrary-precision number kept as its decimal text.
///
/// ```
/// use json_joy_json_length::{length_of, RawNumber};
///
/// let n: RawNumber = "123456789012345678901234567890".parse().unwrap();
/// assert_eq!(length_of(&n).unwrap(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawNumber(String);

/// Text that is not a JSON number literal.
#[derive(Debug, Error)]
#[error("invalid number literal: {0:?}")]
pub struct InvalidNumber(String);

impl RawNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RawNumber {
    type Err = InvalidNumber;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_number_literal(s) {
            Ok(RawNumber(s.to_owned()))
        } else {
            Err(InvalidNumber(s.to_owned()))
        }
    }
}

impl fmt::Display for RawNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl NumberLiteral for RawNumber {
    fn literal(&self) -> &str {
        &self.0
    }
}

impl Measure for RawNumber {
    fn as_number_literal(&self) -> Option<&dyn NumberLiteral> {
        Some(self)
    }
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?`
fn is_number_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let digits = |i: &mut usize| {
        let start = *i;
        while *i < bytes.len() && bytes[*i].is_ascii_digit() {
            *i += 1;
        }
        *i - start
    };

    if bytes.get(i) == Some(&b'-') {
        i += 1;
    }
    match bytes.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => {
            digits(&mut i);
        }
        _ => return false,
    }
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        if digits(&mut i) == 0 {
            return false;
        }
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        if digits(&mut i) == 0 {
            return false;
        }
    }
    i == bytes.len()
}

impl MarshalJson for Box<RawValue> {
    fn marshal_json(&self) -> Result<Cow<'_, [u8]>, BoxError> {
        Ok(Cow::Borrowed(self.get().as_bytes()))
    }
}

impl Measure for Box<RawValue> {
    fn as_marshal_json(&self) -> Option<&dyn MarshalJson> {
        Some(self)
    }
}

macro_rules! display_as_text {
    ($($ty:ty),* $(,)?) => {
        $(
            impl MarshalText for $ty {
                fn marshal_text(&self) -> Result<Cow<'_, str>, BoxError> {
                    Ok(Cow::Owned(self.to_string()))
                }
            }

            impl Measure for $ty {
                fn as_marshal_text(&self) -> Option<&dyn MarshalText> {
                    Some(self)
                }
            }
        )*
    };
}

display_as_text!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);

/// Path that cannot be written as UTF-8 text.
#[derive(Debug, Error)]
#[error("path {0:?} is not valid UTF-8")]
pub struct NonUtf8Path(pub PathBuf);

impl MarshalText for PathBuf {
    fn marshal_text(&self) -> Result<Cow<'_, str>, BoxError> {
        match self.to_str() {
            Some(text) => Ok(Cow::Borrowed(text)),
            None => Err(Box::new(NonUtf8Path(self.clone()))),
        }
    }
}

impl Measure for PathBuf {
    fn as_marshal_text(&self) -> Option<&dyn MarshalText> {
        Some(self)
    }
}
