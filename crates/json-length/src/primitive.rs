//! Closed-form lengths of JSON scalars.
//!
//! Every function here returns the exact number of bytes the canonical
//! encoder writes for the given value:
//!
//! - `null` / `true` / `false` literals
//! - integers in plain decimal
//! - floats in shortest round-trip `g` form (`1`, `0.25`, `1e+06`, `1.5e-07`)
//! - strings quoted, with `"` `\` `/` `\n` `\t` `\r` `\v` `\b` `\f` written as
//!   two-byte escapes and every other byte copied verbatim
//! - byte buffers as padded standard base64 inside quotes

use std::fmt::{self, Write};

use crate::measure::Key;

/// Strings shorter than this are checked for escapable bytes before counting.
pub const SHORT_STRING_THRESHOLD: usize = 100;

const ESCAPED: [bool; 256] = {
    let mut table = [false; 256];
    table[b'"' as usize] = true;
    table[b'\\' as usize] = true;
    table[b'/' as usize] = true;
    table[b'\n' as usize] = true;
    table[b'\t' as usize] = true;
    table[b'\r' as usize] = true;
    table[0x0b] = true; // \v
    table[0x08] = true; // \b
    table[0x0c] = true; // \f
    table
};

/// Whether the canonical encoder writes `byte` as a two-byte escape.
#[inline]
pub const fn needs_escape(byte: u8) -> bool {
    ESCAPED[byte as usize]
}

/// Length of `null`.
#[inline]
pub const fn null() -> usize {
    4
}

/// Length of `true` or `false`.
#[inline]
pub const fn boolean(value: bool) -> usize {
    if value {
        4
    } else {
        5
    }
}

/// Length of a signed integer in decimal.
///
/// ```
/// use json_joy_json_length::primitive::int;
///
/// assert_eq!(int(0), 1);
/// assert_eq!(int(-123), 4);
/// assert_eq!(int(i64::MIN), 20);
/// ```
#[inline]
pub fn int(value: i64) -> usize {
    let digits = uint(value.unsigned_abs());
    if value < 0 {
        digits + 1
    } else {
        digits
    }
}

/// Length of an unsigned integer in decimal.
#[inline]
pub fn uint(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Length of a 128-bit signed integer in decimal.
pub fn int128(value: i128) -> usize {
    let digits = uint128(value.unsigned_abs());
    if value < 0 {
        digits + 1
    } else {
        digits
    }
}

/// Length of a 128-bit unsigned integer in decimal.
pub fn uint128(value: u128) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Length of a double in shortest `g` form. Non-finite values encode as
/// `null`.
///
/// NaN and both infinities therefore measure 4 bytes. A plain `%g`
/// formatter would print `NaN` (3 bytes) or `+Inf`/`-Inf` (4 bytes), so
/// NaN is the one value whose length differs from that spelling.
///
/// ```
/// use json_joy_json_length::primitive::float64;
///
/// assert_eq!(float64(1.0), 1);        // 1
/// assert_eq!(float64(-0.5), 4);       // -0.5
/// assert_eq!(float64(1e6), 5);        // 1e+06
/// assert_eq!(float64(f64::NAN), 4);   // null
/// assert_eq!(float64(f64::NEG_INFINITY), 4);
/// ```
pub fn float64(value: f64) -> usize {
    if !value.is_finite() {
        return null();
    }
    let mut shape = ShortestDigits::default();
    // ShortestDigits::write_str never fails.
    let _ = write!(shape, "{value:e}");
    shape.general_len()
}

/// Length of a float in shortest `g` form, using `f32` precision.
pub fn float32(value: f32) -> usize {
    if !value.is_finite() {
        return null();
    }
    let mut shape = ShortestDigits::default();
    let _ = write!(shape, "{value:e}");
    shape.general_len()
}

/// Digit count and decimal exponent of a float, collected from its `{:e}`
/// rendering without buffering it.
#[derive(Debug, Default)]
struct ShortestDigits {
    negative: bool,
    digits: usize,
    in_exponent: bool,
    exponent_negative: bool,
    exponent: i32,
}

impl Write for ShortestDigits {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            match byte {
                b'-' if self.in_exponent => self.exponent_negative = true,
                b'-' => self.negative = true,
                b'e' | b'E' => self.in_exponent = true,
                b'0'..=b'9' if self.in_exponent => {
                    self.exponent = self.exponent * 10 + i32::from(byte - b'0');
                }
                b'0'..=b'9' => self.digits += 1,
                _ => {}
            }
        }
        Ok(())
    }
}

impl ShortestDigits {
    fn general_len(&self) -> usize {
        let exponent = if self.exponent_negative {
            -self.exponent
        } else {
            self.exponent
        };
        let sign = usize::from(self.negative);
        let digits = self.digits;

        if exponent < -4 || exponent >= 6 {
            // d[.ddd]e±dd
            let mantissa = if digits > 1 { digits + 1 } else { 1 };
            let exponent_digits = if exponent.unsigned_abs() >= 100 { 3 } else { 2 };
            return sign + mantissa + 2 + exponent_digits;
        }

        let point = exponent + 1;
        let integral = if point > 0 { point as usize } else { 1 };
        let fraction = (digits as i32 - point).max(0) as usize;
        sign + integral + if fraction > 0 { fraction + 1 } else { 0 }
    }
}

/// Length of a quoted, escaped string.
///
/// ```
/// use json_joy_json_length::primitive::string;
///
/// assert_eq!(string(""), 2);
/// assert_eq!(string("hello"), 7);
/// assert_eq!(string("a/b"), 6);
/// ```
pub fn string(value: &str) -> usize {
    let bytes = value.as_bytes();
    if bytes.len() < SHORT_STRING_THRESHOLD && !bytes.iter().any(|&b| needs_escape(b)) {
        return 2 + bytes.len();
    }
    let escapes = bytes.iter().filter(|&&b| needs_escape(b)).count();
    2 + bytes.len() + escapes
}

/// Length of a byte buffer rendered as quoted, padded base64.
///
/// ```
/// use json_joy_json_length::primitive::bytes;
///
/// assert_eq!(bytes(b""), 2);
/// assert_eq!(bytes(b"f"), 6);    // "Zg=="
/// assert_eq!(bytes(b"foo"), 6);  // "Zm9v"
/// ```
#[inline]
pub fn bytes(value: &[u8]) -> usize {
    2 + value.len().div_ceil(3) * 4
}

/// Length of an object key. Integer keys are quoted.
#[inline]
pub fn key(key: Key<'_>) -> usize {
    match key {
        Key::Str(s) => string(s),
        Key::Int(i) => int(i) + 2,
        Key::Uint(u) => uint(u) + 2,
        Key::Int128(i) => int128(i) + 2,
        Key::Uint128(u) => uint128(u) + 2,
    }
}
