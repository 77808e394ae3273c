//! Shared helpers: a byte-producing reference encoder and a seeded random
//! value generator.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::IpAddr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use json_joy_json_length::{record, Key, Kind, LengthError, Measure, Object, RawNumber, Values};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde_json::value::RawValue;

/// Writes the canonical JSON encoding of `value`, following the same
/// resolution order as the length computation.
pub fn encode(value: Option<&dyn Measure>) -> Result<Vec<u8>, LengthError> {
    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

/// Length of [`encode`]'s output.
pub fn encoded_len(value: &dyn Measure) -> usize {
    encode(Some(value)).expect("reference encoder failed").len()
}

fn write_value(value: Option<&dyn Measure>, out: &mut Vec<u8>) -> Result<(), LengthError> {
    let Some(value) = value else {
        out.extend_from_slice(b"null");
        return Ok(());
    };

    if let Some(bytes) = value.downcast_ref::<Vec<u8>>() {
        write_base64(bytes, out);
        return Ok(());
    }
    if let Some(hint) = value.as_json_length() {
        out.extend(std::iter::repeat(b'?').take(hint.json_length()));
        return Ok(());
    }
    if let Some(number) = value.as_number_literal() {
        out.extend_from_slice(number.literal().as_bytes());
        return Ok(());
    }
    if let Some(marshal) = value.as_marshal_json() {
        let json = marshal.marshal_json().map_err(LengthError::Delegated)?;
        out.extend_from_slice(&json);
        return Ok(());
    }
    if let Some(marshal) = value.as_marshal_text() {
        let text = marshal.marshal_text().map_err(LengthError::Delegated)?;
        write_string(&text, out);
        return Ok(());
    }

    match value.kind() {
        Kind::Null => out.extend_from_slice(b"null"),
        Kind::Bool(b) => out.extend_from_slice(if b { &b"true"[..] } else { &b"false"[..] }),
        Kind::Int(i) => out.extend_from_slice(i.to_string().as_bytes()),
        Kind::Uint(u) => out.extend_from_slice(u.to_string().as_bytes()),
        Kind::Int128(i) => out.extend_from_slice(i.to_string().as_bytes()),
        Kind::Uint128(u) => out.extend_from_slice(u.to_string().as_bytes()),
        Kind::F32(f) if f.is_finite() => out.extend_from_slice(general_float(&format!("{f:e}")).as_bytes()),
        Kind::F64(f) if f.is_finite() => out.extend_from_slice(general_float(&format!("{f:e}")).as_bytes()),
        Kind::F32(_) | Kind::F64(_) => out.extend_from_slice(b"null"),
        Kind::Str(s) => write_string(s, out),
        Kind::Bytes(b) => write_base64(b, out),
        Kind::Seq(seq) => {
            out.push(b'[');
            let mut first = true;
            seq.visit(&mut |item| {
                if !first {
                    out.push(b',');
                }
                first = false;
                write_value(Some(item), out)
            })?;
            out.push(b']');
        }
        Kind::Map(map) => {
            out.push(b'{');
            let mut first = true;
            map.visit(&mut |key, item| {
                if !first {
                    out.push(b',');
                }
                first = false;
                match key {
                    Key::Str(s) => write_string(s, out),
                    Key::Int(i) => write_string(&i.to_string(), out),
                    Key::Uint(u) => write_string(&u.to_string(), out),
                    Key::Int128(i) => write_string(&i.to_string(), out),
                    Key::Uint128(u) => write_string(&u.to_string(), out),
                }
                out.push(b':');
                write_value(Some(item), out)
            })?;
            out.push(b'}');
        }
        Kind::Record(record) => {
            out.push(b'{');
            let mut first = true;
            for field in record.describe() {
                let Some(item) = field.resolve(record)? else {
                    continue;
                };
                if field.is_omit_empty() && is_zero(item) {
                    continue;
                }
                if !first {
                    out.push(b',');
                }
                first = false;
                write_string(field.name(), out);
                out.push(b':');
                write_value(Some(item), out)?;
            }
            out.push(b'}');
        }
        Kind::Optional(inner) => write_value(inner, out)?,
        Kind::Indirect(guarded) => {
            guarded.with_target(&mut |target| {
                write_value(target, out)?;
                Ok(0)
            })?;
        }
        Kind::Unsupported => {
            return Err(LengthError::UnsupportedType {
                type_name: value.type_identity(),
            })
        }
        Kind::Invalid => {
            return Err(LengthError::InvalidValue {
                type_name: value.type_identity(),
            })
        }
    }
    Ok(())
}

/// Zero-value test for omit-empty fields, worked out from the encoded shape:
/// collections are counted by visiting them.
fn is_zero(value: &dyn Measure) -> bool {
    let mut count = 0usize;
    match value.kind() {
        Kind::Null | Kind::Optional(None) => true,
        Kind::Bool(b) => !b,
        Kind::Int(i) => i == 0,
        Kind::Uint(u) => u == 0,
        Kind::Int128(i) => i == 0,
        Kind::Uint128(u) => u == 0,
        Kind::F32(f) => f == 0.0,
        Kind::F64(f) => f == 0.0,
        Kind::Str(s) => s.is_empty(),
        Kind::Bytes(b) => b.is_empty(),
        Kind::Seq(seq) => {
            let _ = seq.visit(&mut |_| {
                count += 1;
                Ok(())
            });
            count == 0
        }
        Kind::Map(map) => {
            let _ = map.visit(&mut |_, _| {
                count += 1;
                Ok(())
            });
            count == 0
        }
        Kind::Optional(Some(_)) | Kind::Record(_) | Kind::Indirect(_) | Kind::Unsupported | Kind::Invalid => false,
    }
}

fn write_base64(bytes: &[u8], out: &mut Vec<u8>) {
    out.push(b'"');
    out.extend_from_slice(STANDARD.encode(bytes).as_bytes());
    out.push(b'"');
}

fn write_string(text: &str, out: &mut Vec<u8>) {
    out.push(b'"');
    for ch in text.chars() {
        match ch {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '/' => out.extend_from_slice(b"\\/"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\t' => out.extend_from_slice(b"\\t"),
            '\r' => out.extend_from_slice(b"\\r"),
            '\x0b' => out.extend_from_slice(b"\\v"),
            '\x08' => out.extend_from_slice(b"\\b"),
            '\x0c' => out.extend_from_slice(b"\\f"),
            other => {
                let mut buf = [0; 4];
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}

/// Rewrites Rust's shortest `{:e}` rendering (`-1.25e-7`) into `g` form
/// (`-1.25e-07`, `0.0125`, `1e+06`).
pub fn general_float(scientific: &str) -> String {
    let (mantissa, exponent) = scientific.split_once('e').expect("scientific notation");
    let exponent: i32 = exponent.parse().expect("exponent");
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    if !(-4..6).contains(&exponent) {
        let (head, tail) = digits.split_at(1);
        let point = if tail.is_empty() { String::new() } else { format!(".{tail}") };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{head}{point}e{exp_sign}{:02}", exponent.unsigned_abs());
    }

    if exponent < 0 {
        let zeros = "0".repeat((-exponent - 1) as usize);
        return format!("{sign}0.{zeros}{digits}");
    }

    let point = exponent as usize + 1;
    if digits.len() <= point {
        format!("{sign}{digits}{}", "0".repeat(point - digits.len()))
    } else {
        format!("{sign}{}.{}", &digits[..point], &digits[point..])
    }
}

/// Record whose omit-empty fields the fuzzer fills or leaves zeroed.
pub struct Sample {
    pub id: u32,
    pub label: String,
    pub score: Option<i64>,
    pub blob: Vec<u8>,
    pub tags: Vec<i8>,
    pub weight: f64,
    pub big: i128,
    pub flag: bool,
    pub extra: Box<dyn Measure>,
}

record!(Sample {
    id => "id" [omit_empty],
    label => "label" [omit_empty],
    score => "score" [omit_empty],
    blob => "blob" [omit_empty],
    tags => "tags" [omit_empty],
    weight => "w" [omit_empty],
    big => "big" [omit_empty],
    flag => "flag",
    extra => "extra" [omit_empty],
});

/// Record with a nested record and a non-omitted empty collection.
pub struct Envelope {
    pub sample: Sample,
    pub items: Values,
    pub note: Option<String>,
}

record!(Envelope {
    sample => "sample",
    items => "items",
    note => "note" [omit_empty],
});

/// Seeded generator of nested values.
pub struct ValueFuzzer {
    rng: Xoshiro256StarStar,
}

const ALPHABET: &[char] = &[
    'a', 'b', 'Z', '0', ' ', '"', '\\', '/', '\n', '\t', '\r', '\x0b', '\x08', '\x0c', '\x01', '\x7f',
    'é', '€', '😀',
];

impl ValueFuzzer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    pub fn string(&mut self, max_len: usize) -> String {
        let len = self.rng.gen_range(0..=max_len);
        (0..len)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())])
            .collect()
    }

    fn float(&mut self) -> f64 {
        match self.rng.gen_range(0..4) {
            0 => f64::from(self.rng.gen_range(-1000..1000)),
            1 => self.rng.gen_range(-1.0..1.0),
            2 => self.rng.gen::<f64>() * 10f64.powi(self.rng.gen_range(-30..30)),
            _ => f64::from_bits(self.rng.gen()),
        }
    }

    fn raw_number(&mut self) -> RawNumber {
        let literal = match self.rng.gen_range(0..3) {
            0 => self.rng.gen::<i64>().to_string(),
            1 => format!("{}.{}", self.rng.gen::<i16>(), self.rng.gen::<u16>()),
            _ => format!("{}e-{}", self.rng.gen_range(1..10), self.rng.gen_range(0..300)),
        };
        literal.parse().expect("number literal")
    }

    fn ip(&mut self) -> IpAddr {
        if self.rng.gen() {
            IpAddr::from(self.rng.gen::<[u8; 4]>())
        } else {
            IpAddr::from(self.rng.gen::<[u16; 8]>())
        }
    }

    fn raw_value(&mut self) -> Box<RawValue> {
        let text = format!(
            "{{ \"n\" : [ {}, {} ], \"s\": \"{}\" }}",
            self.rng.gen::<i32>(),
            self.rng.gen::<bool>(),
            "x".repeat(self.rng.gen_range(0..5)),
        );
        RawValue::from_string(text).expect("raw JSON")
    }

    /// A [`Sample`] with each omit-empty field independently zeroed or set.
    pub fn sample(&mut self, depth: usize) -> Sample {
        let mut fill = || self.rng.gen_bool(0.5);
        let (id, label, score, blob, tags, weight, big, extra) =
            (fill(), fill(), fill(), fill(), fill(), fill(), fill(), fill());
        Sample {
            id: if id { self.rng.gen_range(1..u32::MAX) } else { 0 },
            label: if label { format!("L{}", self.string(10)) } else { String::new() },
            score: score.then(|| self.rng.gen::<i64>()),
            blob: if blob { vec![self.rng.gen(); self.rng.gen_range(1..6)] } else { Vec::new() },
            tags: if tags { vec![self.rng.gen(); self.rng.gen_range(1..4)] } else { Vec::new() },
            weight: if weight { self.rng.gen_range(0.5..1e9) } else { 0.0 },
            big: if big { self.rng.gen::<i128>() | 1 } else { 0 },
            flag: self.rng.gen(),
            extra: if extra && depth > 0 { self.value(depth - 1) } else { Box::new(0u8) },
        }
    }

    /// A random value nested at most `depth` levels deep.
    pub fn value(&mut self, depth: usize) -> Box<dyn Measure> {
        let leaf_only = depth == 0;
        let choice = if leaf_only {
            self.rng.gen_range(0..13)
        } else {
            self.rng.gen_range(0..19)
        };
        match choice {
            0 => Box::new(self.rng.gen::<i64>()),
            1 => Box::new(self.rng.gen::<u32>()),
            2 => Box::new(self.float()),
            3 => Box::new(self.rng.gen::<f32>()),
            4 => Box::new(self.rng.gen::<bool>()),
            5 => Box::new(self.string(120)),
            6 => {
                let len = self.rng.gen_range(0..20);
                Box::new((0..len).map(|_| self.rng.gen::<u8>()).collect::<Vec<u8>>())
            }
            7 => Box::new(None::<i32>),
            8 => Box::new(Some(self.rng.gen::<i16>())),
            9 => Box::new(self.raw_number()),
            10 => Box::new(self.ip()),
            11 => Box::new(self.raw_value()),
            12 => Box::new(self.rng.gen::<u128>()),
            13 => {
                let len = self.rng.gen_range(0..6);
                let values: Values = (0..len).map(|_| self.value(depth - 1)).collect();
                Box::new(values)
            }
            14 => {
                let len = self.rng.gen_range(0..6);
                let mut object = Object::new();
                for _ in 0..len {
                    let key = self.string(8);
                    let item = self.value(depth - 1);
                    object.insert(key, item);
                }
                Box::new(object)
            }
            15 => {
                let len = self.rng.gen_range(0..4);
                let mut map = BTreeMap::new();
                for _ in 0..len {
                    let key = self.rng.gen::<i16>();
                    let item = self.value(depth - 1);
                    map.insert(key, item);
                }
                Box::new(map)
            }
            16 => Box::new(self.sample(depth)),
            17 => {
                let sample = self.sample(depth);
                let len = self.rng.gen_range(0..3);
                let items: Values = (0..len).map(|_| self.value(depth - 1)).collect();
                let note = self.rng.gen_bool(0.5).then(|| self.string(6));
                Box::new(Envelope { sample, items, note })
            }
            _ => {
                let len = self.rng.gen_range(0..4);
                Box::new((0..len).map(|_| self.rng.gen::<i8>()).collect::<Vec<i8>>())
            }
        }
    }
}
