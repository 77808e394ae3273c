//! Framing of arrays, objects and records.
//!
//! Every composite path (the open `Values`/`Object` containers, the
//! introspected `Seq`/`Map`/`Record` kinds and the serde bridge) goes through
//! [`Framing`], so separators and brackets are counted in exactly one place.

use crate::dispatch::LengthComputer;
use crate::error::LengthError;
use crate::measure::{Kind, Mapping, Measure, Sequence};
use crate::primitive;
use crate::record::Record;

/// Running length of a bracketed, comma-separated list.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Framing {
    total: usize,
    count: usize,
}

impl Framing {
    pub(crate) fn new() -> Self {
        Self { total: 2, count: 0 }
    }

    /// Adds one member of `len` bytes, plus a comma if it is not the first.
    pub(crate) fn push(&mut self, len: usize) {
        if self.count > 0 {
            self.total += 1;
        }
        self.total += len;
        self.count += 1;
    }

    /// Adds an object member: key, colon, value.
    pub(crate) fn push_entry(&mut self, key_len: usize, value_len: usize) {
        self.push(key_len + 1 + value_len);
    }

    pub(crate) fn finish(self) -> usize {
        self.total
    }
}

pub(crate) fn sequence(engine: &LengthComputer<'_>, seq: &dyn Sequence) -> Result<usize, LengthError> {
    let mut framing = Framing::new();
    seq.visit(&mut |item| {
        framing.push(engine.compute_length(Some(item))?);
        Ok(())
    })?;
    Ok(framing.finish())
}

pub(crate) fn mapping(engine: &LengthComputer<'_>, map: &dyn Mapping) -> Result<usize, LengthError> {
    let mut framing = Framing::new();
    map.visit(&mut |key, value| {
        framing.push_entry(primitive::key(key), engine.compute_length(Some(value))?);
        Ok(())
    })?;
    Ok(framing.finish())
}

pub(crate) fn record(engine: &LengthComputer<'_>, record: &dyn Record) -> Result<usize, LengthError> {
    let fields = engine.provider().descriptors(record);
    let mut framing = Framing::new();
    for field in fields.iter() {
        let Some(value) = field.resolve(record)? else {
            continue;
        };
        if field.is_omit_empty() && is_empty_value(value) {
            continue;
        }
        framing.push_entry(field.key_len(), engine.compute_length(Some(value))?);
    }
    Ok(framing.finish())
}

/// Whether `value` is its type's zero value for omit-empty purposes:
/// `false`, numeric zero, empty text or bytes, an empty collection, or an
/// absent optional. Records, guarded values and capability-only types are
/// never empty.
pub fn is_empty_value(value: &dyn Measure) -> bool {
    match value.kind() {
        Kind::Null => true,
        Kind::Bool(b) => !b,
        Kind::Int(i) => i == 0,
        Kind::Uint(u) => u == 0,
        Kind::Int128(i) => i == 0,
        Kind::Uint128(u) => u == 0,
        Kind::F32(f) => f == 0.0,
        Kind::F64(f) => f == 0.0,
        Kind::Str(s) => s.is_empty(),
        Kind::Bytes(b) => b.is_empty(),
        Kind::Seq(seq) => seq.is_empty(),
        Kind::Map(map) => map.is_empty(),
        Kind::Optional(inner) => inner.is_none(),
        Kind::Record(_) | Kind::Indirect(_) | Kind::Unsupported | Kind::Invalid => false,
    }
}
