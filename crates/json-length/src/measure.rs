//! Runtime shape model of measurable values.
//!
//! Rust has no reflection, so a value describes its own shape through
//! [`Measure::kind`]. Custom encodings are advertised through the `as_*`
//! capability queries, which the dispatcher consults before falling back to
//! `kind`.

use downcast_rs::{impl_downcast, Downcast};

use crate::capability::{JsonLength, MarshalJson, MarshalText, NumberLiteral};
use crate::error::LengthError;
use crate::record::Record;

/// A value whose JSON-encoded length can be computed.
///
/// Only shared references are ever handed out, so measuring never mutates
/// the value.
pub trait Measure: Downcast {
    /// Structural shape of the value, used when no capability applies.
    ///
    /// The default reports the value as unsupported, which is what types
    /// without a JSON representation want. Types that rely solely on a
    /// capability can keep the default.
    fn kind(&self) -> Kind<'_> {
        Kind::Unsupported
    }

    /// Self-reported encoded length. Trusted without verification.
    fn as_json_length(&self) -> Option<&dyn JsonLength> {
        None
    }

    /// Numeric literal already materialized as text.
    fn as_number_literal(&self) -> Option<&dyn NumberLiteral> {
        None
    }

    /// Produces its own complete JSON encoding.
    fn as_marshal_json(&self) -> Option<&dyn MarshalJson> {
        None
    }

    /// Produces text that is encoded as a JSON string.
    fn as_marshal_text(&self) -> Option<&dyn MarshalText> {
        None
    }

    /// Name of the concrete type, reported in errors.
    fn type_identity(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
impl_downcast!(Measure);

/// Shape of a value as seen by the introspection fallback.
#[derive(Clone, Copy)]
pub enum Kind<'a> {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Int128(i128),
    Uint128(u128),
    F32(f32),
    F64(f64),
    Str(&'a str),
    /// Raw bytes, encoded as base64 text.
    Bytes(&'a [u8]),
    Seq(&'a dyn Sequence),
    Map(&'a dyn Mapping),
    Record(&'a dyn Record),
    /// A value that may be absent (`None` encodes as `null`) or that points
    /// at another value.
    Optional(Option<&'a dyn Measure>),
    /// A value behind a runtime access guard.
    Indirect(&'a dyn Indirect),
    Unsupported,
    /// A handle that refers to nothing.
    Invalid,
}

impl std::fmt::Debug for Kind<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Null => write!(f, "Null"),
            Kind::Bool(b) => write!(f, "Bool({b})"),
            Kind::Int(i) => write!(f, "Int({i})"),
            Kind::Uint(u) => write!(f, "Uint({u})"),
            Kind::Int128(i) => write!(f, "Int128({i})"),
            Kind::Uint128(u) => write!(f, "Uint128({u})"),
            Kind::F32(x) => write!(f, "F32({x})"),
            Kind::F64(x) => write!(f, "F64({x})"),
            Kind::Str(s) => write!(f, "Str({s:?})"),
            Kind::Bytes(b) => write!(f, "Bytes(len={})", b.len()),
            Kind::Seq(s) => write!(f, "Seq(len={})", s.len()),
            Kind::Map(m) => write!(f, "Map(len={})", m.len()),
            Kind::Record(r) => write!(f, "Record({})", r.type_identity()),
            Kind::Optional(Some(_)) => write!(f, "Optional(Some)"),
            Kind::Optional(None) => write!(f, "Optional(None)"),
            Kind::Indirect(_) => write!(f, "Indirect"),
            Kind::Unsupported => write!(f, "Unsupported"),
            Kind::Invalid => write!(f, "Invalid"),
        }
    }
}

/// Callback receiving each element of a [`Sequence`].
pub type ElementVisitor<'v> = dyn FnMut(&dyn Measure) -> Result<(), LengthError> + 'v;

/// Callback receiving each entry of a [`Mapping`].
pub type EntryVisitor<'v> = dyn FnMut(Key<'_>, &dyn Measure) -> Result<(), LengthError> + 'v;

/// Ordered collection encoded as a JSON array.
pub trait Sequence {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feeds every element to `visitor` in encoding order, stopping at the
    /// first error.
    fn visit(&self, visitor: &mut ElementVisitor<'_>) -> Result<(), LengthError>;
}

/// Key/value collection encoded as a JSON object.
pub trait Mapping {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Feeds every entry to `visitor`, stopping at the first error. Order is
    /// irrelevant to the computed length.
    fn visit(&self, visitor: &mut EntryVisitor<'_>) -> Result<(), LengthError>;
}

/// Object key. Integer keys are written as quoted decimals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    Str(&'a str),
    Int(i64),
    Uint(u64),
    Int128(i128),
    Uint128(u128),
}

/// Types usable as object keys.
pub trait MapKey {
    fn key(&self) -> Key<'_>;
}

/// Callback receiving the target of an [`Indirect`] value.
pub type TargetVisitor<'v> = dyn FnMut(Option<&dyn Measure>) -> Result<usize, LengthError> + 'v;

/// A value that can only be read through a guard (cells, locks, weak
/// pointers).
pub trait Indirect {
    /// Runs `visitor` on the guarded value while access is held. Returns
    /// `Inaccessible` or `InvalidValue` when the guard cannot be taken.
    fn with_target(&self, visitor: &mut TargetVisitor<'_>) -> Result<usize, LengthError>;
}
