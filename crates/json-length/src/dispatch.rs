//! Entry point: classifies a value and routes it to the right formula.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use crate::composite;
use crate::error::LengthError;
use crate::measure::{Kind, Measure};
use crate::primitive;
use crate::record::{DescriptorCache, FieldMetadataProvider};

/// Ordered list of arbitrary values.
pub type Values = Vec<Box<dyn Measure>>;

/// Text-keyed map of arbitrary values.
pub type Object = HashMap<String, Box<dyn Measure>>;

/// Computes JSON lengths against a chosen [`FieldMetadataProvider`].
///
/// [`compute_length`] uses the process-wide [`DescriptorCache`]; build a
/// computer with [`LengthComputer::with_provider`] to use another one.
#[derive(Clone, Copy)]
pub struct LengthComputer<'p> {
    provider: &'p dyn FieldMetadataProvider,
}

impl Default for LengthComputer<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl LengthComputer<'static> {
    pub fn new() -> Self {
        Self {
            provider: DescriptorCache::global(),
        }
    }
}

impl<'p> LengthComputer<'p> {
    pub fn with_provider(provider: &'p dyn FieldMetadataProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &'p dyn FieldMetadataProvider {
        self.provider
    }

    /// Length of the canonical JSON encoding of `value`; `None` is `null`.
    ///
    /// Resolution order, first match wins:
    /// 1. absent value
    /// 2. primitive fast path (`bool`, integers up to 128 bits, floats, strings, byte buffers)
    /// 3. open containers ([`Values`], [`Object`], `serde_json` values)
    /// 4. [`JsonLength`](crate::JsonLength) override
    /// 5. [`NumberLiteral`](crate::NumberLiteral)
    /// 6. [`MarshalJson`](crate::MarshalJson)
    /// 7. [`MarshalText`](crate::MarshalText)
    /// 8. [`Measure::kind`] introspection
    pub fn compute_length(&self, value: Option<&dyn Measure>) -> Result<usize, LengthError> {
        let Some(value) = value else {
            return Ok(primitive::null());
        };

        if let Some(len) = primitive_fast_path(value) {
            return Ok(len);
        }
        if let Some(result) = self.container_fast_path(value) {
            return result;
        }

        if let Some(hint) = value.as_json_length() {
            return Ok(hint.json_length());
        }
        if let Some(number) = value.as_number_literal() {
            return Ok(number.literal().len());
        }
        if let Some(marshal) = value.as_marshal_json() {
            return marshal
                .marshal_json()
                .map(|json| json.len())
                .map_err(LengthError::Delegated);
        }
        if let Some(marshal) = value.as_marshal_text() {
            return marshal
                .marshal_text()
                .map(|text| primitive::string(&text))
                .map_err(LengthError::Delegated);
        }

        self.introspect(value)
    }

    /// Convenience wrapper around [`compute_length`](Self::compute_length).
    pub fn length_of<T: Measure>(&self, value: &T) -> Result<usize, LengthError> {
        self.compute_length(Some(value))
    }

    fn container_fast_path(&self, value: &dyn Measure) -> Option<Result<usize, LengthError>> {
        if let Some(values) = value.downcast_ref::<Values>() {
            return Some(composite::sequence(self, values));
        }
        if let Some(object) = value.downcast_ref::<Object>() {
            return Some(composite::mapping(self, object));
        }
        if let Some(object) = value.downcast_ref::<BTreeMap<String, Box<dyn Measure>>>() {
            return Some(composite::mapping(self, object));
        }
        if let Some(json) = value.downcast_ref::<serde_json::Value>() {
            return Some(self.introspect(json));
        }
        if let Some(array) = value.downcast_ref::<Vec<serde_json::Value>>() {
            return Some(composite::sequence(self, array));
        }
        if let Some(object) = value.downcast_ref::<serde_json::Map<String, serde_json::Value>>() {
            return Some(composite::mapping(self, object));
        }
        None
    }

    fn introspect(&self, value: &dyn Measure) -> Result<usize, LengthError> {
        match value.kind() {
            Kind::Null => Ok(primitive::null()),
            Kind::Bool(b) => Ok(primitive::boolean(b)),
            Kind::Int(i) => Ok(primitive::int(i)),
            Kind::Uint(u) => Ok(primitive::uint(u)),
            Kind::Int128(i) => Ok(primitive::int128(i)),
            Kind::Uint128(u) => Ok(primitive::uint128(u)),
            Kind::F32(f) => Ok(primitive::float32(f)),
            Kind::F64(f) => Ok(primitive::float64(f)),
            Kind::Str(s) => Ok(primitive::string(s)),
            Kind::Bytes(b) => Ok(primitive::bytes(b)),
            Kind::Seq(seq) => composite::sequence(self, seq),
            Kind::Map(map) => composite::mapping(self, map),
            Kind::Record(record) => composite::record(self, record),
            Kind::Optional(inner) => self.compute_length(inner),
            Kind::Indirect(guarded) => guarded.with_target(&mut |target| self.compute_length(target)),
            Kind::Unsupported => {
                trace!(type_name = value.type_identity(), "no JSON representation");
                Err(LengthError::unsupported(value.type_identity()))
            }
            Kind::Invalid => Err(LengthError::InvalidValue {
                type_name: value.type_identity(),
            }),
        }
    }
}

fn primitive_fast_path(value: &dyn Measure) -> Option<usize> {
    macro_rules! try_as {
        ($($ty:ty => $len:expr),* $(,)?) => {
            $(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some($len(v));
                }
            )*
        };
    }

    try_as! {
        bool => |v: &bool| primitive::boolean(*v),
        i64 => |v: &i64| primitive::int(*v),
        i32 => |v: &i32| primitive::int(i64::from(*v)),
        i16 => |v: &i16| primitive::int(i64::from(*v)),
        i8 => |v: &i8| primitive::int(i64::from(*v)),
        isize => |v: &isize| primitive::int(*v as i64),
        i128 => |v: &i128| primitive::int128(*v),
        u64 => |v: &u64| primitive::uint(*v),
        u32 => |v: &u32| primitive::uint(u64::from(*v)),
        u16 => |v: &u16| primitive::uint(u64::from(*v)),
        u8 => |v: &u8| primitive::uint(u64::from(*v)),
        usize => |v: &usize| primitive::uint(*v as u64),
        u128 => |v: &u128| primitive::uint128(*v),
        f64 => |v: &f64| primitive::float64(*v),
        f32 => |v: &f32| primitive::float32(*v),
        String => |v: &String| primitive::string(v),
        &'static str => |v: &&str| primitive::string(v),
        Box<str> => |v: &Box<str>| primitive::string(v),
        Vec<u8> => |v: &Vec<u8>| primitive::bytes(v),
        &'static [u8] => |v: &&[u8]| primitive::bytes(v),
        Box<[u8]> => |v: &Box<[u8]>| primitive::bytes(v),
    }
    None
}

/// Length of the canonical JSON encoding of `value`, using the process-wide
/// descriptor cache. `None` measures as `null`.
///
/// ```
/// use json_joy_json_length::{compute_length, Measure};
///
/// assert_eq!(compute_length(None).unwrap(), 4);
/// assert_eq!(compute_length(Some(&-123i64 as &dyn Measure)).unwrap(), 4);
/// ```
pub fn compute_length(value: Option<&dyn Measure>) -> Result<usize, LengthError> {
    LengthComputer::new().compute_length(value)
}

/// Length of the canonical JSON encoding of `value`.
///
/// ```
/// use json_joy_json_length::length_of;
///
/// assert_eq!(length_of(&true).unwrap(), 4);
/// assert_eq!(length_of(&vec![1, 2, 3]).unwrap(), 7);
/// ```
pub fn length_of<T: Measure>(value: &T) -> Result<usize, LengthError> {
    compute_length(Some(value))
}
