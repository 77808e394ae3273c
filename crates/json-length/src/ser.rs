//! Length of any `serde::Serialize` value, measured through a
//! [`Serializer`] that counts bytes instead of writing them.
//!
//! The output follows the same canonical encoding as [`compute_length`]:
//! floats use the shortest round-trip form, non-finite floats are `null`,
//! `serialize_bytes` is base64 text and enum variants use the externally
//! tagged `{"Variant":...}` layout.
//!
//! [`compute_length`]: crate::compute_length

use serde::ser::{
    Impossible, Serialize, SerializeMap, SerializeSeq, SerializeStruct, SerializeStructVariant,
    SerializeTuple, SerializeTupleStruct, SerializeTupleVariant, Serializer,
};

use crate::composite::Framing;
use crate::error::LengthError;
use crate::measure::Key;
use crate::primitive;

/// Length of the canonical JSON encoding of a serializable value.
///
/// ```
/// use json_joy_json_length::serialized_length;
///
/// let value = (1u8, "a", [true, false]);
/// assert_eq!(serialized_length(&value).unwrap(), r#"[1,"a",[true,false]]"#.len());
/// ```
pub fn serialized_length<T: Serialize + ?Sized>(value: &T) -> Result<usize, LengthError> {
    value.serialize(LengthSerializer)
}

/// Serializer whose output is the encoded length.
#[derive(Debug, Clone, Copy, Default)]
pub struct LengthSerializer;

/// Bytes around a variant payload: `{"Variant":` and `}`.
fn variant_wrapper(variant: &str) -> usize {
    primitive::string(variant) + 3
}

impl Serializer for LengthSerializer {
    type Ok = usize;
    type Error = LengthError;

    type SerializeSeq = Compound;
    type SerializeTuple = Compound;
    type SerializeTupleStruct = Compound;
    type SerializeTupleVariant = Compound;
    type SerializeMap = Compound;
    type SerializeStruct = Compound;
    type SerializeStructVariant = Compound;

    fn serialize_bool(self, v: bool) -> Result<usize, LengthError> {
        Ok(primitive::boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<usize, LengthError> {
        Ok(primitive::int(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<usize, LengthError> {
        Ok(primitive::int(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<usize, LengthError> {
        Ok(primitive::int(v.into()))
    }

    fn serialize_i64(self, v: i64) -> Result<usize, LengthError> {
        Ok(primitive::int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<usize, LengthError> {
        Ok(primitive::int128(v))
    }

    fn serialize_u8(self, v: u8) -> Result<usize, LengthError> {
        Ok(primitive::uint(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<usize, LengthError> {
        Ok(primitive::uint(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<usize, LengthError> {
        Ok(primitive::uint(v.into()))
    }

    fn serialize_u64(self, v: u64) -> Result<usize, LengthError> {
        Ok(primitive::uint(v))
    }

    fn serialize_u128(self, v: u128) -> Result<usize, LengthError> {
        Ok(primitive::uint128(v))
    }

    fn serialize_f32(self, v: f32) -> Result<usize, LengthError> {
        Ok(primitive::float32(v))
    }

    fn serialize_f64(self, v: f64) -> Result<usize, LengthError> {
        Ok(primitive::float64(v))
    }

    fn serialize_char(self, v: char) -> Result<usize, LengthError> {
        Ok(primitive::string(v.encode_utf8(&mut [0; 4])))
    }

    fn serialize_str(self, v: &str) -> Result<usize, LengthError> {
        Ok(primitive::string(v))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<usize, LengthError> {
        Ok(primitive::bytes(v))
    }

    fn serialize_none(self) -> Result<usize, LengthError> {
        Ok(primitive::null())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<usize, LengthError> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<usize, LengthError> {
        Ok(primitive::null())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<usize, LengthError> {
        Ok(primitive::null())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<usize, LengthError> {
        Ok(primitive::string(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<usize, LengthError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<usize, LengthError> {
        Ok(variant_wrapper(variant) + value.serialize(self)?)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Compound, LengthError> {
        Ok(Compound::new(0))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Compound, LengthError> {
        Ok(Compound::new(0))
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Compound, LengthError> {
        Ok(Compound::new(0))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound, LengthError> {
        Ok(Compound::new(variant_wrapper(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Compound, LengthError> {
        Ok(Compound::new(0))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Compound, LengthError> {
        Ok(Compound::new(0))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<Compound, LengthError> {
        Ok(Compound::new(variant_wrapper(variant)))
    }
}

/// In-progress array, object or variant payload.
#[derive(Debug)]
pub struct Compound {
    framing: Framing,
    wrapper: usize,
    pending_key: Option<usize>,
}

impl Compound {
    fn new(wrapper: usize) -> Self {
        Self {
            framing: Framing::new(),
            wrapper,
            pending_key: None,
        }
    }

    fn element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LengthError> {
        self.framing.push(value.serialize(LengthSerializer)?);
        Ok(())
    }

    fn field<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), LengthError> {
        self.framing
            .push_entry(primitive::string(key), value.serialize(LengthSerializer)?);
        Ok(())
    }

    fn finish(self) -> usize {
        self.framing.finish() + self.wrapper
    }
}

impl SerializeSeq for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LengthError> {
        self.element(value)
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

impl SerializeTuple for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LengthError> {
        self.element(value)
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

impl SerializeTupleStruct for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LengthError> {
        self.element(value)
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

impl SerializeTupleVariant for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LengthError> {
        self.element(value)
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

impl SerializeMap for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), LengthError> {
        self.pending_key = Some(key.serialize(MapKeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LengthError> {
        let key_len = self
            .pending_key
            .take()
            .ok_or_else(|| LengthError::Custom("map value serialized before its key".to_owned()))?;
        self.framing
            .push_entry(key_len, value.serialize(LengthSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

impl SerializeStruct for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), LengthError> {
        self.field(key, value)
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

impl SerializeStructVariant for Compound {
    type Ok = usize;
    type Error = LengthError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), LengthError> {
        self.field(key, value)
    }

    fn end(self) -> Result<usize, LengthError> {
        Ok(self.finish())
    }
}

/// Measures object keys. Text and integers are accepted, integers quoted.
struct MapKeySerializer;

fn key_unsupported(type_name: &'static str) -> LengthError {
    LengthError::unsupported(type_name)
}

impl Serializer for MapKeySerializer {
    type Ok = usize;
    type Error = LengthError;

    type SerializeSeq = Impossible<usize, LengthError>;
    type SerializeTuple = Impossible<usize, LengthError>;
    type SerializeTupleStruct = Impossible<usize, LengthError>;
    type SerializeTupleVariant = Impossible<usize, LengthError>;
    type SerializeMap = Impossible<usize, LengthError>;
    type SerializeStruct = Impossible<usize, LengthError>;
    type SerializeStructVariant = Impossible<usize, LengthError>;

    fn serialize_bool(self, _v: bool) -> Result<usize, LengthError> {
        Err(key_unsupported("bool"))
    }

    fn serialize_i8(self, v: i8) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Int(v.into())))
    }

    fn serialize_i16(self, v: i16) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Int(v.into())))
    }

    fn serialize_i32(self, v: i32) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Int(v.into())))
    }

    fn serialize_i64(self, v: i64) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Int(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Int128(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Uint(v.into())))
    }

    fn serialize_u16(self, v: u16) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Uint(v.into())))
    }

    fn serialize_u32(self, v: u32) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Uint(v.into())))
    }

    fn serialize_u64(self, v: u64) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Uint(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Uint128(v)))
    }

    fn serialize_f32(self, _v: f32) -> Result<usize, LengthError> {
        Err(key_unsupported("f32"))
    }

    fn serialize_f64(self, _v: f64) -> Result<usize, LengthError> {
        Err(key_unsupported("f64"))
    }

    fn serialize_char(self, v: char) -> Result<usize, LengthError> {
        Ok(primitive::string(v.encode_utf8(&mut [0; 4])))
    }

    fn serialize_str(self, v: &str) -> Result<usize, LengthError> {
        Ok(primitive::key(Key::Str(v)))
    }

    fn serialize_bytes(self, _v: &[u8]) -> Result<usize, LengthError> {
        Err(key_unsupported("&[u8]"))
    }

    fn serialize_none(self) -> Result<usize, LengthError> {
        Err(key_unsupported("Option"))
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<usize, LengthError> {
        Err(key_unsupported("Option"))
    }

    fn serialize_unit(self) -> Result<usize, LengthError> {
        Err(key_unsupported("()"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<usize, LengthError> {
        Err(key_unsupported(name))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<usize, LengthError> {
        Ok(primitive::string(variant))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<usize, LengthError> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<usize, LengthError> {
        Err(key_unsupported(name))
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq, LengthError> {
        Err(key_unsupported("sequence"))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple, LengthError> {
        Err(key_unsupported("tuple"))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleStruct, LengthError> {
        Err(key_unsupported(name))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeTupleVariant, LengthError> {
        Err(key_unsupported(name))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap, LengthError> {
        Err(key_unsupported("map"))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct, LengthError> {
        Err(key_unsupported(name))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Self::SerializeStructVariant, LengthError> {
        Err(key_unsupported(name))
    }
}
