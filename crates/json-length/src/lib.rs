//! json-joy-json-length - Exact JSON-encoded byte length without encoding
//!
//! Computes how many bytes the canonical JSON encoding of a value occupies,
//! including quotes, escapes, separators and brackets, without producing the
//! encoding itself.
//!
//! Values take part through the [`Measure`] trait, which is implemented for
//! the standard scalar, string, collection, pointer and lock types, for
//! `serde_json` values and for `indexmap` maps. Struct-like types use the
//! [`record!`] macro. Any `serde::Serialize` type can also be measured with
//! [`serialized_length`].
//!
//! ```
//! use json_joy_json_length::{length_of, Object, Values};
//!
//! assert_eq!(length_of(&"a/b").unwrap(), 6); // "a\/b"
//!
//! let mut values = Values::new();
//! values.push(Box::new(1));
//! values.push(Box::new("x"));
//! values.push(Box::new(None::<u8>));
//! assert_eq!(length_of(&values).unwrap(), r#"[1,"x",null]"#.len());
//!
//! let mut object = Object::new();
//! object.insert("n".to_owned(), Box::new(values));
//! assert_eq!(length_of(&object).unwrap(), r#"{"n":[1,"x",null]}"#.len());
//! ```

pub mod capability;
pub mod composite;
pub mod dispatch;
pub mod error;
mod impls;
mod macros;
pub mod measure;
pub mod primitive;
pub mod record;
pub mod ser;

// Re-exports for convenience
pub use capability::{InvalidNumber, JsonLength, MarshalJson, MarshalText, NonUtf8Path, NumberLiteral, RawNumber};
pub use composite::is_empty_value;
pub use dispatch::{compute_length, length_of, LengthComputer, Object, Values};
pub use error::{BoxError, LengthError};
pub use measure::{Indirect, Key, Kind, MapKey, Mapping, Measure, Sequence};
pub use primitive::SHORT_STRING_THRESHOLD;
pub use record::{DescriptorCache, FieldDescriptor, FieldMetadataProvider, Record};
pub use ser::{serialized_length, LengthSerializer};
