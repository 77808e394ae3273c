//! `Measure` implementations for standard library, `serde_json` and
//! `indexmap` types.

use std::borrow::Cow;
use std::cell::{OnceCell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::BuildHasher;
use std::rc::Rc;
use std::sync::{mpsc, Arc, Mutex, OnceLock, RwLock, TryLockError};

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use crate::error::LengthError;
use crate::measure::{ElementVisitor, EntryVisitor, Indirect, Key, Kind, MapKey, Mapping, Measure, Sequence, TargetVisitor};

// ---------------------------------------------------------------- scalars

macro_rules! scalar {
    ($($ty:ty => |$v:ident| $kind:expr),* $(,)?) => {
        $(
            impl Measure for $ty {
                fn kind(&self) -> Kind<'_> {
                    let $v = *self;
                    $kind
                }
            }
        )*
    };
}

scalar! {
    bool => |v| Kind::Bool(v),
    i8 => |v| Kind::Int(i64::from(v)),
    i16 => |v| Kind::Int(i64::from(v)),
    i32 => |v| Kind::Int(i64::from(v)),
    i64 => |v| Kind::Int(v),
    isize => |v| Kind::Int(v as i64),
    u8 => |v| Kind::Uint(u64::from(v)),
    u16 => |v| Kind::Uint(u64::from(v)),
    u32 => |v| Kind::Uint(u64::from(v)),
    u64 => |v| Kind::Uint(v),
    usize => |v| Kind::Uint(v as u64),
    i128 => |v| Kind::Int128(v),
    u128 => |v| Kind::Uint128(v),
    f32 => |v| Kind::F32(v),
    f64 => |v| Kind::F64(v),
}

impl Measure for () {
    fn kind(&self) -> Kind<'_> {
        Kind::Null
    }
}

impl Measure for String {
    fn kind(&self) -> Kind<'_> {
        Kind::Str(self)
    }
}

impl Measure for &'static str {
    fn kind(&self) -> Kind<'_> {
        Kind::Str(self)
    }
}

impl Measure for Box<str> {
    fn kind(&self) -> Kind<'_> {
        Kind::Str(self)
    }
}

impl Measure for Cow<'static, str> {
    fn kind(&self) -> Kind<'_> {
        Kind::Str(self)
    }
}

impl Measure for &'static [u8] {
    fn kind(&self) -> Kind<'_> {
        Kind::Bytes(self)
    }
}

impl Measure for Box<[u8]> {
    fn kind(&self) -> Kind<'_> {
        Kind::Bytes(self)
    }
}

// ---------------------------------------------------------------- sequences

macro_rules! sequence {
    ($([$($gen:tt)*] $ty:ty),* $(,)?) => {
        $(
            impl<$($gen)*> Sequence for $ty {
                fn len(&self) -> usize {
                    self.iter().len()
                }

                fn visit(&self, visitor: &mut ElementVisitor<'_>) -> Result<(), LengthError> {
                    self.iter().try_for_each(|item| visitor(item as &dyn Measure))
                }
            }

            impl<$($gen)*> Measure for $ty {
                fn kind(&self) -> Kind<'_> {
                    Kind::Seq(self)
                }
            }
        )*
    };
}

sequence! {
    [T: Measure] Vec<T>,
    [T: Measure] VecDeque<T>,
    [T: Measure, const N: usize] [T; N],
    [T: Measure, S: BuildHasher + 'static] HashSet<T, S>,
    [T: Measure] BTreeSet<T>,
}

// ---------------------------------------------------------------- mappings

macro_rules! map_key {
    ($($ty:ty => |$k:ident| $key:expr),* $(,)?) => {
        $(
            impl MapKey for $ty {
                fn key(&self) -> Key<'_> {
                    let $k = self;
                    $key
                }
            }
        )*
    };
}

map_key! {
    String => |k| Key::Str(k),
    &'static str => |k| Key::Str(k),
    Box<str> => |k| Key::Str(k),
    Cow<'static, str> => |k| Key::Str(k),
    i8 => |k| Key::Int(i64::from(*k)),
    i16 => |k| Key::Int(i64::from(*k)),
    i32 => |k| Key::Int(i64::from(*k)),
    i64 => |k| Key::Int(*k),
    isize => |k| Key::Int(*k as i64),
    u8 => |k| Key::Uint(u64::from(*k)),
    u16 => |k| Key::Uint(u64::from(*k)),
    u32 => |k| Key::Uint(u64::from(*k)),
    u64 => |k| Key::Uint(*k),
    usize => |k| Key::Uint(*k as u64),
    i128 => |k| Key::Int128(*k),
    u128 => |k| Key::Uint128(*k),
}

macro_rules! mapping {
    ($([$($gen:tt)*] $ty:ty),* $(,)?) => {
        $(
            impl<$($gen)*> Mapping for $ty {
                fn len(&self) -> usize {
                    self.iter().len()
                }

                fn visit(&self, visitor: &mut EntryVisitor<'_>) -> Result<(), LengthError> {
                    self.iter()
                        .try_for_each(|(key, value)| visitor(key.key(), value as &dyn Measure))
                }
            }

            impl<$($gen)*> Measure for $ty {
                fn kind(&self) -> Kind<'_> {
                    Kind::Map(self)
                }
            }
        )*
    };
}

mapping! {
    [K: MapKey + 'static, V: Measure, S: BuildHasher + 'static] HashMap<K, V, S>,
    [K: MapKey + 'static, V: Measure] BTreeMap<K, V>,
    [K: MapKey + 'static, V: Measure, S: BuildHasher + 'static] IndexMap<K, V, S>,
}

// ---------------------------------------------------------------- pointers

impl<T: Measure> Measure for Option<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Optional(self.as_ref().map(|v| v as &dyn Measure))
    }
}

impl<T: Measure> Measure for Box<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Optional(Some(&**self))
    }
}

impl Measure for Box<dyn Measure> {
    fn kind(&self) -> Kind<'_> {
        Kind::Optional(Some(&**self))
    }
}

impl<T: Measure> Measure for Rc<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Optional(Some(&**self))
    }
}

impl<T: Measure> Measure for Arc<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Optional(Some(&**self))
    }
}

impl<T: Measure> Measure for OnceLock<T> {
    fn kind(&self) -> Kind<'_> {
        match self.get() {
            Some(value) => Kind::Optional(Some(value)),
            None => Kind::Invalid,
        }
    }
}

impl<T: Measure> Measure for OnceCell<T> {
    fn kind(&self) -> Kind<'_> {
        match self.get() {
            Some(value) => Kind::Optional(Some(value)),
            None => Kind::Invalid,
        }
    }
}

// ---------------------------------------------------------------- guarded

impl<T: Measure> Indirect for RefCell<T> {
    fn with_target(&self, visitor: &mut TargetVisitor<'_>) -> Result<usize, LengthError> {
        let value = self.try_borrow().map_err(|_| {
            LengthError::inaccessible(std::any::type_name::<Self>(), "already mutably borrowed")
        })?;
        visitor(Some(&*value as &dyn Measure))
    }
}

impl<T: Measure> Indirect for Mutex<T> {
    fn with_target(&self, visitor: &mut TargetVisitor<'_>) -> Result<usize, LengthError> {
        let value = self.try_lock().map_err(|err| {
            let reason = match err {
                TryLockError::Poisoned(_) => "lock poisoned",
                TryLockError::WouldBlock => "lock held elsewhere",
            };
            LengthError::inaccessible(std::any::type_name::<Self>(), reason)
        })?;
        visitor(Some(&*value as &dyn Measure))
    }
}

impl<T: Measure> Indirect for RwLock<T> {
    fn with_target(&self, visitor: &mut TargetVisitor<'_>) -> Result<usize, LengthError> {
        let value = self.try_read().map_err(|err| {
            let reason = match err {
                TryLockError::Poisoned(_) => "lock poisoned",
                TryLockError::WouldBlock => "write lock held elsewhere",
            };
            LengthError::inaccessible(std::any::type_name::<Self>(), reason)
        })?;
        visitor(Some(&*value as &dyn Measure))
    }
}

impl<T: Measure> Indirect for std::rc::Weak<T> {
    fn with_target(&self, visitor: &mut TargetVisitor<'_>) -> Result<usize, LengthError> {
        match self.upgrade() {
            Some(value) => visitor(Some(&*value as &dyn Measure)),
            None => Err(LengthError::InvalidValue {
                type_name: std::any::type_name::<Self>(),
            }),
        }
    }
}

impl<T: Measure> Indirect for std::sync::Weak<T> {
    fn with_target(&self, visitor: &mut TargetVisitor<'_>) -> Result<usize, LengthError> {
        match self.upgrade() {
            Some(value) => visitor(Some(&*value as &dyn Measure)),
            None => Err(LengthError::InvalidValue {
                type_name: std::any::type_name::<Self>(),
            }),
        }
    }
}

macro_rules! guarded {
    ($($ty:ident),*) => {
        $(
            impl<T: Measure> Measure for $ty<T> {
                fn kind(&self) -> Kind<'_> {
                    Kind::Indirect(self)
                }
            }
        )*
    };
}

guarded!(RefCell, Mutex, RwLock);

impl<T: Measure> Measure for std::rc::Weak<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Indirect(self)
    }
}

impl<T: Measure> Measure for std::sync::Weak<T> {
    fn kind(&self) -> Kind<'_> {
        Kind::Indirect(self)
    }
}

// ---------------------------------------------------------------- unsupported

impl<T: 'static> Measure for mpsc::Sender<T> {}
impl<T: 'static> Measure for mpsc::SyncSender<T> {}
impl<T: 'static> Measure for mpsc::Receiver<T> {}
impl<R: 'static> Measure for fn() -> R {}
impl<A: 'static, R: 'static> Measure for fn(A) -> R {}
impl<A: 'static, B: 'static, R: 'static> Measure for fn(A, B) -> R {}

// ---------------------------------------------------------------- serde_json

impl Measure for Number {
    fn kind(&self) -> Kind<'_> {
        if let Some(u) = self.as_u64() {
            Kind::Uint(u)
        } else if let Some(i) = self.as_i64() {
            Kind::Int(i)
        } else {
            self.as_f64().map_or(Kind::Null, Kind::F64)
        }
    }
}

impl Measure for Value {
    fn kind(&self) -> Kind<'_> {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(b) => Kind::Bool(*b),
            Value::Number(n) => n.kind(),
            Value::String(s) => Kind::Str(s),
            Value::Array(items) => Kind::Seq(items),
            Value::Object(map) => Kind::Map(map),
        }
    }
}

impl Mapping for Map<String, Value> {
    fn len(&self) -> usize {
        Map::len(self)
    }

    fn visit(&self, visitor: &mut EntryVisitor<'_>) -> Result<(), LengthError> {
        self.iter()
            .try_for_each(|(key, value)| visitor(Key::Str(key), value as &dyn Measure))
    }
}

impl Measure for Map<String, Value> {
    fn kind(&self) -> Kind<'_> {
        Kind::Map(self)
    }
}
