//! Record (fixed named fields) metadata and its process-wide cache.

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use tracing::debug;

use crate::error::LengthError;
use crate::measure::{Kind, Measure};
use crate::primitive;

/// A struct-like value encoded as a JSON object with fixed keys.
///
/// Usually implemented through the [`record!`](crate::record!) macro.
pub trait Record: Measure {
    /// Field descriptors in declaration order. Called once per type; the
    /// result is cached by the [`FieldMetadataProvider`].
    fn describe(&self) -> Vec<FieldDescriptor>;

    /// The field at `index`, or `None` when it cannot be read.
    fn field(&self, index: usize) -> Option<&dyn Measure>;
}

/// One member of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    path: Box<[usize]>,
    name: Cow<'static, str>,
    key_len: usize,
    omit_empty: bool,
}

impl FieldDescriptor {
    /// Field `index` of the record, written under `name`.
    pub fn new(index: usize, name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        Self {
            path: Box::new([index]),
            key_len: primitive::string(&name),
            name,
            omit_empty: false,
        }
    }

    /// Skip the field when it holds its type's empty value.
    pub fn omit_empty(mut self, omit_empty: bool) -> Self {
        self.omit_empty = omit_empty;
        self
    }

    /// Re-roots a descriptor of a nested record under field `index` of the
    /// outer record, which is how flattened members are described.
    pub fn nested(self, index: usize) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.push(index);
        path.extend_from_slice(&self.path);
        Self {
            path: path.into_boxed_slice(),
            ..self
        }
    }

    /// Chain of field indices from the record down to this member.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Encoded length of the quoted key.
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    pub fn is_omit_empty(&self) -> bool {
        self.omit_empty
    }

    /// Follows the access path from `record`. `Ok(None)` means the member
    /// sits behind an absent optional and is not written at all.
    pub fn resolve<'a>(&self, record: &'a dyn Record) -> Result<Option<&'a dyn Measure>, LengthError> {
        let Some((&first, rest)) = self.path.split_first() else {
            return Err(LengthError::InvalidValue {
                type_name: record.type_identity(),
            });
        };
        let mut value = record
            .field(first)
            .ok_or_else(|| LengthError::inaccessible(record.type_identity(), "field is not readable"))?;

        for &index in rest {
            let mut current = value;
            let inner = loop {
                match current.kind() {
                    Kind::Record(inner) => break inner,
                    Kind::Optional(Some(next)) => current = next,
                    Kind::Optional(None) | Kind::Null => return Ok(None),
                    _ => {
                        return Err(LengthError::inaccessible(
                            current.type_identity(),
                            "field path does not lead through a record",
                        ))
                    }
                }
            };
            value = inner
                .field(index)
                .ok_or_else(|| LengthError::inaccessible(inner.type_identity(), "field is not readable"))?;
        }
        Ok(Some(value))
    }
}

/// Source of field descriptors for record types.
///
/// Implementations must return the same sequence for a given type for the
/// life of the process and must be safe to call from many threads.
pub trait FieldMetadataProvider: Send + Sync {
    fn descriptors(&self, record: &dyn Record) -> Arc<[FieldDescriptor]>;
}

/// Read-through cache of descriptors keyed by type.
///
/// Entries are never evicted. Two threads missing on the same type at once
/// both call [`Record::describe`]; the first insert wins and the other
/// result, identical by contract, is dropped.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Arc<[FieldDescriptor]>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by [`compute_length`](crate::compute_length).
    pub fn global() -> &'static DescriptorCache {
        static GLOBAL: OnceLock<DescriptorCache> = OnceLock::new();
        GLOBAL.get_or_init(DescriptorCache::new)
    }

    /// Number of record types cached so far.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FieldMetadataProvider for DescriptorCache {
    fn descriptors(&self, record: &dyn Record) -> Arc<[FieldDescriptor]> {
        let id = record.as_any().type_id();
        if let Some(fields) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
        {
            return Arc::clone(fields);
        }

        let described: Arc<[FieldDescriptor]> = record.describe().into();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let fields = entries.entry(id).or_insert_with(|| {
            debug!(
                type_name = record.type_identity(),
                fields = described.len(),
                "cached record field descriptors"
            );
            described
        });
        Arc::clone(fields)
    }
}
