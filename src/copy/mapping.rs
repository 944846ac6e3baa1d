use rustc_hash::FxHashMap;

use crate::{
    copy::{copier::shape_mismatch, CopyContext, ShapeCopier},
    heap::HeapObject,
    value::{EntrySide, MappingValue, Shape, Value},
    Error, Result,
};

/// Copies mappings into a freshly allocated heap cell, copying every key and value.
///
/// Entries are visited in the mapping's internal order. If two distinct keys copy to equal
/// keys, the entry inserted last wins. A nil mapping copies to a new empty mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct MappingCopier;

impl ShapeCopier for MappingCopier {
    fn shape(&self) -> Shape {
        Shape::Mapping
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        let Value::Mapping(mapping) = value else {
            return Err(shape_mismatch(Shape::Mapping, value));
        };
        let key_type = mapping.key_type().clone();
        let value_type = mapping.value_type().clone();
        let entries = match mapping.handle() {
            Some(handle) => ctx.heap().mapping_entries(handle)?,
            None => Vec::new(),
        };

        let mut copied = FxHashMap::with_capacity_and_hasher(entries.len(), Default::default());
        for (key, item) in &entries {
            let copied_key = ctx
                .copy(key)
                .map_err(|source| entry_error(EntrySide::Key, key, source))?;
            let copied_item = ctx
                .copy(item)
                .map_err(|source| entry_error(EntrySide::Value, item, source))?;

            copied.insert(copied_key, copied_item);
        }

        let heap_ref = ctx.heap().alloc(HeapObject::Mapping {
            key: key_type.clone(),
            value: value_type.clone(),
            entries: copied,
        })?;
        Ok(Value::Mapping(MappingValue::new(key_type, value_type, heap_ref)))
    }
}

fn entry_error(side: EntrySide, entry: &Value, source: Error) -> Error {
    Error::Entry {
        side,
        entry: entry.to_string(),
        source: Box::new(source),
    }
}
