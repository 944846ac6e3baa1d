use std::{fmt, mem};

use rustc_hash::FxHashMap;

use crate::value::{TypeDesc, Value};

/// Contents of a heap cell.
#[derive(Clone, Debug)]
pub enum HeapObject {
    /// Storage of a dynamic sequence.
    Sequence {
        /// The declared element type.
        element: TypeDesc,
        /// The elements, in order.
        elements: Vec<Value>,
    },

    /// Entries of a mapping.
    Mapping {
        /// The declared key type.
        key: TypeDesc,
        /// The declared value type.
        value: TypeDesc,
        /// The entries.
        entries: FxHashMap<Value, Value>,
    },

    /// Target of a reference: a single value of the declared type.
    Cell {
        /// The declared type of the stored value.
        ty: TypeDesc,
        /// The stored value.
        value: Value,
    },
}

impl HeapObject {
    /// Returns a human-readable description of the object kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            HeapObject::Sequence { .. } => "sequence",
            HeapObject::Mapping { .. } => "mapping",
            HeapObject::Cell { .. } => "cell",
        }
    }

    /// Returns the estimated size of this object in bytes.
    ///
    /// Used for heap limit tracking; it counts the inline size of the stored values only.
    #[must_use]
    pub fn estimated_size(&self) -> usize {
        let slot = mem::size_of::<Value>();
        match self {
            HeapObject::Sequence { elements, .. } => 24 + elements.len() * slot,
            HeapObject::Mapping { entries, .. } => 32 + entries.len() * slot * 2,
            HeapObject::Cell { .. } => 16 + slot,
        }
    }
}

impl fmt::Display for HeapObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapObject::Sequence { element, elements } => {
                write!(f, "[{element}] with {} elements", elements.len())
            }
            HeapObject::Mapping {
                key,
                value,
                entries,
            } => write!(f, "map<{key}, {value}> with {} entries", entries.len()),
            HeapObject::Cell { ty, value } => write!(f, "{ty} = {value}"),
        }
    }
}
