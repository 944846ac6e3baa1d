//! Arena of heap cells.
//!
//! Everything that has identity lives here: the targets of references, the storage of
//! dynamic sequences and the entries of mappings. A [`HeapRef`] names one cell; two values
//! holding the same [`HeapRef`] share that cell, so a mutation through one is visible through
//! the other. That identity is what the copy engine tracks to preserve aliasing.
//!
//! # Key Components
//!
//! - [`Heap`] - The arena, with size accounting and a configurable limit
//! - [`HeapRef`] - Stable handle to a cell
//! - [`HeapObject`] - Contents of a cell
//!
//! # Example
//!
//! ```rust
//! use deepcopy::{heap::Heap, value::{TypeDesc, Value}};
//!
//! let heap = Heap::new(1024 * 1024);
//! let numbers = heap.alloc_sequence(TypeDesc::I64, vec![Value::I64(1), Value::I64(2)])?;
//! let handle = numbers.as_sequence().and_then(|s| s.handle()).unwrap();
//!
//! heap.sequence_push(handle, Value::I64(3))?;
//! assert_eq!(heap.sequence_len(handle)?, 3);
//! # Ok::<(), deepcopy::Error>(())
//! ```

mod arena;
mod object;

use std::fmt;

pub use arena::Heap;
pub use object::HeapObject;

/// Handle to a [`Heap`] cell.
///
/// Handles are plain indices; they are only meaningful for the heap that issued them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HeapRef(pub(crate) usize);

impl HeapRef {
    /// Creates a heap reference with the given index.
    #[must_use]
    pub fn new(id: usize) -> Self {
        HeapRef(id)
    }

    /// Returns the index of the referenced cell.
    #[must_use]
    pub fn id(&self) -> usize {
        self.0
    }
}

impl fmt::Display for HeapRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapRef({})", self.0)
    }
}
