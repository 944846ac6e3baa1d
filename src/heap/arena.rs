use std::{
    fmt, mem,
    sync::{
        atomic::{AtomicUsize, Ordering},
        RwLock,
    },
};

use crate::{
    heap::{HeapObject, HeapRef},
    value::{MappingValue, ReferenceValue, SequenceValue, TypeDesc, Value},
    Error, Result,
};

/// Arena of heap cells.
///
/// Cells are appended to a [`boxcar::Vec`], so allocation only needs `&self` and a
/// [`HeapRef`] stays valid for the lifetime of the heap (nothing is ever freed). Each cell has
/// its own `RwLock`, which makes the heap `Send + Sync` and lets independent copies run in
/// parallel against it.
///
/// # Memory Limits
///
/// Every allocation and every growth of a sequence or mapping is size-estimated (see
/// [`HeapObject::estimated_size`]) and checked against the configured maximum. Exceeding it
/// returns [`Error::HeapLimitExceeded`].
///
/// # Example
///
/// ```rust
/// use deepcopy::{heap::Heap, value::{TypeDesc, Value}};
///
/// let heap = Heap::default();
/// let counter = heap.alloc_reference(TypeDesc::I64, Value::I64(1))?;
/// let cell = counter.as_reference().and_then(|r| r.handle()).unwrap();
///
/// heap.store(cell, Value::I64(2))?;
/// assert_eq!(heap.load(cell)?, Value::I64(2));
/// # Ok::<(), deepcopy::Error>(())
/// ```
#[derive(Debug)]
pub struct Heap {
    cells: boxcar::Vec<RwLock<HeapObject>>,
    current_size: AtomicUsize,
    max_size: usize,
}

impl Heap {
    /// Creates a new heap with the given size limit.
    ///
    /// # Arguments
    ///
    /// * `max_size` - Maximum estimated heap size in bytes
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Heap {
            cells: boxcar::Vec::new(),
            current_size: AtomicUsize::new(0),
            max_size,
        }
    }

    /// Creates a heap with the default limit (64MB).
    #[must_use]
    pub fn default_size() -> Self {
        Self::new(64 * 1024 * 1024)
    }

    /// Checks if growing the heap by `size` bytes would exceed the limit, and reserves them if
    /// not.
    fn reserve(&self, size: usize) -> Result<()> {
        self.current_size
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                current
                    .checked_add(size)
                    .filter(|&grown| grown <= self.max_size)
            })
            .map(|_| ())
            .map_err(|current| Error::HeapLimitExceeded {
                current,
                limit: self.max_size,
            })
    }

    fn cell(&self, heap_ref: HeapRef) -> Result<&RwLock<HeapObject>> {
        self.cells
            .get(heap_ref.0)
            .ok_or(Error::InvalidHeapReference(heap_ref))
    }

    /// Allocates a cell holding `object`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeapLimitExceeded`] if the heap is out of memory.
    pub fn alloc(&self, object: HeapObject) -> Result<HeapRef> {
        self.reserve(object.estimated_size())?;
        Ok(HeapRef(self.cells.push(RwLock::new(object))))
    }

    /// Allocates a dynamic sequence with the given elements.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeapLimitExceeded`] if the heap is out of memory.
    pub fn alloc_sequence(&self, element: TypeDesc, elements: Vec<Value>) -> Result<Value> {
        let heap_ref = self.alloc(HeapObject::Sequence {
            element: element.clone(),
            elements,
        })?;
        Ok(Value::Sequence(SequenceValue::new(element, heap_ref)))
    }

    /// Allocates a mapping with the given entries. Later duplicates of a key replace earlier
    /// ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeapLimitExceeded`] if the heap is out of memory.
    pub fn alloc_mapping<I>(&self, key: TypeDesc, value: TypeDesc, entries: I) -> Result<Value>
    where
        I: IntoIterator<Item = (Value, Value)>,
    {
        let heap_ref = self.alloc(HeapObject::Mapping {
            key: key.clone(),
            value: value.clone(),
            entries: entries.into_iter().collect(),
        })?;
        Ok(Value::Mapping(MappingValue::new(key, value, heap_ref)))
    }

    /// Allocates a cell holding `value` and returns a reference to it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeapLimitExceeded`] if the heap is out of memory.
    pub fn alloc_reference(&self, target: TypeDesc, value: Value) -> Result<Value> {
        let heap_ref = self.alloc(HeapObject::Cell {
            ty: target.clone(),
            value,
        })?;
        Ok(Value::Reference(ReferenceValue::new(target, heap_ref)))
    }

    /// Gets a cloned snapshot of a heap object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeapReference`] if the reference is invalid.
    pub fn get(&self, heap_ref: HeapRef) -> Result<HeapObject> {
        self.with_object(heap_ref, |object| Ok(object.clone()))
    }

    /// Applies a read-only function to an object on the heap.
    ///
    /// The cell is read-locked while `f` runs; `f` must not write to the same cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeapReference`] if the reference is invalid, or whatever `f`
    /// returns.
    pub fn with_object<F, R>(&self, heap_ref: HeapRef, f: F) -> Result<R>
    where
        F: FnOnce(&HeapObject) -> Result<R>,
    {
        let object = self.cell(heap_ref)?.read().map_err(|_| Error::LockError)?;
        f(&object)
    }

    /// Applies a mutation function to an object on the heap.
    ///
    /// The cell is write-locked while `f` runs; `f` must not access the same cell.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeapReference`] if the reference is invalid, or whatever `f`
    /// returns.
    pub fn with_object_mut<F, R>(&self, heap_ref: HeapRef, f: F) -> Result<R>
    where
        F: FnOnce(&mut HeapObject) -> Result<R>,
    {
        let mut object = self.cell(heap_ref)?.write().map_err(|_| Error::LockError)?;
        f(&mut object)
    }

    /// Reads the value stored in a reference cell.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or doesn't point to a cell.
    pub fn load(&self, heap_ref: HeapRef) -> Result<Value> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Cell { value, .. } => Ok(value.clone()),
            other => Err(mismatch("cell", other)),
        })
    }

    /// Replaces the value stored in a reference cell.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or doesn't point to a cell.
    pub fn store(&self, heap_ref: HeapRef, value: Value) -> Result<()> {
        self.with_object_mut(heap_ref, |object| match object {
            HeapObject::Cell { value: slot, .. } => {
                *slot = value;
                Ok(())
            }
            other => Err(mismatch("cell", other)),
        })
    }

    /// Returns the number of elements of a sequence.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or not a sequence.
    pub fn sequence_len(&self, heap_ref: HeapRef) -> Result<usize> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Sequence { elements, .. } => Ok(elements.len()),
            other => Err(mismatch("sequence", other)),
        })
    }

    /// Gets a sequence element (cloned).
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid, not a sequence, or index out of bounds.
    pub fn sequence_get(&self, heap_ref: HeapRef, index: usize) -> Result<Value> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Sequence { elements, .. } => {
                elements.get(index).cloned().ok_or(Error::IndexOutOfBounds {
                    index,
                    length: elements.len(),
                })
            }
            other => Err(mismatch("sequence", other)),
        })
    }

    /// Sets a sequence element.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid, not a sequence, or index out of bounds.
    pub fn sequence_set(&self, heap_ref: HeapRef, index: usize, value: Value) -> Result<()> {
        self.with_object_mut(heap_ref, |object| match object {
            HeapObject::Sequence { elements, .. } => {
                let length = elements.len();
                let slot = elements
                    .get_mut(index)
                    .ok_or(Error::IndexOutOfBounds { index, length })?;
                *slot = value;
                Ok(())
            }
            other => Err(mismatch("sequence", other)),
        })
    }

    /// Appends an element to a sequence.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid, not a sequence, or the heap is out of memory.
    pub fn sequence_push(&self, heap_ref: HeapRef, value: Value) -> Result<()> {
        self.with_object_mut(heap_ref, |object| match object {
            HeapObject::Sequence { elements, .. } => {
                self.reserve(mem::size_of::<Value>())?;
                elements.push(value);
                Ok(())
            }
            other => Err(mismatch("sequence", other)),
        })
    }

    /// Returns a snapshot of a sequence's elements.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or not a sequence.
    pub fn sequence_elements(&self, heap_ref: HeapRef) -> Result<Vec<Value>> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Sequence { elements, .. } => Ok(elements.clone()),
            other => Err(mismatch("sequence", other)),
        })
    }

    /// Returns the number of entries of a mapping.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or not a mapping.
    pub fn mapping_len(&self, heap_ref: HeapRef) -> Result<usize> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Mapping { entries, .. } => Ok(entries.len()),
            other => Err(mismatch("mapping", other)),
        })
    }

    /// Looks up the value stored under `key` (cloned).
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or not a mapping.
    pub fn mapping_get(&self, heap_ref: HeapRef, key: &Value) -> Result<Option<Value>> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Mapping { entries, .. } => Ok(entries.get(key).cloned()),
            other => Err(mismatch("mapping", other)),
        })
    }

    /// Inserts an entry, returning the value previously stored under the key.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid, not a mapping, or the heap is out of memory.
    pub fn mapping_insert(
        &self,
        heap_ref: HeapRef,
        key: Value,
        value: Value,
    ) -> Result<Option<Value>> {
        self.with_object_mut(heap_ref, |object| match object {
            HeapObject::Mapping { entries, .. } => {
                if !entries.contains_key(&key) {
                    self.reserve(mem::size_of::<Value>() * 2)?;
                }
                Ok(entries.insert(key, value))
            }
            other => Err(mismatch("mapping", other)),
        })
    }

    /// Returns a snapshot of a mapping's entries, in unspecified order.
    ///
    /// # Errors
    ///
    /// Returns error if the reference is invalid or not a mapping.
    pub fn mapping_entries(&self, heap_ref: HeapRef) -> Result<Vec<(Value, Value)>> {
        self.with_object(heap_ref, |object| match object {
            HeapObject::Mapping { entries, .. } => Ok(entries
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()),
            other => Err(mismatch("mapping", other)),
        })
    }

    /// Returns `true` if the reference names a cell of this heap.
    #[must_use]
    pub fn contains(&self, heap_ref: HeapRef) -> bool {
        self.cells.get(heap_ref.0).is_some()
    }

    /// Returns the current estimated heap size in bytes.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.current_size.load(Ordering::Relaxed)
    }

    /// Returns the maximum heap size in bytes.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns the number of allocated cells.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.cells.count()
    }
}

fn mismatch(expected: &'static str, found: &HeapObject) -> Error {
    Error::HeapTypeMismatch {
        expected,
        found: found.kind(),
    }
}

impl Default for Heap {
    fn default() -> Self {
        Self::default_size()
    }
}

impl fmt::Display for Heap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heap({} objects, {}/{} bytes)",
            self.object_count(),
            self.current_size(),
            self.max_size
        )
    }
}

#[cfg(test)]
mod tests {
    use rayon::prelude::*;

    use super::*;

    fn handle(value: &Value) -> HeapRef {
        match value {
            Value::Sequence(sequence) => sequence.handle().unwrap(),
            Value::Mapping(mapping) => mapping.handle().unwrap(),
            Value::Reference(reference) => reference.handle().unwrap(),
            other => panic!("{other} is not heap-backed"),
        }
    }

    #[test]
    fn test_heap_alloc_reference() {
        let heap = Heap::new(1024 * 1024);

        let reference = heap.alloc_reference(TypeDesc::I64, Value::I64(42)).unwrap();
        let cell = handle(&reference);
        assert!(heap.contains(cell));
        assert_eq!(heap.load(cell).unwrap(), Value::I64(42));

        heap.store(cell, Value::I64(7)).unwrap();
        assert_eq!(heap.load(cell).unwrap(), Value::I64(7));
    }

    #[test]
    fn test_heap_sequence_operations() {
        let heap = Heap::new(1024 * 1024);

        let sequence = heap
            .alloc_sequence(TypeDesc::I32, vec![Value::I32(0); 5])
            .unwrap();
        let cells = handle(&sequence);
        assert_eq!(heap.sequence_len(cells).unwrap(), 5);

        heap.sequence_set(cells, 2, Value::I32(42)).unwrap();
        assert_eq!(heap.sequence_get(cells, 2).unwrap(), Value::I32(42));

        heap.sequence_push(cells, Value::I32(5)).unwrap();
        assert_eq!(heap.sequence_len(cells).unwrap(), 6);
        assert_eq!(heap.sequence_elements(cells).unwrap()[5], Value::I32(5));

        // Out of bounds
        assert!(matches!(
            heap.sequence_get(cells, 10),
            Err(Error::IndexOutOfBounds {
                index: 10,
                length: 6
            })
        ));
        assert!(heap.sequence_set(cells, 10, Value::I32(0)).is_err());
    }

    #[test]
    fn test_heap_mapping_operations() {
        let heap = Heap::new(1024 * 1024);

        let mapping = heap
            .alloc_mapping(
                TypeDesc::String,
                TypeDesc::I64,
                [(Value::string("a"), Value::I64(1))],
            )
            .unwrap();
        let entries = handle(&mapping);

        assert_eq!(
            heap.mapping_get(entries, &Value::string("a")).unwrap(),
            Some(Value::I64(1))
        );
        assert_eq!(
            heap.mapping_insert(entries, Value::string("a"), Value::I64(2))
                .unwrap(),
            Some(Value::I64(1))
        );
        assert_eq!(
            heap.mapping_insert(entries, Value::string("b"), Value::I64(3))
                .unwrap(),
            None
        );
        assert_eq!(heap.mapping_len(entries).unwrap(), 2);
        assert_eq!(heap.mapping_entries(entries).unwrap().len(), 2);
        assert_eq!(heap.mapping_get(entries, &Value::string("z")).unwrap(), None);
    }

    #[test]
    fn test_heap_type_mismatch() {
        let heap = Heap::new(1024 * 1024);

        let reference = heap.alloc_reference(TypeDesc::I64, Value::I64(1)).unwrap();
        let cell = handle(&reference);

        assert_eq!(
            heap.sequence_len(cell),
            Err(Error::HeapTypeMismatch {
                expected: "sequence",
                found: "cell"
            })
        );
        assert!(heap.mapping_get(cell, &Value::I64(0)).is_err());
    }

    #[test]
    fn test_heap_invalid_reference() {
        let heap = Heap::new(1024 * 1024);
        let bogus = HeapRef::new(99);

        assert!(!heap.contains(bogus));
        assert_eq!(heap.load(bogus), Err(Error::InvalidHeapReference(bogus)));
        assert!(heap.get(bogus).is_err());
    }

    #[test]
    fn test_heap_memory_limit() {
        let heap = Heap::new(256);

        let result = heap.alloc_sequence(TypeDesc::U8, vec![Value::U8(0); 1000]);
        assert!(matches!(result, Err(Error::HeapLimitExceeded { limit: 256, .. })));
        assert_eq!(heap.object_count(), 0);
        assert_eq!(heap.current_size(), 0);
    }

    #[test]
    fn test_heap_size_tracking() {
        let heap = Heap::new(1024 * 1024);
        assert_eq!(heap.current_size(), 0);

        heap.alloc_reference(TypeDesc::Bool, Value::Bool(true)).unwrap();
        let after_one = heap.current_size();
        assert!(after_one > 0);

        let sequence = heap.alloc_sequence(TypeDesc::Bool, Vec::new()).unwrap();
        heap.sequence_push(handle(&sequence), Value::Bool(false)).unwrap();
        assert!(heap.current_size() > after_one);
        assert_eq!(heap.object_count(), 2);
    }

    #[test]
    fn test_heap_display() {
        let heap = Heap::new(4096);
        heap.alloc_reference(TypeDesc::I8, Value::I8(1)).unwrap();
        let display = heap.to_string();
        assert!(display.starts_with("Heap(1 objects"));
        assert!(display.ends_with("/4096 bytes)"));
    }

    #[test]
    fn test_heap_concurrent_allocation() {
        let heap = Heap::default();

        let refs: Vec<HeapRef> = (0..256_i64)
            .into_par_iter()
            .map(|i| handle(&heap.alloc_reference(TypeDesc::I64, Value::I64(i)).unwrap()))
            .collect();

        assert_eq!(heap.object_count(), 256);
        for (i, cell) in refs.into_iter().enumerate() {
            assert_eq!(heap.load(cell).unwrap().as_i64(), Some(i as i64));
        }
    }

    #[test]
    fn test_heap_limit_holds_under_contention() {
        let cell_size = HeapObject::Cell {
            ty: TypeDesc::I64,
            value: Value::I64(0),
        }
        .estimated_size();
        let heap = Heap::new(cell_size * 32);

        let allocated = (0..512_i64)
            .into_par_iter()
            .filter(|&i| heap.alloc_reference(TypeDesc::I64, Value::I64(i)).is_ok())
            .count();

        assert_eq!(allocated, 32);
        assert_eq!(heap.object_count(), 32);
        assert_eq!(heap.current_size(), heap.max_size());
    }
}
