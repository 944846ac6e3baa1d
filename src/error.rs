use thiserror::Error;

use crate::{
    heap::HeapRef,
    value::{EntrySide, Kind, Shape},
};

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every error is deterministic for a given input and fatal to the copy operation that raised
/// it. Composite copiers wrap the failure of a contained value with exactly one layer of context
/// (the index, entry, field or reference that was being copied) as the recursion unwinds, so the
/// chain of [`std::error::Error::source`] mirrors the path from the copied root down to the
/// offending value. [`Error::root_cause`] walks that chain.
///
/// # Error Categories
///
/// ## Shape Errors
/// - [`Error::ShapeNotSupported`] - A value of a non-copyable kind (function, channel, raw pointer)
/// - [`Error::NotAPrimitive`] - The primitive copier was handed a composite value
/// - [`Error::ShapeMismatch`] - A structural copier was handed a value of another shape
///
/// ## Context Errors
/// - [`Error::Element`] - Copying an array or sequence element failed
/// - [`Error::Entry`] - Copying a mapping key or value failed
/// - [`Error::Field`] - Copying a record field failed
/// - [`Error::Reference`] - Copying the target of a reference failed
///
/// ## Heap Errors
/// - [`Error::InvalidHeapReference`] - A [`HeapRef`] that names no cell
/// - [`Error::HeapTypeMismatch`] - A cell holds a different kind of object than expected
/// - [`Error::HeapLimitExceeded`] - Allocation would exceed the heap's configured size
/// - [`Error::IndexOutOfBounds`] - An element index past the end of an array or sequence
/// - [`Error::LockError`] - A heap cell lock was poisoned
///
/// ## Descriptor Errors
/// - [`Error::UndefinedRecordType`] - A declared record type was used before being defined
/// - [`Error::RecordTypeRedefined`] - A record type was defined twice
/// - [`Error::RecursiveRecordType`] - A record type would contain itself inline
/// - [`Error::UnknownField`] - A record has no field with the requested name
///
/// # Examples
///
/// ```rust
/// use deepcopy::{copy, Error, Heap, Shape, Value};
///
/// let heap = Heap::default();
/// match copy(&heap, &Value::function("fn(i64) -> i64")) {
///     Err(Error::ShapeNotSupported { shape, .. }) => assert_eq!(shape, Shape::Unsupported),
///     other => panic!("unexpected result: {other:?}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Shape errors
    /// The value's kind is outside the closed set of copyable shapes.
    ///
    /// Raised by the shape dispatcher for functions, channels and unsafe pointers. Copying
    /// stops immediately; nothing is allocated for the offending value.
    #[error("unable to make a deep copy of {description} (type: {type_name}) - {kind} values ({shape}) are not supported")]
    ShapeNotSupported {
        /// Rendering of the offending value
        description: String,
        /// Rendering of the offending value's type
        type_name: String,
        /// Shape of the offending value, always [`Shape::Unsupported`]
        shape: Shape,
        /// Kind of the offending value
        kind: Kind,
    },

    /// The primitive copier was invoked on a value that is not a primitive.
    #[error("unable to copy {description} (a {kind}) as a primitive")]
    NotAPrimitive {
        /// Rendering of the offending value
        description: String,
        /// The actual kind of the value
        kind: Kind,
    },

    /// A structural copier was invoked on a value of a different shape.
    #[error("must pass a value with shape {expected}; got {found}")]
    ShapeMismatch {
        /// The shape the copier handles
        expected: Shape,
        /// The kind of the value it was given
        found: Kind,
    },

    // Context errors
    /// Copying an element of a fixed array or dynamic sequence failed.
    #[error("failed to copy {container} item at index {index}: {source}")]
    Element {
        /// Shape of the container, [`Shape::FixedArray`] or [`Shape::DynamicSequence`]
        container: Shape,
        /// Index of the failing element
        index: usize,
        /// The error raised while copying the element
        source: Box<Error>,
    },

    /// Copying a key or a value of a mapping entry failed.
    #[error("failed to copy the map {side} {entry}: {source}")]
    Entry {
        /// Which half of the entry failed
        side: EntrySide,
        /// Rendering of the original key or value
        entry: String,
        /// The error raised while copying it
        source: Box<Error>,
    },

    /// Copying an exported field of a record failed.
    #[error("failed to copy the field {field} in the record {record}: {source}")]
    Field {
        /// Name of the failing field
        field: String,
        /// Rendering of the owning record
        record: String,
        /// The error raised while copying the field
        source: Box<Error>,
    },

    /// Copying the value behind a reference failed.
    #[error("failed to copy the value under the reference {reference}: {source}")]
    Reference {
        /// Rendering of the original reference
        reference: String,
        /// The error raised while copying the target
        source: Box<Error>,
    },

    // Heap errors
    /// The reference does not name a cell of the heap it was used with.
    #[error("invalid heap reference: {0}")]
    InvalidHeapReference(HeapRef),

    /// The heap cell holds a different kind of object than the operation requires.
    #[error("heap type mismatch: expected {expected}, found {found}")]
    HeapTypeMismatch {
        /// The object kind the operation needs
        expected: &'static str,
        /// The object kind stored in the cell
        found: &'static str,
    },

    /// The allocation would grow the heap beyond its configured maximum.
    #[error("heap memory limit exceeded: {current} bytes in use (limit: {limit})")]
    HeapLimitExceeded {
        /// Estimated bytes in use before the allocation
        current: usize,
        /// Configured maximum
        limit: usize,
    },

    /// An element index is outside the bounds of an array or sequence.
    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds {
        /// The requested index
        index: usize,
        /// Length of the container
        length: usize,
    },

    /// Failed to lock a heap cell.
    ///
    /// Only happens if a thread panicked while holding the cell's write lock.
    #[error("Failed to lock target")]
    LockError,

    // Descriptor errors
    /// A record type created with [`RecordType::declare`](crate::value::RecordType::declare)
    /// was used before [`RecordType::define`](crate::value::RecordType::define) was called.
    #[error("record type {0} is declared but has no fields defined")]
    UndefinedRecordType(String),

    /// [`RecordType::define`](crate::value::RecordType::define) was called twice.
    #[error("record type {0} is already defined")]
    RecordTypeRedefined(String),

    /// A field layout would make the record contain itself without a reference in between,
    /// giving it no finite zero value.
    #[error("record type {record} contains itself through field {field}")]
    RecursiveRecordType {
        /// Name of the record type
        record: String,
        /// The field that leads back to the record
        field: String,
    },

    /// The record type has no field with the given name.
    #[error("record type {record} has no field named {field}")]
    UnknownField {
        /// Name of the record type
        record: String,
        /// The requested field name
        field: String,
    },
}

impl Error {
    /// Returns the innermost error of a chain of context errors.
    ///
    /// Context variants ([`Error::Element`], [`Error::Entry`], [`Error::Field`] and
    /// [`Error::Reference`]) are unwrapped until a non-context error is reached.
    #[must_use]
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Some(inner) = current.inner() {
            current = inner;
        }
        current
    }

    /// Returns the number of context layers wrapped around the root cause.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self;
        while let Some(inner) = current.inner() {
            depth += 1;
            current = inner;
        }
        depth
    }

    fn inner(&self) -> Option<&Error> {
        match self {
            Error::Element { source, .. }
            | Error::Entry { source, .. }
            | Error::Field { source, .. }
            | Error::Reference { source, .. } => Some(source),
            _ => None,
        }
    }
}
