//! Deep copy engine.
//!
//! A copy walks the value graph once. At every level the dispatcher classifies the value by
//! its [`Shape`](crate::value::Shape) and hands it to the matching [`ShapeCopier`]; composite
//! copiers recurse through [`CopyContext::copy`] for each contained value. Reference cells are
//! recorded in an [`AliasTracker`], so references that share a target in the original share
//! the copied target in the result and cycles terminate.
//!
//! # Key Components
//!
//! - [`copy`] / [`must_copy`] - Copy one value with a fresh tracker
//! - [`copy_all`] - Copy unrelated values in parallel
//! - [`CopyContext`] - Copy several values with one shared tracker
//! - [`ShapeCopier`] / [`copier_for`] - The per-shape strategies
//!
//! # Example
//!
//! ```rust
//! use deepcopy::{copy, heap::Heap, value::{TypeDesc, Value}};
//!
//! let heap = Heap::default();
//! let shared = heap.alloc_reference(TypeDesc::I64, Value::I64(1))?;
//! let pair = heap.alloc_sequence(
//!     TypeDesc::reference(TypeDesc::I64),
//!     vec![shared.clone(), shared],
//! )?;
//!
//! let copied = copy(&heap, &pair)?;
//! let cells = copied.as_sequence().and_then(|s| s.handle()).unwrap();
//! let elements = heap.sequence_elements(cells)?;
//! assert_eq!(elements[0], elements[1]);
//! # Ok::<(), deepcopy::Error>(())
//! ```

mod array;
mod copier;
mod mapping;
mod primitive;
mod record;
mod reference;
mod sequence;
mod tracker;

use log::debug;
use rayon::prelude::*;

pub use array::FixedArrayCopier;
pub use copier::{copier_for, ShapeCopier};
pub use mapping::MappingCopier;
pub use primitive::PrimitiveCopier;
pub use record::RecordCopier;
pub use reference::ReferenceCopier;
pub use sequence::SequenceCopier;
pub use tracker::AliasTracker;

use crate::{heap::Heap, value::Value, Result};

/// State of one copy invocation: the heap the graph lives in and the aliasing tracker.
///
/// Values copied through the same context share one tracker, so a cell reachable from several
/// of them is copied once and the copies alias each other.
///
/// ```rust
/// use deepcopy::{copy::CopyContext, heap::Heap, value::{TypeDesc, Value}};
///
/// let heap = Heap::default();
/// let shared = heap.alloc_reference(TypeDesc::Bool, Value::Bool(true))?;
///
/// let mut ctx = CopyContext::new(&heap);
/// let first = ctx.copy(&shared)?;
/// let second = ctx.copy(&shared)?;
/// assert_eq!(first, second);
/// # Ok::<(), deepcopy::Error>(())
/// ```
#[derive(Debug)]
pub struct CopyContext<'h> {
    heap: &'h Heap,
    tracker: AliasTracker,
}

impl<'h> CopyContext<'h> {
    /// Creates a context with an empty tracker.
    #[must_use]
    pub fn new(heap: &'h Heap) -> Self {
        CopyContext {
            heap,
            tracker: AliasTracker::new(),
        }
    }

    /// Copies `value`, dispatching on its shape.
    ///
    /// # Errors
    ///
    /// Returns the first error raised anywhere in the value graph, wrapped in one layer of
    /// context per composite level between `value` and the failing value.
    pub fn copy(&mut self, value: &Value) -> Result<Value> {
        copier::dispatch(self, value)
    }

    /// Returns the heap values are read from and allocated in.
    #[must_use]
    pub fn heap(&self) -> &'h Heap {
        self.heap
    }

    /// Returns the aliasing tracker.
    #[must_use]
    pub fn tracker(&self) -> &AliasTracker {
        &self.tracker
    }

    pub(crate) fn tracker_mut(&mut self) -> &mut AliasTracker {
        &mut self.tracker
    }
}

/// Produces a deep copy of `value`.
///
/// The result has the same type as `value`, shares no mutable storage with it, and mirrors
/// its reference aliasing: references to one cell in the original point to one new cell in the
/// copy. [`Value::Absent`] copies to itself.
///
/// # Errors
///
/// Returns [`Error::ShapeNotSupported`](crate::Error::ShapeNotSupported) if the graph contains
/// a function, channel or unsafe pointer reachable through exported fields, wrapped in the
/// context of the path that led to it. Heap errors (limit exceeded, invalid reference) are
/// passed through.
pub fn copy(heap: &Heap, value: &Value) -> Result<Value> {
    let mut ctx = CopyContext::new(heap);
    let result = ctx.copy(value);

    match &result {
        Ok(_) => debug!(
            "copied {} ({} cells, {} aliased)",
            value.kind(),
            ctx.tracker.len(),
            ctx.tracker.hits()
        ),
        Err(error) => debug!("copy of {} failed: {error}", value.kind()),
    }

    result
}

/// Produces a deep copy of `value`, panicking on failure.
///
/// # Panics
///
/// Panics with the error message if [`copy`] fails.
#[must_use]
pub fn must_copy(heap: &Heap, value: &Value) -> Value {
    match copy(heap, value) {
        Ok(copied) => copied,
        Err(error) => panic!("{error}"),
    }
}

/// Copies unrelated values in parallel, each with its own tracker.
///
/// Aliasing is preserved within each value but not between them: a cell reachable from two
/// inputs is copied twice. Use a single [`CopyContext`] to copy related values.
///
/// # Errors
///
/// Returns the error of the first failing value in input order.
pub fn copy_all(heap: &Heap, values: &[Value]) -> Result<Vec<Value>> {
    let results: Vec<Result<Value>> = values.par_iter().map(|value| copy(heap, value)).collect();
    results.into_iter().collect()
}
