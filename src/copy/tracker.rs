use log::trace;
use rustc_hash::FxHashMap;

use crate::heap::HeapRef;

/// Identity map from original reference cells to the cells allocated for their copies.
///
/// One tracker lives for exactly one top-level copy (or one [`CopyContext`](super::CopyContext)).
/// A cell is registered before its contents are copied, so a cycle that leads back to it finds
/// the entry and reuses the copy instead of recursing again. Null references never reach the
/// tracker.
#[derive(Debug, Default)]
pub struct AliasTracker {
    copies: FxHashMap<HeapRef, HeapRef>,
    hits: usize,
}

impl AliasTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the copy previously registered for `original`, if any.
    pub fn lookup(&mut self, original: HeapRef) -> Option<HeapRef> {
        let copy = self.copies.get(&original).copied();
        if let Some(copy) = copy {
            self.hits += 1;
            trace!("reusing copy {copy} of aliased {original}");
        }
        copy
    }

    /// Records `copy` as the copy of `original`.
    ///
    /// The first registration for an identity is kept; callers always look up before
    /// registering, so a second registration does not happen in a well-formed copy.
    pub fn register(&mut self, original: HeapRef, copy: HeapRef) {
        self.copies.entry(original).or_insert(copy);
    }

    /// Returns the copy registered for `original` without counting it as a hit.
    #[must_use]
    pub fn get(&self, original: HeapRef) -> Option<HeapRef> {
        self.copies.get(&original).copied()
    }

    /// Returns the number of distinct cells copied so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.copies.len()
    }

    /// Returns `true` if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.copies.is_empty()
    }

    /// Returns how many times a registered copy was reused.
    #[must_use]
    pub fn hits(&self) -> usize {
        self.hits
    }
}
