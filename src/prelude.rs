//! # deepcopy Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and functions
//! from the deepcopy library. Import this module to get quick access to everything needed to
//! build a value graph and copy it.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all deepcopy operations
pub use crate::Error;

/// The result type used throughout deepcopy
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Copy functions
pub use crate::copy::{copy, copy_all, must_copy};

/// Shared-tracker copying
pub use crate::copy::CopyContext;

// ================================================================================================
// Heap
// ================================================================================================

/// Arena and cell handles
pub use crate::heap::{Heap, HeapRef};

// ================================================================================================
// Values and Types
// ================================================================================================

/// Runtime values
pub use crate::value::{
    ChannelValue, Complex, FixedArray, FunctionValue, MappingValue, RecordValue, ReferenceValue,
    SequenceValue, Value,
};

/// Runtime classification
pub use crate::value::{EntrySide, Kind, Shape};

/// Type descriptors
pub use crate::value::{FieldDesc, RecordType, TypeDesc, Visibility};
