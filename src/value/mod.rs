//! Dynamically-typed values and their type descriptors.
//!
//! # Key Components
//!
//! - [`Value`] - A runtime value of any kind
//! - [`Kind`] / [`Shape`] - Fine-grained runtime tag and the structural category derived from it
//! - [`TypeDesc`] - Declared type of a value slot, with [`TypeDesc::zero_value`]
//! - [`RecordType`] - Nominal record descriptor with ordered, visibility-tagged fields
//!
//! Heap-backed values ([`SequenceValue`], [`MappingValue`], [`ReferenceValue`]) are handles into
//! a [`Heap`](crate::heap::Heap); everything else is stored inline.

mod dynvalue;
mod kind;
mod types;

pub use dynvalue::{
    ChannelValue, Complex, FixedArray, FunctionValue, MappingValue, RecordValue, ReferenceValue,
    SequenceValue, Value,
};
pub use kind::{EntrySide, Kind, Shape};
pub use types::{FieldDesc, RecordType, RecordTypeBuilder, TypeDesc, Visibility};
