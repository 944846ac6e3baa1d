//! Runtime classification of values.
//!
//! Every [`Value`](crate::value::Value) carries a fine-grained [`Kind`], and every kind except
//! [`Kind::Invalid`] belongs to exactly one [`Shape`]. The shape is what the copy dispatcher
//! routes on; the kind is what error messages report.

use strum::{Display, EnumCount, EnumIter, IntoStaticStr};

/// Structural category of a value, selecting the copy strategy that applies to it.
///
/// The set is closed: anything that cannot be copied structurally is [`Shape::Unsupported`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Shape {
    /// Booleans, integers, floats, complex numbers and strings, copied by value
    Primitive,
    /// Inline array with a length fixed by its type
    FixedArray,
    /// Heap-backed, variable-length, ordered sequence
    DynamicSequence,
    /// Heap-backed, unordered key/value mapping
    Mapping,
    /// Nullable reference to a heap cell
    Reference,
    /// Inline record with named, typed fields
    Record,
    /// Functions, channels and raw pointers
    Unsupported,
}

/// Fine-grained runtime tag of a value.
///
/// One variant per [`Value`](crate::value::Value) variant. [`Kind::Invalid`] is the kind of
/// [`Value::Absent`](crate::value::Value::Absent) and has no shape.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumCount, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum Kind {
    /// No value
    Invalid,
    /// `bool`
    Bool,
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`
    I32,
    /// `i64`
    I64,
    /// `isize`
    Isize,
    /// `u8`
    U8,
    /// `u16`
    U16,
    /// `u32`
    U32,
    /// `u64`
    U64,
    /// `usize`
    Usize,
    /// `f32`
    F32,
    /// `f64`
    F64,
    /// Complex number with `f32` parts
    Complex64,
    /// Complex number with `f64` parts
    Complex128,
    /// Immutable string
    String,
    /// Fixed-length inline array
    Array,
    /// Heap-backed sequence
    Sequence,
    /// Heap-backed mapping
    Mapping,
    /// Reference to a heap cell
    Reference,
    /// Record
    Record,
    /// Function value
    Function,
    /// Channel handle
    Channel,
    /// Raw, untyped pointer
    UnsafePointer,
}

impl Kind {
    /// Returns the shape values of this kind have, or `None` for [`Kind::Invalid`].
    #[must_use]
    pub fn shape(self) -> Option<Shape> {
        let shape = match self {
            Kind::Invalid => return None,
            Kind::Bool
            | Kind::I8
            | Kind::I16
            | Kind::I32
            | Kind::I64
            | Kind::Isize
            | Kind::U8
            | Kind::U16
            | Kind::U32
            | Kind::U64
            | Kind::Usize
            | Kind::F32
            | Kind::F64
            | Kind::Complex64
            | Kind::Complex128
            | Kind::String => Shape::Primitive,
            Kind::Array => Shape::FixedArray,
            Kind::Sequence => Shape::DynamicSequence,
            Kind::Mapping => Shape::Mapping,
            Kind::Reference => Shape::Reference,
            Kind::Record => Shape::Record,
            Kind::Function | Kind::Channel | Kind::UnsafePointer => Shape::Unsupported,
        };
        Some(shape)
    }

    /// Check if this is a primitive kind
    #[must_use]
    pub fn is_primitive(self) -> bool {
        self.shape() == Some(Shape::Primitive)
    }
}

/// Half of a mapping entry, used to report which side of an entry failed to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntrySide {
    /// The entry's key
    Key,
    /// The entry's value
    Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_every_valid_kind_has_a_shape() {
        for kind in Kind::iter() {
            match kind {
                Kind::Invalid => assert_eq!(kind.shape(), None),
                _ => assert!(kind.shape().is_some(), "{kind} has no shape"),
            }
        }
    }

    #[test]
    fn test_every_shape_is_reachable() {
        for shape in Shape::iter() {
            assert!(
                Kind::iter().any(|kind| kind.shape() == Some(shape)),
                "no kind maps to {shape}"
            );
        }
        assert_eq!(Shape::COUNT, 7);
    }

    #[test]
    fn test_unsupported_kinds() {
        let unsupported: Vec<Kind> = Kind::iter()
            .filter(|kind| kind.shape() == Some(Shape::Unsupported))
            .collect();
        assert_eq!(
            unsupported,
            vec![Kind::Function, Kind::Channel, Kind::UnsafePointer]
        );
    }

    #[test]
    fn test_display_names() {
        assert_eq!(Shape::DynamicSequence.to_string(), "dynamic_sequence");
        assert_eq!(Kind::UnsafePointer.to_string(), "unsafe_pointer");
        assert_eq!(EntrySide::Key.to_string(), "key");
        let name: &'static str = Shape::FixedArray.into();
        assert_eq!(name, "fixed_array");
    }

    #[test]
    fn test_primitive_kinds() {
        assert!(Kind::String.is_primitive());
        assert!(!Kind::Array.is_primitive());
    }
}
