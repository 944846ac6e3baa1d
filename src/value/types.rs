//! Declared types of values.
//!
//! Composite values remember the declared type of their contents so that a copy can be
//! reconstructed with the same type: the element type of arrays and sequences, the key and
//! value types of mappings, the target type of references and the field layout of records.
//! [`TypeDesc::zero_value`] produces the default value of a type; the copy engine uses it for
//! private record fields and for freshly allocated reference cells.
//!
//! Record types are nominal. Two [`RecordType`] descriptors are the same type only if they are
//! the same allocation, which also makes self-referential types possible:
//!
//! ```rust
//! use deepcopy::value::{FieldDesc, RecordType, TypeDesc};
//!
//! // struct Node { value: i64, next: &Node }
//! let node = RecordType::declare("Node");
//! node.define(vec![
//!     FieldDesc::exported("value", TypeDesc::I64),
//!     FieldDesc::exported("next", TypeDesc::reference(TypeDesc::Record(node.clone()))),
//! ])?;
//! assert_eq!(node.fields().len(), 2);
//! # Ok::<(), deepcopy::Error>(())
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    ptr,
    sync::{Arc, OnceLock},
};

use rustc_hash::FxHashSet;
use strum::{Display, IntoStaticStr};

use crate::{
    value::{
        ChannelValue, Complex, FixedArray, FunctionValue, MappingValue, RecordValue,
        ReferenceValue, SequenceValue, Value,
    },
    Error, Result,
};

/// Declared type of a value slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDesc {
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
    /// Inline array of `len` elements
    Array {
        /// Number of elements
        len: usize,
        /// Element type
        element: Box<TypeDesc>,
    },
    /// Heap-backed sequence
    Sequence(Box<TypeDesc>),
    /// Heap-backed mapping
    Mapping {
        /// Key type
        key: Box<TypeDesc>,
        /// Value type
        value: Box<TypeDesc>,
    },
    /// Nullable reference to a heap cell holding the target type
    Reference(Box<TypeDesc>),
    /// Record of the given nominal type
    Record(Arc<RecordType>),
    /// Function with the given signature text
    Function(Arc<str>),
    /// Channel carrying the element type
    Channel(Box<TypeDesc>),
    /// Raw, untyped pointer
    UnsafePointer,
    /// Any value; the zero value is [`Value::Absent`]
    Dynamic,
}

impl TypeDesc {
    /// Creates an array type.
    #[must_use]
    pub fn array(element: TypeDesc, len: usize) -> Self {
        TypeDesc::Array {
            len,
            element: Box::new(element),
        }
    }

    /// Creates a sequence type.
    #[must_use]
    pub fn sequence(element: TypeDesc) -> Self {
        TypeDesc::Sequence(Box::new(element))
    }

    /// Creates a mapping type.
    #[must_use]
    pub fn mapping(key: TypeDesc, value: TypeDesc) -> Self {
        TypeDesc::Mapping {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Creates a reference type.
    #[must_use]
    pub fn reference(target: TypeDesc) -> Self {
        TypeDesc::Reference(Box::new(target))
    }

    /// Creates a channel type.
    #[must_use]
    pub fn channel(element: TypeDesc) -> Self {
        TypeDesc::Channel(Box::new(element))
    }

    /// Creates a function type from its signature text.
    #[must_use]
    pub fn function(signature: &str) -> Self {
        TypeDesc::Function(signature.into())
    }

    /// Returns the default value of this type.
    ///
    /// Numbers are zero, strings are empty, arrays and records are filled with the zero
    /// values of their element and field types, and every heap-backed type (sequence, mapping,
    /// reference) is nil. Function and channel zero values are nil handles that still carry
    /// their type.
    #[must_use]
    pub fn zero_value(&self) -> Value {
        match self {
            TypeDesc::Bool => Value::Bool(false),
            TypeDesc::I8 => Value::I8(0),
            TypeDesc::I16 => Value::I16(0),
            TypeDesc::I32 => Value::I32(0),
            TypeDesc::I64 => Value::I64(0),
            TypeDesc::Isize => Value::Isize(0),
            TypeDesc::U8 => Value::U8(0),
            TypeDesc::U16 => Value::U16(0),
            TypeDesc::U32 => Value::U32(0),
            TypeDesc::U64 => Value::U64(0),
            TypeDesc::Usize => Value::Usize(0),
            TypeDesc::F32 => Value::F32(0.0),
            TypeDesc::F64 => Value::F64(0.0),
            TypeDesc::Complex64 => Value::Complex64(Complex::default()),
            TypeDesc::Complex128 => Value::Complex128(Complex::default()),
            TypeDesc::String => Value::Str(Arc::from("")),
            TypeDesc::Array { len, element } => {
                Value::Array(FixedArray::zeroed((**element).clone(), *len))
            }
            TypeDesc::Sequence(element) => {
                Value::Sequence(SequenceValue::nil((**element).clone()))
            }
            TypeDesc::Mapping { key, value } => {
                Value::Mapping(MappingValue::nil((**key).clone(), (**value).clone()))
            }
            TypeDesc::Reference(target) => {
                Value::Reference(ReferenceValue::null((**target).clone()))
            }
            TypeDesc::Record(record) => Value::Record(RecordValue::zeroed(record)),
            TypeDesc::Function(signature) => {
                Value::Function(FunctionValue::nil(signature.clone()))
            }
            TypeDesc::Channel(element) => Value::Channel(ChannelValue::nil((**element).clone())),
            TypeDesc::UnsafePointer => Value::UnsafePointer(0),
            TypeDesc::Dynamic => Value::Absent,
        }
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Bool => write!(f, "bool"),
            TypeDesc::I8 => write!(f, "i8"),
            TypeDesc::I16 => write!(f, "i16"),
            TypeDesc::I32 => write!(f, "i32"),
            TypeDesc::I64 => write!(f, "i64"),
            TypeDesc::Isize => write!(f, "isize"),
            TypeDesc::U8 => write!(f, "u8"),
            TypeDesc::U16 => write!(f, "u16"),
            TypeDesc::U32 => write!(f, "u32"),
            TypeDesc::U64 => write!(f, "u64"),
            TypeDesc::Usize => write!(f, "usize"),
            TypeDesc::F32 => write!(f, "f32"),
            TypeDesc::F64 => write!(f, "f64"),
            TypeDesc::Complex64 => write!(f, "complex64"),
            TypeDesc::Complex128 => write!(f, "complex128"),
            TypeDesc::String => write!(f, "string"),
            TypeDesc::Array { len, element } => write!(f, "[{element}; {len}]"),
            TypeDesc::Sequence(element) => write!(f, "[{element}]"),
            TypeDesc::Mapping { key, value } => write!(f, "map<{key}, {value}>"),
            TypeDesc::Reference(target) => write!(f, "&{target}"),
            TypeDesc::Record(record) => write!(f, "{}", record.name()),
            TypeDesc::Function(signature) => write!(f, "{signature}"),
            TypeDesc::Channel(element) => write!(f, "chan<{element}>"),
            TypeDesc::UnsafePointer => write!(f, "*const ()"),
            TypeDesc::Dynamic => write!(f, "any"),
        }
    }
}

/// Visibility of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Visibility {
    /// Readable by external code; copied
    Exported,
    /// Internal to the owning type; skipped by the copy and left at its zero value
    Private,
}

/// A named, typed slot of a record type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDesc {
    /// Field name, unique within its record type
    pub name: String,
    /// Declared type of the field
    pub ty: TypeDesc,
    /// Whether the field takes part in copying
    pub visibility: Visibility,
}

impl FieldDesc {
    /// Creates an exported field.
    #[must_use]
    pub fn exported(name: &str, ty: TypeDesc) -> Self {
        FieldDesc {
            name: name.to_string(),
            ty,
            visibility: Visibility::Exported,
        }
    }

    /// Creates a private field.
    #[must_use]
    pub fn private(name: &str, ty: TypeDesc) -> Self {
        FieldDesc {
            name: name.to_string(),
            ty,
            visibility: Visibility::Private,
        }
    }

    /// Returns `true` if the field is exported.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.visibility == Visibility::Exported
    }
}

/// Nominal record type: a name and an ordered list of fields.
///
/// Equality and hashing are by identity. Field layouts are set once, either at construction
/// through [`RecordType::builder`] or later through [`RecordType::define`] for types that refer
/// to themselves.
pub struct RecordType {
    name: String,
    fields: OnceLock<Vec<FieldDesc>>,
}

impl RecordType {
    /// Starts building a record type with the given name.
    #[must_use]
    pub fn builder(name: &str) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Declares a record type whose fields are supplied later with [`RecordType::define`].
    #[must_use]
    pub fn declare(name: &str) -> Arc<Self> {
        Arc::new(RecordType {
            name: name.to_string(),
            fields: OnceLock::new(),
        })
    }

    /// Sets the field layout of a declared record type.
    ///
    /// A field may refer back to the type through a reference, sequence or mapping, but not
    /// inline (directly, through an array, or through another record).
    ///
    /// # Errors
    ///
    /// Returns [`Error::RecordTypeRedefined`] if the type already has a field layout, or
    /// [`Error::RecursiveRecordType`] if a field would embed the type in itself.
    pub fn define(&self, fields: Vec<FieldDesc>) -> Result<()> {
        if self.is_defined() {
            return Err(Error::RecordTypeRedefined(self.name.clone()));
        }

        let mut visited = FxHashSet::default();
        if let Some(field) = fields
            .iter()
            .find(|field| self.is_embedded_in(&field.ty, &mut visited))
        {
            return Err(Error::RecursiveRecordType {
                record: self.name.clone(),
                field: field.name.clone(),
            });
        }

        self.fields
            .set(fields)
            .map_err(|_| Error::RecordTypeRedefined(self.name.clone()))
    }

    /// Returns `true` if a value of type `ty` stores a value of this record type inline.
    fn is_embedded_in(&self, ty: &TypeDesc, visited: &mut FxHashSet<*const RecordType>) -> bool {
        match ty {
            TypeDesc::Array { element, .. } => self.is_embedded_in(element, visited),
            TypeDesc::Record(record) => {
                if ptr::eq(self, record.as_ref()) {
                    return true;
                }
                visited.insert(Arc::as_ptr(record))
                    && record
                        .fields()
                        .iter()
                        .any(|field| self.is_embedded_in(&field.ty, visited))
            }
            _ => false,
        }
    }

    /// Returns the name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` once the field layout is known.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.fields.get().is_some()
    }

    /// Returns the fields in declaration order, or an empty slice for an undefined type.
    #[must_use]
    pub fn fields(&self) -> &[FieldDesc] {
        self.fields.get().map_or(&[], Vec::as_slice)
    }

    /// Returns the declaration index of the named field.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields().iter().position(|field| field.name == name)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        ptr::hash(self, state);
    }
}

impl fmt::Debug for RecordType {
    // Field types may refer back to this record, only names are printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.fields().iter().map(|field| field.name.as_str()).collect();
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("fields", &names)
            .finish()
    }
}

/// Builder for [`RecordType`].
///
/// ```rust
/// use deepcopy::value::{RecordType, TypeDesc};
///
/// let point = RecordType::builder("Point")
///     .exported("x", TypeDesc::F64)
///     .exported("y", TypeDesc::F64)
///     .private("cache", TypeDesc::String)
///     .build();
/// assert_eq!(point.field_index("y"), Some(1));
/// ```
pub struct RecordTypeBuilder {
    name: String,
    fields: Vec<FieldDesc>,
}

impl RecordTypeBuilder {
    /// Appends an exported field.
    #[must_use]
    pub fn exported(mut self, name: &str, ty: TypeDesc) -> Self {
        self.fields.push(FieldDesc::exported(name, ty));
        self
    }

    /// Appends a private field.
    #[must_use]
    pub fn private(mut self, name: &str, ty: TypeDesc) -> Self {
        self.fields.push(FieldDesc::private(name, ty));
        self
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    /// Finishes the record type.
    #[must_use]
    pub fn build(self) -> Arc<RecordType> {
        Arc::new(RecordType {
            name: self.name,
            fields: OnceLock::from(self.fields),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values() {
        assert_eq!(TypeDesc::I64.zero_value(), Value::I64(0));
        assert_eq!(TypeDesc::String.zero_value(), Value::string(""));
        assert_eq!(TypeDesc::Dynamic.zero_value(), Value::Absent);

        let Value::Array(array) = TypeDesc::array(TypeDesc::U8, 3).zero_value() else {
            panic!("array zero value is not an array");
        };
        assert_eq!(array.elements(), &[Value::U8(0), Value::U8(0), Value::U8(0)]);

        let Value::Reference(reference) = TypeDesc::reference(TypeDesc::I32).zero_value() else {
            panic!("reference zero value is not a reference");
        };
        assert!(reference.is_null());
        assert_eq!(reference.target(), &TypeDesc::I32);
    }

    #[test]
    fn test_record_zero_value() {
        let point = RecordType::builder("Point")
            .exported("x", TypeDesc::I32)
            .private("tag", TypeDesc::String)
            .build();

        let Value::Record(record) = TypeDesc::Record(point.clone()).zero_value() else {
            panic!("record zero value is not a record");
        };
        assert_eq!(record.get("x").unwrap(), &Value::I32(0));
        assert_eq!(record.get("tag").unwrap(), &Value::string(""));
    }

    #[test]
    fn test_record_identity() {
        let a = RecordType::builder("Same").exported("v", TypeDesc::I8).build();
        let b = RecordType::builder("Same").exported("v", TypeDesc::I8).build();

        assert_eq!(TypeDesc::Record(a.clone()), TypeDesc::Record(a.clone()));
        assert_ne!(TypeDesc::Record(a), TypeDesc::Record(b));
    }

    #[test]
    fn test_declare_define() {
        let node = RecordType::declare("Node");
        assert!(!node.is_defined());
        assert!(node.fields().is_empty());

        node.define(vec![FieldDesc::exported(
            "next",
            TypeDesc::reference(TypeDesc::Record(node.clone())),
        )])
        .unwrap();
        assert!(node.is_defined());
        assert_eq!(node.field_index("next"), Some(0));

        assert!(matches!(
            node.define(Vec::new()),
            Err(Error::RecordTypeRedefined(ref name)) if name == "Node"
        ));

        // Debug must not recurse through the self-reference
        assert!(format!("{node:?}").contains("next"));
    }

    #[test]
    fn test_define_rejects_inline_self() {
        let direct = RecordType::declare("Direct");
        assert!(matches!(
            direct.define(vec![
                FieldDesc::exported("id", TypeDesc::I64),
                FieldDesc::exported("inner", TypeDesc::Record(direct.clone())),
            ]),
            Err(Error::RecursiveRecordType { ref record, ref field })
                if record == "Direct" && field == "inner"
        ));
        assert!(!direct.is_defined());

        let through_array = RecordType::declare("Grid");
        assert!(matches!(
            through_array.define(vec![FieldDesc::private(
                "cells",
                TypeDesc::array(TypeDesc::Record(through_array.clone()), 2),
            )]),
            Err(Error::RecursiveRecordType { .. })
        ));

        // Outer embeds Inner, and Inner embeds Outer
        let outer = RecordType::declare("Outer");
        let inner = RecordType::builder("Inner")
            .exported("outer", TypeDesc::Record(outer.clone()))
            .build();
        assert!(matches!(
            outer.define(vec![FieldDesc::exported("inner", TypeDesc::Record(inner))]),
            Err(Error::RecursiveRecordType { ref field, .. }) if field == "inner"
        ));
    }

    #[test]
    fn test_define_allows_indirect_self() {
        let tree = RecordType::declare("Tree");
        let this = TypeDesc::Record(tree.clone());
        tree.define(vec![
            FieldDesc::exported("parent", TypeDesc::reference(this.clone())),
            FieldDesc::exported("children", TypeDesc::sequence(this.clone())),
            FieldDesc::exported("index", TypeDesc::mapping(TypeDesc::String, this.clone())),
        ])
        .unwrap();

        let Value::Record(zero) = this.zero_value() else {
            panic!("record zero value is not a record");
        };
        assert_eq!(zero.fields().count(), 3);
    }

    #[test]
    fn test_type_display() {
        assert_eq!(TypeDesc::array(TypeDesc::I64, 4).to_string(), "[i64; 4]");
        assert_eq!(TypeDesc::sequence(TypeDesc::U8).to_string(), "[u8]");
        assert_eq!(
            TypeDesc::mapping(TypeDesc::String, TypeDesc::Dynamic).to_string(),
            "map<string, any>"
        );
        assert_eq!(
            TypeDesc::reference(TypeDesc::channel(TypeDesc::Bool)).to_string(),
            "&chan<bool>"
        );
    }

    #[test]
    fn test_field_visibility() {
        assert!(FieldDesc::exported("a", TypeDesc::Bool).is_exported());
        assert!(!FieldDesc::private("b", TypeDesc::Bool).is_exported());
        assert_eq!(Visibility::Private.to_string(), "private");
    }
}
