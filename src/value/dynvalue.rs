//! Core runtime value representation.

use std::{
    fmt,
    hash::{Hash, Hasher},
    mem,
    sync::Arc,
};

use crate::{
    heap::HeapRef,
    value::{FieldDesc, Kind, RecordType, Shape, TypeDesc},
    Error, Result,
};

/// Dynamically-typed value.
///
/// Primitive values, fixed arrays and records are stored inline and have value semantics:
/// cloning a `Value` clones them. Sequences, mappings and reference targets live in
/// [`Heap`](crate::heap::Heap) cells and are held through a [`HeapRef`]; cloning such a value
/// clones the handle, so both clones share the same storage. Only
/// [`copy`](crate::copy::copy) produces storage that is independent of the original.
///
/// # Kind Mapping
///
/// | Variant | [`Kind`] | [`Shape`] |
/// |---------|----------|-----------|
/// | [`Value::Absent`] | `Invalid` | none |
/// | `Bool`, integers, floats, complex, `Str` | matching kind | `Primitive` |
/// | [`Value::Array`] | `Array` | `FixedArray` |
/// | [`Value::Sequence`] | `Sequence` | `DynamicSequence` |
/// | [`Value::Mapping`] | `Mapping` | `Mapping` |
/// | [`Value::Reference`] | `Reference` | `Reference` |
/// | [`Value::Record`] | `Record` | `Record` |
/// | `Function`, `Channel`, `UnsafePointer` | matching kind | `Unsupported` |
///
/// # Equality
///
/// Equality and hashing are structural for inline data and by identity for heap-backed data,
/// which makes every value usable as a mapping key. Floating point values compare by bit
/// pattern with `-0.0` folded onto `0.0`.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// A value without any shape information.
    #[default]
    Absent,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// Pointer-sized signed integer
    Isize(isize),
    /// 8-bit unsigned integer
    U8(u8),
    /// 16-bit unsigned integer
    U16(u16),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit unsigned integer
    U64(u64),
    /// Pointer-sized unsigned integer
    Usize(usize),
    /// 32-bit floating point
    F32(f32),
    /// 64-bit floating point
    F64(f64),
    /// Complex number with `f32` parts
    Complex64(Complex<f32>),
    /// Complex number with `f64` parts
    Complex128(Complex<f64>),
    /// Immutable string
    Str(Arc<str>),
    /// Fixed-length inline array
    Array(FixedArray),
    /// Heap-backed sequence
    Sequence(SequenceValue),
    /// Heap-backed mapping
    Mapping(MappingValue),
    /// Nullable reference to a heap cell
    Reference(ReferenceValue),
    /// Inline record
    Record(RecordValue),
    /// Function value; cannot be copied
    Function(FunctionValue),
    /// Channel handle; cannot be copied
    Channel(ChannelValue),
    /// Raw, untyped pointer; cannot be copied
    UnsafePointer(usize),
}

impl Value {
    /// Creates a string value.
    #[must_use]
    pub fn string(value: &str) -> Self {
        Value::Str(value.into())
    }

    /// Creates a function value with the given signature.
    #[must_use]
    pub fn function(signature: &str) -> Self {
        Value::Function(FunctionValue::new(signature.into(), "<anonymous>".into()))
    }

    /// Creates a channel value carrying `element`.
    #[must_use]
    pub fn channel(element: TypeDesc, id: u64) -> Self {
        Value::Channel(ChannelValue::new(element, id))
    }

    /// Returns the runtime kind of this value.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Value::Absent => Kind::Invalid,
            Value::Bool(_) => Kind::Bool,
            Value::I8(_) => Kind::I8,
            Value::I16(_) => Kind::I16,
            Value::I32(_) => Kind::I32,
            Value::I64(_) => Kind::I64,
            Value::Isize(_) => Kind::Isize,
            Value::U8(_) => Kind::U8,
            Value::U16(_) => Kind::U16,
            Value::U32(_) => Kind::U32,
            Value::U64(_) => Kind::U64,
            Value::Usize(_) => Kind::Usize,
            Value::F32(_) => Kind::F32,
            Value::F64(_) => Kind::F64,
            Value::Complex64(_) => Kind::Complex64,
            Value::Complex128(_) => Kind::Complex128,
            Value::Str(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Sequence(_) => Kind::Sequence,
            Value::Mapping(_) => Kind::Mapping,
            Value::Reference(_) => Kind::Reference,
            Value::Record(_) => Kind::Record,
            Value::Function(_) => Kind::Function,
            Value::Channel(_) => Kind::Channel,
            Value::UnsafePointer(_) => Kind::UnsafePointer,
        }
    }

    /// Returns the shape of this value, or `None` for [`Value::Absent`].
    #[must_use]
    pub fn shape(&self) -> Option<Shape> {
        self.kind().shape()
    }

    /// Returns the declared type of this value. [`Value::Absent`] reports [`TypeDesc::Dynamic`].
    #[must_use]
    pub fn type_desc(&self) -> TypeDesc {
        match self {
            Value::Absent => TypeDesc::Dynamic,
            Value::Bool(_) => TypeDesc::Bool,
            Value::I8(_) => TypeDesc::I8,
            Value::I16(_) => TypeDesc::I16,
            Value::I32(_) => TypeDesc::I32,
            Value::I64(_) => TypeDesc::I64,
            Value::Isize(_) => TypeDesc::Isize,
            Value::U8(_) => TypeDesc::U8,
            Value::U16(_) => TypeDesc::U16,
            Value::U32(_) => TypeDesc::U32,
            Value::U64(_) => TypeDesc::U64,
            Value::Usize(_) => TypeDesc::Usize,
            Value::F32(_) => TypeDesc::F32,
            Value::F64(_) => TypeDesc::F64,
            Value::Complex64(_) => TypeDesc::Complex64,
            Value::Complex128(_) => TypeDesc::Complex128,
            Value::Str(_) => TypeDesc::String,
            Value::Array(array) => TypeDesc::array(array.element.clone(), array.len()),
            Value::Sequence(sequence) => TypeDesc::sequence(sequence.element.clone()),
            Value::Mapping(mapping) => {
                TypeDesc::mapping(mapping.key.clone(), mapping.value.clone())
            }
            Value::Reference(reference) => TypeDesc::reference(reference.target.clone()),
            Value::Record(record) => TypeDesc::Record(record.ty.clone()),
            Value::Function(function) => TypeDesc::Function(function.signature.clone()),
            Value::Channel(channel) => TypeDesc::channel(channel.element.clone()),
            Value::UnsafePointer(_) => TypeDesc::UnsafePointer,
        }
    }

    /// Returns `true` if this value is [`Value::Absent`].
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Returns the value as `i64` if it is a signed integer that fits.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I8(value) => Some(i64::from(*value)),
            Value::I16(value) => Some(i64::from(*value)),
            Value::I32(value) => Some(i64::from(*value)),
            Value::I64(value) => Some(*value),
            Value::Isize(value) => i64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Returns the string slice of a [`Value::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(&**value),
            _ => None,
        }
    }

    /// Returns the inner array of a [`Value::Array`].
    #[must_use]
    pub fn as_array(&self) -> Option<&FixedArray> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// Returns the inner sequence handle of a [`Value::Sequence`].
    #[must_use]
    pub fn as_sequence(&self) -> Option<&SequenceValue> {
        match self {
            Value::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    /// Returns the inner mapping handle of a [`Value::Mapping`].
    #[must_use]
    pub fn as_mapping(&self) -> Option<&MappingValue> {
        match self {
            Value::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns the inner reference of a [`Value::Reference`].
    #[must_use]
    pub fn as_reference(&self) -> Option<&ReferenceValue> {
        match self {
            Value::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    /// Returns the inner record of a [`Value::Record`].
    #[must_use]
    pub fn as_record(&self) -> Option<&RecordValue> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

// Folds -0.0 onto 0.0 so equal numbers hash equally.
fn f32_key(value: f32) -> u32 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

fn f64_key(value: f64) -> u64 {
    if value == 0.0 {
        0
    } else {
        value.to_bits()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Absent, Value::Absent) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::Isize(a), Value::Isize(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::Usize(a), Value::Usize(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => f32_key(*a) == f32_key(*b),
            (Value::F64(a), Value::F64(b)) => f64_key(*a) == f64_key(*b),
            (Value::Complex64(a), Value::Complex64(b)) => {
                f32_key(a.re) == f32_key(b.re) && f32_key(a.im) == f32_key(b.im)
            }
            (Value::Complex128(a), Value::Complex128(b)) => {
                f64_key(a.re) == f64_key(b.re) && f64_key(a.im) == f64_key(b.im)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            (Value::Mapping(a), Value::Mapping(b)) => a == b,
            (Value::Reference(a), Value::Reference(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Channel(a), Value::Channel(b)) => a == b,
            (Value::UnsafePointer(a), Value::UnsafePointer(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        mem::discriminant(self).hash(state);
        match self {
            Value::Absent => {}
            Value::Bool(value) => value.hash(state),
            Value::I8(value) => value.hash(state),
            Value::I16(value) => value.hash(state),
            Value::I32(value) => value.hash(state),
            Value::I64(value) => value.hash(state),
            Value::Isize(value) => value.hash(state),
            Value::U8(value) => value.hash(state),
            Value::U16(value) => value.hash(state),
            Value::U32(value) => value.hash(state),
            Value::U64(value) => value.hash(state),
            Value::Usize(value) => value.hash(state),
            Value::F32(value) => f32_key(*value).hash(state),
            Value::F64(value) => f64_key(*value).hash(state),
            Value::Complex64(value) => {
                f32_key(value.re).hash(state);
                f32_key(value.im).hash(state);
            }
            Value::Complex128(value) => {
                f64_key(value.re).hash(state);
                f64_key(value.im).hash(state);
            }
            Value::Str(value) => value.hash(state),
            Value::Array(array) => array.hash(state),
            Value::Sequence(sequence) => sequence.hash(state),
            Value::Mapping(mapping) => mapping.hash(state),
            Value::Reference(reference) => reference.hash(state),
            Value::Record(record) => record.hash(state),
            Value::Function(function) => function.hash(state),
            Value::Channel(channel) => channel.hash(state),
            Value::UnsafePointer(value) => value.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Absent => write!(f, "<absent>"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::I8(value) => write!(f, "{value}"),
            Value::I16(value) => write!(f, "{value}"),
            Value::I32(value) => write!(f, "{value}"),
            Value::I64(value) => write!(f, "{value}"),
            Value::Isize(value) => write!(f, "{value}"),
            Value::U8(value) => write!(f, "{value}"),
            Value::U16(value) => write!(f, "{value}"),
            Value::U32(value) => write!(f, "{value}"),
            Value::U64(value) => write!(f, "{value}"),
            Value::Usize(value) => write!(f, "{value}"),
            Value::F32(value) => write!(f, "{value}"),
            Value::F64(value) => write!(f, "{value}"),
            Value::Complex64(value) => write!(f, "{value}"),
            Value::Complex128(value) => write!(f, "{value}"),
            Value::Str(value) => write!(f, "{value:?}"),
            Value::Array(array) => {
                write!(f, "[")?;
                for (i, element) in array.elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Value::Sequence(sequence) => {
                write!(f, "[{}]", sequence.element)?;
                write_handle(f, sequence.handle)
            }
            Value::Mapping(mapping) => {
                write!(f, "map<{}, {}>", mapping.key, mapping.value)?;
                write_handle(f, mapping.handle)
            }
            Value::Reference(reference) => {
                write!(f, "&{}", reference.target)?;
                write_handle(f, reference.handle)
            }
            Value::Record(record) => {
                write!(f, "{}{{", record.ty.name())?;
                for (i, (field, value)) in record.fields().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {value}", field.name)?;
                }
                write!(f, "}}")
            }
            Value::Function(function) => match &function.symbol {
                Some(symbol) => write!(f, "{}({symbol})", function.signature),
                None => write!(f, "{}(nil)", function.signature),
            },
            Value::Channel(channel) => match channel.id {
                Some(id) => write!(f, "chan<{}>(#{id})", channel.element),
                None => write!(f, "chan<{}>(nil)", channel.element),
            },
            Value::UnsafePointer(address) => write!(f, "0x{address:x}"),
        }
    }
}

fn write_handle(f: &mut fmt::Formatter<'_>, handle: Option<HeapRef>) -> fmt::Result {
    match handle {
        Some(handle) => write!(f, "({handle})"),
        None => write!(f, "(nil)"),
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value)
                }
            }
        )*
    };
}

impl_from_primitive! {
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
    f32 => F32,
    f64 => F64,
    Complex<f32> => Complex64,
    Complex<f64> => Complex128,
    FixedArray => Array,
    RecordValue => Record,
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value.into())
    }
}

/// Complex number.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Complex<T> {
    /// Real part
    pub re: T,
    /// Imaginary part
    pub im: T,
}

impl<T> Complex<T> {
    /// Creates a complex number from its parts.
    pub fn new(re: T, im: T) -> Self {
        Complex { re, im }
    }
}

impl<T: fmt::Display> fmt::Display for Complex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}+{}i)", self.re, self.im)
    }
}

/// Fixed-length array stored inline.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FixedArray {
    element: TypeDesc,
    elements: Vec<Value>,
}

impl FixedArray {
    /// Creates an array from its elements. The length is fixed from here on.
    #[must_use]
    pub fn new(element: TypeDesc, elements: Vec<Value>) -> Self {
        FixedArray { element, elements }
    }

    /// Creates an array of `len` zero values of `element`.
    #[must_use]
    pub fn zeroed(element: TypeDesc, len: usize) -> Self {
        let elements = vec![element.zero_value(); len];
        FixedArray { element, elements }
    }

    /// Returns the element type.
    #[must_use]
    pub fn element(&self) -> &TypeDesc {
        &self.element
    }

    /// Returns the elements.
    #[must_use]
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` for a zero-length array.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.elements.get(index)
    }

    /// Replaces the element at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index` is not below the array length.
    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let length = self.elements.len();
        match self.elements.get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { index, length }),
        }
    }
}

/// Handle to a sequence stored on the heap; `None` is the nil sequence.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SequenceValue {
    element: TypeDesc,
    handle: Option<HeapRef>,
}

impl SequenceValue {
    /// Creates a handle to the sequence stored in `handle`.
    #[must_use]
    pub fn new(element: TypeDesc, handle: HeapRef) -> Self {
        SequenceValue {
            element,
            handle: Some(handle),
        }
    }

    /// Creates a nil sequence.
    #[must_use]
    pub fn nil(element: TypeDesc) -> Self {
        SequenceValue {
            element,
            handle: None,
        }
    }

    /// Returns the element type.
    #[must_use]
    pub fn element(&self) -> &TypeDesc {
        &self.element
    }

    /// Returns the heap cell holding the elements.
    #[must_use]
    pub fn handle(&self) -> Option<HeapRef> {
        self.handle
    }

    /// Returns `true` for the nil sequence.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.handle.is_none()
    }
}

/// Handle to a mapping stored on the heap; `None` is the nil mapping.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MappingValue {
    key: TypeDesc,
    value: TypeDesc,
    handle: Option<HeapRef>,
}

impl MappingValue {
    /// Creates a handle to the mapping stored in `handle`.
    #[must_use]
    pub fn new(key: TypeDesc, value: TypeDesc, handle: HeapRef) -> Self {
        MappingValue {
            key,
            value,
            handle: Some(handle),
        }
    }

    /// Creates a nil mapping.
    #[must_use]
    pub fn nil(key: TypeDesc, value: TypeDesc) -> Self {
        MappingValue {
            key,
            value,
            handle: None,
        }
    }

    /// Returns the key type.
    #[must_use]
    pub fn key_type(&self) -> &TypeDesc {
        &self.key
    }

    /// Returns the value type.
    #[must_use]
    pub fn value_type(&self) -> &TypeDesc {
        &self.value
    }

    /// Returns the heap cell holding the entries.
    #[must_use]
    pub fn handle(&self) -> Option<HeapRef> {
        self.handle
    }

    /// Returns `true` for the nil mapping.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.handle.is_none()
    }
}

/// Nullable reference to a heap cell holding a value of the target type.
///
/// The [`HeapRef`] is the reference's identity: two references to the same cell alias, and
/// the copy engine preserves that aliasing in the copy.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReferenceValue {
    target: TypeDesc,
    handle: Option<HeapRef>,
}

impl ReferenceValue {
    /// Creates a reference to the cell `handle`.
    #[must_use]
    pub fn new(target: TypeDesc, handle: HeapRef) -> Self {
        ReferenceValue {
            target,
            handle: Some(handle),
        }
    }

    /// Creates a null reference.
    #[must_use]
    pub fn null(target: TypeDesc) -> Self {
        ReferenceValue {
            target,
            handle: None,
        }
    }

    /// Returns the target type.
    #[must_use]
    pub fn target(&self) -> &TypeDesc {
        &self.target
    }

    /// Returns the referenced cell.
    #[must_use]
    pub fn handle(&self) -> Option<HeapRef> {
        self.handle
    }

    /// Returns `true` for the null reference.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.handle.is_none()
    }
}

/// Record value stored inline, one value per field of its [`RecordType`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordValue {
    ty: Arc<RecordType>,
    values: Vec<Value>,
}

impl RecordValue {
    /// Creates a record of type `ty` with every field at its zero value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UndefinedRecordType`] if `ty` was declared but never defined.
    pub fn new(ty: &Arc<RecordType>) -> Result<Self> {
        if !ty.is_defined() {
            return Err(Error::UndefinedRecordType(ty.name().to_string()));
        }
        Ok(Self::zeroed(ty))
    }

    pub(crate) fn zeroed(ty: &Arc<RecordType>) -> Self {
        RecordValue {
            ty: ty.clone(),
            values: ty.fields().iter().map(|field| field.ty.zero_value()).collect(),
        }
    }

    /// Sets a field and returns the record, for building records in one expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the type has no field called `name`.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value.into())?;
        Ok(self)
    }

    /// Returns the record's type.
    #[must_use]
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.ty
    }

    /// Returns the value of the named field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the type has no field called `name`.
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.ty
            .field_index(name)
            .and_then(|index| self.values.get(index))
            .ok_or_else(|| self.unknown_field(name))
    }

    /// Replaces the value of the named field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the type has no field called `name`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match self.ty.field_index(name) {
            Some(index) if index < self.values.len() => {
                self.values[index] = value;
                Ok(())
            }
            _ => Err(self.unknown_field(name)),
        }
    }

    /// Returns the field descriptors with their values, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldDesc, &Value)> {
        self.ty.fields().iter().zip(self.values.iter())
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    fn unknown_field(&self, name: &str) -> Error {
        Error::UnknownField {
            record: self.ty.name().to_string(),
            field: name.to_string(),
        }
    }
}

/// Function value. A nil function has no symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionValue {
    signature: Arc<str>,
    symbol: Option<Arc<str>>,
}

impl FunctionValue {
    /// Creates a function value bound to `symbol`.
    #[must_use]
    pub fn new(signature: Arc<str>, symbol: Arc<str>) -> Self {
        FunctionValue {
            signature,
            symbol: Some(symbol),
        }
    }

    /// Creates a nil function.
    #[must_use]
    pub fn nil(signature: Arc<str>) -> Self {
        FunctionValue {
            signature,
            symbol: None,
        }
    }

    /// Returns the signature text.
    #[must_use]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

/// Channel handle. A nil channel has no id.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelValue {
    element: TypeDesc,
    id: Option<u64>,
}

impl ChannelValue {
    /// Creates a handle to channel `id`.
    #[must_use]
    pub fn new(element: TypeDesc, id: u64) -> Self {
        ChannelValue {
            element,
            id: Some(id),
        }
    }

    /// Creates a nil channel.
    #[must_use]
    pub fn nil(element: TypeDesc) -> Self {
        ChannelValue { element, id: None }
    }

    /// Returns the element type.
    #[must_use]
    pub fn element(&self) -> &TypeDesc {
        &self.element
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn point_type() -> Arc<RecordType> {
        RecordType::builder("Point")
            .exported("x", TypeDesc::I64)
            .exported("y", TypeDesc::I64)
            .private("label", TypeDesc::String)
            .build()
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(Value::Absent.kind(), Kind::Invalid);
        assert_eq!(Value::Absent.shape(), None);
        assert_eq!(Value::from(1_u16).shape(), Some(Shape::Primitive));
        assert_eq!(Value::string("x").kind(), Kind::String);
        assert_eq!(
            Value::Array(FixedArray::zeroed(TypeDesc::I8, 2)).shape(),
            Some(Shape::FixedArray)
        );
        assert_eq!(Value::function("fn()").shape(), Some(Shape::Unsupported));
        assert_eq!(Value::channel(TypeDesc::I32, 7).kind(), Kind::Channel);
        assert_eq!(Value::UnsafePointer(0x1000).shape(), Some(Shape::Unsupported));
    }

    #[test]
    fn test_float_equality() {
        assert_eq!(Value::F64(0.0), Value::F64(-0.0));
        assert_eq!(Value::F64(f64::NAN), Value::F64(f64::NAN));
        assert_ne!(Value::F64(1.0), Value::F32(1.0));

        let mut map = HashMap::new();
        map.insert(Value::F64(-0.0), 1);
        assert_eq!(map.get(&Value::F64(0.0)), Some(&1));
    }

    #[test]
    fn test_handle_identity() {
        let a = ReferenceValue::new(TypeDesc::I64, HeapRef::new(1));
        let b = ReferenceValue::new(TypeDesc::I64, HeapRef::new(2));
        assert_ne!(Value::Reference(a.clone()), Value::Reference(b));
        assert_eq!(Value::Reference(a.clone()), Value::Reference(a));
        assert!(ReferenceValue::null(TypeDesc::I64).is_null());
    }

    #[test]
    fn test_record_access() {
        let point = point_type();
        let mut record = RecordValue::new(&point)
            .unwrap()
            .with("x", 3_i64)
            .unwrap()
            .with("label", "origin")
            .unwrap();

        assert_eq!(record.get("x").unwrap(), &Value::I64(3));
        assert_eq!(record.get("y").unwrap(), &Value::I64(0));
        record.set("y", Value::I64(4)).unwrap();
        assert_eq!(record.get("y").unwrap().as_i64(), Some(4));

        assert!(matches!(
            record.get("z"),
            Err(Error::UnknownField { ref field, .. }) if field == "z"
        ));

        let names: Vec<&str> = record.fields().map(|(field, _)| field.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y", "label"]);
    }

    #[test]
    fn test_undefined_record_type() {
        let pending = RecordType::declare("Pending");
        assert!(matches!(
            RecordValue::new(&pending),
            Err(Error::UndefinedRecordType(ref name)) if name == "Pending"
        ));
    }

    #[test]
    fn test_record_equality_includes_private_fields() {
        let point = point_type();
        let a = RecordValue::new(&point).unwrap().with("label", "a").unwrap();
        let b = RecordValue::new(&point).unwrap().with("label", "b").unwrap();
        assert_ne!(Value::Record(a), Value::Record(b));
    }

    #[test]
    fn test_fixed_array_set() {
        let mut array = FixedArray::zeroed(TypeDesc::I64, 4);
        array.set(3, Value::I64(3)).unwrap();
        assert_eq!(array.get(3), Some(&Value::I64(3)));
        assert!(matches!(
            array.set(4, Value::I64(0)),
            Err(Error::IndexOutOfBounds { index: 4, length: 4 })
        ));
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::string("hi").to_string(), "\"hi\"");
        assert_eq!(Value::Complex64(Complex::new(1.0, 2.0)).to_string(), "(1+2i)");

        let array = FixedArray::new(TypeDesc::I32, vec![Value::I32(1), Value::I32(2)]);
        assert_eq!(Value::Array(array).to_string(), "[1, 2]");

        let reference = ReferenceValue::new(TypeDesc::I64, HeapRef::new(5));
        assert_eq!(Value::Reference(reference).to_string(), "&i64(HeapRef(5))");
        assert_eq!(
            Value::Sequence(SequenceValue::nil(TypeDesc::U8)).to_string(),
            "[u8](nil)"
        );

        let record = RecordValue::new(&point_type()).unwrap().with("x", 1_i64).unwrap();
        assert_eq!(
            Value::Record(record).to_string(),
            "Point{x: 1, y: 0, label: \"\"}"
        );
    }

    #[test]
    fn test_type_desc_round_trip() {
        let mapping = MappingValue::nil(TypeDesc::String, TypeDesc::I64);
        assert_eq!(
            Value::Mapping(mapping).type_desc(),
            TypeDesc::mapping(TypeDesc::String, TypeDesc::I64)
        );
        assert_eq!(Value::Absent.type_desc(), TypeDesc::Dynamic);
        assert_eq!(
            Value::Array(FixedArray::zeroed(TypeDesc::F32, 3)).type_desc(),
            TypeDesc::array(TypeDesc::F32, 3)
        );
    }
}
