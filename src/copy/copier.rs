//! Shape dispatch.

use crate::{
    copy::{
        array::FixedArrayCopier, mapping::MappingCopier, primitive::PrimitiveCopier,
        record::RecordCopier, reference::ReferenceCopier, sequence::SequenceCopier, CopyContext,
    },
    value::{Shape, Value},
    Error, Result,
};

/// Copy strategy for one [`Shape`].
///
/// Composite copiers call back into [`CopyContext::copy`] for every contained value, so the
/// dispatcher re-classifies at each level of the recursion. All copiers are stateless; the
/// per-invocation state lives in the [`CopyContext`].
pub trait ShapeCopier: Send + Sync {
    /// The shape this copier handles.
    fn shape(&self) -> Shape;

    /// Copies `value`, which must have this copier's shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] (or [`Error::NotAPrimitive`] for the primitive copier)
    /// if `value` has a different shape, and the context-wrapped error of the first contained
    /// value that fails to copy.
    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value>;
}

/// Returns the copier for `shape`, or `None` for [`Shape::Unsupported`].
#[must_use]
pub fn copier_for(shape: Shape) -> Option<&'static dyn ShapeCopier> {
    match shape {
        Shape::Primitive => Some(&PrimitiveCopier),
        Shape::FixedArray => Some(&FixedArrayCopier),
        Shape::DynamicSequence => Some(&SequenceCopier),
        Shape::Mapping => Some(&MappingCopier),
        Shape::Reference => Some(&ReferenceCopier),
        Shape::Record => Some(&RecordCopier),
        Shape::Unsupported => None,
    }
}

/// Routes `value` to the copier for its shape.
///
/// [`Value::Absent`] is returned unchanged.
pub(crate) fn dispatch(ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
    let Some(shape) = value.shape() else {
        return Ok(Value::Absent);
    };

    match copier_for(shape) {
        Some(copier) => copier.copy(ctx, value),
        None => Err(Error::ShapeNotSupported {
            description: value.to_string(),
            type_name: value.type_desc().to_string(),
            shape,
            kind: value.kind(),
        }),
    }
}

pub(crate) fn shape_mismatch(expected: Shape, value: &Value) -> Error {
    Error::ShapeMismatch {
        expected,
        found: value.kind(),
    }
}
