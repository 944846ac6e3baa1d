use crate::{
    copy::{copier::shape_mismatch, CopyContext, ShapeCopier},
    heap::HeapObject,
    value::{ReferenceValue, Shape, Value},
    Error, Result,
};

/// Copies references, preserving aliasing and terminating cycles through the tracker.
///
/// The cell for the copy is allocated with the target type's zero value and registered before
/// the pointee is copied; the copied pointee is stored into it afterwards. Any path that leads
/// back to the original cell while its pointee is being copied receives the registered cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceCopier;

impl ShapeCopier for ReferenceCopier {
    fn shape(&self) -> Shape {
        Shape::Reference
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        let Value::Reference(reference) = value else {
            return Err(shape_mismatch(Shape::Reference, value));
        };
        let target = reference.target();
        let Some(original) = reference.handle() else {
            return Ok(Value::Reference(ReferenceValue::null(target.clone())));
        };

        if let Some(copy) = ctx.tracker_mut().lookup(original) {
            return Ok(Value::Reference(ReferenceValue::new(target.clone(), copy)));
        }

        let pointee = ctx.heap().load(original)?;
        let copy = ctx.heap().alloc(HeapObject::Cell {
            ty: target.clone(),
            value: target.zero_value(),
        })?;
        ctx.tracker_mut().register(original, copy);

        let item = ctx.copy(&pointee).map_err(|source| Error::Reference {
            reference: value.to_string(),
            source: Box::new(source),
        })?;
        if !item.is_absent() {
            ctx.heap().store(copy, item)?;
        }

        Ok(Value::Reference(ReferenceValue::new(target.clone(), copy)))
    }
}
