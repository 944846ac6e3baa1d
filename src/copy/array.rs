use crate::{
    copy::{copier::shape_mismatch, CopyContext, ShapeCopier},
    value::{FixedArray, Shape, Value},
    Error, Result,
};

/// Copies inline fixed arrays element by element, in ascending index order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedArrayCopier;

impl ShapeCopier for FixedArrayCopier {
    fn shape(&self) -> Shape {
        Shape::FixedArray
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        let Value::Array(array) = value else {
            return Err(shape_mismatch(Shape::FixedArray, value));
        };

        let mut copied = FixedArray::zeroed(array.element().clone(), array.len());
        for (index, element) in array.elements().iter().enumerate() {
            let item = ctx.copy(element).map_err(|source| Error::Element {
                container: Shape::FixedArray,
                index,
                source: Box::new(source),
            })?;

            // An absent copy keeps the slot's zero value
            if !item.is_absent() {
                copied.set(index, item)?;
            }
        }

        Ok(Value::Array(copied))
    }
}
