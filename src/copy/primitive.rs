use crate::{
    copy::{CopyContext, ShapeCopier},
    value::{Shape, Value},
    Error, Result,
};

/// Copies booleans, numbers and strings by returning them unchanged.
///
/// Strings are immutable, so sharing the underlying `Arc<str>` is indistinguishable from a copy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveCopier;

impl ShapeCopier for PrimitiveCopier {
    fn shape(&self) -> Shape {
        Shape::Primitive
    }

    fn copy(&self, _ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        let kind = value.kind();
        if !kind.is_primitive() {
            return Err(Error::NotAPrimitive {
                description: value.to_string(),
                kind,
            });
        }
        Ok(value.clone())
    }
}
