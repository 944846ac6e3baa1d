use crate::{
    copy::{copier::shape_mismatch, CopyContext, ShapeCopier},
    value::{SequenceValue, Shape, Value},
    Error, Result,
};

/// Copies dynamic sequences into a freshly allocated heap cell of the same length.
///
/// Sequence cells are not tracked: two sequences sharing one cell copy to two independent
/// cells. A nil sequence copies to a new empty sequence of the same element type.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceCopier;

impl ShapeCopier for SequenceCopier {
    fn shape(&self) -> Shape {
        Shape::DynamicSequence
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        let Value::Sequence(sequence) = value else {
            return Err(shape_mismatch(Shape::DynamicSequence, value));
        };
        let element = sequence.element();
        let elements = match sequence.handle() {
            Some(handle) => ctx.heap().sequence_elements(handle)?,
            None => Vec::new(),
        };

        let mut copied = Vec::with_capacity(elements.len());
        for (index, item) in elements.iter().enumerate() {
            let item = ctx.copy(item).map_err(|source| Error::Element {
                container: Shape::DynamicSequence,
                index,
                source: Box::new(source),
            })?;

            copied.push(if item.is_absent() {
                element.zero_value()
            } else {
                item
            });
        }

        ctx.heap().alloc_sequence(element.clone(), copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{heap::Heap, value::TypeDesc};

    #[test]
    fn test_sequence_copy_is_independent() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let mut elements = vec![Value::I64(0); 10];
        elements[4] = Value::I64(4);
        let original = heap.alloc_sequence(TypeDesc::I64, elements).unwrap();
        let copied = SequenceCopier.copy(&mut ctx, &original).unwrap();

        let original_cells = original.as_sequence().and_then(SequenceValue::handle).unwrap();
        let copied_cells = copied.as_sequence().and_then(SequenceValue::handle).unwrap();
        assert_ne!(original_cells, copied_cells);
        assert_eq!(heap.sequence_len(copied_cells).unwrap(), 10);

        heap.sequence_set(original_cells, 4, Value::I64(5)).unwrap();
        assert_eq!(heap.sequence_get(copied_cells, 4).unwrap(), Value::I64(4));
    }

    #[test]
    fn test_nil_sequence() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let original = Value::Sequence(SequenceValue::nil(TypeDesc::String));
        let copied = SequenceCopier.copy(&mut ctx, &original).unwrap();
        assert_eq!(copied.type_desc(), TypeDesc::sequence(TypeDesc::String));
        assert_eq!(heap.object_count(), 1);

        // The copy is an empty, writable sequence
        let cells = copied.as_sequence().and_then(SequenceValue::handle).unwrap();
        assert_eq!(heap.sequence_len(cells).unwrap(), 0);
        heap.sequence_push(cells, Value::string("x")).unwrap();
        assert_eq!(heap.sequence_len(cells).unwrap(), 1);
        assert!(original.as_sequence().is_some_and(SequenceValue::is_nil));
    }

    #[test]
    fn test_empty_sequence_gets_new_cell() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let original = heap.alloc_sequence(TypeDesc::U8, Vec::new()).unwrap();
        let copied = SequenceCopier.copy(&mut ctx, &original).unwrap();
        assert_ne!(copied, original);
        assert_eq!(copied.type_desc(), TypeDesc::sequence(TypeDesc::U8));
        assert_eq!(heap.object_count(), 2);
    }

    #[test]
    fn test_shared_sequence_cells_are_not_tracked() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let original = heap
            .alloc_sequence(TypeDesc::I64, vec![Value::I64(1)])
            .unwrap();
        let first = ctx.copy(&original).unwrap();
        let second = ctx.copy(&original).unwrap();
        assert_ne!(first, second);
        assert!(ctx.tracker().is_empty());
    }

    #[test]
    fn test_sequence_element_failure() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let original = heap
            .alloc_sequence(
                TypeDesc::Dynamic,
                vec![Value::I64(1), Value::I64(2), Value::UnsafePointer(8)],
            )
            .unwrap();
        let err = SequenceCopier.copy(&mut ctx, &original).unwrap_err();
        assert!(matches!(
            err,
            Error::Element {
                container: Shape::DynamicSequence,
                index: 2,
                ..
            }
        ));
        assert!(matches!(err.root_cause(), Error::ShapeNotSupported { .. }));
    }
}
