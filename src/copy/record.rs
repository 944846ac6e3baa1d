use crate::{
    copy::{copier::shape_mismatch, CopyContext, ShapeCopier},
    value::{RecordValue, Shape, Value},
    Error, Result,
};

/// Copies records field by field in declaration order.
///
/// Private fields are not read; they stay at their zero value in the copy, as do exported
/// fields whose copy is absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordCopier;

impl ShapeCopier for RecordCopier {
    fn shape(&self) -> Shape {
        Shape::Record
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, value: &Value) -> Result<Value> {
        let Value::Record(record) = value else {
            return Err(shape_mismatch(Shape::Record, value));
        };

        let mut copied = RecordValue::zeroed(record.record_type());
        for (index, (field, item)) in record.fields().enumerate() {
            if !field.is_exported() {
                continue;
            }

            let item = ctx.copy(item).map_err(|source| Error::Field {
                field: field.name.clone(),
                record: value.to_string(),
                source: Box::new(source),
            })?;
            if !item.is_absent() {
                copied.set_at(index, item);
            }
        }

        Ok(Value::Record(copied))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        heap::Heap,
        value::{RecordType, TypeDesc},
    };

    #[test]
    fn test_private_fields_are_zeroed() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let account = RecordType::builder("Account")
            .private("a", TypeDesc::I64)
            .exported("Int64", TypeDesc::I64)
            .exported("Name", TypeDesc::String)
            .build();
        let original = RecordValue::new(&account)
            .unwrap()
            .with("a", 121_i64)
            .unwrap()
            .with("Int64", 7_i64)
            .unwrap()
            .with("Name", "acct")
            .unwrap();

        let Value::Record(copied) = RecordCopier
            .copy(&mut ctx, &Value::Record(original.clone()))
            .unwrap()
        else {
            panic!("record copied to a different shape");
        };

        assert_eq!(copied.record_type(), original.record_type());
        assert_eq!(copied.get("a").unwrap(), &Value::I64(0));
        assert_eq!(copied.get("Int64").unwrap(), &Value::I64(7));
        assert_eq!(copied.get("Name").unwrap(), &Value::string("acct"));
        assert_eq!(original.get("a").unwrap(), &Value::I64(121));
    }

    #[test]
    fn test_private_unsupported_field_is_skipped() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let service = RecordType::builder("Service")
            .exported("Port", TypeDesc::U16)
            .private("handler", TypeDesc::function("fn()"))
            .build();
        let original = RecordValue::new(&service)
            .unwrap()
            .with("Port", 8080_u16)
            .unwrap()
            .with("handler", Value::function("fn()"))
            .unwrap();

        let copied = RecordCopier
            .copy(&mut ctx, &Value::Record(original))
            .unwrap();
        let copied = copied.as_record().unwrap();
        assert_eq!(copied.get("Port").unwrap(), &Value::U16(8080));
        assert_eq!(
            copied.get("handler").unwrap(),
            &TypeDesc::function("fn()").zero_value()
        );
    }

    #[test]
    fn test_exported_field_failure() {
        let heap = Heap::default();
        let mut ctx = CopyContext::new(&heap);

        let service = RecordType::builder("Service")
            .exported("Port", TypeDesc::U16)
            .exported("Handler", TypeDesc::function("fn()"))
            .build();
        let original = RecordValue::new(&service)
            .unwrap()
            .with("Handler", Value::function("fn()"))
            .unwrap();

        match RecordCopier.copy(&mut ctx, &Value::Record(original)) {
            Err(Error::Field {
                field,
                record,
                source,
            }) => {
                assert_eq!(field, "Handler");
                assert!(record.starts_with("Service{"));
                assert!(matches!(*source, Error::ShapeNotSupported { .. }));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
