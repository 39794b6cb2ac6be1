//! Canonical ordering of IR collections.
//!
//! Reordering only: no value is added, dropped or rewritten (apart from
//! duplicate `required` entries collapsing), so two documents that differ only
//! in key order produce identical IR.

use crate::ir::{AdditionalPropertiesIr, Ir, IrOperation, IrSchema};

/// Sort every IR collection into canonical order.
pub fn canonical_sort_ir(mut ir: Ir) -> Ir {
    ir.models.sort_by(|a, b| a.name.cmp(&b.name));
    for model in &mut ir.models {
        sort_schema(&mut model.schema);
    }

    ir.operations
        .sort_by(|a, b| (a.tag(), &a.operation_id).cmp(&(b.tag(), &b.operation_id)));
    for operation in &mut ir.operations {
        sort_operation(operation);
    }
    ir
}

fn sort_operation(operation: &mut IrOperation) {
    // Stable: same-named params at the same location keep source order.
    operation
        .params
        .sort_by(|a, b| (a.location.as_str(), &a.name).cmp(&(b.location.as_str(), &b.name)));
    for param in &mut operation.params {
        sort_schema(&mut param.schema);
    }

    if let Some(body) = &mut operation.request_body {
        sort_schema(&mut body.schema);
    }

    operation.responses.sort_by(|a, b| a.status.cmp(&b.status));
    for response in &mut operation.responses {
        if let Some(schema) = &mut response.schema {
            sort_schema(schema);
        }
    }
}

/// Recursively sort object properties and `required` lists.
pub fn sort_schema(schema: &mut IrSchema) {
    match schema {
        IrSchema::Object(object) => {
            object.properties.sort_keys();
            for value in object.properties.values_mut() {
                sort_schema(value);
            }
            object.required.sort();
            object.required.dedup();
            if let Some(AdditionalPropertiesIr::Schema(value)) = &mut object.additional_properties {
                sort_schema(value);
            }
        }
        IrSchema::Array { items } => sort_schema(items),
        IrSchema::Nullable { inner } => sort_schema(inner),
        IrSchema::Union { variants: members } | IrSchema::Intersection { parts: members } => {
            for member in members {
                sort_schema(member);
            }
        }
        IrSchema::Primitive { .. }
        | IrSchema::Literal { .. }
        | IrSchema::Enum { .. }
        | IrSchema::Ref { .. }
        | IrSchema::Binary
        | IrSchema::Unknown => {}
    }
}
