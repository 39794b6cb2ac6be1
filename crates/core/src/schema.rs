//! JSON-Schema node → [`IrSchema`] normalization.
//!
//! [`to_ir_schema`] is total: shapes it cannot represent become
//! [`IrSchema::Unknown`] plus a `schema.unsupported` warning. Resolution order:
//!
//! 0. boolean, tuple-form and malformed nodes → `unknown` with a warning
//! 1. `$ref` → `ref` by canonical model name (never dereferenced)
//! 2. nullability (`nullable: true` or a `"null"` type member) is stripped and
//!    re-applied once around the result
//! 3. `enum`, then `const`
//! 4. `oneOf`, then `anyOf` (except required-only constraints on an object)
//! 5. `allOf`: merged when every part is object-like, otherwise an intersection
//! 6. objects, arrays, required-only fragments, primitives, multi-type unions

use indexmap::IndexMap;
use serde_json::Value;
use tracing::trace;

use crate::diagnostics::{DiagnosticCollector, child_pointer};
use crate::ir::{AdditionalPropertiesIr, IrSchema, ObjectSchema, PrimitiveType};
use crate::naming::pascal_case_model_name;
use crate::openapi::{AdditionalProperties, Schema, SchemaType};

/// Per-call normalization state: where diagnostics go and where in the source
/// document the current node lives.
#[derive(Debug)]
pub struct SchemaContext<'a> {
    /// Diagnostic sink for the whole build.
    pub diagnostics: &'a mut DiagnosticCollector,
    /// Pointer of the current node, if known.
    pub pointer: Option<String>,
}

impl<'a> SchemaContext<'a> {
    /// Context rooted at `pointer`.
    pub fn new(diagnostics: &'a mut DiagnosticCollector, pointer: Option<String>) -> Self {
        Self {
            diagnostics,
            pointer,
        }
    }

    fn at(&mut self, keyword: &str) -> SchemaContext<'_> {
        SchemaContext {
            diagnostics: &mut *self.diagnostics,
            pointer: self.pointer.as_deref().map(|p| child_pointer(p, keyword)),
        }
    }

    fn nested(&mut self, keyword: &str, key: &str) -> SchemaContext<'_> {
        SchemaContext {
            diagnostics: &mut *self.diagnostics,
            pointer: self
                .pointer
                .as_deref()
                .map(|p| child_pointer(&child_pointer(p, keyword), key)),
        }
    }

    fn unsupported(&mut self, message: &str) {
        self.diagnostics
            .warn("schema.unsupported", message, self.pointer.as_deref());
    }
}

/// Normalize one schema node.
pub fn to_ir_schema(schema: &Schema, ctx: &mut SchemaContext<'_>) -> IrSchema {
    if let Some(reason) = &schema.unsupported {
        ctx.unsupported(reason);
        return IrSchema::Unknown;
    }
    if let Some(reference) = &schema.ref_path {
        return IrSchema::reference(pascal_case_model_name(ref_name(reference)));
    }

    let stripped = strip_null(schema);
    if stripped.null_only {
        return IrSchema::Literal { value: Value::Null };
    }
    let ir = normalize_inner(&stripped.schema, ctx);
    if stripped.nullable {
        IrSchema::nullable(ir)
    } else {
        ir
    }
}

fn ref_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}

struct NullStripped {
    schema: Schema,
    nullable: bool,
    null_only: bool,
}

/// Fold `nullable: true` and `"null"` type members into one flag.
fn strip_null(schema: &Schema) -> NullStripped {
    let mut normalized = schema.clone();
    let mut nullable = normalized.nullable.take().unwrap_or(false);
    let mut null_only = false;

    match &schema.schema_type {
        Some(SchemaType::Single(ty)) if ty == "null" => null_only = true,
        Some(SchemaType::Multiple(types)) => {
            let mut remaining: Vec<String> =
                types.iter().filter(|ty| *ty != "null").cloned().collect();
            if remaining.len() != types.len() {
                nullable = true;
                null_only = remaining.is_empty();
            }
            normalized.schema_type = match remaining.len() {
                0 => None,
                1 => remaining.pop().map(SchemaType::Single),
                _ => Some(SchemaType::Multiple(remaining)),
            };
        }
        _ => {}
    }

    NullStripped {
        schema: normalized,
        nullable,
        null_only,
    }
}

fn non_empty<T>(items: &Option<Vec<T>>) -> Option<&[T]> {
    items.as_deref().filter(|items| !items.is_empty())
}

fn normalize_inner(schema: &Schema, ctx: &mut SchemaContext<'_>) -> IrSchema {
    if let Some(values) = non_empty(&schema.enum_values) {
        return IrSchema::Enum {
            values: values.to_vec(),
        };
    }

    if let Some(value) = &schema.const_value {
        return IrSchema::Literal {
            value: value.clone(),
        };
    }

    if let Some(variants) = non_empty(&schema.one_of) {
        return union_of(variants, "oneOf", ctx);
    }

    if let Some(variants) = non_empty(&schema.any_of) {
        let required_constraints = schema.is_object_like()
            && variants
                .iter()
                .all(|v| v.ref_path.is_none() && v.is_required_only());
        if !required_constraints {
            return union_of(variants, "anyOf", ctx);
        }
        trace!(
            pointer = ctx.pointer.as_deref().unwrap_or(""),
            "Dropping required-only anyOf on object."
        );
    }

    if let Some(parts) = non_empty(&schema.all_of) {
        if let Some(merged) = flatten_all_of(parts, ctx) {
            return normalize_inner(&merged, ctx);
        }
        if let [only] = parts {
            return to_ir_schema(only, &mut ctx.nested("allOf", "0"));
        }
        let parts = parts
            .iter()
            .enumerate()
            .map(|(index, part)| to_ir_schema(part, &mut ctx.nested("allOf", &index.to_string())))
            .collect();
        return IrSchema::Intersection { parts };
    }

    if schema.is_object_like() {
        return object_schema(schema, ctx);
    }

    if schema.has_type("array") {
        let items = match &schema.items {
            Some(items) => to_ir_schema(items, &mut ctx.at("items")),
            None => IrSchema::Unknown,
        };
        return IrSchema::array(items);
    }

    if schema.is_required_only() {
        return IrSchema::Object(ObjectSchema {
            properties: IndexMap::new(),
            required: schema.required.clone().unwrap_or_default(),
            additional_properties: None,
        });
    }

    match &schema.schema_type {
        Some(SchemaType::Single(ty)) => {
            if let Some(ir) = primitive(ty, schema.format.as_deref()) {
                return ir;
            }
        }
        Some(SchemaType::Multiple(types)) if !types.is_empty() => {
            let variants = types
                .iter()
                .map(|ty| {
                    let single = Schema {
                        schema_type: Some(SchemaType::Single(ty.clone())),
                        ..schema.clone()
                    };
                    normalize_inner(&single, ctx)
                })
                .collect();
            return IrSchema::Union { variants };
        }
        _ => {}
    }

    ctx.unsupported("Unsupported schema shape; falling back to unknown.");
    IrSchema::Unknown
}

fn primitive(ty: &str, format: Option<&str>) -> Option<IrSchema> {
    let ty = match ty {
        "string" if format == Some("binary") => return Some(IrSchema::Binary),
        "string" => PrimitiveType::String,
        "number" => PrimitiveType::Number,
        "integer" => PrimitiveType::Integer,
        "boolean" => PrimitiveType::Boolean,
        _ => return None,
    };
    Some(IrSchema::primitive(ty))
}

/// `oneOf`/`anyOf` members as a union; `null` members fold into `nullable`.
fn union_of(members: &[Schema], keyword: &str, ctx: &mut SchemaContext<'_>) -> IrSchema {
    let mut variants = Vec::with_capacity(members.len());
    let mut saw_null = false;
    for (index, member) in members.iter().enumerate() {
        let variant = to_ir_schema(member, &mut ctx.nested(keyword, &index.to_string()));
        if variant.is_null_literal() {
            saw_null = true;
        } else {
            variants.push(variant);
        }
    }

    if !saw_null {
        return IrSchema::Union { variants };
    }
    if variants.len() == 1
        && let Some(only) = variants.pop()
    {
        return IrSchema::nullable(only);
    }
    if variants.is_empty() {
        return IrSchema::Literal { value: Value::Null };
    }
    IrSchema::nullable(IrSchema::Union { variants })
}

/// Merge object-like `allOf` parts into one object schema. Later parts win on
/// property conflicts; `required` is unioned; the last explicit
/// `additionalProperties` wins, with a warning when parts disagree.
fn flatten_all_of(parts: &[Schema], ctx: &mut SchemaContext<'_>) -> Option<Schema> {
    if !parts.iter().all(Schema::is_object_like) {
        return None;
    }

    let mut properties: IndexMap<String, Schema> = IndexMap::new();
    let mut required: Vec<String> = Vec::new();
    let mut additional: Option<AdditionalProperties> = None;

    for part in parts {
        if let Some(declared) = &part.properties {
            for (name, prop) in declared {
                properties.insert(name.clone(), prop.clone());
            }
        }
        for name in part.required.iter().flatten() {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }
        if let Some(value) = &part.additional_properties {
            if additional.as_ref().is_some_and(|previous| previous != value) {
                ctx.diagnostics.warn(
                    "schema.allOf.additionalProperties",
                    "Conflicting additionalProperties in allOf; using the last value.",
                    ctx.pointer.as_deref(),
                );
            }
            additional = Some(value.clone());
        }
    }

    Some(Schema {
        schema_type: Some(SchemaType::Single("object".to_string())),
        properties: Some(properties),
        required: Some(required),
        additional_properties: additional,
        ..Schema::default()
    })
}

fn object_schema(schema: &Schema, ctx: &mut SchemaContext<'_>) -> IrSchema {
    let mut properties = IndexMap::new();
    if let Some(declared) = &schema.properties {
        for (name, prop) in declared {
            let ir = to_ir_schema(prop, &mut ctx.nested("properties", name));
            properties.insert(name.clone(), ir);
        }
    }

    let additional_properties = match &schema.additional_properties {
        None => None,
        Some(AdditionalProperties::Bool(false)) => Some(AdditionalPropertiesIr::Forbidden),
        Some(AdditionalProperties::Bool(true)) => {
            Some(AdditionalPropertiesIr::Schema(Box::new(IrSchema::Unknown)))
        }
        Some(AdditionalProperties::Schema(value)) => Some(AdditionalPropertiesIr::Schema(
            Box::new(to_ir_schema(value, &mut ctx.at("additionalProperties"))),
        )),
    };

    IrSchema::Object(ObjectSchema {
        properties,
        required: schema.required.clone().unwrap_or_default(),
        additional_properties,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::diagnostics::Diagnostic;

    fn normalize(value: Value) -> (IrSchema, Vec<Diagnostic>) {
        let schema: Schema = serde_json::from_value(value).unwrap();
        let mut diagnostics = DiagnosticCollector::new();
        let ir = to_ir_schema(
            &schema,
            &mut SchemaContext::new(&mut diagnostics, Some("#/components/schemas/T".into())),
        );
        (ir, diagnostics.into_diagnostics())
    }

    fn string() -> IrSchema {
        IrSchema::primitive(PrimitiveType::String)
    }

    #[test]
    fn test_ref_is_never_dereferenced() {
        let (ir, diags) = normalize(json!({ "$ref": "#/components/schemas/pet_store" }));
        assert_eq!(ir, IrSchema::reference("PetStore"));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_nullable_forms_are_equivalent() {
        let expected = IrSchema::nullable(string());
        let (a, _) = normalize(json!({ "type": ["string", "null"] }));
        let (b, _) = normalize(json!({ "type": "string", "nullable": true }));
        let (c, _) = normalize(json!({ "type": ["string", "null"], "nullable": true }));
        assert_eq!(a, expected);
        assert_eq!(b, expected);
        assert_eq!(c, expected);
    }

    #[test]
    fn test_null_type_is_null_literal() {
        let (ir, diags) = normalize(json!({ "type": "null" }));
        assert!(ir.is_null_literal());
        assert!(diags.is_empty());
        let (ir, _) = normalize(json!({ "type": ["null"] }));
        assert!(ir.is_null_literal());
    }

    #[test]
    fn test_enum_preserves_json_types() {
        let (ir, _) = normalize(json!({ "type": "integer", "enum": [1, 2, null] }));
        assert_eq!(
            ir,
            IrSchema::Enum {
                values: vec![json!(1), json!(2), json!(null)]
            }
        );
    }

    #[test]
    fn test_const_becomes_literal() {
        let (ir, _) = normalize(json!({ "type": "string", "const": "dog" }));
        assert_eq!(ir, IrSchema::Literal { value: json!("dog") });
    }

    #[test]
    fn test_one_of_with_null_member_folds_to_nullable() {
        let (ir, _) = normalize(json!({
            "oneOf": [{ "$ref": "#/components/schemas/Pet" }, { "type": "null" }]
        }));
        assert_eq!(ir, IrSchema::nullable(IrSchema::reference("Pet")));

        let (ir, _) = normalize(json!({
            "anyOf": [{ "type": "string" }, { "type": "integer" }, { "type": "null" }],
            "nullable": true
        }));
        assert_eq!(
            ir,
            IrSchema::nullable(IrSchema::Union {
                variants: vec![string(), IrSchema::primitive(PrimitiveType::Integer)]
            })
        );
    }

    #[test]
    fn test_any_of_required_only_keeps_object() {
        let (ir, _) = normalize(json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "string" } },
            "anyOf": [{ "required": ["a"] }, { "required": ["b"] }]
        }));
        let IrSchema::Object(object) = ir else {
            panic!("expected object, got {ir:?}");
        };
        assert_eq!(object.properties.len(), 2);
        assert!(object.required.is_empty());
    }

    #[test]
    fn test_any_of_otherwise_is_union() {
        let (ir, _) = normalize(json!({
            "anyOf": [{ "type": "string" }, { "required": ["b"] }]
        }));
        let IrSchema::Union { variants } = ir else {
            panic!("expected union, got {ir:?}");
        };
        assert_eq!(variants[0], string());
        assert_eq!(
            variants[1],
            IrSchema::Object(ObjectSchema {
                properties: IndexMap::new(),
                required: vec!["b".into()],
                additional_properties: None,
            })
        );
    }

    #[test]
    fn test_all_of_merge_last_wins_and_unions_required() {
        let (ir, diags) = normalize(json!({
            "allOf": [
                { "type": "object", "properties": { "x": { "type": "string" }, "y": { "type": "string" } }, "required": ["x"] },
                { "type": "object", "properties": { "x": { "type": "integer" } }, "required": ["y", "x"] }
            ]
        }));
        assert!(diags.is_empty());
        let IrSchema::Object(object) = ir else {
            panic!("expected object, got {ir:?}");
        };
        assert_eq!(
            object.properties["x"],
            IrSchema::primitive(PrimitiveType::Integer)
        );
        assert_eq!(object.properties["y"], string());
        assert_eq!(object.required, ["x", "y"]);
    }

    #[test]
    fn test_all_of_conflicting_additional_properties_warns() {
        let (ir, diags) = normalize(json!({
            "allOf": [
                { "type": "object", "additionalProperties": false },
                { "type": "object", "additionalProperties": true }
            ]
        }));
        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].code, "schema.allOf.additionalProperties");
        let IrSchema::Object(object) = ir else {
            panic!("expected object, got {ir:?}");
        };
        assert_eq!(
            object.additional_properties,
            Some(AdditionalPropertiesIr::Schema(Box::new(IrSchema::Unknown)))
        );
    }

    #[test]
    fn test_all_of_with_ref_is_intersection() {
        let (ir, _) = normalize(json!({
            "allOf": [
                { "$ref": "#/components/schemas/Base" },
                { "type": "object", "properties": { "extra": { "type": "boolean" } } }
            ]
        }));
        let IrSchema::Intersection { parts } = ir else {
            panic!("expected intersection, got {ir:?}");
        };
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], IrSchema::reference("Base"));
    }

    #[test]
    fn test_single_member_all_of_unwraps() {
        let (ir, _) = normalize(json!({ "allOf": [{ "$ref": "#/components/schemas/Base" }] }));
        assert_eq!(ir, IrSchema::reference("Base"));
    }

    #[test]
    fn test_object_additional_properties() {
        let (ir, _) = normalize(json!({ "additionalProperties": { "type": "integer" } }));
        let IrSchema::Object(object) = ir else {
            panic!("expected object, got {ir:?}");
        };
        assert!(object.properties.is_empty());
        assert_eq!(
            object.additional_properties,
            Some(AdditionalPropertiesIr::Schema(Box::new(IrSchema::primitive(
                PrimitiveType::Integer
            ))))
        );

        let (ir, diags) = normalize(json!({ "additionalProperties": false }));
        assert_eq!(ir, IrSchema::Unknown);
        assert_eq!(diags[0].code, "schema.unsupported");
    }

    #[test]
    fn test_arrays() {
        let (ir, _) = normalize(json!({ "type": "array", "items": { "type": "string" } }));
        assert_eq!(ir, IrSchema::array(string()));
        let (ir, diags) = normalize(json!({ "type": "array" }));
        assert_eq!(ir, IrSchema::array(IrSchema::Unknown));
        assert!(diags.is_empty());
    }

    #[test]
    fn test_primitives_and_binary() {
        let (ir, _) = normalize(json!({ "type": "integer", "format": "int64" }));
        assert_eq!(ir, IrSchema::primitive(PrimitiveType::Integer));
        let (ir, _) = normalize(json!({ "type": "number" }));
        assert_eq!(ir, IrSchema::primitive(PrimitiveType::Number));
        let (ir, _) = normalize(json!({ "type": "string", "format": "binary" }));
        assert_eq!(ir, IrSchema::Binary);
    }

    #[test]
    fn test_multi_type_becomes_union() {
        let (ir, _) = normalize(json!({ "type": ["string", "integer", "null"] }));
        assert_eq!(
            ir,
            IrSchema::nullable(IrSchema::Union {
                variants: vec![string(), IrSchema::primitive(PrimitiveType::Integer)]
            })
        );
    }

    #[test]
    fn test_boolean_and_tuple_schemas_become_unknown() {
        let (ir, diags) = normalize(json!({
            "type": "object",
            "properties": {
                "anything": true,
                "pair": { "type": "array", "items": [{ "type": "string" }, { "type": "integer" }] }
            }
        }));
        let IrSchema::Object(object) = ir else {
            panic!("expected object, got {ir:?}");
        };
        assert_eq!(object.properties["anything"], IrSchema::Unknown);
        assert_eq!(object.properties["pair"], IrSchema::array(IrSchema::Unknown));
        let pointers: Vec<_> = diags.iter().map(|d| d.pointer.as_deref().unwrap()).collect();
        assert!(diags.iter().all(|d| d.code == "schema.unsupported"));
        assert!(pointers.contains(&"#/components/schemas/T/properties/anything"));
        assert!(pointers.contains(&"#/components/schemas/T/properties/pair/items"));
    }

    #[test]
    fn test_malformed_keyword_degrades_to_unknown() {
        let (ir, diags) = normalize(json!({ "anyOf": [{ "type": 5 }, { "type": "string" }] }));
        assert_eq!(
            ir,
            IrSchema::Union {
                variants: vec![IrSchema::Unknown, string()]
            }
        );
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].pointer.as_deref(),
            Some("#/components/schemas/T/anyOf/0")
        );
    }

    #[test]
    fn test_unsupported_shape_warns_with_nested_pointer() {
        let (ir, diags) = normalize(json!({
            "type": "object",
            "properties": { "weird/key": { "format": "uuid" } }
        }));
        let IrSchema::Object(object) = ir else {
            panic!("expected object, got {ir:?}");
        };
        assert_eq!(object.properties["weird/key"], IrSchema::Unknown);
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags[0].pointer.as_deref(),
            Some("#/components/schemas/T/properties/weird~1key")
        );
    }
}
