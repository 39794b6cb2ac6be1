//! `models.go`: one declaration per model.

use std::collections::BTreeSet;

use oapigen_core::backend::TypeRenderer;
use oapigen_core::ir::{IrModel, IrSchema, ObjectSchema};
use oapigen_core::naming::ensure_unique_name;
use serde_json::Value;

use super::GENERATED_HEADER;
use super::types::{GoTypeRenderer, export_name, go_comment, go_quote, is_nilable};

/// Type of one struct field. Refs are always pointers so self-referencing
/// models have a finite size; optional fields are pointers unless the type
/// already has a nil value.
pub fn field_type(schema: &IrSchema, required: bool) -> String {
    let ty = GoTypeRenderer.render(schema);
    if matches!(schema, IrSchema::Ref { .. }) || (!required && !is_nilable(&ty)) {
        format!("*{ty}")
    } else {
        ty
    }
}

fn struct_tag(json_name: &str, required: bool) -> String {
    let omit = if required { "" } else { ",omitempty" };
    let tag = format!("json:{}", go_quote(&format!("{json_name}{omit}")));
    if tag.contains('`') {
        go_quote(&tag)
    } else {
        format!("`{tag}`")
    }
}

fn render_struct(name: &str, object: &ObjectSchema) -> String {
    if object.properties.is_empty() {
        return format!("type {name} struct{{}}\n");
    }
    let mut used = BTreeSet::new();
    let fields: Vec<(String, String, String)> = object
        .properties
        .iter()
        .map(|(prop, schema)| {
            let required = object.is_required(prop);
            (
                ensure_unique_name(&export_name(prop), &mut used),
                field_type(schema, required),
                struct_tag(prop, required),
            )
        })
        .collect();
    let name_width = fields.iter().map(|(n, _, _)| n.len()).max().unwrap_or(0);
    let type_width = fields.iter().map(|(_, t, _)| t.len()).max().unwrap_or(0);

    let mut out = format!("type {name} struct {{\n");
    for (field, ty, tag) in &fields {
        out.push_str(&format!("\t{field:<name_width$} {ty:<type_width$} {tag}\n"));
    }
    out.push_str("}\n");
    out
}

fn render_string_enum(name: &str, values: &[Value], used: &mut BTreeSet<String>) -> String {
    let mut out = format!("type {name} string\n");
    let mut seen = BTreeSet::new();
    let consts: Vec<(String, String)> = values
        .iter()
        .filter_map(Value::as_str)
        .filter(|value| seen.insert(*value))
        .map(|value| {
            let ident = ensure_unique_name(&format!("{name}{}", export_name(value)), used);
            (ident, go_quote(value))
        })
        .collect();
    if consts.is_empty() {
        return out;
    }
    let width = consts.iter().map(|(ident, _)| ident.len()).max().unwrap_or(0);
    out.push_str("\nconst (\n");
    for (ident, literal) in &consts {
        out.push_str(&format!("\t{ident:<width$} {name} = {literal}\n"));
    }
    out.push_str(")\n");
    out
}

fn render_model(model: &IrModel, used: &mut BTreeSet<String>) -> String {
    let name = &model.name;
    let body = match &model.schema {
        // Map-only objects are named map types.
        IrSchema::Object(object)
            if !object.properties.is_empty() || object.additional_schema().is_none() =>
        {
            render_struct(name, object)
        }
        IrSchema::Enum { values } if !values.is_empty() && values.iter().all(Value::is_string) => {
            render_string_enum(name, values, used)
        }
        schema => format!("type {name} {}\n", GoTypeRenderer.render(schema)),
    };
    go_comment(model.doc.as_deref()) + &body
}

/// Contents of `models.go`. `reserved` holds every package-level name
/// already taken, model names included; enum constants are added to it.
pub fn models_file(models: &[IrModel], reserved: &mut BTreeSet<String>) -> String {
    let mut out = format!("{GENERATED_HEADER}package gen\n");
    for model in models {
        out.push('\n');
        out.push_str(&render_model(model, reserved));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use indexmap::IndexMap;
    use oapigen_core::ir::{AdditionalPropertiesIr, PrimitiveType};
    use serde_json::json;

    use super::*;

    fn model(name: &str, schema: IrSchema) -> IrModel {
        IrModel {
            name: name.into(),
            schema,
            doc: None,
            source_pointer: None,
        }
    }

    fn object(props: &[(&str, IrSchema)], required: &[&str]) -> IrSchema {
        IrSchema::Object(ObjectSchema {
            properties: props
                .iter()
                .map(|(n, s)| ((*n).to_string(), s.clone()))
                .collect::<IndexMap<_, _>>(),
            required: required.iter().map(|r| (*r).to_string()).collect(),
            additional_properties: None,
        })
    }

    #[test]
    fn test_field_types() {
        let string = IrSchema::primitive(PrimitiveType::String);
        assert_eq!(field_type(&string, true), "string");
        assert_eq!(field_type(&string, false), "*string");
        assert_eq!(field_type(&IrSchema::reference("Pet"), true), "*Pet");
        assert_eq!(field_type(&IrSchema::reference("Pet"), false), "*Pet");
        assert_eq!(
            field_type(&IrSchema::nullable(IrSchema::reference("Pet")), false),
            "*Pet"
        );
        assert_eq!(field_type(&IrSchema::array(string.clone()), false), "[]string");
        assert_eq!(field_type(&IrSchema::Unknown, false), "any");
        assert_eq!(field_type(&IrSchema::nullable(string), true), "*string");
    }

    #[test]
    fn test_struct_rendering() {
        let pet = model(
            "Pet",
            object(
                &[
                    ("name", IrSchema::primitive(PrimitiveType::String)),
                    (
                        "tag",
                        IrSchema::nullable(IrSchema::primitive(PrimitiveType::String)),
                    ),
                    ("owner", IrSchema::reference("Person")),
                ],
                &["name"],
            ),
        );
        let out = render_model(&pet, &mut BTreeSet::new());
        assert_eq!(
            out,
            "type Pet struct {\n\tName  string  `json:\"name\"`\n\tTag   *string `json:\"tag,omitempty\"`\n\tOwner *Person `json:\"owner,omitempty\"`\n}\n"
        );
    }

    #[test]
    fn test_struct_field_names_are_uniqued() {
        let m = model(
            "Headers",
            object(
                &[
                    ("user-id", IrSchema::primitive(PrimitiveType::String)),
                    ("user_id", IrSchema::primitive(PrimitiveType::String)),
                ],
                &["user-id", "user_id"],
            ),
        );
        let out = render_model(&m, &mut BTreeSet::new());
        assert!(out.contains("\tUserId  string `json:\"user-id\"`\n"), "{out}");
        assert!(out.contains("\tUserId2 string `json:\"user_id\"`\n"), "{out}");
    }

    #[test]
    fn test_string_enum_constants() {
        let mut used: BTreeSet<String> = ["Status".to_string(), "StatusActive".to_string()].into();
        let status = model(
            "Status",
            IrSchema::Enum {
                values: vec![json!("active"), json!("on-hold"), json!("active")],
            },
        );
        let out = render_model(&status, &mut used);
        assert_eq!(
            out,
            "type Status string\n\nconst (\n\tStatusActive2 Status = \"active\"\n\tStatusOnHold  Status = \"on-hold\"\n)\n"
        );
    }

    #[test]
    fn test_other_models_are_named_types() {
        let codes = model(
            "Codes",
            IrSchema::Enum {
                values: vec![json!(200), json!(404)],
            },
        );
        assert_eq!(render_model(&codes, &mut BTreeSet::new()), "type Codes int64\n");

        let mut tree = model("Tree", IrSchema::array(IrSchema::reference("Tree")));
        tree.doc = Some("A forest.".into());
        assert_eq!(
            render_model(&tree, &mut BTreeSet::new()),
            "// A forest.\ntype Tree []Tree\n"
        );
    }

    #[test]
    fn test_map_only_object_is_map_type() {
        let labels = model(
            "Labels",
            IrSchema::Object(ObjectSchema {
                properties: IndexMap::new(),
                required: vec![],
                additional_properties: Some(AdditionalPropertiesIr::Schema(Box::new(
                    IrSchema::primitive(PrimitiveType::String),
                ))),
            }),
        );
        assert_eq!(
            render_model(&labels, &mut BTreeSet::new()),
            "type Labels map[string]string\n"
        );

        let closed = model(
            "Empty",
            IrSchema::Object(ObjectSchema {
                properties: IndexMap::new(),
                required: vec![],
                additional_properties: Some(AdditionalPropertiesIr::Forbidden),
            }),
        );
        assert_eq!(render_model(&closed, &mut BTreeSet::new()), "type Empty struct{}\n");
    }
}
