//! IR schemas to TypeScript types and model definitions.

use std::collections::BTreeSet;

use oapigen_core::backend::TypeRenderer;
use oapigen_core::ir::{IrModel, IrSchema, ObjectSchema, PrimitiveType};
use oapigen_core::naming::ensure_unique_name;
use serde_json::Value;

use super::types::{TsLiteral, TsPrimitive, TsProp, TsType, TsTypeDef, TypeDefKind};
use super::utils::enum_value_key;

/// Renders IR schemas as TypeScript type expressions. References render as
/// bare model names; the caller is responsible for importing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TsTypeRenderer;

impl TsTypeRenderer {
    fn props(self, object: &ObjectSchema) -> Vec<TsProp> {
        object
            .properties
            .iter()
            .map(|(name, schema)| TsProp::new(name, self.render(schema), !object.is_required(name)))
            .collect()
    }

    fn index(self, object: &ObjectSchema) -> Option<TsType> {
        object.additional_schema().map(|schema| self.render(schema))
    }
}

/// An index signature must admit every declared property type, which only
/// `unknown` guarantees.
fn index_fits_inline(index: &TsType) -> bool {
    matches!(index, TsType::Primitive(TsPrimitive::Unknown))
}

impl TypeRenderer for TsTypeRenderer {
    type Output = TsType;

    fn primitive(&self, ty: PrimitiveType) -> TsType {
        TsType::primitive(match ty {
            PrimitiveType::String => TsPrimitive::String,
            PrimitiveType::Number | PrimitiveType::Integer => TsPrimitive::Number,
            PrimitiveType::Boolean => TsPrimitive::Boolean,
        })
    }

    fn literal(&self, value: &Value) -> TsType {
        TsLiteral::from_json(value).map_or(TsType::Primitive(TsPrimitive::Unknown), TsType::Literal)
    }

    fn enumeration(&self, values: &[Value]) -> TsType {
        let mut members: Vec<TsType> = values
            .iter()
            .filter_map(TsLiteral::from_json)
            .map(TsType::Literal)
            .collect();
        members.dedup();
        match members.len() {
            0 => TsType::Primitive(TsPrimitive::Unknown),
            1 => members.remove(0),
            _ => TsType::Union(members),
        }
    }

    fn array(&self, items: &IrSchema) -> TsType {
        TsType::array(self.render(items))
    }

    fn object(&self, object: &ObjectSchema) -> TsType {
        let props = self.props(object);
        match self.index(object) {
            Some(index) if !props.is_empty() && !index_fits_inline(&index) => {
                TsType::Intersection(vec![
                    TsType::Object { props, index: None },
                    TsType::Object {
                        props: vec![],
                        index: Some(Box::new(index)),
                    },
                ])
            }
            index => TsType::Object {
                props,
                index: index.map(Box::new),
            },
        }
    }

    fn union(&self, variants: &[IrSchema]) -> TsType {
        TsType::Union(variants.iter().map(|v| self.render(v)).collect())
    }

    fn intersection(&self, parts: &[IrSchema]) -> TsType {
        TsType::Intersection(parts.iter().map(|p| self.render(p)).collect())
    }

    fn reference(&self, name: &str) -> TsType {
        TsType::Ref(name.to_string())
    }

    fn nullable(&self, inner: &IrSchema) -> TsType {
        TsType::nullable(self.render(inner))
    }

    fn binary(&self) -> TsType {
        TsType::Ref("Blob".to_string())
    }

    fn unknown(&self) -> TsType {
        TsType::Primitive(TsPrimitive::Unknown)
    }
}

/// Values of an enum that can become a `const` object: all strings or all
/// numbers.
fn const_enum_values(values: &[Value]) -> Option<Vec<TsLiteral>> {
    if values.is_empty() {
        return None;
    }
    let all_strings = values.iter().all(Value::is_string);
    let all_numbers = values.iter().all(Value::is_number);
    if !(all_strings || all_numbers) {
        return None;
    }
    let mut literals: Vec<TsLiteral> = values.iter().filter_map(TsLiteral::from_json).collect();
    literals.dedup();
    Some(literals)
}

/// Lower one model to its exported definition.
pub fn lower_model(model: &IrModel) -> TsTypeDef {
    let renderer = TsTypeRenderer;
    let kind = match &model.schema {
        IrSchema::Object(object) => {
            let properties = renderer.props(object);
            match renderer.index(object) {
                Some(index) if !properties.is_empty() && !index_fits_inline(&index) => {
                    TypeDefKind::TypeAlias {
                        ty: renderer.object(object),
                    }
                }
                index => TypeDefKind::Interface { properties, index },
            }
        }
        IrSchema::Enum { values } => match const_enum_values(values) {
            Some(literals) => {
                let mut used = BTreeSet::new();
                let values = literals
                    .into_iter()
                    .enumerate()
                    .map(|(i, literal)| {
                        let key = ensure_unique_name(&enum_value_key(&literal, i), &mut used);
                        (key, literal)
                    })
                    .collect();
                TypeDefKind::ConstEnum { values }
            }
            None => TypeDefKind::TypeAlias {
                ty: renderer.render(&model.schema),
            },
        },
        other => TypeDefKind::TypeAlias {
            ty: renderer.render(other),
        },
    };
    TsTypeDef {
        name: model.name.clone(),
        doc: model.doc.clone(),
        kind,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use indexmap::IndexMap;
    use oapigen_core::ir::AdditionalPropertiesIr;
    use serde_json::json;

    use super::*;
    use crate::typescript::emit::Emit;

    fn ts(schema: &IrSchema) -> String {
        TsTypeRenderer.render(schema).emit()
    }

    fn object(
        props: &[(&str, IrSchema)],
        required: &[&str],
        additional: Option<AdditionalPropertiesIr>,
    ) -> ObjectSchema {
        ObjectSchema {
            properties: props
                .iter()
                .map(|(name, schema)| ((*name).to_string(), schema.clone()))
                .collect::<IndexMap<_, _>>(),
            required: required.iter().map(|name| (*name).to_string()).collect(),
            additional_properties: additional,
        }
    }

    fn model(name: &str, schema: IrSchema) -> IrModel {
        IrModel {
            name: name.into(),
            schema,
            doc: None,
            source_pointer: None,
        }
    }

    #[test]
    fn test_type_table() {
        assert_eq!(ts(&IrSchema::primitive(PrimitiveType::Integer)), "number");
        assert_eq!(ts(&IrSchema::primitive(PrimitiveType::Boolean)), "boolean");
        assert_eq!(ts(&IrSchema::Literal { value: json!("on") }), "\"on\"");
        assert_eq!(
            ts(&IrSchema::Enum {
                values: vec![json!("a"), json!(1), json!(null)]
            }),
            "\"a\" | 1 | null"
        );
        assert_eq!(ts(&IrSchema::Binary), "Blob");
        assert_eq!(ts(&IrSchema::Unknown), "unknown");
        assert_eq!(
            ts(&IrSchema::nullable(IrSchema::reference("Pet"))),
            "Pet | null"
        );
        assert_eq!(
            ts(&IrSchema::array(IrSchema::Union {
                variants: vec![IrSchema::reference("Cat"), IrSchema::reference("Dog")]
            })),
            "(Cat | Dog)[]"
        );
        assert_eq!(
            ts(&IrSchema::Intersection {
                parts: vec![IrSchema::reference("Base"), IrSchema::reference("Extra")]
            }),
            "Base & Extra"
        );
    }

    #[test]
    fn test_object_index_signatures() {
        let open = object(
            &[("id", IrSchema::primitive(PrimitiveType::String))],
            &["id"],
            Some(AdditionalPropertiesIr::Schema(Box::new(IrSchema::Unknown))),
        );
        assert_eq!(
            ts(&IrSchema::Object(open)),
            "{ id: string; [key: string]: unknown }"
        );

        let typed = object(
            &[("id", IrSchema::primitive(PrimitiveType::String))],
            &[],
            Some(AdditionalPropertiesIr::Schema(Box::new(IrSchema::primitive(
                PrimitiveType::Integer,
            )))),
        );
        assert_eq!(
            ts(&IrSchema::Object(typed)),
            "{ id?: string } & { [key: string]: number }"
        );

        let closed = object(&[], &[], Some(AdditionalPropertiesIr::Forbidden));
        assert_eq!(ts(&IrSchema::Object(closed)), "{}");
    }

    #[test]
    fn test_lower_object_model_to_interface() {
        let pet = model(
            "Pet",
            IrSchema::Object(object(
                &[
                    ("name", IrSchema::primitive(PrimitiveType::String)),
                    (
                        "tag",
                        IrSchema::nullable(IrSchema::primitive(PrimitiveType::String)),
                    ),
                ],
                &["name"],
                None,
            )),
        );
        assert_eq!(
            lower_model(&pet).emit(),
            "export interface Pet {\n  name: string;\n  tag?: string | null;\n}\n"
        );
    }

    #[test]
    fn test_lower_enum_models() {
        let status = model(
            "Status",
            IrSchema::Enum {
                values: vec![json!("active"), json!("on-hold")],
            },
        );
        let def = lower_model(&status);
        let TypeDefKind::ConstEnum { values } = &def.kind else {
            panic!("expected const enum, got {:?}", def.kind);
        };
        let keys: Vec<_> = values.iter().map(|(key, _)| key.as_str()).collect();
        assert_eq!(keys, ["active", "\"on-hold\""]);

        let codes = model(
            "Code",
            IrSchema::Enum {
                values: vec![json!(200), json!(404)],
            },
        );
        assert!(lower_model(&codes).emit().contains("VALUE_404: 404,"));

        let mixed = model(
            "Mixed",
            IrSchema::Enum {
                values: vec![json!("a"), json!(true)],
            },
        );
        assert_eq!(lower_model(&mixed).emit(), "export type Mixed = \"a\" | true;\n");
    }

    #[test]
    fn test_lower_alias_model() {
        let pets = model("Pets", IrSchema::array(IrSchema::reference("Pet")));
        assert_eq!(lower_model(&pets).emit(), "export type Pets = Pet[];\n");
    }
}
