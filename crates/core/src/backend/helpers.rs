//! Primitives shared by every backend.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;

use super::{BackendError, GeneratedFile};
use crate::ir::{Ir, IrOperation, IrResponse, IrSchema, ObjectSchema, PrimitiveType};

static UNKNOWN: IrSchema = IrSchema::Unknown;

/// First response with a numeric status in `200..300`, in IR order.
pub fn select_success_response(op: &IrOperation) -> Option<&IrResponse> {
    op.responses
        .iter()
        .find(|response| response.status_code().is_some_and(|code| (200..300).contains(&code)))
}

/// Schema of the success response; `unknown` when there is none or it has no body.
pub fn select_success_schema(op: &IrOperation) -> &IrSchema {
    select_success_response(op)
        .and_then(|response| response.schema.as_ref())
        .unwrap_or(&UNKNOWN)
}

/// A piece of a templated path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment<'a> {
    /// Text copied verbatim.
    Literal(&'a str),
    /// The name inside `{...}`.
    Param(&'a str),
}

/// Split `/users/{id}/posts/{postId}` into literals and parameters. An
/// unterminated `{` is kept as literal text.
pub fn split_path_template(path: &str) -> Vec<PathSegment<'_>> {
    let mut segments = Vec::new();
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|offset| open + offset) else {
            break;
        };
        if open > 0 {
            segments.push(PathSegment::Literal(&rest[..open]));
        }
        segments.push(PathSegment::Param(&rest[open + 1..close]));
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        segments.push(PathSegment::Literal(rest));
    }
    segments
}

/// One method per IR schema variant; [`TypeRenderer::render`] dispatches.
pub trait TypeRenderer {
    /// Rendered form, usually a type expression string.
    type Output;

    /// `primitive`
    fn primitive(&self, ty: PrimitiveType) -> Self::Output;
    /// `literal`
    fn literal(&self, value: &Value) -> Self::Output;
    /// `enum`
    fn enumeration(&self, values: &[Value]) -> Self::Output;
    /// `array`
    fn array(&self, items: &IrSchema) -> Self::Output;
    /// `object`
    fn object(&self, object: &ObjectSchema) -> Self::Output;
    /// `union`
    fn union(&self, variants: &[IrSchema]) -> Self::Output;
    /// `intersection`
    fn intersection(&self, parts: &[IrSchema]) -> Self::Output;
    /// `ref`
    fn reference(&self, name: &str) -> Self::Output;
    /// `nullable`
    fn nullable(&self, inner: &IrSchema) -> Self::Output;
    /// `binary`
    fn binary(&self) -> Self::Output;
    /// `unknown`
    fn unknown(&self) -> Self::Output;

    /// Dispatch on the variant.
    fn render(&self, schema: &IrSchema) -> Self::Output {
        match schema {
            IrSchema::Primitive { ty } => self.primitive(*ty),
            IrSchema::Literal { value } => self.literal(value),
            IrSchema::Enum { values } => self.enumeration(values),
            IrSchema::Array { items } => self.array(items),
            IrSchema::Object(object) => self.object(object),
            IrSchema::Union { variants } => self.union(variants),
            IrSchema::Intersection { parts } => self.intersection(parts),
            IrSchema::Ref { name } => self.reference(name),
            IrSchema::Nullable { inner } => self.nullable(inner),
            IrSchema::Binary => self.binary(),
            IrSchema::Unknown => self.unknown(),
        }
    }
}

/// Every schema an operation's signature mentions.
pub fn operation_schemas(op: &IrOperation) -> impl Iterator<Item = &IrSchema> {
    op.params
        .iter()
        .map(|param| &param.schema)
        .chain(op.request_body.iter().map(|body| &body.schema))
        .chain(op.responses.iter().filter_map(|r| r.schema.as_ref()))
}

/// Model names referenced anywhere in `schemas`.
pub fn collect_refs<'a>(schemas: impl IntoIterator<Item = &'a IrSchema>) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for schema in schemas {
        names.extend(schema.referenced_models());
    }
    names
}

/// Operations grouped by their tag, tags in sorted order, IR order within a tag.
pub fn group_by_tag(ir: &Ir) -> BTreeMap<&str, Vec<&IrOperation>> {
    let mut groups: BTreeMap<&str, Vec<&IrOperation>> = BTreeMap::new();
    for op in &ir.operations {
        groups.entry(op.tag()).or_default().push(op);
    }
    groups
}

/// Sort files by path and reject duplicates.
pub fn finalize_files(mut files: Vec<GeneratedFile>) -> Result<Vec<GeneratedFile>, BackendError> {
    files.sort_by(|a, b| a.path.cmp(&b.path));
    if let Some(pair) = files.windows(2).find(|pair| pair[0].path == pair[1].path) {
        return Err(BackendError::DuplicatePath(pair[0].path.clone()));
    }
    Ok(files)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::{ContentKind, HttpMethod};

    fn response(status: &str, schema: Option<IrSchema>) -> IrResponse {
        IrResponse {
            status: status.into(),
            schema,
            is_default: status == "default",
            content_type: None,
            kind: ContentKind::Json,
            doc: None,
        }
    }

    fn op(responses: Vec<IrResponse>) -> IrOperation {
        IrOperation {
            operation_id: "op".into(),
            method: HttpMethod::Get,
            path: "/".into(),
            tags: vec!["default".into()],
            params: vec![],
            request_body: None,
            responses,
            doc: None,
            source_pointer: None,
        }
    }

    #[test]
    fn test_success_schema_selection() {
        let operation = op(vec![
            response("2XX", Some(IrSchema::reference("Wild"))),
            response("201", Some(IrSchema::reference("Created"))),
            response("default", Some(IrSchema::reference("Error"))),
        ]);
        assert_eq!(
            select_success_schema(&operation),
            &IrSchema::reference("Created")
        );

        let only_errors = op(vec![
            response("404", Some(IrSchema::reference("Error"))),
            response("default", Some(IrSchema::reference("Error"))),
        ]);
        assert!(select_success_response(&only_errors).is_none());
        assert_eq!(select_success_schema(&only_errors), &IrSchema::Unknown);

        let no_content = op(vec![response("204", None)]);
        assert_eq!(select_success_response(&no_content).unwrap().status, "204");
        assert_eq!(select_success_schema(&no_content), &IrSchema::Unknown);
    }

    #[test]
    fn test_split_path_template() {
        assert_eq!(
            split_path_template("/users/{id}/posts/{postId}"),
            [
                PathSegment::Literal("/users/"),
                PathSegment::Param("id"),
                PathSegment::Literal("/posts/"),
                PathSegment::Param("postId"),
            ]
        );
        assert_eq!(
            split_path_template("/files/{name}.json"),
            [
                PathSegment::Literal("/files/"),
                PathSegment::Param("name"),
                PathSegment::Literal(".json"),
            ]
        );
        assert_eq!(split_path_template("/plain"), [PathSegment::Literal("/plain")]);
        assert_eq!(
            split_path_template("/broken/{id"),
            [PathSegment::Literal("/broken/{id")]
        );
    }

    #[test]
    fn test_finalize_files_sorts_and_rejects_duplicates() {
        let files = finalize_files(vec![
            GeneratedFile::new("b.ts", ""),
            GeneratedFile::new("a.ts", ""),
        ])
        .unwrap();
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["a.ts", "b.ts"]);

        let err = finalize_files(vec![
            GeneratedFile::new("a.ts", "1"),
            GeneratedFile::new("a.ts", "2"),
        ])
        .unwrap_err();
        assert!(matches!(err, BackendError::DuplicatePath(path) if path == "a.ts"));
    }

    struct Describe;

    impl TypeRenderer for Describe {
        type Output = String;

        fn primitive(&self, ty: PrimitiveType) -> String {
            format!("{ty:?}")
        }
        fn literal(&self, value: &Value) -> String {
            value.to_string()
        }
        fn enumeration(&self, values: &[Value]) -> String {
            format!("enum{}", values.len())
        }
        fn array(&self, items: &IrSchema) -> String {
            format!("[{}]", self.render(items))
        }
        fn object(&self, object: &ObjectSchema) -> String {
            format!("obj{}", object.properties.len())
        }
        fn union(&self, variants: &[IrSchema]) -> String {
            variants.iter().map(|v| self.render(v)).collect::<Vec<_>>().join("|")
        }
        fn intersection(&self, parts: &[IrSchema]) -> String {
            parts.iter().map(|p| self.render(p)).collect::<Vec<_>>().join("&")
        }
        fn reference(&self, name: &str) -> String {
            name.to_string()
        }
        fn nullable(&self, inner: &IrSchema) -> String {
            format!("{}?", self.render(inner))
        }
        fn binary(&self) -> String {
            "bytes".into()
        }
        fn unknown(&self) -> String {
            "?".into()
        }
    }

    #[test]
    fn test_type_renderer_dispatch() {
        let schema = IrSchema::nullable(IrSchema::Union {
            variants: vec![
                IrSchema::array(IrSchema::reference("Pet")),
                IrSchema::primitive(PrimitiveType::Integer),
                IrSchema::Binary,
            ],
        });
        assert_eq!(Describe.render(&schema), "[Pet]|Integer|bytes?");
    }

    #[test]
    fn test_collect_refs_across_operation() {
        let mut operation = op(vec![response("200", Some(IrSchema::reference("Pet")))]);
        operation.params.push(crate::ir::IrParam {
            name: "filter".into(),
            location: crate::ir::ParamLocation::Query,
            required: false,
            schema: IrSchema::array(IrSchema::reference("Filter")),
            doc: None,
        });
        let refs: Vec<_> = collect_refs(operation_schemas(&operation)).into_iter().collect();
        assert_eq!(refs, ["Filter", "Pet"]);
    }
}
