//! Per-tag client modules: one `Params` type and one `async function` per
//! operation.

use std::collections::BTreeSet;

use oapigen_core::backend::{
    PathSegment, TypeRenderer, collect_refs, operation_schemas, select_success_response,
    select_success_schema, split_path_template,
};
use oapigen_core::ir::{ContentKind, IrOperation, IrParam, IrSchema, ParamLocation};
use oapigen_core::naming::{capitalize_first, ensure_unique_name};

use super::emit::Emit;
use super::lower::TsTypeRenderer;
use super::types::{
    TemplatePart, TsExpr, TsFunction, TsImport, TsModule, TsParam, TsProp, TsStmt, TsType,
    TsTypeDef, TypeDefKind,
};
use super::utils::{format_param_access, sanitize_ts_identifier};

/// Parameter groups in the order they appear in `Params` types.
const GROUPS: [(&str, ParamLocation); 3] = [
    ("path", ParamLocation::Path),
    ("query", ParamLocation::Query),
    ("headers", ParamLocation::Header),
];

/// Build the module for one tag's operations.
pub fn client_module(operations: &[&IrOperation]) -> TsModule {
    let refs = collect_refs(operations.iter().copied().flat_map(operation_schemas));

    let mut used: BTreeSet<String> = refs.iter().cloned().collect();
    // A model called `Client` keeps its name; the runtime class is aliased.
    let client_type = ensure_unique_name(
        if refs.contains("Client") {
            "RuntimeClient"
        } else {
            "Client"
        },
        &mut used,
    );
    let runtime_import = if client_type == "Client" {
        client_type.clone()
    } else {
        format!("Client as {client_type}")
    };

    let mut module = TsModule {
        imports: vec![TsImport::types([runtime_import], "../runtime.js")],
        ..TsModule::default()
    };
    if !refs.is_empty() {
        module
            .imports
            .push(TsImport::types(refs.iter().cloned(), "../models/index.js"));
    }

    for op in operations {
        let function_name = ensure_unique_name(&sanitize_ts_identifier(&op.operation_id), &mut used);
        let params_name = ensure_unique_name(
            &format!(
                "{}Params",
                capitalize_first(function_name.trim_start_matches('_'))
            ),
            &mut used,
        );
        let params = ParamsShape::new(op);
        module.types.push(params.type_def(&params_name));
        module.functions.push(operation_function(
            op,
            &OperationNames {
                function: &function_name,
                params: &params_name,
                client: &client_type,
            },
            &params,
        ));
    }
    module
}

/// Which groups an operation's `Params` type has and whether each is required.
struct ParamsShape<'a> {
    groups: Vec<(&'static str, Vec<&'a IrParam>, bool)>,
    body: Option<(&'a IrSchema, bool)>,
}

impl<'a> ParamsShape<'a> {
    fn new(op: &'a IrOperation) -> Self {
        let groups = GROUPS
            .iter()
            .filter_map(|(name, location)| {
                let members = op.distinct_params_in(*location);
                if members.is_empty() {
                    return None;
                }
                let required = members.iter().any(|p| p.required);
                Some((*name, members, required))
            })
            .collect();
        Self {
            groups,
            body: op
                .request_body
                .as_ref()
                .map(|body| (&body.schema, body.required)),
        }
    }

    fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.body.is_none()
    }

    fn is_required(&self) -> bool {
        self.groups.iter().any(|(_, _, required)| *required)
            || self.body.is_some_and(|(_, required)| required)
    }

    fn group_required(&self, group: &str) -> bool {
        self.groups
            .iter()
            .any(|(name, _, required)| *name == group && *required)
    }

    fn type_def(&self, name: &str) -> TsTypeDef {
        if self.is_empty() {
            return TsTypeDef {
                name: name.to_string(),
                doc: None,
                kind: TypeDefKind::TypeAlias {
                    ty: TsType::string_record(TsType::Ref("never".to_string())),
                },
            };
        }
        let renderer = TsTypeRenderer;
        let mut properties: Vec<TsProp> = self
            .groups
            .iter()
            .map(|(group, members, required)| {
                let props = members
                    .iter()
                    .map(|p| TsProp::new(&p.name, renderer.render(&p.schema), !p.required))
                    .collect();
                TsProp::new(*group, TsType::Object { props, index: None }, !required)
            })
            .collect();
        if let Some((schema, required)) = self.body {
            properties.push(TsProp::new("body", renderer.render(schema), !required));
        }
        TsTypeDef {
            name: name.to_string(),
            doc: None,
            kind: TypeDefKind::Interface {
                properties,
                index: None,
            },
        }
    }
}

fn response_kind(op: &IrOperation) -> &'static str {
    match select_success_response(op) {
        Some(response) if response.schema.is_some() => match response.kind {
            ContentKind::Json => "json",
            ContentKind::Binary => "binary",
            ContentKind::Form | ContentKind::Text | ContentKind::Unknown => "text",
        },
        _ => "none",
    }
}

/// The `path` expression: a plain string when there is nothing to splice.
/// Template tokens without a declared path parameter stay literal.
fn path_expr(op: &IrOperation, path_required: bool) -> TsExpr {
    let declared: BTreeSet<&str> = op
        .params_in(ParamLocation::Path)
        .map(|p| p.name.as_str())
        .collect();
    let segments = split_path_template(&op.path);
    if !segments
        .iter()
        .any(|segment| matches!(segment, PathSegment::Param(name) if declared.contains(name)))
    {
        return TsExpr::string(op.path.clone());
    }
    TsExpr::Template(
        segments
            .into_iter()
            .map(|segment| match segment {
                PathSegment::Param(name) if declared.contains(name) => {
                    TemplatePart::Dynamic(TsExpr::Raw(format!(
                        "encodeURIComponent(String({}))",
                        format_param_access("path", name, path_required)
                    )))
                }
                PathSegment::Param(name) => TemplatePart::Static(format!("{{{name}}}")),
                PathSegment::Literal(text) => TemplatePart::Static(text.to_string()),
            })
            .collect(),
    )
}

/// Identifiers one generated function refers to.
struct OperationNames<'a> {
    function: &'a str,
    params: &'a str,
    client: &'a str,
}

fn operation_function(
    op: &IrOperation,
    names: &OperationNames<'_>,
    shape: &ParamsShape<'_>,
) -> TsFunction {
    let renderer = TsTypeRenderer;
    let success = renderer.render(select_success_schema(op));

    let mut bound: Vec<&str> = shape.groups.iter().map(|(group, _, _)| *group).collect();
    if shape.body.is_some() {
        bound.push("body");
    }

    let mut body = Vec::new();
    if !bound.is_empty() {
        body.push(TsStmt::Const {
            name: format!("{{ {} }}", bound.join(", ")),
            init: TsExpr::ident("params"),
        });
    }
    body.push(TsStmt::Const {
        name: "resolvedPath".to_string(),
        init: path_expr(op, shape.group_required("path")),
    });

    let mut request: Vec<(String, Option<TsExpr>)> = vec![
        ("method".to_string(), Some(TsExpr::string(op.method.as_upper()))),
        ("path".to_string(), Some(TsExpr::ident("resolvedPath"))),
    ];
    for group in ["query", "headers"] {
        if bound.contains(&group) {
            request.push((group.to_string(), None));
        }
    }
    if let Some(request_body) = &op.request_body {
        request.push(("body".to_string(), None));
        request.push((
            "bodyKind".to_string(),
            Some(TsExpr::string(request_body.kind.as_str())),
        ));
        request.push((
            "contentType".to_string(),
            Some(TsExpr::string(request_body.content_type.clone())),
        ));
    }
    request.push((
        "responseKind".to_string(),
        Some(TsExpr::string(response_kind(op))),
    ));

    body.push(TsStmt::Return(TsExpr::Call {
        callee: Box::new(TsExpr::Member {
            object: Box::new(TsExpr::ident("client")),
            prop: "request".to_string(),
        }),
        type_args: vec![success.clone()],
        args: vec![TsExpr::Object(request)],
    }));

    let params_param = TsParam {
        name: if bound.is_empty() { "_params" } else { "params" }.to_string(),
        ty: TsType::Ref(names.params.to_string()),
        default: (!shape.is_required()).then(|| TsExpr::Object(vec![])),
    };

    TsFunction {
        name: names.function.to_string(),
        doc: op.doc.clone(),
        params: vec![
            TsParam {
                name: "client".to_string(),
                ty: TsType::Ref(names.client.to_string()),
                default: None,
            },
            params_param,
        ],
        return_type: Some(TsType::Ref(format!("Promise<{}>", success.emit()))),
        body,
        is_async: true,
        is_export: true,
    }
}
