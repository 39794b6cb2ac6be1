//! `operations.go`: one method on `*Client` per operation.

use std::collections::{BTreeMap, BTreeSet};

use oapigen_core::backend::{
    PathSegment, TypeRenderer, select_success_response, select_success_schema,
    split_path_template,
};
use oapigen_core::ir::{ContentKind, IrOperation, ParamLocation};
use oapigen_core::naming::ensure_unique_name;

use super::GENERATED_HEADER;
use super::client::CLIENT_MEMBERS;
use super::types::{GoTypeRenderer, export_name, go_comment, go_quote, local_name};

/// Go expression building the request path: quoted literals and escaped
/// arguments joined with `+`. Tokens without a declared path parameter stay
/// literal.
pub fn path_expression(path: &str, args: &BTreeMap<&str, String>) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut literal = String::new();
    for segment in split_path_template(path) {
        match segment {
            PathSegment::Param(name) if args.contains_key(name) => {
                if !literal.is_empty() {
                    parts.push(go_quote(&literal));
                    literal.clear();
                }
                parts.push(format!("url.PathEscape(fmt.Sprint({}))", args[name]));
            }
            PathSegment::Param(name) => {
                literal.push('{');
                literal.push_str(name);
                literal.push('}');
            }
            PathSegment::Literal(text) => literal.push_str(text),
        }
    }
    if !literal.is_empty() || parts.is_empty() {
        parts.push(go_quote(&literal));
    }
    parts.join(" + ")
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

fn render_operation(op: &IrOperation, method_name: &str) -> String {
    let renderer = GoTypeRenderer;

    let mut locals = BTreeSet::new();
    let mut args: BTreeMap<&str, String> = BTreeMap::new();
    let mut signature = Vec::new();
    for param in op.distinct_params_in(ParamLocation::Path) {
        let arg = ensure_unique_name(&local_name(&param.name), &mut locals);
        signature.push(format!("{arg} {}", renderer.render(&param.schema)));
        args.insert(param.name.as_str(), arg);
    }
    signature.push("query url.Values".to_string());
    signature.push("headers map[string]string".to_string());

    let (body_arg, content_type) = match &op.request_body {
        Some(body) => {
            signature.push(format!("body {}", renderer.render(&body.schema)));
            ("body", go_quote(&body.content_type))
        }
        None => ("nil", "\"\"".to_string()),
    };

    let success = renderer.render(select_success_schema(op));
    let mut out = format!(
        "// {method_name} calls {} {}.\n",
        op.method.as_upper(),
        op.path
    );
    if let Some(doc) = op.doc.as_deref() {
        out.push_str("//\n");
        out.push_str(&go_comment(Some(doc)));
    }
    out.push_str(&format!(
        "func (c *Client) {method_name}({}) ({success}, error) {{\n",
        signature.join(", ")
    ));
    out.push_str(&format!("\tvar out {success}\n"));
    out.push_str(&format!(
        "\terr := c.Request({}, {}, query, headers, {body_arg}, {content_type}, &out, {})\n",
        go_quote(op.method.as_upper()),
        path_expression(&op.path, &args),
        go_quote(response_kind(op)),
    ));
    out.push_str("\treturn out, err\n}\n");
    out
}

/// Contents of `operations.go`.
pub fn operations_file(operations: &[IrOperation]) -> String {
    let mut out = format!("{GENERATED_HEADER}package gen\n");
    if operations.is_empty() {
        return out;
    }

    let splices_path = operations.iter().any(|op| {
        let declared: BTreeSet<&str> = op
            .params_in(ParamLocation::Path)
            .map(|p| p.name.as_str())
            .collect();
        split_path_template(&op.path)
            .iter()
            .any(|segment| matches!(segment, PathSegment::Param(name) if declared.contains(name)))
    });
    if splices_path {
        out.push_str("\nimport (\n\t\"fmt\"\n\t\"net/url\"\n)\n");
    } else {
        out.push_str("\nimport \"net/url\"\n");
    }

    let mut methods: BTreeSet<String> = CLIENT_MEMBERS.iter().map(ToString::to_string).collect();
    for op in operations {
        let method_name = ensure_unique_name(&export_name(&op.operation_id), &mut methods);
        out.push('\n');
        out.push_str(&render_operation(op, &method_name));
    }
    out
}
