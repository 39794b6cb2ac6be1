//! OpenAPI document → canonical IR.
//!
//! Walks `components.schemas` and `paths`, naming everything through
//! [`crate::naming`], normalizing schemas through [`crate::schema`] and
//! recording every approximation as a diagnostic. The returned IR is already
//! canonically sorted.

use tracing::{debug, info};

use crate::diagnostics::{Diagnostic, DiagnosticCollector, child_pointer};
use crate::ir::{
    ContentKind, HttpMethod, IR_VERSION, Ir, IrInfo, IrModel, IrOperation, IrParam,
    IrRequestBody, IrResponse, IrSchema, ParamLocation,
};
use crate::naming::{
    Namespaces, camel_case_operation_name, derive_operation_id, ensure_unique_name,
    pascal_case_model_name,
};
use crate::openapi::{MediaType, OpenApiDocument, Operation, Parameter, PathItem, RequestBody};
use crate::schema::{SchemaContext, to_ir_schema};
use crate::sort::canonical_sort_ir;

/// Tag used when an operation declares none and no override is configured.
pub const DEFAULT_TAG: &str = "default";

/// Caller-tunable build settings.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Tag for untagged operations; [`DEFAULT_TAG`] when `None`.
    pub default_tag: Option<String>,
}

/// Everything one build produces.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Canonically sorted IR.
    pub ir: Ir,
    /// Diagnostics in discovery order.
    pub diagnostics: Vec<Diagnostic>,
    /// Final used-name sets of both namespaces.
    pub namespaces: Namespaces,
}

/// Build the canonical IR for a document.
pub fn build_ir(doc: &OpenApiDocument, options: &BuildOptions) -> BuildOutput {
    let mut diagnostics = DiagnosticCollector::new();
    let mut namespaces = Namespaces::default();

    let info = IrInfo {
        title: doc
            .info
            .as_ref()
            .and_then(|i| i.title.clone())
            .unwrap_or_else(|| "API".to_string()),
        version: doc
            .info
            .as_ref()
            .and_then(|i| i.version.clone())
            .unwrap_or_else(|| "0.0.0".to_string()),
    };

    let models = build_models(doc, &mut diagnostics, &mut namespaces.models);
    let operations = build_operations(
        doc,
        options.default_tag.as_deref().unwrap_or(DEFAULT_TAG),
        &mut diagnostics,
        &mut namespaces.operations,
    );

    let ir = canonical_sort_ir(Ir {
        version: IR_VERSION,
        info,
        models,
        operations,
    });

    info!(
        models = ir.models.len(),
        operations = ir.operations.len(),
        diagnostics = diagnostics.diagnostics().len(),
        "Built IR."
    );

    BuildOutput {
        ir,
        diagnostics: diagnostics.into_diagnostics(),
        namespaces,
    }
}

fn build_models(
    doc: &OpenApiDocument,
    diagnostics: &mut DiagnosticCollector,
    used: &mut std::collections::BTreeSet<String>,
) -> Vec<IrModel> {
    let Some(components) = &doc.components else {
        return Vec::new();
    };

    let mut raw_names: Vec<&String> = components.schemas.keys().collect();
    raw_names.sort();

    let mut models = Vec::with_capacity(raw_names.len());
    for raw_name in raw_names {
        let Some(schema) = components.schemas.get(raw_name) else {
            continue;
        };
        let name = ensure_unique_name(&pascal_case_model_name(raw_name), used);
        let pointer = child_pointer("#/components/schemas", raw_name);
        if name != *raw_name {
            debug!(raw = %raw_name, %name, "Renamed model.");
        }
        let ir_schema = to_ir_schema(
            schema,
            &mut SchemaContext::new(diagnostics, Some(pointer.clone())),
        );
        models.push(IrModel {
            name,
            schema: ir_schema,
            doc: schema.description.clone(),
            source_pointer: Some(pointer),
        });
    }
    models
}

fn operations_of(item: &PathItem) -> impl Iterator<Item = (HttpMethod, &Operation)> {
    HttpMethod::ALL.into_iter().filter_map(|method| {
        let op = match method {
            HttpMethod::Get => item.get.as_ref(),
            HttpMethod::Post => item.post.as_ref(),
            HttpMethod::Put => item.put.as_ref(),
            HttpMethod::Patch => item.patch.as_ref(),
            HttpMethod::Delete => item.delete.as_ref(),
        };
        op.map(|op| (method, op))
    })
}

fn build_operations(
    doc: &OpenApiDocument,
    default_tag: &str,
    diagnostics: &mut DiagnosticCollector,
    used: &mut std::collections::BTreeSet<String>,
) -> Vec<IrOperation> {
    let mut paths: Vec<(&String, &PathItem)> = doc.paths.iter().collect();
    paths.sort_by_key(|(path, _)| *path);

    let mut operations = Vec::new();
    for (path, item) in paths {
        let path_pointer = child_pointer("#/paths", path);
        for (method, op) in operations_of(item) {
            let pointer = child_pointer(&path_pointer, method.as_str());
            let raw_id = op
                .operation_id
                .clone()
                .unwrap_or_else(|| derive_operation_id(method.as_str(), path));
            let operation_id = ensure_unique_name(&camel_case_operation_name(&raw_id), used);
            let tag = op
                .tags
                .first()
                .cloned()
                .unwrap_or_else(|| default_tag.to_string());

            let mut params = build_params(&item.parameters, &path_pointer, diagnostics);
            params.extend(build_params(&op.parameters, &pointer, diagnostics));

            let request_body = op
                .request_body
                .as_ref()
                .and_then(|body| build_request_body(body, &pointer, diagnostics));
            let responses = build_responses(op, &pointer, diagnostics);

            debug!(%operation_id, %method, %path, %tag, "Built operation.");
            operations.push(IrOperation {
                operation_id,
                method,
                path: path.clone(),
                tags: vec![tag],
                params,
                request_body,
                responses,
                doc: op.description.clone().or_else(|| op.summary.clone()),
                source_pointer: Some(pointer),
            });
        }
    }
    operations
}

/// Parameters in declaration order; unsupported locations are dropped.
fn build_params(
    params: &[Parameter],
    owner_pointer: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<IrParam> {
    let list_pointer = child_pointer(owner_pointer, "parameters");
    let mut out = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let pointer = child_pointer(&list_pointer, &index.to_string());
        let Some(location) = ParamLocation::parse(&param.location) else {
            diagnostics.warn(
                "parameter.unsupported",
                format!(
                    "Unsupported parameter location \"{}\" for \"{}\".",
                    param.location, param.name
                ),
                Some(&pointer),
            );
            continue;
        };
        let schema = match &param.schema {
            Some(schema) => to_ir_schema(
                schema,
                &mut SchemaContext::new(diagnostics, Some(child_pointer(&pointer, "schema"))),
            ),
            None => {
                diagnostics.warn(
                    "parameter.schema.missing",
                    format!("Parameter \"{}\" has no schema; using unknown.", param.name),
                    Some(&pointer),
                );
                IrSchema::Unknown
            }
        };
        out.push(IrParam {
            name: param.name.clone(),
            location,
            required: param.required.unwrap_or(location == ParamLocation::Path),
            schema,
            doc: param.description.clone(),
        });
    }
    out
}

fn build_request_body(
    body: &RequestBody,
    op_pointer: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Option<IrRequestBody> {
    let pointer = child_pointer(op_pointer, "requestBody");
    let Some((content_type, media)) = select_media(&body.content) else {
        diagnostics.warn(
            "requestBody.content.unsupported",
            "Request body does not include a supported content type.",
            Some(&pointer),
        );
        return None;
    };

    let schema = match &media.schema {
        Some(schema) => {
            let schema_pointer = child_pointer(&child_pointer(&pointer, "content"), content_type);
            to_ir_schema(
                schema,
                &mut SchemaContext::new(diagnostics, Some(child_pointer(&schema_pointer, "schema"))),
            )
        }
        None => {
            diagnostics.warn(
                "requestBody.schema.missing",
                "Request body schema missing; using unknown.",
                Some(&pointer),
            );
            IrSchema::Unknown
        }
    };

    Some(IrRequestBody {
        schema,
        content_type: content_type.to_string(),
        kind: classify_content_type(content_type),
        required: body.required,
        doc: body.description.clone(),
    })
}

fn build_responses(
    op: &Operation,
    op_pointer: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<IrResponse> {
    let list_pointer = child_pointer(op_pointer, "responses");
    let mut responses = Vec::with_capacity(op.responses.len());
    for (status, response) in &op.responses {
        let pointer = child_pointer(&list_pointer, status);
        let selected = select_media(&response.content);
        let schema = selected.map(|(content_type, media)| match &media.schema {
            Some(schema) => {
                let schema_pointer =
                    child_pointer(&child_pointer(&pointer, "content"), content_type);
                to_ir_schema(
                    schema,
                    &mut SchemaContext::new(
                        diagnostics,
                        Some(child_pointer(&schema_pointer, "schema")),
                    ),
                )
            }
            None => {
                diagnostics.warn(
                    "response.schema.missing",
                    format!("Response {status} has no schema; using unknown."),
                    Some(&pointer),
                );
                IrSchema::Unknown
            }
        });
        let content_type = selected.map(|(content_type, _)| content_type.to_string());
        responses.push(IrResponse {
            status: status.clone(),
            schema,
            is_default: status == "default",
            kind: content_type
                .as_deref()
                .map_or(ContentKind::Unknown, classify_content_type),
            content_type,
            doc: response.description.clone(),
        });
    }
    responses
}

fn select_media(content: &indexmap::IndexMap<String, MediaType>) -> Option<(&str, &MediaType)> {
    let declared: Vec<&str> = content.keys().map(String::as_str).collect();
    let preferred = pick_preferred_content_type(&declared)?;
    content
        .get_key_value(preferred)
        .map(|(key, media)| (key.as_str(), media))
}

/// Lower-cased media type without parameters.
fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

fn is_json(essence: &str) -> bool {
    essence == "application/json" || essence.ends_with("+json")
}

fn is_multipart(essence: &str) -> bool {
    essence == "multipart/form-data"
}

fn is_urlencoded(essence: &str) -> bool {
    essence == "application/x-www-form-urlencoded"
}

fn is_text(essence: &str) -> bool {
    essence.starts_with("text/")
}

fn is_octet_stream(essence: &str) -> bool {
    essence == "application/octet-stream"
}

fn is_media(essence: &str) -> bool {
    ["audio/", "image/", "video/"]
        .iter()
        .any(|prefix| essence.starts_with(prefix))
}

const PREFERENCE: [fn(&str) -> bool; 6] = [
    is_json,
    is_multipart,
    is_urlencoded,
    is_text,
    is_octet_stream,
    is_media,
];

/// Pick the content type the generated client should speak. JSON beats forms,
/// forms beat text, text beats raw bytes; otherwise the first declared one.
pub fn pick_preferred_content_type<'a>(content_types: &[&'a str]) -> Option<&'a str> {
    let essences: Vec<String> = content_types.iter().map(|ct| essence(ct)).collect();
    PREFERENCE
        .iter()
        .find_map(|matches| {
            essences
                .iter()
                .position(|e| matches(e.as_str()))
                .map(|index| content_types[index])
        })
        .or_else(|| content_types.first().copied())
}

/// Coarse serialization strategy for a content type.
pub fn classify_content_type(content_type: &str) -> ContentKind {
    let essence = essence(content_type);
    if is_json(&essence) {
        ContentKind::Json
    } else if is_multipart(&essence) || is_urlencoded(&essence) {
        ContentKind::Form
    } else if is_text(&essence) {
        ContentKind::Text
    } else if is_octet_stream(&essence) || is_media(&essence) {
        ContentKind::Binary
    } else {
        ContentKind::Unknown
    }
}
