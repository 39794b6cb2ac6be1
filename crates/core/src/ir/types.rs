//! IR entity types.
//!
//! Every node is self-describing: no variant needs the source document to be
//! interpreted. Model references are by name only, so cyclic models are plain
//! data.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Current IR format version.
pub const IR_VERSION: u32 = 1;

/// Root of the intermediate representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ir {
    /// Always [`IR_VERSION`].
    pub version: u32,
    /// API metadata.
    pub info: IrInfo,
    /// Named models from `components.schemas`.
    pub models: Vec<IrModel>,
    /// Operations from `paths`.
    pub operations: Vec<IrOperation>,
}

impl Ir {
    /// Rename models (`old -> new`) and every reference to them.
    pub fn rename_models(&mut self, renames: &BTreeMap<String, String>) {
        if renames.is_empty() {
            return;
        }
        for model in &mut self.models {
            if let Some(name) = renames.get(&model.name) {
                model.name.clone_from(name);
            }
            model.schema.rename_refs(renames);
        }
        for op in &mut self.operations {
            for param in &mut op.params {
                param.schema.rename_refs(renames);
            }
            if let Some(body) = &mut op.request_body {
                body.schema.rename_refs(renames);
            }
            for schema in op.responses.iter_mut().filter_map(|r| r.schema.as_mut()) {
                schema.rename_refs(renames);
            }
        }
    }
}

/// API title and version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrInfo {
    /// Title, `"API"` when absent.
    pub title: String,
    /// Version, `"0.0.0"` when absent.
    pub version: String,
}

/// A named model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrModel {
    /// Canonical, unique model name.
    pub name: String,
    /// Normalized schema.
    pub schema: IrSchema,
    /// Description from the source schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Pointer to the source schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_pointer: Option<String>,
}

/// HTTP methods the builder keeps, in builder order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Builder iteration order.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    /// Lowercase name as it appears in OpenAPI path items.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    /// Uppercase wire name.
    pub fn as_upper(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a parameter travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Templated path segment.
    Path,
    /// Query string.
    Query,
    /// Request header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parse an OpenAPI `in` value; `None` for anything unsupported.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            _ => None,
        }
    }

    /// Lowercase name; also the canonical sort key.
    pub fn as_str(self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

/// Coarse serialization strategy derived from a media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// `application/json`, `*+json`
    Json,
    /// `multipart/form-data`, `application/x-www-form-urlencoded`
    Form,
    /// `text/*`
    Text,
    /// `application/octet-stream`, `audio|image|video/*`
    Binary,
    /// Anything else.
    Unknown,
}

impl ContentKind {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Json => "json",
            ContentKind::Form => "form",
            ContentKind::Text => "text",
            ContentKind::Binary => "binary",
            ContentKind::Unknown => "unknown",
        }
    }
}

/// One API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrOperation {
    /// Canonical, unique operation identifier (camelCase).
    pub operation_id: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Templated path, e.g. `/pets/{id}`.
    pub path: String,
    /// Exactly one tag.
    pub tags: Vec<String>,
    /// Path-level then operation-level parameters.
    pub params: Vec<IrParam>,
    /// At most one request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<IrRequestBody>,
    /// Every declared response, `"default"` included.
    pub responses: Vec<IrResponse>,
    /// Description, falling back to the summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Pointer to the source operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_pointer: Option<String>,
}

impl IrOperation {
    /// The single tag.
    pub fn tag(&self) -> &str {
        self.tags.first().map_or("default", String::as_str)
    }

    /// Parameters at one location, in IR order.
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &IrParam> {
        self.params.iter().filter(move |p| p.location == location)
    }

    /// Parameters at one location with repeated names collapsed. The later
    /// declaration (operation-level over path-level) takes the earlier slot.
    pub fn distinct_params_in(&self, location: ParamLocation) -> Vec<&IrParam> {
        let mut out: Vec<&IrParam> = Vec::new();
        for param in self.params_in(location) {
            match out.iter_mut().find(|seen| seen.name == param.name) {
                Some(seen) => *seen = param,
                None => out.push(param),
            }
        }
        out
    }
}

/// One parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrParam {
    /// Wire name.
    pub name: String,
    /// Location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Whether callers must supply it.
    pub required: bool,
    /// Value schema.
    pub schema: IrSchema,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// The selected request body representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrRequestBody {
    /// Body schema.
    pub schema: IrSchema,
    /// Selected media type as declared.
    pub content_type: String,
    /// Coarse kind of `content_type`.
    pub kind: ContentKind,
    /// Whether the body is required.
    #[serde(default)]
    pub required: bool,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

/// One declared response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrResponse {
    /// Status text: `"200"`, `"4XX"`, `"default"`.
    pub status: String,
    /// Body schema; `None` for responses without content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<IrSchema>,
    /// `status == "default"`.
    pub is_default: bool,
    /// Selected media type as declared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Coarse kind of `content_type`; `unknown` when there is none.
    pub kind: ContentKind,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
}

impl IrResponse {
    /// Numeric status, if the status text is a plain number.
    pub fn status_code(&self) -> Option<u16> {
        self.status.parse().ok()
    }
}

/// Scalar schema types. `integer` stays distinct from `number`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// string
    String,
    /// number
    Number,
    /// integer
    Integer,
    /// boolean
    Boolean,
}

/// The closed schema union every backend renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IrSchema {
    /// A scalar type.
    Primitive {
        /// Which scalar.
        #[serde(rename = "type")]
        ty: PrimitiveType,
    },
    /// Exactly one JSON value.
    Literal {
        /// The value.
        value: Value,
    },
    /// One of a fixed list of JSON values.
    Enum {
        /// Allowed values in declaration order.
        values: Vec<Value>,
    },
    /// Homogeneous array.
    Array {
        /// Element schema.
        items: Box<IrSchema>,
    },
    /// Object with named properties.
    Object(ObjectSchema),
    /// Exactly one of several shapes.
    Union {
        /// Alternatives in declaration order.
        variants: Vec<IrSchema>,
    },
    /// All of several shapes at once.
    Intersection {
        /// Parts in declaration order.
        parts: Vec<IrSchema>,
    },
    /// By-name reference to a model.
    Ref {
        /// Canonical model name.
        name: String,
    },
    /// `inner` or null; never directly wraps another `Nullable`.
    Nullable {
        /// Non-null shape.
        inner: Box<IrSchema>,
    },
    /// Opaque bytes (`format: binary`).
    Binary,
    /// Unrepresentable or unconstrained.
    Unknown,
}

/// Payload of [`IrSchema::Object`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSchema {
    /// Declared properties.
    pub properties: IndexMap<String, IrSchema>,
    /// Names of required properties.
    pub required: Vec<String>,
    /// Policy for undeclared keys; `None` when the source says nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalPropertiesIr>,
}

impl ObjectSchema {
    /// Whether `name` is in the required set.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    /// Value schema for undeclared keys, if they are allowed.
    pub fn additional_schema(&self) -> Option<&IrSchema> {
        match &self.additional_properties {
            Some(AdditionalPropertiesIr::Schema(schema)) => Some(schema),
            Some(AdditionalPropertiesIr::Forbidden) | None => None,
        }
    }
}

/// `additionalProperties` after normalization: `false`, or a value schema
/// (`true` becomes [`IrSchema::Unknown`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AdditionalPropertiesRepr", into = "AdditionalPropertiesRepr")]
pub enum AdditionalPropertiesIr {
    /// No undeclared keys allowed.
    Forbidden,
    /// Undeclared keys map to this schema.
    Schema(Box<IrSchema>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AdditionalPropertiesRepr {
    Flag(bool),
    Schema(Box<IrSchema>),
}

impl From<AdditionalPropertiesRepr> for AdditionalPropertiesIr {
    fn from(repr: AdditionalPropertiesRepr) -> Self {
        match repr {
            AdditionalPropertiesRepr::Flag(false) => AdditionalPropertiesIr::Forbidden,
            AdditionalPropertiesRepr::Flag(true) => {
                AdditionalPropertiesIr::Schema(Box::new(IrSchema::Unknown))
            }
            AdditionalPropertiesRepr::Schema(schema) => AdditionalPropertiesIr::Schema(schema),
        }
    }
}

impl From<AdditionalPropertiesIr> for AdditionalPropertiesRepr {
    fn from(value: AdditionalPropertiesIr) -> Self {
        match value {
            AdditionalPropertiesIr::Forbidden => AdditionalPropertiesRepr::Flag(false),
            AdditionalPropertiesIr::Schema(schema) => AdditionalPropertiesRepr::Schema(schema),
        }
    }
}

impl IrSchema {
    /// `primitive` shorthand.
    pub fn primitive(ty: PrimitiveType) -> Self {
        IrSchema::Primitive { ty }
    }

    /// `ref` shorthand.
    pub fn reference(name: impl Into<String>) -> Self {
        IrSchema::Ref { name: name.into() }
    }

    /// `array` shorthand.
    pub fn array(items: IrSchema) -> Self {
        IrSchema::Array {
            items: Box::new(items),
        }
    }

    /// Wrap in `nullable` unless already nullable (or the null literal itself).
    pub fn nullable(inner: IrSchema) -> Self {
        match inner {
            IrSchema::Nullable { .. } | IrSchema::Literal { value: Value::Null } => inner,
            other => IrSchema::Nullable {
                inner: Box::new(other),
            },
        }
    }

    /// Whether this is `literal(null)`.
    pub fn is_null_literal(&self) -> bool {
        matches!(self, IrSchema::Literal { value: Value::Null })
    }

    /// Names of every model referenced anywhere inside this schema.
    pub fn referenced_models(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_refs(&mut names);
        names
    }

    /// Point `ref` nodes at new model names.
    pub fn rename_refs(&mut self, renames: &BTreeMap<String, String>) {
        match self {
            IrSchema::Ref { name } => {
                if let Some(renamed) = renames.get(name.as_str()) {
                    name.clone_from(renamed);
                }
            }
            IrSchema::Array { items: inner } | IrSchema::Nullable { inner } => {
                inner.rename_refs(renames);
            }
            IrSchema::Object(object) => {
                for schema in object.properties.values_mut() {
                    schema.rename_refs(renames);
                }
                if let Some(AdditionalPropertiesIr::Schema(schema)) =
                    &mut object.additional_properties
                {
                    schema.rename_refs(renames);
                }
            }
            IrSchema::Union { variants: members } | IrSchema::Intersection { parts: members } => {
                for member in members {
                    member.rename_refs(renames);
                }
            }
            IrSchema::Primitive { .. }
            | IrSchema::Literal { .. }
            | IrSchema::Enum { .. }
            | IrSchema::Binary
            | IrSchema::Unknown => {}
        }
    }

    fn collect_refs(&self, names: &mut BTreeSet<String>) {
        match self {
            IrSchema::Ref { name } => {
                names.insert(name.clone());
            }
            IrSchema::Array { items } => items.collect_refs(names),
            IrSchema::Nullable { inner } => inner.collect_refs(names),
            IrSchema::Object(object) => {
                for schema in object.properties.values() {
                    schema.collect_refs(names);
                }
                if let Some(AdditionalPropertiesIr::Schema(schema)) = &object.additional_properties
                {
                    schema.collect_refs(names);
                }
            }
            IrSchema::Union { variants: members } | IrSchema::Intersection { parts: members } => {
                for member in members {
                    member.collect_refs(names);
                }
            }
            IrSchema::Primitive { .. }
            | IrSchema::Literal { .. }
            | IrSchema::Enum { .. }
            | IrSchema::Binary
            | IrSchema::Unknown => {}
        }
    }
}
