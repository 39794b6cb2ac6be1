//! OpenAPI document structs for serde deserialization.
//!
//! A deliberately small subset of OpenAPI 3.0/3.1: only what the IR builder
//! reads. Unknown keys are ignored. Content maps keep declaration order.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Failure to read or parse a source document.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// JSON syntax or shape error.
    #[error("failed to parse OpenAPI JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// YAML syntax or shape error.
    #[error("failed to parse OpenAPI YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Root OpenAPI document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenApiDocument {
    /// Declared OpenAPI version string.
    pub openapi: Option<String>,
    /// API metadata.
    pub info: Option<Info>,
    /// Path items keyed by templated path.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components.
    pub components: Option<Components>,
}

/// `info` object.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Info {
    /// API title.
    pub title: Option<String>,
    /// API version.
    pub version: Option<String>,
}

/// Components section containing reusable schemas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    /// Named schemas.
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    /// GET operation.
    pub get: Option<Operation>,
    /// POST operation.
    pub post: Option<Operation>,
    /// PUT operation.
    pub put: Option<Operation>,
    /// PATCH operation.
    pub patch: Option<Operation>,
    /// DELETE operation.
    pub delete: Option<Operation>,
    /// HEAD operation (ignored by the builder).
    pub head: Option<Operation>,
    /// OPTIONS operation (ignored by the builder).
    pub options: Option<Operation>,
    /// TRACE operation (ignored by the builder).
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Declared operation id.
    pub operation_id: Option<String>,
    /// One-line summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Declared tags; only the first one is used.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Operation-level parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request body.
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status text.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// A parameter (path, query, header or cookie).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameter {
    /// Wire name.
    #[serde(default)]
    pub name: String,
    /// Location as written in the document; validated by the builder.
    #[serde(rename = "in", default)]
    pub location: String,
    /// Whether the parameter is required.
    pub required: Option<bool>,
    /// Parameter schema.
    pub schema: Option<Schema>,
    /// Description.
    pub description: Option<String>,
}

/// A request body definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    /// Description.
    pub description: Option<String>,
    /// Whether the body is required.
    #[serde(default)]
    pub required: bool,
    /// Media types in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    /// Description.
    pub description: Option<String>,
    /// Media types in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    /// Body schema.
    pub schema: Option<Schema>,
}

/// JSON Schema definition used in OpenAPI.
///
/// Deserialization never fails: boolean schemas, tuple-form lists and
/// malformed objects load as an empty schema with [`Schema::unsupported`] set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(remote = "Self", rename_all = "camelCase")]
pub struct Schema {
    /// `type`: a single name or (3.1) an array of names.
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,

    /// Reference to another schema.
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,

    /// Properties for object types.
    pub properties: Option<IndexMap<String, Schema>>,

    /// Required property names for object types.
    pub required: Option<Vec<String>>,

    /// Item schema for array types.
    pub items: Option<Box<Schema>>,

    /// Enum values of any JSON type.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    /// Constant value - schema matches only this exact value.
    #[serde(rename = "const")]
    pub const_value: Option<Value>,

    /// Union type (any of these schemas).
    pub any_of: Option<Vec<Schema>>,

    /// Union type (exactly one of these schemas).
    pub one_of: Option<Vec<Schema>>,

    /// Intersection type (all of these schemas combined).
    pub all_of: Option<Vec<Schema>>,

    /// Additional properties for object types.
    pub additional_properties: Option<AdditionalProperties>,

    /// Format hint (e.g., date-time, binary).
    pub format: Option<String>,

    /// OpenAPI 3.0 nullable flag (3.1 uses type arrays instead).
    pub nullable: Option<bool>,

    /// Human-readable description.
    pub description: Option<String>,

    /// Why the node could not be read as a schema object.
    #[serde(skip)]
    pub unsupported: Option<String>,
}

impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let reason = match value {
            Value::Object(_) => match Schema::deserialize(value) {
                Ok(schema) => return Ok(schema),
                Err(err) => format!("Malformed schema ({err}); using unknown."),
            },
            Value::Bool(flag) => format!("Boolean schema `{flag}` is not supported; using unknown."),
            Value::Array(_) => "Tuple-form schema list is not supported; using unknown.".to_string(),
            other => format!("Schema must be an object, got `{other}`; using unknown."),
        };
        Ok(Schema {
            unsupported: Some(reason),
            ..Schema::default()
        })
    }
}

/// Schema type can be a single type or an array of types.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    /// `"type": "string"`
    Single(String),
    /// `"type": ["string", "null"]`
    Multiple(Vec<String>),
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    /// `true` / `false`
    Bool(bool),
    /// An explicit value schema.
    Schema(Box<Schema>),
}

impl AdditionalProperties {
    /// JavaScript-style truthiness: everything but `false`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, AdditionalProperties::Bool(false))
    }
}

/// Input syntax of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON
    Json,
    /// YAML
    Yaml,
}

impl DocumentFormat {
    /// Pick the syntax from a file extension; anything but `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("yaml" | "yml") => DocumentFormat::Yaml,
            _ => DocumentFormat::Json,
        }
    }
}

impl OpenApiDocument {
    /// Parse an OpenAPI document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an OpenAPI document from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a document in the given syntax.
    pub fn parse(text: &str, format: DocumentFormat) -> Result<Self, LoadError> {
        match format {
            DocumentFormat::Json => Self::from_json(text),
            DocumentFormat::Yaml => Self::from_yaml(text),
        }
    }
}

/// Read and parse a document from disk, choosing the syntax by extension.
pub fn load_document(path: &Path) -> Result<OpenApiDocument, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let format = DocumentFormat::from_path(path);
    debug!(
        path = %path.display(),
        ?format,
        len = text.len(),
        "Loading OpenAPI document."
    );
    OpenApiDocument::parse(&text, format)
}

impl Schema {
    /// `type` is exactly the given single name.
    pub fn has_type(&self, name: &str) -> bool {
        matches!(&self.schema_type, Some(SchemaType::Single(t)) if t == name)
    }

    /// `type:"object"`, `properties`, or truthy `additionalProperties`.
    pub fn is_object_like(&self) -> bool {
        self.has_type("object")
            || self.properties.is_some()
            || self
                .additional_properties
                .as_ref()
                .is_some_and(AdditionalProperties::is_truthy)
    }

    /// A fragment that contributes only a non-empty `required` list.
    pub fn is_required_only(&self) -> bool {
        let has_required = self.required.as_ref().is_some_and(|r| !r.is_empty());
        let has_combinators = [&self.one_of, &self.any_of, &self.all_of]
            .into_iter()
            .any(|members| members.as_ref().is_some_and(|m| !m.is_empty()));
        let has_enum = self.enum_values.as_ref().is_some_and(|e| !e.is_empty());
        has_required
            && self.schema_type.is_none()
            && self.properties.is_none()
            && self.additional_properties.is_none()
            && !has_combinators
            && !has_enum
    }
}
