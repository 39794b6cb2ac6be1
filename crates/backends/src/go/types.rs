//! Go type table and identifier helpers.

use std::collections::HashSet;
use std::sync::LazyLock;

use oapigen_core::backend::TypeRenderer;
use oapigen_core::ir::{IrSchema, ObjectSchema, PrimitiveType};
use serde_json::Value;

/// Names a generated local identifier must not take: keywords, predeclared
/// identifiers used by the output, imported package names and the
/// generator's own locals.
static GO_RESERVED: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // keywords
        "break",
        "case",
        "chan",
        "const",
        "continue",
        "default",
        "defer",
        "else",
        "fallthrough",
        "for",
        "func",
        "go",
        "goto",
        "if",
        "import",
        "interface",
        "map",
        "package",
        "range",
        "return",
        "select",
        "struct",
        "switch",
        "type",
        "var",
        // predeclared
        "any",
        "bool",
        "byte",
        "error",
        "float64",
        "int64",
        "nil",
        "string",
        "true",
        "false",
        // packages and locals
        "c",
        "err",
        "fmt",
        "headers",
        "out",
        "query",
        "url",
        "body",
    ]
    .into_iter()
    .collect()
});

fn words(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
}

fn upper_first(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

/// Exported identifier: `pet_status` -> `PetStatus`, `x-rate-limit` ->
/// `XRateLimit`. Falls back to `Value`; a leading digit gets an `X` prefix.
pub fn export_name(raw: &str) -> String {
    let joined: String = words(raw).map(upper_first).collect();
    if joined.is_empty() {
        "Value".to_string()
    } else if joined.starts_with(|c: char| c.is_ascii_digit()) {
        format!("X{joined}")
    } else {
        joined
    }
}

/// Unexported identifier for an argument: `post-id` -> `postId`.
pub fn local_name(raw: &str) -> String {
    let mut out = String::new();
    for (i, word) in words(raw).enumerate() {
        if i == 0 {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_lowercase());
                out.push_str(chars.as_str());
            }
        } else {
            out.push_str(&upper_first(word));
        }
    }
    if out.is_empty() {
        return "arg".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, 'p');
    }
    if GO_RESERVED.contains(out.as_str()) {
        out.push_str("Param");
    }
    out
}

/// Interpreted Go string literal.
pub fn go_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// `// ` comment lines for `doc`, or nothing.
pub fn go_comment(doc: Option<&str>) -> String {
    let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::new();
    };
    doc.lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                "//\n".to_string()
            } else {
                format!("// {line}\n")
            }
        })
        .collect()
}

/// Scalar Go type shared by every value of an enum, or `any`.
pub fn enum_scalar_type(values: &[Value]) -> &'static str {
    if values.is_empty() {
        "any"
    } else if values.iter().all(Value::is_string) {
        "string"
    } else if values.iter().all(|v| v.is_i64() || v.is_u64()) {
        "int64"
    } else if values.iter().all(Value::is_number) {
        "float64"
    } else if values.iter().all(Value::is_boolean) {
        "bool"
    } else {
        "any"
    }
}

/// Whether a Go type already has a usable zero value for "absent".
pub fn is_nilable(ty: &str) -> bool {
    ty == "any" || ty.starts_with('*') || ty.starts_with("[]") || ty.starts_with("map[")
}

/// Renders IR schemas as Go type expressions.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoTypeRenderer;

impl TypeRenderer for GoTypeRenderer {
    type Output = String;

    fn primitive(&self, ty: PrimitiveType) -> String {
        match ty {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "int64",
            PrimitiveType::Number => "float64",
            PrimitiveType::Boolean => "bool",
        }
        .to_string()
    }

    fn literal(&self, _value: &Value) -> String {
        "any".to_string()
    }

    fn enumeration(&self, values: &[Value]) -> String {
        enum_scalar_type(values).to_string()
    }

    fn array(&self, items: &IrSchema) -> String {
        format!("[]{}", self.render(items))
    }

    fn object(&self, object: &ObjectSchema) -> String {
        match object.additional_schema() {
            Some(IrSchema::Unknown) | None => "map[string]any".to_string(),
            Some(schema) => format!("map[string]{}", self.render(schema)),
        }
    }

    fn union(&self, _variants: &[IrSchema]) -> String {
        "any".to_string()
    }

    fn intersection(&self, _parts: &[IrSchema]) -> String {
        "any".to_string()
    }

    fn reference(&self, name: &str) -> String {
        name.to_string()
    }

    fn nullable(&self, inner: &IrSchema) -> String {
        let inner = self.render(inner);
        if inner == "any" || inner.starts_with('*') {
            inner
        } else {
            format!("*{inner}")
        }
    }

    fn binary(&self) -> String {
        "[]byte".to_string()
    }

    fn unknown(&self) -> String {
        "any".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use oapigen_core::ir::AdditionalPropertiesIr;
    use serde_json::json;

    use super::*;

    fn go(schema: &IrSchema) -> String {
        GoTypeRenderer.render(schema)
    }

    #[test]
    fn test_type_table() {
        assert_eq!(go(&IrSchema::primitive(PrimitiveType::Integer)), "int64");
        assert_eq!(go(&IrSchema::primitive(PrimitiveType::Number)), "float64");
        assert_eq!(go(&IrSchema::Literal { value: json!(1) }), "any");
        assert_eq!(
            go(&IrSchema::Enum {
                values: vec![json!("a"), json!("b")]
            }),
            "string"
        );
        assert_eq!(
            go(&IrSchema::Enum {
                values: vec![json!(1), json!(2.5)]
            }),
            "float64"
        );
        assert_eq!(
            go(&IrSchema::array(IrSchema::reference("Pet"))),
            "[]Pet"
        );
        assert_eq!(go(&IrSchema::Object(ObjectSchema::default())), "map[string]any");
        assert_eq!(
            go(&IrSchema::Object(ObjectSchema {
                additional_properties: Some(AdditionalPropertiesIr::Schema(Box::new(
                    IrSchema::primitive(PrimitiveType::Integer)
                ))),
                ..ObjectSchema::default()
            })),
            "map[string]int64"
        );
        assert_eq!(
            go(&IrSchema::nullable(IrSchema::primitive(PrimitiveType::String))),
            "*string"
        );
        assert_eq!(go(&IrSchema::nullable(IrSchema::Unknown)), "any");
        assert_eq!(go(&IrSchema::Binary), "[]byte");
        assert_eq!(
            go(&IrSchema::Union {
                variants: vec![IrSchema::reference("A"), IrSchema::reference("B")]
            }),
            "any"
        );
    }

    #[test]
    fn test_export_name() {
        assert_eq!(export_name("pet_status"), "PetStatus");
        assert_eq!(export_name("x-rate-limit"), "XRateLimit");
        assert_eq!(export_name("getPetById"), "GetPetById");
        assert_eq!(export_name("2fa"), "X2fa");
        assert_eq!(export_name("--"), "Value");
    }

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("postId"), "postId");
        assert_eq!(local_name("Post-ID"), "postID");
        assert_eq!(local_name("type"), "typeParam");
        assert_eq!(local_name("url"), "urlParam");
        assert_eq!(local_name("1st"), "p1st");
        assert_eq!(local_name(""), "arg");
    }

    #[test]
    fn test_go_quote() {
        assert_eq!(go_quote("/pets/"), "\"/pets/\"");
        assert_eq!(go_quote("a\"b\\c\n"), "\"a\\\"b\\\\c\\n\"");
    }

    #[test]
    fn test_go_comment() {
        assert_eq!(go_comment(None), "");
        assert_eq!(go_comment(Some("A pet.\n\nMore.")), "// A pet.\n//\n// More.\n");
    }
}
