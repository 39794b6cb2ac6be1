//! Identifier, string and comment helpers for TypeScript output.

use std::collections::HashSet;
use std::sync::LazyLock;

use super::types::TsLiteral;

/// TypeScript reserved words that cannot be used as identifiers.
pub static TS_RESERVED_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "break",
        "case",
        "catch",
        "class",
        "const",
        "continue",
        "debugger",
        "default",
        "delete",
        "do",
        "else",
        "enum",
        "export",
        "extends",
        "false",
        "finally",
        "for",
        "function",
        "if",
        "import",
        "in",
        "instanceof",
        "new",
        "null",
        "return",
        "super",
        "switch",
        "this",
        "throw",
        "true",
        "try",
        "typeof",
        "var",
        "void",
        "while",
        "with",
        "yield",
        "let",
        "static",
        "implements",
        "interface",
        "package",
        "private",
        "protected",
        "public",
        "await",
        "async",
    ]
    .into_iter()
    .collect()
});

/// Whether `name` must be quoted as a key or accessed with brackets.
pub fn needs_bracket_notation(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for a double-quoted JavaScript literal.
pub fn escape_js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", u32::from(c))),
            c => out.push(c),
        }
    }
    out
}

/// Escape the static part of a template literal.
pub fn escape_template_literal(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('$', "\\$")
}

/// Quote a property or enum key unless it is a plain identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// `obj.prop`, `obj?.prop`, `obj["a-b"]` or `obj?.["a-b"]`.
pub fn format_param_access(obj: &str, prop: &str, required: bool) -> String {
    match (needs_bracket_notation(prop), required) {
        (true, true) => format!("{obj}[\"{}\"]", escape_js_string(prop)),
        (true, false) => format!("{obj}?.[\"{}\"]", escape_js_string(prop)),
        (false, true) => format!("{obj}.{prop}"),
        (false, false) => format!("{obj}?.{prop}"),
    }
}

/// Make `name` a usable binding: separators become camelCase, a leading
/// digit or a reserved word gets a `_` prefix.
pub fn sanitize_ts_identifier(name: &str) -> String {
    let mut result = String::new();
    for (i, part) in name
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
        .filter(|part| !part.is_empty())
        .enumerate()
    {
        if i == 0 {
            result.push_str(part);
        } else {
            let mut chars = part.chars();
            if let Some(first) = chars.next() {
                result.extend(first.to_uppercase());
                result.extend(chars);
            }
        }
    }

    if result.is_empty() {
        return "_empty".to_string();
    }
    if result.starts_with(|c: char| c.is_ascii_digit())
        || TS_RESERVED_WORDS.contains(result.as_str())
    {
        result.insert(0, '_');
    }
    result
}

/// Key of one member of a `const` enum object.
pub fn enum_value_key(value: &TsLiteral, index: usize) -> String {
    match value {
        TsLiteral::String(s) => quote_if_needed(s),
        TsLiteral::Int(n) if *n >= 0 => format!("VALUE_{n}"),
        TsLiteral::Int(_) | TsLiteral::Number(_) => format!("VALUE_{index}"),
        TsLiteral::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        TsLiteral::Null => "NULL".to_string(),
    }
}

/// Lowercase kebab file stem for a tag: `Pet Store` -> `pet-store`.
pub fn to_file_name(tag: &str) -> String {
    let mut out = String::new();
    let mut prev_lower = false;
    for c in tag.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && prev_lower && !out.ends_with('-') {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            prev_lower = false;
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "default".to_string()
    } else {
        trimmed.to_string()
    }
}

/// JSDoc block at `indent` spaces, or nothing when `doc` is empty.
pub fn render_js_doc(doc: Option<&str>, indent: usize) -> String {
    let Some(doc) = doc.map(str::trim).filter(|d| !d.is_empty()) else {
        return String::new();
    };
    let pad = " ".repeat(indent);
    let mut out = format!("{pad}/**\n");
    for line in doc.lines() {
        let line = line.trim_end().replace("*/", "*\\/");
        if line.is_empty() {
            out.push_str(&format!("{pad} *\n"));
        } else {
            out.push_str(&format!("{pad} * {line}\n"));
        }
    }
    out.push_str(&format!("{pad} */\n"));
    out
}
