//! TypeScript code emission via the Emit trait.
//!
//! Every AST node knows how to print itself; composite nodes print their
//! children. Output uses two-space indentation and double quotes.

use super::types::{
    TemplatePart, TsExpr, TsFunction, TsImport, TsLiteral, TsModule, TsParam, TsPrimitive, TsProp,
    TsStmt, TsType, TsTypeDef, TypeDefKind,
};
use super::utils::{escape_js_string, escape_template_literal, quote_if_needed, render_js_doc};

/// Trait for emitting TypeScript code from AST nodes.
pub trait Emit {
    /// Convert the AST node to its TypeScript string representation.
    fn emit(&self) -> String;
}

fn join<T: Emit>(items: &[T], sep: &str) -> String {
    items.iter().map(Emit::emit).collect::<Vec<_>>().join(sep)
}

impl Emit for TsPrimitive {
    fn emit(&self) -> String {
        match self {
            TsPrimitive::String => "string",
            TsPrimitive::Number => "number",
            TsPrimitive::Boolean => "boolean",
            TsPrimitive::Unknown => "unknown",
        }
        .to_string()
    }
}

impl Emit for TsLiteral {
    fn emit(&self) -> String {
        match self {
            TsLiteral::String(s) => format!("\"{}\"", escape_js_string(s)),
            TsLiteral::Int(i) => i.to_string(),
            TsLiteral::Number(n) => n.to_string(),
            TsLiteral::Bool(b) => b.to_string(),
            TsLiteral::Null => "null".to_string(),
        }
    }
}

impl Emit for TsType {
    fn emit(&self) -> String {
        match self {
            TsType::Primitive(p) => p.emit(),
            TsType::Array(inner) => {
                let inner_str = inner.emit();
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Union(types) => join(types, " | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| {
                    let s = t.emit();
                    if matches!(t, TsType::Union(_)) {
                        format!("({s})")
                    } else {
                        s
                    }
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object { props, index } => {
                let mut parts: Vec<_> = props.iter().map(Emit::emit).collect();
                if let Some(index) = index {
                    parts.push(format!("[key: string]: {}", index.emit()));
                }
                if parts.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", parts.join("; "))
                }
            }
            TsType::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TsType::Literal(lit) => lit.emit(),
            TsType::Ref(name) => name.clone(),
        }
    }
}

impl Emit for TsProp {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        format!("{key}{opt}: {}", self.ty.emit())
    }
}

impl Emit for TsTypeDef {
    fn emit(&self) -> String {
        let mut output = render_js_doc(self.doc.as_deref(), 0);
        let name = &self.name;
        match &self.kind {
            TypeDefKind::Interface { properties, index } => {
                output.push_str(&format!("export interface {name} {{\n"));
                for prop in properties {
                    output.push_str(&render_js_doc(prop.doc.as_deref(), 2));
                    output.push_str(&format!("  {};\n", prop.emit()));
                }
                if let Some(index) = index {
                    output.push_str(&format!("  [key: string]: {};\n", index.emit()));
                }
                output.push_str("}\n");
            }
            TypeDefKind::TypeAlias { ty } => {
                output.push_str(&format!("export type {name} = {};\n", ty.emit()));
            }
            TypeDefKind::ConstEnum { values } => {
                output.push_str(&format!("export const {name} = {{\n"));
                for (key, value) in values {
                    output.push_str(&format!("  {key}: {},\n", value.emit()));
                }
                output.push_str("} as const;\n\n");
                output.push_str(&format!(
                    "export type {name} = (typeof {name})[keyof typeof {name}];\n"
                ));
            }
        }
        output
    }
}

impl Emit for TsExpr {
    fn emit(&self) -> String {
        match self {
            TsExpr::Ident(name) | TsExpr::Raw(name) => name.clone(),
            TsExpr::Literal(lit) => lit.emit(),
            TsExpr::Object(props) => {
                if props.is_empty() {
                    return "{}".to_string();
                }
                let parts: Vec<_> = props
                    .iter()
                    .map(|(key, value)| match value {
                        Some(value) => format!("{}: {}", quote_if_needed(key), value.emit()),
                        None => key.clone(),
                    })
                    .collect();
                format!("{{ {} }}", parts.join(", "))
            }
            TsExpr::Template(parts) => {
                let content: String = parts
                    .iter()
                    .map(|p| match p {
                        TemplatePart::Static(s) => escape_template_literal(s),
                        TemplatePart::Dynamic(e) => format!("${{{}}}", e.emit()),
                    })
                    .collect();
                format!("`{content}`")
            }
            TsExpr::Call {
                callee,
                type_args,
                args,
            } => {
                let type_args_str = if type_args.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", join(type_args, ", "))
                };
                format!("{}{type_args_str}({})", callee.emit(), join(args, ", "))
            }
            TsExpr::Member { object, prop } => format!("{}.{prop}", object.emit()),
        }
    }
}

impl Emit for TsParam {
    fn emit(&self) -> String {
        match &self.default {
            Some(default) => format!("{}: {} = {}", self.name, self.ty.emit(), default.emit()),
            None => format!("{}: {}", self.name, self.ty.emit()),
        }
    }
}

impl TsStmt {
    /// Emit with specified indentation level (2 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = "  ".repeat(indent);
        match self {
            TsStmt::Const { name, init } => format!("{prefix}const {name} = {};\n", init.emit()),
            TsStmt::Return(expr) => format!("{prefix}return {};\n", expr.emit()),
        }
    }
}

impl Emit for TsStmt {
    fn emit(&self) -> String {
        self.emit_indented(1)
    }
}

impl Emit for TsFunction {
    fn emit(&self) -> String {
        let mut output = render_js_doc(self.doc.as_deref(), 0);
        if self.is_export {
            output.push_str("export ");
        }
        if self.is_async {
            output.push_str("async ");
        }
        let return_type = self
            .return_type
            .as_ref()
            .map(|t| format!(": {}", t.emit()))
            .unwrap_or_default();
        output.push_str(&format!(
            "function {}({}){return_type} {{\n",
            self.name,
            join(&self.params, ", ")
        ));
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(1));
        }
        output.push_str("}\n");
        output
    }
}

impl Emit for TsImport {
    fn emit(&self) -> String {
        let type_keyword = if self.type_only { "type " } else { "" };
        format!(
            "import {type_keyword}{{ {} }} from \"{}\";\n",
            self.items.join(", "),
            self.from
        )
    }
}

impl Emit for TsModule {
    fn emit(&self) -> String {
        let mut output = String::new();
        for import in &self.imports {
            output.push_str(&import.emit());
        }

        let blocks: Vec<String> = self
            .types
            .iter()
            .map(Emit::emit)
            .chain(self.functions.iter().map(Emit::emit))
            .collect();
        if !self.imports.is_empty() && !blocks.is_empty() {
            output.push('\n');
        }
        output.push_str(&blocks.join("\n"));
        output
    }
}
