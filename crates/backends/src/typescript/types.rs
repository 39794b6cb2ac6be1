//! TypeScript AST used by the generator.
//!
//! Only the shapes the SDK output needs are modelled; anything more exotic
//! goes through [`TsExpr::Raw`].

use serde_json::Value;

/// TypeScript type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    /// Primitive types: string, number, boolean, unknown
    Primitive(TsPrimitive),
    /// Array type: T[]
    Array(Box<TsType>),
    /// Union type: A | B | C
    Union(Vec<TsType>),
    /// Intersection type: A & B & C
    Intersection(Vec<TsType>),
    /// Object type: `{ foo: string; bar?: number }`, with an optional index signature
    Object {
        /// Named properties in output order.
        props: Vec<TsProp>,
        /// Value type of `[key: string]: T`.
        index: Option<Box<TsType>>,
    },
    /// Record type: Record<K, V>
    Record {
        /// Key type.
        key: Box<TsType>,
        /// Value type.
        value: Box<TsType>,
    },
    /// Literal type: "foo", 42, true
    Literal(TsLiteral),
    /// Named type reference, possibly qualified (`Models.Pet`)
    Ref(String),
}

impl TsType {
    /// `string`, `number`, ...
    pub fn primitive(p: TsPrimitive) -> Self {
        Self::Primitive(p)
    }

    /// `T[]`
    pub fn array(inner: TsType) -> Self {
        Self::Array(Box::new(inner))
    }

    /// `Record<string, T>`
    pub fn string_record(value: TsType) -> Self {
        Self::Record {
            key: Box::new(Self::Primitive(TsPrimitive::String)),
            value: Box::new(value),
        }
    }

    /// `T | null`, without doubling an existing `null` member.
    pub fn nullable(inner: TsType) -> Self {
        let null = TsType::Literal(TsLiteral::Null);
        match inner {
            TsType::Union(mut members) => {
                if !members.contains(&null) {
                    members.push(null);
                }
                TsType::Union(members)
            }
            TsType::Literal(TsLiteral::Null) => inner,
            other => TsType::Union(vec![other, null]),
        }
    }
}

/// TypeScript primitive types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsPrimitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `unknown`
    Unknown,
}

/// Object property definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    /// Property name, quoted on output when it is not an identifier.
    pub name: String,
    /// Property type.
    pub ty: TsType,
    /// Emits `name?:`.
    pub optional: bool,
    /// JSDoc text.
    pub doc: Option<String>,
}

impl TsProp {
    /// Property without documentation.
    pub fn new(name: impl Into<String>, ty: TsType, optional: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            optional,
            doc: None,
        }
    }
}

/// TypeScript literal values
#[derive(Debug, Clone, PartialEq)]
pub enum TsLiteral {
    /// `"text"`
    String(String),
    /// Integral number.
    Int(i64),
    /// Any other number.
    Number(f64),
    /// `true` / `false`
    Bool(bool),
    /// `null`
    Null,
}

impl TsLiteral {
    /// Scalar JSON values map one-to-one; arrays and objects have no literal type.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::String(s.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null => Some(Self::Null),
            Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Number)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Type definition kind
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefKind {
    /// interface Foo { ... }
    Interface {
        /// Members in output order.
        properties: Vec<TsProp>,
        /// Value type of `[key: string]: T`.
        index: Option<TsType>,
    },
    /// type Foo = ...
    TypeAlias {
        /// Aliased type.
        ty: TsType,
    },
    /// const Foo = { ... } as const; type Foo = ...
    ConstEnum {
        /// Object keys (already quoted where needed) and their values.
        values: Vec<(String, TsLiteral)>,
    },
}

/// Exported type definition
#[derive(Debug, Clone, PartialEq)]
pub struct TsTypeDef {
    /// Exported name.
    pub name: String,
    /// JSDoc text.
    pub doc: Option<String>,
    /// What is declared.
    pub kind: TypeDefKind,
}

/// Import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsImport {
    /// Items to import; `A as B` renames
    pub items: Vec<String>,
    /// Module path
    pub from: String,
    /// Whether this is a type-only import
    pub type_only: bool,
}

impl TsImport {
    /// `import type { a, b } from "..."`
    pub fn types<I, S>(items: I, from: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            from: from.into(),
            type_only: true,
        }
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct TsParam {
    /// Parameter name.
    pub name: String,
    /// Declared type.
    pub ty: TsType,
    /// Default value expression, e.g. `{}`
    pub default: Option<TsExpr>,
}

/// TypeScript expression
#[derive(Debug, Clone, PartialEq)]
pub enum TsExpr {
    /// Identifier: foo
    Ident(String),
    /// Literal value: "bar", 42
    Literal(TsLiteral),
    /// Object literal: `{ a: 1, b }`; a `None` value is shorthand
    Object(Vec<(String, Option<TsExpr>)>),
    /// Template literal: `${foo}/bar`
    Template(Vec<TemplatePart>),
    /// Call with explicit type arguments: `foo<T>(a, b)`
    Call {
        /// Function being called.
        callee: Box<TsExpr>,
        /// Explicit type arguments; omitted when empty.
        type_args: Vec<TsType>,
        /// Call arguments.
        args: Vec<TsExpr>,
    },
    /// Member access: foo.bar
    Member {
        /// Receiver.
        object: Box<TsExpr>,
        /// Property name.
        prop: String,
    },
    /// Raw code that doesn't fit the AST
    Raw(String),
}

impl TsExpr {
    /// Identifier expression.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::Ident(name.into())
    }

    /// String literal expression.
    pub fn string(value: impl Into<String>) -> Self {
        Self::Literal(TsLiteral::String(value.into()))
    }
}

/// Template literal part
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    /// Static string part
    Static(String),
    /// Dynamic expression part: ${expr}
    Dynamic(TsExpr),
}

/// TypeScript statement
#[derive(Debug, Clone, PartialEq)]
pub enum TsStmt {
    /// `const x = ...;`; `name` may be a destructuring pattern
    Const {
        /// Binding name or pattern.
        name: String,
        /// Initializer.
        init: TsExpr,
    },
    /// return expr;
    Return(TsExpr),
}

/// Function declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    /// Function name.
    pub name: String,
    /// JSDoc text.
    pub doc: Option<String>,
    /// Parameters in order.
    pub params: Vec<TsParam>,
    /// Declared return type, if any.
    pub return_type: Option<TsType>,
    /// Statements, indented one level.
    pub body: Vec<TsStmt>,
    /// Emits `async`.
    pub is_async: bool,
    /// Emits `export`.
    pub is_export: bool,
}

/// One generated `.ts` file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TsModule {
    /// Import lines, in order.
    pub imports: Vec<TsImport>,
    /// Type declarations, printed before functions.
    pub types: Vec<TsTypeDef>,
    /// Function declarations.
    pub functions: Vec<TsFunction>,
}
