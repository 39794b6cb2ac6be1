//! OpenAPI front-end for the oapigen SDK generator.
//!
//! This crate turns one OpenAPI 3.x document into a small, closed
//! intermediate representation that every backend renders without knowing
//! anything about OpenAPI:
//!
//! - `openapi`: source document model and loader
//! - `diagnostics`: warnings and errors collected while building
//! - `naming`: canonical, collision-free identifiers
//! - `schema`: JSON-Schema node normalization
//! - `builder`: models and operations
//! - `sort`: canonical ordering
//! - `ir`: the IR itself and its text form
//! - `backend`: the contract backends implement, plus shared helpers

pub mod backend;
pub mod builder;
pub mod diagnostics;
pub mod ir;
pub mod naming;
pub mod openapi;
pub mod schema;
pub mod sort;

pub use backend::{Backend, BackendContext, BackendError, GeneratedFile, SourceFormatter};
pub use builder::{BuildOptions, BuildOutput, build_ir};
pub use diagnostics::{Diagnostic, DiagnosticCollector, DiagnosticLevel};
pub use ir::{Ir, IrError, IrSchema, parse_ir, stringify_ir};
pub use openapi::{LoadError, OpenApiDocument, load_document};
