//! TypeScript backend.
//!
//! Output layout, relative to the output root:
//!
//! ```text
//! runtime.ts          fetch-based Client and ApiError
//! models/<Model>.ts   one definition per model
//! models/index.ts
//! client/<tag>.ts     one module per tag
//! client/index.ts
//! index.ts
//! ```
//!
//! Everything is built as a small AST ([`types`]) and printed through the
//! [`emit::Emit`] trait.

pub mod client;
pub mod emit;
pub mod lower;
pub mod runtime;
pub mod types;
pub mod utils;

use std::collections::BTreeSet;

use oapigen_core::backend::{finalize_files, group_by_tag};
use oapigen_core::ir::{Ir, IrModel};
use oapigen_core::naming::ensure_unique_name;
use oapigen_core::{Backend, BackendContext, BackendError, GeneratedFile};
use tracing::debug;

use self::emit::Emit;
use self::types::{TsImport, TsModule};

/// `ts` / `typescript`
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptBackend;

fn barrel(stems: &[String]) -> String {
    if stems.is_empty() {
        return "export {};\n".to_string();
    }
    stems
        .iter()
        .map(|stem| format!("export * from \"./{stem}.js\";\n"))
        .collect()
}

fn model_file(model: &IrModel) -> GeneratedFile {
    let imports = model
        .schema
        .referenced_models()
        .into_iter()
        .filter(|name| *name != model.name)
        .map(|name| {
            let from = format!("./{name}.js");
            TsImport::types([name], from)
        })
        .collect();
    let module = TsModule {
        imports,
        types: vec![lower::lower_model(model)],
        functions: vec![],
    };
    GeneratedFile::new(format!("models/{}.ts", model.name), module.emit())
}

impl Backend for TypeScriptBackend {
    fn id(&self) -> &'static str {
        "ts"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["typescript"]
    }

    fn generate(&self, ir: &Ir, ctx: &BackendContext) -> Result<Vec<GeneratedFile>, BackendError> {
        let mut files: Vec<GeneratedFile> = ir.models.iter().map(model_file).collect();
        let model_names: Vec<String> = ir.models.iter().map(|m| m.name.clone()).collect();
        files.push(GeneratedFile::new("models/index.ts", barrel(&model_names)));

        let groups = group_by_tag(ir);
        let single = groups.len() == 1;
        let mut used = BTreeSet::new();
        let mut client_stems = Vec::with_capacity(groups.len());
        for (tag, operations) in &groups {
            let stem = if single {
                "default".to_string()
            } else {
                ensure_unique_name(&utils::to_file_name(tag), &mut used)
            };
            debug!(tag, file = %stem, operations = operations.len(), "rendering client module");
            files.push(GeneratedFile::new(
                format!("client/{stem}.ts"),
                client::client_module(operations).emit(),
            ));
            client_stems.push(stem);
        }
        files.push(GeneratedFile::new("client/index.ts", barrel(&client_stems)));

        files.push(GeneratedFile::new("runtime.ts", runtime::RUNTIME_TS));
        files.push(GeneratedFile::new(
            "index.ts",
            "export * from \"./runtime.js\";\nexport * as models from \"./models/index.js\";\nexport * as client from \"./client/index.js\";\n",
        ));

        let files = files
            .into_iter()
            .map(|file| ctx.format(file))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            models = ir.models.len(),
            operations = ir.operations.len(),
            files = files.len(),
            "typescript generation complete"
        );
        finalize_files(files)
    }
}
