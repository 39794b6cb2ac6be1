//! Go backend.
//!
//! Emits a single package `gen`:
//!
//! - `doc.go`: package documentation
//! - `models.go`: structs, string enums and named types
//! - `client.go`: `Client`, `NewClient`, `APIError` and the request helper
//! - `operations.go`: one `*Client` method per operation

pub mod client;
pub mod models;
pub mod operations;
pub mod types;

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use oapigen_core::backend::finalize_files;
use oapigen_core::ir::Ir;
use oapigen_core::naming::ensure_unique_name;
use oapigen_core::{Backend, BackendContext, BackendError, GeneratedFile};
use tracing::{debug, warn};

/// First lines of every generated Go file.
pub const GENERATED_HEADER: &str = "// Code generated by oapigen. DO NOT EDIT.\n\n";

/// `go` / `golang`
#[derive(Debug, Clone, Copy, Default)]
pub struct GoBackend;

fn doc_file(ir: &Ir) -> String {
    let title = ir.info.title.split_whitespace().collect::<Vec<_>>().join(" ");
    let version = ir.info.version.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(
        "{GENERATED_HEADER}// Package gen is a client for the {title} API, version {version}.\npackage gen\n"
    )
}

/// New names for models that would redeclare something in `client.go`.
fn client_collisions(ir: &Ir) -> BTreeMap<String, String> {
    let mut taken: BTreeSet<String> =
        client::CLIENT_NAMES.iter().map(ToString::to_string).collect();
    taken.extend(ir.models.iter().map(|m| m.name.clone()));
    let mut renames = BTreeMap::new();
    for model in &ir.models {
        if client::CLIENT_NAMES.contains(&model.name.as_str()) {
            let renamed = ensure_unique_name(&format!("{}Model", model.name), &mut taken);
            warn!(model = %model.name, %renamed, "Renamed model that collides with client.go.");
            renames.insert(model.name.clone(), renamed);
        }
    }
    renames
}

impl Backend for GoBackend {
    fn id(&self) -> &'static str {
        "go"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["golang"]
    }

    fn generate(&self, ir: &Ir, ctx: &BackendContext) -> Result<Vec<GeneratedFile>, BackendError> {
        let renames = client_collisions(ir);
        let ir: Cow<'_, Ir> = if renames.is_empty() {
            Cow::Borrowed(ir)
        } else {
            let mut renamed = ir.clone();
            renamed.rename_models(&renames);
            Cow::Owned(renamed)
        };
        let ir = ir.as_ref();

        let mut reserved: BTreeSet<String> =
            client::CLIENT_NAMES.iter().map(ToString::to_string).collect();
        reserved.extend(ir.models.iter().map(|m| m.name.clone()));

        let files = vec![
            GeneratedFile::new("doc.go", doc_file(ir)),
            GeneratedFile::new("models.go", models::models_file(&ir.models, &mut reserved)),
            GeneratedFile::new("client.go", format!("{GENERATED_HEADER}{}", client::CLIENT_GO)),
            GeneratedFile::new("operations.go", operations::operations_file(&ir.operations)),
        ];
        let files = files
            .into_iter()
            .map(|file| ctx.format(file))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            models = ir.models.len(),
            operations = ir.operations.len(),
            "go generation complete"
        );
        finalize_files(files)
    }
}
