use clap::Args;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Instant;

use oapigen_backends::{BACKENDS, backend_ids, resolve_backend};
use oapigen_core::{Backend, BackendContext};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cli::{load_ir, run_cli};
use crate::common::format_elapsed_ms;
use crate::config::{Config, resolve_out_dir};
use crate::output::OutputPlan;

#[derive(Args, Debug, Clone)]
pub struct GenArgs {
    #[arg(
        long,
        value_name = "LANGS",
        help = "Language id, comma-separated ids, or `all` [default: all]"
    )]
    pub lang: Option<String>,
    #[arg(long, value_name = "PATH", help = "OpenAPI document (JSON or YAML)")]
    pub spec: PathBuf,
    #[arg(
        long,
        value_name = "DIR",
        conflicts_with = "sdk",
        help = "Output directory (single language only)"
    )]
    pub out: Option<PathBuf>,
    #[arg(long, value_name = "NAME", help = "Named SDK output directory (single language only)")]
    pub sdk: Option<String>,
    #[arg(long = "default-tag", value_name = "TAG", help = "Tag for untagged operations")]
    pub default_tag: Option<String>,
    #[arg(long, value_name = "PATH", help = "Configuration file [default: ./oapigen.toml]")]
    pub config: Option<PathBuf>,
}

pub fn run(args: GenArgs) -> i32 {
    run_cli(|| run_inner(args))
}

/// Backends named by `--lang`, deduplicated, in the order given.
fn resolve_languages(lang: Option<&str>) -> Result<Vec<&'static dyn Backend>, String> {
    let lang = lang.map(str::trim).unwrap_or("all");
    if lang.eq_ignore_ascii_case("all") {
        return Ok(BACKENDS.to_vec());
    }

    let mut seen = BTreeSet::new();
    let mut backends = Vec::new();
    for name in lang.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        let backend = resolve_backend(name).ok_or_else(|| {
            format!(
                "Unsupported language \"{name}\". Available: {}",
                backend_ids().join(", ")
            )
        })?;
        if seen.insert(backend.id()) {
            backends.push(backend);
        }
    }
    if backends.is_empty() {
        return Err("No languages resolved for generation.".to_string());
    }
    Ok(backends)
}

fn run_inner(args: GenArgs) -> Result<(), String> {
    let start = Instant::now();
    let backends = resolve_languages(args.lang.as_deref())?;
    if (args.out.is_some() || args.sdk.is_some()) && backends.len() > 1 {
        return Err("Use --out or --sdk only when generating a single language.".to_string());
    }

    let config = Config::load(args.config.as_deref())?;
    let ir = load_ir(&args.spec, args.default_tag.or_else(|| config.default_tag.clone()))?;

    let targets: Vec<(&'static dyn Backend, PathBuf)> = backends
        .into_iter()
        .map(|backend| {
            let out_dir =
                resolve_out_dir(args.out.as_deref(), args.sdk.as_deref(), &config, backend);
            (backend, out_dir)
        })
        .collect();
    let mut dirs = BTreeSet::new();
    for (backend, out_dir) in &targets {
        if !dirs.insert(out_dir) {
            return Err(format!(
                "Output directory {} is shared by more than one language (at {})",
                out_dir.display(),
                backend.id()
            ));
        }
    }

    // Render everything before touching the disk.
    let plans = targets
        .par_iter()
        .map(|(backend, out_dir)| {
            let files = backend
                .generate(&ir, &BackendContext::new(out_dir))
                .map_err(|err| format!("{} backend failed: {err}", backend.id()))?;
            debug!(lang = backend.id(), files = files.len(), "Backend finished.");
            OutputPlan::new(out_dir, files).map_err(|err| format!("{}: {err}", backend.id()))
        })
        .collect::<Result<Vec<_>, String>>()?;

    for ((backend, _), plan) in targets.iter().zip(&plans) {
        let summary = plan.commit().map_err(|err| err.to_string())?;
        info!(
            lang = backend.id(),
            removed = summary.removed,
            written = summary.written,
            "Generated SDK."
        );
        println!(
            "Generated {} {} files in {}",
            summary.written,
            backend.id(),
            plan.out_dir().display()
        );
    }
    println!("Done in {}", format_elapsed_ms(start));
    Ok(())
}
