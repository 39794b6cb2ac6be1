use clap::Args;
use std::fs;
use std::path::PathBuf;

use oapigen_core::stringify_ir;

use crate::cli::{load_ir, run_cli};
use crate::common::ensure_dir;
use crate::config::Config;

#[derive(Args, Debug, Clone)]
pub struct IrArgs {
    #[arg(long, value_name = "PATH", help = "OpenAPI document (JSON or YAML)")]
    pub spec: PathBuf,
    #[arg(long, value_name = "FILE", help = "Where to write the IR JSON")]
    pub out: PathBuf,
    #[arg(long = "default-tag", value_name = "TAG", help = "Tag for untagged operations")]
    pub default_tag: Option<String>,
    #[arg(long, value_name = "PATH", help = "Configuration file [default: ./oapigen.toml]")]
    pub config: Option<PathBuf>,
}

pub fn run(args: IrArgs) -> i32 {
    run_cli(|| run_inner(args))
}

fn run_inner(args: IrArgs) -> Result<(), String> {
    let config = Config::load(args.config.as_deref())?;
    let ir = load_ir(&args.spec, args.default_tag.or(config.default_tag))?;
    let text = stringify_ir(&ir).map_err(|err| err.to_string())?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    fs::write(&args.out, text).map_err(|err| format!("Failed to write IR: {err}"))?;
    println!("Wrote IR to {}", args.out.display());
    Ok(())
}
