//! Command-line front-end for oapigen.
//!
//! ```text
//! oapigen gen [--lang <id|id,id|all>] --spec <path> [--sdk <name> | --out <dir>]
//! oapigen gen:<lang> --spec <path> [--sdk <name> | --out <dir>]
//! oapigen ir --spec <path> --out <file>
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod cli;
mod common;
pub mod config;
pub mod output;

/// Crates whose events a plain `OAPIGEN_LOG` level applies to.
const WORKSPACE_CRATES: [&str; 3] = ["oapigen_core", "oapigen_backends", "oapigen_cli"];

/// Environment variable controlling log output.
pub const LOG_ENV: &str = "OAPIGEN_LOG";

#[derive(Parser)]
#[command(
    name = "oapigen",
    version,
    about = "Generate client SDKs from an OpenAPI 3.x document",
    after_help = "`gen:<lang>` is shorthand for `gen --lang <lang>`."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate SDK sources for one or more languages
    #[command(name = "gen")]
    Gen(cli::generate::GenArgs),
    /// Write the intermediate representation as JSON
    Ir(cli::ir::IrArgs),
}

/// Rewrite a leading `gen:<lang>` into `gen --lang <lang>`.
fn normalize_args(mut args: Vec<String>) -> Vec<String> {
    let Some(lang) = args
        .get(1)
        .and_then(|command| command.strip_prefix("gen:"))
        .map(ToString::to_string)
    else {
        return args;
    };
    args[1] = "gen".to_string();
    if !lang.is_empty() {
        args.insert(2, lang);
        args.insert(2, "--lang".to_string());
    }
    args
}

/// Parse `args` (including the program name) and run the command.
///
/// Returns the process exit code: 0 on success and for `--help`/`--version`,
/// 1 on any failure.
pub fn run(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(normalize_args(args)) {
        Ok(cli) => match cli.command {
            Some(Commands::Gen(args)) => cli::generate::run(args),
            Some(Commands::Ir(args)) => cli::ir::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let _ = e.print();
            i32::from(e.use_stderr())
        }
    }
}

/// Install the stderr fmt subscriber, filtered by [`LOG_ENV`].
pub fn init_tracing() {
    // OAPIGEN_LOG: "trace", "debug", "info", "warn", "error" for the workspace
    // crates, or a full tracing filter spec like "oapigen_core=debug"
    let filter = match std::env::var(LOG_ENV) {
        Ok(level) if is_plain_level(&level) => workspace_filter(&level),
        Ok(spec) => spec,
        Err(_) => workspace_filter("info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn workspace_filter(level: &str) -> String {
    let level = level.to_ascii_lowercase();
    WORKSPACE_CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_normalize_gen_lang() {
        assert_eq!(
            normalize_args(args(&["oapigen", "gen:ts", "--spec", "a.json"])),
            args(&["oapigen", "gen", "--lang", "ts", "--spec", "a.json"])
        );
        assert_eq!(
            normalize_args(args(&["oapigen", "gen:", "--spec", "a.json"])),
            args(&["oapigen", "gen", "--spec", "a.json"])
        );
        assert_eq!(
            normalize_args(args(&["oapigen", "ir", "--spec", "gen:ts"])),
            args(&["oapigen", "ir", "--spec", "gen:ts"])
        );
        assert_eq!(normalize_args(args(&["oapigen"])), args(&["oapigen"]));
    }

    #[test]
    fn test_workspace_filter() {
        assert_eq!(
            workspace_filter("DEBUG"),
            "oapigen_core=debug,oapigen_backends=debug,oapigen_cli=debug"
        );
        assert!(is_plain_level("Warn"));
        assert!(!is_plain_level("oapigen_core=trace"));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(run(args(&["oapigen", "--help"])), 0);
        assert_eq!(run(args(&["oapigen"])), 0);
        assert_eq!(run(args(&["oapigen", "publish"])), 1);
        assert_eq!(run(args(&["oapigen", "gen"])), 1);
        assert_eq!(run(args(&["oapigen", "ir", "--spec", "missing.json"])), 1);
    }
}
