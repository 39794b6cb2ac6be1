pub mod generate;
pub mod ir;

use std::path::Path;

use console::style;
use oapigen_core::diagnostics::has_errors;
use oapigen_core::{BuildOptions, Diagnostic, DiagnosticLevel, Ir, build_ir, load_document};
use tracing::debug;

pub fn run_cli<F>(f: F) -> i32
where
    F: FnOnce() -> Result<(), String>,
{
    match f() {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

/// One line per diagnostic on stderr, errors in red and warnings in yellow.
pub fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        let line = diagnostic.to_string();
        match diagnostic.level {
            DiagnosticLevel::Error => eprintln!("{}", style(line).red()),
            DiagnosticLevel::Warning => eprintln!("{}", style(line).yellow()),
        }
    }
}

/// Load `spec`, build the IR and report diagnostics.
///
/// Fails if the document cannot be read or any error-level diagnostic was
/// recorded; nothing has been written at that point.
pub fn load_ir(spec: &Path, default_tag: Option<String>) -> Result<Ir, String> {
    let doc = load_document(spec).map_err(|err| err.to_string())?;
    let output = build_ir(&doc, &BuildOptions { default_tag });
    print_diagnostics(&output.diagnostics);
    if has_errors(&output.diagnostics) {
        let count = output
            .diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Error)
            .count();
        return Err(format!(
            "Aborting: {count} error diagnostic(s) in {}",
            spec.display()
        ));
    }
    debug!(
        models = output.ir.models.len(),
        operations = output.ir.operations.len(),
        warnings = output.diagnostics.len(),
        "IR built."
    );
    Ok(output.ir)
}
