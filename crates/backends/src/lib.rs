//! Target-language backends for oapigen.
//!
//! Each backend implements [`oapigen_core::Backend`]. The CLI looks them up
//! through the static [`BACKENDS`] table.

pub mod go;
pub mod typescript;

use oapigen_core::Backend;

pub use go::GoBackend;
pub use typescript::TypeScriptBackend;

/// Every registered backend, in `--lang all` order.
pub static BACKENDS: &[&dyn Backend] = &[&TypeScriptBackend, &GoBackend];

/// Find a backend by id or alias, case-insensitively.
pub fn resolve_backend(name: &str) -> Option<&'static dyn Backend> {
    let name = name.trim().to_ascii_lowercase();
    BACKENDS.iter().copied().find(|backend| backend.matches(&name))
}

/// Primary ids of every backend.
pub fn backend_ids() -> Vec<&'static str> {
    BACKENDS.iter().map(|backend| backend.id()).collect()
}
