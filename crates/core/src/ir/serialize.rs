//! Flat text form of the IR.

use thiserror::Error;

use super::types::{IR_VERSION, Ir};

/// Failure to convert between IR and its text form.
#[derive(Debug, Error)]
pub enum IrError {
    /// Serialization failed.
    #[error("failed to serialize IR: {0}")]
    Serialize(#[source] serde_json::Error),
    /// The text is not a valid IR document.
    #[error("failed to parse IR: {0}")]
    Parse(#[source] serde_json::Error),
    /// The document carries a version this build does not understand.
    #[error("unsupported IR version {found}")]
    UnsupportedVersion {
        /// Version found in the document.
        found: u32,
    },
}

/// Pretty JSON with a trailing newline. Field order is fixed by the types, so
/// equal IR values always produce identical text.
pub fn stringify_ir(ir: &Ir) -> Result<String, IrError> {
    let mut text = serde_json::to_string_pretty(ir).map_err(IrError::Serialize)?;
    text.push('\n');
    Ok(text)
}

/// Inverse of [`stringify_ir`].
pub fn parse_ir(text: &str) -> Result<Ir, IrError> {
    let ir: Ir = serde_json::from_str(text).map_err(IrError::Parse)?;
    if ir.version != IR_VERSION {
        return Err(IrError::UnsupportedVersion { found: ir.version });
    }
    Ok(ir)
}
