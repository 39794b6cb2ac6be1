//! The contract every target-language generator implements.
//!
//! A backend is a pure function of the IR: it returns a flat list of files
//! relative to the output root and never touches the filesystem itself. The
//! only side-effect channel is the optional [`SourceFormatter`] carried by the
//! [`BackendContext`].

mod helpers;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::ir::Ir;

pub use helpers::{
    PathSegment, TypeRenderer, collect_refs, finalize_files, group_by_tag, operation_schemas,
    select_success_response, select_success_schema, split_path_template,
};

/// One output file, relative to the backend's output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Forward-slash relative path.
    pub path: String,
    /// Full file contents.
    pub contents: String,
}

impl GeneratedFile {
    /// Create a file.
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Failure inside a backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The injected formatter rejected a file.
    #[error("formatter failed on {path}: {message}")]
    Formatter {
        /// File being formatted.
        path: String,
        /// Formatter's explanation.
        message: String,
    },
    /// Two files share one path.
    #[error("duplicate generated path {0}")]
    DuplicatePath(String),
}

/// Post-processes generated source, e.g. by running a language formatter.
pub trait SourceFormatter: Send + Sync {
    /// Return the formatted contents of `path`, or an error message.
    fn format(&self, path: &str, contents: &str) -> Result<String, String>;
}

/// Everything a backend may know about the run besides the IR.
#[derive(Clone, Default)]
pub struct BackendContext {
    /// Directory the files will be written under.
    pub out_dir: PathBuf,
    /// Optional formatter applied to every file.
    pub formatter: Option<Arc<dyn SourceFormatter>>,
}

impl fmt::Debug for BackendContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendContext")
            .field("out_dir", &self.out_dir)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl BackendContext {
    /// Context without a formatter.
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            formatter: None,
        }
    }

    /// Attach a formatter.
    pub fn with_formatter(mut self, formatter: Arc<dyn SourceFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Run the formatter, if any, over one file.
    pub fn format(&self, file: GeneratedFile) -> Result<GeneratedFile, BackendError> {
        let Some(formatter) = &self.formatter else {
            return Ok(file);
        };
        let contents =
            formatter
                .format(&file.path, &file.contents)
                .map_err(|message| BackendError::Formatter {
                    path: file.path.clone(),
                    message,
                })?;
        Ok(GeneratedFile {
            path: file.path,
            contents,
        })
    }
}

/// A target-language generator.
pub trait Backend: Sync {
    /// Primary id used on the command line (`ts`, `go`).
    fn id(&self) -> &'static str;

    /// Alternative ids.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Render the IR into files sorted by path.
    fn generate(&self, ir: &Ir, ctx: &BackendContext) -> Result<Vec<GeneratedFile>, BackendError>;

    /// Whether `name` is this backend's id or one of its aliases.
    fn matches(&self, name: &str) -> bool {
        self.id() == name || self.aliases().contains(&name)
    }
}
