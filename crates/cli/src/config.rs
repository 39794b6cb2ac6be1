//! Optional `oapigen.toml` project configuration.
//!
//! ```toml
//! default_tag = "misc"
//!
//! [out]
//! ts = "packages/sdk/sdk-ts/src/oapi-gen"
//!
//! [sdk]
//! sdk-ts = "packages/sdk/sdk-ts/src/oapi-gen"
//! ```
//!
//! Relative directories are resolved against the directory holding the file.
//! Command-line flags always win over the file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use oapigen_core::Backend;
use serde::Deserialize;
use tracing::debug;

/// File looked up in the working directory when `--config` is not given.
pub const CONFIG_FILENAME: &str = "oapigen.toml";

/// Parsed configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Tag for operations without one.
    pub default_tag: Option<String>,
    /// Output directory per language id or alias.
    pub out: BTreeMap<String, PathBuf>,
    /// Output directory per SDK name.
    pub sdk: BTreeMap<String, PathBuf>,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl Config {
    /// Parse configuration text; relative paths resolve against `base_dir`.
    pub fn parse(contents: &str, base_dir: &Path) -> Result<Self, String> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|err| format!("Failed to parse {CONFIG_FILENAME}: {err}"))?;
        config.base_dir = base_dir.to_path_buf();
        Ok(config)
    }

    /// Load `explicit`, or `oapigen.toml` from the working directory if present.
    ///
    /// A missing explicit file is an error; a missing implicit one yields the
    /// default configuration.
    pub fn load(explicit: Option<&Path>) -> Result<Self, String> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let implicit = PathBuf::from(CONFIG_FILENAME);
                if !implicit.is_file() {
                    return Ok(Self::default());
                }
                implicit
            }
        };
        let contents = fs::read_to_string(&path)
            .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
        debug!(path = %path.display(), "Loaded configuration.");
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self::parse(&contents, &base_dir)
    }

    /// Configured directory for a backend, matched by id or alias.
    pub fn lang_out_dir(&self, backend: &dyn Backend) -> Option<PathBuf> {
        self.out
            .iter()
            .find(|(lang, _)| backend.matches(&lang.trim().to_ascii_lowercase()))
            .map(|(_, dir)| self.base_dir.join(dir))
    }

    /// Configured directory for a named SDK.
    pub fn sdk_out_dir(&self, sdk: &str) -> Option<PathBuf> {
        self.sdk.get(sdk).map(|dir| self.base_dir.join(dir))
    }
}

/// Where generated files for `backend` go.
///
/// `--out` wins, then `--sdk` (configured, else `packages/sdk/<name>/src/gen`),
/// then the configured language directory, else
/// `packages/sdk/sdk-<id>/src/gen`.
pub fn resolve_out_dir(
    out: Option<&Path>,
    sdk: Option<&str>,
    config: &Config,
    backend: &dyn Backend,
) -> PathBuf {
    if let Some(out) = out {
        return out.to_path_buf();
    }
    if let Some(sdk) = sdk {
        return config
            .sdk_out_dir(sdk)
            .unwrap_or_else(|| Path::new("packages/sdk").join(sdk).join("src/gen"));
    }
    config.lang_out_dir(backend).unwrap_or_else(|| {
        Path::new("packages/sdk")
            .join(format!("sdk-{}", backend.id()))
            .join("src/gen")
    })
}
