//! Writing generated files and the `.gen-manifest.json` beside them.
//!
//! Every output directory carries a manifest of the files the last run wrote.
//! Before a new run writes anything, the previously listed files are deleted
//! and the directories that held them are pruned once empty, so files for
//! removed models or tags do not linger.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use oapigen_core::GeneratedFile;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Name of the manifest inside an output directory.
pub const MANIFEST_FILENAME: &str = ".gen-manifest.json";

/// Failure while planning or writing output.
#[derive(Debug, Error)]
pub enum OutputError {
    /// A generated path is absolute, empty or climbs out of the output directory.
    #[error("Generated path escapes output dir: {0}")]
    EscapingPath(String),
    /// Two generated files resolve to the same location.
    #[error("Duplicate generated path: {0}")]
    DuplicatePath(String),
    /// Filesystem failure.
    #[error("Failed to {action} {}: {source}", .path.display())]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The manifest could not be encoded.
    #[error("Failed to encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl OutputError {
    fn io(action: &'static str, path: &Path) -> impl FnOnce(io::Error) -> Self {
        let path = path.to_path_buf();
        move |source| OutputError::Io {
            action,
            path,
            source,
        }
    }
}

/// Contents of `.gen-manifest.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Relative paths written by the last run, sorted.
    #[serde(default)]
    pub files: Vec<String>,
}

impl Manifest {
    /// Pretty JSON with a trailing newline.
    pub fn to_json(&self) -> Result<String, OutputError> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}

/// Lexically normalize `path` and make sure it stays below the output root.
///
/// Returns `None` for empty or absolute paths and for paths whose `..`
/// components climb past the root.
pub fn contained_path(path: &str) -> Option<PathBuf> {
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    for component in Path::new(path).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop()?;
            }
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if parts.is_empty() {
        return None;
    }
    Some(parts.iter().collect())
}

/// Output for one directory, validated but not yet written.
#[derive(Debug)]
pub struct OutputPlan {
    out_dir: PathBuf,
    files: Vec<(PathBuf, String)>,
    manifest: Manifest,
}

/// What [`OutputPlan::commit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitSummary {
    /// Files from the previous manifest that were deleted.
    pub removed: usize,
    /// Files written.
    pub written: usize,
}

impl OutputPlan {
    /// Validate every path before anything touches the disk.
    pub fn new(out_dir: impl Into<PathBuf>, files: Vec<GeneratedFile>) -> Result<Self, OutputError> {
        let mut seen = BTreeSet::new();
        let mut planned = Vec::with_capacity(files.len());
        let mut listed = Vec::with_capacity(files.len());
        for file in files {
            let relative =
                contained_path(&file.path).ok_or_else(|| OutputError::EscapingPath(file.path.clone()))?;
            if relative == Path::new(MANIFEST_FILENAME) || !seen.insert(relative.clone()) {
                return Err(OutputError::DuplicatePath(file.path));
            }
            listed.push(file.path);
            planned.push((relative, file.contents));
        }
        listed.sort();
        Ok(Self {
            out_dir: out_dir.into(),
            files: planned,
            manifest: Manifest { files: listed },
        })
    }

    /// Target directory.
    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Manifest that [`OutputPlan::commit`] will write.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Delete the previous run's files, write the new ones and the manifest.
    pub fn commit(&self) -> Result<CommitSummary, OutputError> {
        let removed = clean_generated(&self.out_dir)?;
        for (relative, contents) in &self.files {
            let target = self.out_dir.join(relative);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(OutputError::io("create directory", parent))?;
            }
            fs::write(&target, contents).map_err(OutputError::io("write", &target))?;
        }
        fs::create_dir_all(&self.out_dir)
            .map_err(OutputError::io("create directory", &self.out_dir))?;
        let manifest_path = self.out_dir.join(MANIFEST_FILENAME);
        fs::write(&manifest_path, self.manifest.to_json()?)
            .map_err(OutputError::io("write", &manifest_path))?;
        debug!(
            out_dir = %self.out_dir.display(),
            removed,
            written = self.files.len(),
            "Output committed."
        );
        Ok(CommitSummary {
            removed,
            written: self.files.len(),
        })
    }
}

/// Read the manifest in `out_dir`, if there is a readable one.
pub fn read_manifest(out_dir: &Path) -> Option<Manifest> {
    let path = out_dir.join(MANIFEST_FILENAME);
    let raw = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&raw) {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            warn!(path = %path.display(), "Ignoring unreadable manifest: {err}");
            None
        }
    }
}

/// Remove every file listed in the previous manifest, then prune the
/// directories that held them (up to, not including, `out_dir`) once they are
/// empty. Returns the number of files removed.
///
/// Listed paths that would escape `out_dir` are skipped.
pub fn clean_generated(out_dir: &Path) -> Result<usize, OutputError> {
    let Some(manifest) = read_manifest(out_dir) else {
        return Ok(0);
    };
    let mut removed = 0;
    let mut parents: BTreeSet<PathBuf> = BTreeSet::new();
    for listed in &manifest.files {
        let Some(relative) = contained_path(listed) else {
            warn!(path = %listed, "Skipping manifest entry outside the output directory.");
            continue;
        };
        parents.extend(
            relative
                .ancestors()
                .skip(1)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf),
        );
        let target = out_dir.join(relative);
        match fs::remove_file(&target) {
            Ok(()) => removed += 1,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(OutputError::io("remove", &target)(err)),
        }
    }
    prune_empty_dirs(out_dir, &parents)?;
    Ok(removed)
}

/// Remove each of `dirs` (relative to `root`) that is empty, deepest first.
fn prune_empty_dirs(root: &Path, dirs: &BTreeSet<PathBuf>) -> Result<(), OutputError> {
    let mut ordered: Vec<&PathBuf> = dirs.iter().collect();
    ordered.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));
    for dir in ordered {
        let path = root.join(dir);
        let is_empty = match fs::read_dir(&path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(OutputError::io("read directory", &path)(err)),
        };
        if is_empty {
            fs::remove_dir(&path).map_err(OutputError::io("remove directory", &path))?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<GeneratedFile> {
        paths
            .iter()
            .map(|path| GeneratedFile::new(*path, format!("// {path}\n")))
            .collect()
    }

    #[test]
    fn test_contained_path() {
        assert_eq!(contained_path("a/b.ts"), Some(PathBuf::from("a/b.ts")));
        assert_eq!(contained_path("./a/../b.ts"), Some(PathBuf::from("b.ts")));
        assert_eq!(contained_path("../b.ts"), None);
        assert_eq!(contained_path("a/../../b.ts"), None);
        assert_eq!(contained_path("/etc/passwd"), None);
        assert_eq!(contained_path(""), None);
        assert_eq!(contained_path("a/.."), None);
    }

    #[test]
    fn test_plan_rejects_bad_paths() {
        assert!(matches!(
            OutputPlan::new("out", files(&["ok.ts", "../x.ts"])),
            Err(OutputError::EscapingPath(p)) if p == "../x.ts"
        ));
        assert!(matches!(
            OutputPlan::new("out", files(&["a/b.ts", "a/./b.ts"])),
            Err(OutputError::DuplicatePath(p)) if p == "a/./b.ts"
        ));
        assert!(matches!(
            OutputPlan::new("out", files(&[MANIFEST_FILENAME])),
            Err(OutputError::DuplicatePath(_))
        ));
    }

    #[test]
    fn test_manifest_json() {
        let plan = OutputPlan::new("out", files(&["z.go", "a/b.go", "B.go"])).unwrap();
        assert_eq!(
            plan.manifest().to_json().unwrap(),
            "{\n  \"files\": [\n    \"B.go\",\n    \"a/b.go\",\n    \"z.go\"\n  ]\n}\n"
        );
    }

    #[test]
    fn test_commit_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen");

        OutputPlan::new(&out, files(&["models/Old.ts", "index.ts"]))
            .unwrap()
            .commit()
            .unwrap();
        fs::write(out.join("keep.txt"), "hand written").unwrap();
        assert!(out.join("models/Old.ts").is_file());

        let summary = OutputPlan::new(&out, files(&["index.ts", "client/default.ts"]))
            .unwrap()
            .commit()
            .unwrap();
        assert_eq!(summary, CommitSummary { removed: 2, written: 2 });
        assert!(!out.join("models").exists());
        assert!(out.join("client/default.ts").is_file());
        assert!(out.join("keep.txt").is_file());
        assert_eq!(
            read_manifest(&out).unwrap().files,
            ["client/default.ts", "index.ts"]
        );
    }

    #[test]
    fn test_clean_skips_escaping_entries() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen");
        fs::create_dir_all(&out).unwrap();
        fs::write(dir.path().join("outside.txt"), "precious").unwrap();
        fs::write(out.join("inside.ts"), "x").unwrap();
        fs::write(
            out.join(MANIFEST_FILENAME),
            "{\"files\": [\"../outside.txt\", \"inside.ts\", \"gone.ts\"]}",
        )
        .unwrap();

        assert_eq!(clean_generated(&out).unwrap(), 1);
        assert!(dir.path().join("outside.txt").is_file());
        assert!(!out.join("inside.ts").exists());
    }

    #[test]
    fn test_clean_prunes_only_listed_parents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("gen");
        OutputPlan::new(&out, files(&["client/v1/pets.ts", "index.ts"]))
            .unwrap()
            .commit()
            .unwrap();
        fs::create_dir_all(out.join("assets/empty")).unwrap();
        fs::create_dir_all(out.join("client/extra")).unwrap();

        assert_eq!(clean_generated(&out).unwrap(), 2);
        assert!(!out.join("client/v1").exists());
        assert!(out.join("client/extra").is_dir());
        assert!(out.join("assets/empty").is_dir());
        assert!(out.is_dir());
    }

    #[test]
    fn test_clean_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clean_generated(dir.path()).unwrap(), 0);
        fs::write(dir.path().join(MANIFEST_FILENAME), "not json").unwrap();
        assert_eq!(clean_generated(dir.path()).unwrap(), 0);
    }
}
