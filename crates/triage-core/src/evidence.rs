//! Path-keyed evidence storage
//!
//! Collectors write their output as byte blobs keyed by a relative path
//! (`image-signatures/app.json`, `system/block_devices.json`). Analyzers read
//! them back either by exact path or by glob pattern.
//!
//! - `MemoryEvidence`: in-memory map, used by collectors and in tests
//! - `DirectoryEvidence`: a bundle extracted on disk, sandboxed to its root
//!
//! `.tar.gz` bundles are read into a `MemoryEvidence` by [`crate::archive`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use glob::Pattern;
use walkdir::WalkDir;

use crate::error::{CoreError, Result};

/// Read access to collected evidence
pub trait EvidenceStore: Send + Sync {
    /// Read one artifact by exact path
    ///
    /// Returns `CoreError::EvidenceNotFound` when nothing is stored there.
    fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// All stored paths matching `pattern`, sorted
    fn glob(&self, pattern: &str) -> Result<Vec<String>>;

    fn exists(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| CoreError::GlobPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// In-memory evidence, keyed by normalized relative path
#[derive(Debug, Clone, Default)]
pub struct MemoryEvidence {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemoryEvidence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<Vec<u8>>) {
        let path = normalize(&path.into());
        self.files.insert(path, content.into());
    }

    /// Merge another store into this one; later writes win on path collision
    pub fn extend(&mut self, other: MemoryEvidence) {
        self.files.extend(other.files);
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Write every artifact below `root`, creating directories as needed
    pub fn write_to_dir(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());
        for (path, content) in &self.files {
            let target = root.join(path);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&target, content)?;
            written.push(target);
        }
        Ok(written)
    }
}

impl EvidenceStore for MemoryEvidence {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| CoreError::EvidenceNotFound {
                path: path.to_string(),
            })
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = compile(pattern)?;
        // BTreeMap iteration is already sorted
        Ok(self
            .files
            .keys()
            .filter(|p| pattern.matches(p))
            .cloned()
            .collect())
    }
}

/// Evidence read from an extracted bundle directory
#[derive(Debug)]
pub struct DirectoryEvidence {
    root: PathBuf,
    canonical_root: PathBuf,
}

impl DirectoryEvidence {
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(CoreError::EvidenceAccess {
                path: root.display().to_string(),
                message: "bundle directory does not exist".to_string(),
            });
        }

        let canonical_root = root.canonicalize().map_err(|e| CoreError::EvidenceAccess {
            path: root.display().to_string(),
            message: format!("failed to canonicalize bundle root: {}", e),
        })?;

        Ok(Self {
            root,
            canonical_root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path, refusing anything outside the bundle root
    fn resolve(&self, relative: &str) -> Result<PathBuf> {
        if Path::new(relative).is_absolute() {
            return Err(CoreError::EvidenceAccess {
                path: relative.to_string(),
                message: "absolute paths are not allowed".to_string(),
            });
        }

        let full = self.root.join(relative);
        if !full.is_file() {
            return Err(CoreError::EvidenceNotFound {
                path: relative.to_string(),
            });
        }

        let canonical = full.canonicalize().map_err(|e| CoreError::EvidenceAccess {
            path: relative.to_string(),
            message: format!("failed to resolve path: {}", e),
        })?;

        if !canonical.starts_with(&self.canonical_root) {
            return Err(CoreError::EvidenceAccess {
                path: relative.to_string(),
                message: "path escapes bundle directory".to_string(),
            });
        }

        Ok(canonical)
    }
}

impl EvidenceStore for DirectoryEvidence {
    fn get(&self, path: &str) -> Result<Vec<u8>> {
        let resolved = self.resolve(path)?;
        std::fs::read(&resolved).map_err(|e| CoreError::EvidenceAccess {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn glob(&self, pattern: &str) -> Result<Vec<String>> {
        let pattern = compile(pattern)?;
        let mut matches = Vec::new();

        for entry in WalkDir::new(&self.root).into_iter().filter_map(|e| e.ok()) {
            if !entry.file_type().is_file() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let relative = normalize(&relative.to_string_lossy());
            if pattern.matches(&relative) {
                matches.push(relative);
            }
        }

        matches.sort();
        Ok(matches)
    }
}

/// Forward slashes, no leading `./` or `/`
fn normalize(path: &str) -> String {
    let path = path.replace('\\', "/");
    let trimmed = path.trim_start_matches("./").trim_start_matches('/');
    trimmed.to_string()
}
