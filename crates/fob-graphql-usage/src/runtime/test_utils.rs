//! In-memory runtime for tests.
//!
//! `MemoryRuntime` holds a virtual filesystem in a map and counts how many
//! times each path was read, which lets tests assert that an operation
//! document is parsed exactly once per build.

use async_trait::async_trait;
use parking_lot::Mutex;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};

use super::{Runtime, RuntimeError, RuntimeResult};

const PROBE_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "gql", "graphql"];

/// Virtual filesystem runtime.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    cwd: PathBuf,
    files: Mutex<FxHashMap<PathBuf, Vec<u8>>>,
    reads: Mutex<FxHashMap<PathBuf, usize>>,
    aliases: Vec<(String, PathBuf)>,
}

impl MemoryRuntime {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            ..Default::default()
        }
    }

    /// Map a specifier prefix (e.g. `@`) to a directory.
    pub fn with_alias(mut self, prefix: impl Into<String>, target: impl Into<PathBuf>) -> Self {
        let target = self.absolute(&target.into());
        self.aliases.push((prefix.into(), target));
        self
    }

    /// Add a file. Relative paths are placed under the working directory.
    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.absolute(path.as_ref());
        self.files.lock().insert(path, content.into());
    }

    /// Number of successful and failed reads of `path`.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        let path = self.absolute(path.as_ref());
        self.reads.lock().get(&path).copied().unwrap_or(0)
    }

    /// Contents of `path` as UTF-8, if present.
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<String> {
        let path = self.absolute(path.as_ref());
        self.files
            .lock()
            .get(&path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.cwd.join(path).clean()
        }
    }

    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        let files = self.files.lock();
        if files.contains_key(candidate) {
            return Some(candidate.to_path_buf());
        }
        for ext in PROBE_EXTENSIONS {
            let mut with_ext = candidate.as_os_str().to_owned();
            with_ext.push(".");
            with_ext.push(ext);
            let with_ext = PathBuf::from(with_ext);
            if files.contains_key(&with_ext) {
                return Some(with_ext);
            }
        }
        PROBE_EXTENSIONS
            .iter()
            .map(|ext| candidate.join(format!("index.{ext}")))
            .find(|index| files.contains_key(index))
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.absolute(path);
        *self.reads.lock().entry(path.clone()).or_default() += 1;
        self.files
            .lock()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        self.insert(path, content);
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let path = self.absolute(path);
        self.files.lock().contains_key(&path)
    }

    async fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        let from = self.absolute(from);
        let base = from.parent().unwrap_or(&self.cwd);

        let candidate = if specifier.starts_with("./") || specifier.starts_with("../") {
            Some(base.join(specifier).clean())
        } else if Path::new(specifier).is_absolute() {
            Some(PathBuf::from(specifier).clean())
        } else {
            self.aliases.iter().find_map(|(prefix, target)| {
                specifier
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.strip_prefix('/'))
                    .map(|rest| target.join(rest).clean())
            })
        };

        candidate
            .and_then(|candidate| self.probe(&candidate))
            .ok_or_else(|| RuntimeError::ResolutionFailed {
                specifier: specifier.to_string(),
                from: from.clone(),
                reason: "no matching file in memory runtime".to_string(),
            })
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
