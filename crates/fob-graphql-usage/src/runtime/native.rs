//! Native runtime backed by `tokio::fs` and `oxc_resolver`.
//!
//! ```text
//! NativeRuntime
//! ┌──────────────────┐
//! │ .read_file()     │────▶ tokio::fs::read()
//! │ .write_file()    │────▶ tokio::fs::write()
//! │ .resolve()       │────▶ oxc_resolver::Resolver (spawn_blocking)
//! └──────────────────┘
//! ```

// The only core module that touches the filesystem directly
#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use oxc_resolver::{AliasValue, ResolveOptions, Resolver};
use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Runtime, RuntimeError, RuntimeResult};

/// Extensions probed when a specifier omits one.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".mjs", ".cjs", ".gql", ".graphql", ".json",
];

/// Native filesystem runtime with node-style module resolution.
#[derive(Debug, Clone)]
pub struct NativeRuntime {
    resolver: Arc<Resolver>,
    cwd: PathBuf,
}

impl NativeRuntime {
    /// Create a runtime rooted at `cwd` without path aliases.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_aliases(cwd, std::iter::empty::<(String, PathBuf)>())
    }

    /// Create a runtime rooted at `cwd` with path aliases such as `@ → src`.
    ///
    /// Relative alias targets are interpreted from `cwd`.
    pub fn with_aliases<I, K, V>(cwd: impl Into<PathBuf>, aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PathBuf>,
    {
        let cwd = cwd.into();
        let alias = aliases
            .into_iter()
            .map(|(key, target)| {
                let target: PathBuf = target.into();
                let target = if target.is_absolute() {
                    target
                } else {
                    cwd.join(target).clean()
                };
                (
                    key.into(),
                    vec![AliasValue::Path(target.to_string_lossy().into_owned())],
                )
            })
            .collect();

        let resolver = Resolver::new(ResolveOptions {
            alias,
            condition_names: vec!["import".into(), "module".into(), "default".into()],
            extensions: DEFAULT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            ..Default::default()
        });

        Self {
            resolver: Arc::new(resolver),
            cwd,
        }
    }

    /// Get the current working directory for this runtime.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RuntimeError::FileNotFound(path.to_path_buf())
            } else {
                RuntimeError::Io(format!("Failed to read {}: {}", path.display(), e))
            }
        })
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                RuntimeError::Io(format!(
                    "Failed to create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| RuntimeError::Io(format!("Failed to write {}: {}", path.display(), e)))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf> {
        let resolver = Arc::clone(&self.resolver);
        let request = specifier.to_string();
        let importer = from.to_path_buf();

        let resolved = tokio::task::spawn_blocking(move || {
            // blocking stat
            let from_dir = if importer.is_dir() {
                importer.as_path()
            } else {
                importer.parent().unwrap_or(&importer)
            };
            resolver
                .resolve(from_dir, &request)
                .map(|res| res.path().to_path_buf())
                .map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?;

        resolved.map_err(|reason| RuntimeError::ResolutionFailed {
            specifier: specifier.to_string(),
            from: from.to_path_buf(),
            reason,
        })
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
