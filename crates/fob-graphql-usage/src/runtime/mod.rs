//! Platform runtime abstraction for usage collection.
//!
//! The collector never touches the filesystem directly. Reading operation
//! documents, resolving module specifiers and writing report artifacts all go
//! through the [`Runtime`] trait so the same engine runs inside the Rolldown
//! plugin, the standalone CLI walker and in-memory tests.

#[cfg(not(target_family = "wasm"))]
pub mod native;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Module resolution failed
    #[error("Failed to resolve module '{specifier}' from '{}': {reason}", .from.display())]
    ResolutionFailed {
        specifier: String,
        from: PathBuf,
        reason: String,
    },

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Platform runtime trait
///
/// `resolve` is asynchronous so that callers can fan out many resolutions at
/// once and join them; implementations backed by a synchronous resolver move
/// the work off the async executor.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file to the filesystem, creating parent directories as needed
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool;

    /// Resolve `specifier` as if it were imported by the module at `from`.
    ///
    /// Returns an absolute path. Aliases and extension probing are the
    /// implementation's business.
    async fn resolve(&self, specifier: &str, from: &Path) -> RuntimeResult<PathBuf>;

    /// Get the current working directory
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;

    /// Read a UTF-8 text file.
    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes)
            .map_err(|e| RuntimeError::Io(format!("{} is not valid UTF-8: {}", path.display(), e)))
    }
}
