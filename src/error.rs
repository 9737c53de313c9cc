//! Error types for file loading.
//!
//! Parse problems are never errors in this sense; they are reported as
//! diagnostics on the parse result.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading source units from disk.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error while reading a file or walking a directory.
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension names neither notation.
    #[error("Unsupported file: {0} (expected .kerml or .sysml)")]
    UnsupportedFile(PathBuf),

    /// Directory to load does not exist.
    #[error("Directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
