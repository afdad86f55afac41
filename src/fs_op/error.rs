use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the copy/clear engines and their helpers.
#[derive(Debug, Error)]
pub enum FsOpError {
    /// Wrapper for underlying IO errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// IO failure attributed to a specific path and operation.
    #[error("{op} `{path}` failed: {source}")]
    Path {
        op: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

impl FsOpError {
    /// Attach operation and path context to an IO error.
    pub fn path(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        FsOpError::Path {
            op,
            path: path.into(),
            source,
        }
    }
}
