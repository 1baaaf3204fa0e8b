use std::path::PathBuf;
use thiserror::Error;

/// Failure to ingest a source set. Fatal to that source set only.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Source set path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Unknown service '{0}'")]
    UnknownService(String),
}

impl StoreError {
    /// Path the failure relates to, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::Io { path, .. } | Self::Walk { path, .. } | Self::NotADirectory(path) => {
                Some(path)
            }
            Self::UnknownService(_) => None,
        }
    }
}
