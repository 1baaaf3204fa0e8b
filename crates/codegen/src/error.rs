use graphql_variants::ResolveError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures outside a unit's diagnostics.
///
/// Problems with the documents of one (variant, service) unit are reported in
/// its [`crate::UnitReport`]; these errors stop a run before or around units.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error(transparent)]
    Variants(#[from] ResolveError),

    #[error("Unknown variant '{name}' (available: {available})")]
    UnknownVariant { name: String, available: String },

    #[error("Unknown service '{name}' (available: {available})")]
    UnknownService { name: String, available: String },

    #[error("Failed to write {}: {source}", path.display())]
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
}

impl CodegenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
