//! Document-related types: [`DocumentKind`], [`LogicalName`].

use std::sync::Arc;

/// Document kind (determines semantic processing).
///
/// Merging happens per kind: a schema document never overrides an operation
/// document even when both share a logical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DocumentKind {
    /// Schema definitions (SDL or introspection JSON)
    Schema,
    /// Executable documents containing at least one operation
    Operation,
    /// Executable documents containing only fragment definitions
    Fragment,
}

impl DocumentKind {
    /// All kinds, in merge order.
    pub const ALL: [Self; 3] = [Self::Schema, Self::Operation, Self::Fragment];

    /// Returns `true` if this is a schema document.
    #[must_use]
    pub const fn is_schema(self) -> bool {
        matches!(self, Self::Schema)
    }

    /// Returns `true` if this is an executable document (operation or fragment).
    #[must_use]
    pub const fn is_executable(self) -> bool {
        matches!(self, Self::Operation | Self::Fragment)
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema => write!(f, "schema"),
            Self::Operation => write!(f, "operation"),
            Self::Fragment => write!(f, "fragment"),
        }
    }
}

/// Stable identifier of a document used for override matching.
///
/// A logical name is the document's path relative to its source set's GraphQL
/// directory, always using `/` separators (e.g. `com/example/DroidDetails.graphql`).
/// The same logical name in two source sets refers to the same document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalName(Arc<str>);

impl LogicalName {
    /// Create a logical name, normalizing `\` separators and stripping any
    /// leading `./` or `/`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        let normalized = path.replace('\\', "/");
        let trimmed = normalized
            .trim_start_matches("./")
            .trim_start_matches('/');
        Self(Arc::from(trimmed))
    }

    /// Get the logical name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The directory part of the name (`com/example` for
    /// `com/example/DroidDetails.graphql`), empty at the root.
    #[must_use]
    pub fn package_path(&self) -> &str {
        self.0.rfind('/').map_or("", |idx| &self.0[..idx])
    }

    /// The file name without its directory.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rfind('/').map_or(&self.0, |idx| &self.0[idx + 1..])
    }

    /// The file extension, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let file_name = self.file_name();
        file_name
            .rfind('.')
            .filter(|idx| *idx > 0)
            .map(|idx| &file_name[idx + 1..])
    }
}

impl std::fmt::Display for LogicalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for LogicalName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogicalName {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}
