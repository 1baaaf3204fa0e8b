//! Position and range types for source locations.

use crate::LogicalName;
use std::path::PathBuf;
use std::sync::Arc;

/// Byte offset range in a source file.
///
/// AST nodes report byte offsets; they are converted to line/column
/// [`Position`]s only when a diagnostic is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OffsetRange {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl OffsetRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a zero-width range at a specific offset.
    #[must_use]
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for OffsetRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Position in a source file (0-indexed line and byte column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: u32,
    /// Byte offset within the line (0-indexed)
    pub character: u32,
}

impl Position {
    #[must_use]
    pub const fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Range in a source file, from `start` (inclusive) to `end` (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    #[must_use]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Create a zero-width range at a specific position.
    #[must_use]
    pub const fn at(position: Position) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.line == self.end.line && self.start.character == self.end.character
    }
}

/// Where a diagnostic points: a document inside a source set, plus a range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source set that contributed the document
    pub source_set: Arc<str>,
    pub logical_name: LogicalName,
    /// Path of the file on disk (or a virtual path for in-memory documents)
    pub path: PathBuf,
    pub range: Range,
}

impl SourceLocation {
    #[must_use]
    pub fn new(
        source_set: impl Into<Arc<str>>,
        logical_name: LogicalName,
        path: impl Into<PathBuf>,
        range: Range,
    ) -> Self {
        Self {
            source_set: source_set.into(),
            logical_name,
            path: path.into(),
            range,
        }
    }
}

/// Formats as `path:line:column` with 1-based line and column numbers.
impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.path.display(),
            self.range.start.line + 1,
            self.range.start.character + 1
        )
    }
}
