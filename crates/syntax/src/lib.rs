//! # GraphQL Syntax Parsing
//!
//! Parses GraphQL text into an [`ast::Document`]. Syntax errors are collected
//! with byte offsets instead of aborting, so callers can record a failed parse
//! on the document and keep going with its siblings.

use apollo_compiler::ast;
use graphql_types::{OffsetRange, Position, Range};

/// A parse error with position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    /// Byte offset where the error occurred
    pub offset: usize,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (at offset {})", self.message, self.offset)
    }
}

/// Parse GraphQL text.
///
/// Returns the AST only when the text is free of syntax errors; a partial AST
/// is never handed out.
#[tracing::instrument(skip(content), fields(size = content.len()))]
pub fn parse_graphql(content: &str, path: &str) -> Result<ast::Document, Vec<ParseError>> {
    let tree = apollo_parser::Parser::new(content).parse();
    let mut errors: Vec<ParseError> = tree
        .errors()
        .map(|e| ParseError {
            message: e.message().to_string(),
            offset: e.index(),
        })
        .collect();

    match ast::Document::parse(content, path) {
        Ok(document) if errors.is_empty() => Ok(document),
        Ok(_) => Err(errors),
        Err(with_errors) => {
            if errors.is_empty() {
                // apollo-compiler errors don't carry byte offsets
                errors.extend(with_errors.errors.iter().map(|e| ParseError {
                    message: e.to_string(),
                    offset: 0,
                }));
            }
            tracing::debug!(errors = errors.len(), "Parse failed");
            Err(errors)
        }
    }
}

/// Counts of top-level definitions by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefinitionSummary {
    pub operations: usize,
    pub fragments: usize,
    /// Schema, type, extension and directive definitions
    pub type_system: usize,
}

impl DefinitionSummary {
    /// A fragment document holds fragments and nothing else.
    #[must_use]
    pub const fn is_fragment_only(&self) -> bool {
        self.fragments > 0 && self.operations == 0 && self.type_system == 0
    }

    #[must_use]
    pub const fn has_executable(&self) -> bool {
        self.operations > 0 || self.fragments > 0
    }
}

#[must_use]
pub fn summarize_definitions(document: &ast::Document) -> DefinitionSummary {
    let mut summary = DefinitionSummary::default();
    for definition in &document.definitions {
        match definition {
            ast::Definition::OperationDefinition(_) => summary.operations += 1,
            ast::Definition::FragmentDefinition(_) => summary.fragments += 1,
            _ => summary.type_system += 1,
        }
    }
    summary
}

/// Byte range of a located AST node, if it has one.
#[must_use]
pub fn node_range<T>(node: &apollo_compiler::Node<T>) -> Option<OffsetRange> {
    node.location()
        .map(|loc| OffsetRange::new(loc.offset(), loc.end_offset()))
}

/// Byte range of a name token, if it has one.
#[must_use]
pub fn name_range(name: &apollo_compiler::Name) -> Option<OffsetRange> {
    name.location()
        .map(|loc| OffsetRange::new(loc.offset(), loc.end_offset()))
}

/// Maps byte offsets to line/column positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line
    line_starts: Vec<usize>,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.char_indices()
                .filter(|(_, c)| *c == '\n')
                .map(|(i, _)| i + 1),
        );
        Self { line_starts }
    }

    /// Convert a byte offset to a line/column position (0-based)
    #[must_use]
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let line = self
            .line_starts
            .binary_search(&offset)
            .unwrap_or_else(|i| i.saturating_sub(1));

        (line, offset - self.line_starts[line])
    }

    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let (line, col) = self.line_col(offset);
        Position::new(line as u32, col as u32)
    }

    #[must_use]
    pub fn range(&self, range: OffsetRange) -> Range {
        Range::new(self.position(range.start), self.position(range.end))
    }

    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
