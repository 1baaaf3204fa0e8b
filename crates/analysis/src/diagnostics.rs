// Diagnostic types for variant validation

use graphql_base_db::Document;
use graphql_types::{DiagnosticSeverity, OffsetRange, Range, SourceLocation};
use std::fmt;
use std::sync::Arc;

/// What went wrong, scoped by how much it takes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DiagnosticKind {
    /// A source set could not be read. Fatal to the source set.
    Io,
    /// Malformed or unusable executable document. Fatal to the document.
    DocumentParse,
    /// Malformed schema. Fatal to the service for this variant.
    SchemaParse,
    /// A type, field, argument, variable or fragment that does not resolve.
    UnknownSymbol,
    /// Two operations or two fragments share a name.
    DuplicateDefinition,
    /// Fragments that spread each other in a loop.
    CyclicFragment,
    /// A service with no schema document at all.
    MissingSchema,
    /// A unit stopped without finishing, e.g. a panicking code emitter.
    Internal,
}

impl DiagnosticKind {
    /// Stable code used in output.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Io => "io-error",
            Self::DocumentParse => "document-parse-error",
            Self::SchemaParse => "schema-parse-error",
            Self::UnknownSymbol => "unknown-symbol",
            Self::DuplicateDefinition => "duplicate-definition",
            Self::CyclicFragment => "cyclic-fragment",
            Self::MissingSchema => "missing-schema",
            Self::Internal => "internal-error",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub severity: DiagnosticSeverity,
    /// Human-readable message
    pub message: Arc<str>,
    /// Absent for problems that belong to no single document (a missing
    /// schema, an unreadable source set).
    pub location: Option<SourceLocation>,
}

impl Diagnostic {
    /// Create an error diagnostic without a location
    #[must_use]
    pub fn error(kind: DiagnosticKind, message: impl Into<Arc<str>>) -> Self {
        Self {
            kind,
            severity: DiagnosticSeverity::Error,
            message: message.into(),
            location: None,
        }
    }

    /// Create an error diagnostic pointing into a document.
    ///
    /// `range` is a byte range into the text the document's AST was parsed
    /// from. When that text is not the file itself (introspection JSON), the
    /// location falls back to the start of the file.
    #[must_use]
    pub fn in_document(
        kind: DiagnosticKind,
        message: impl Into<Arc<str>>,
        document: &Document,
        range: Option<OffsetRange>,
    ) -> Self {
        Self::error(kind, message).with_location(location(document, range))
    }

    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.severity.is_error()
    }
}

/// `error[unknown-symbol]: message (debug:com/example/A.graphql:3:5)`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]: {}", self.severity, self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(
                f,
                " ({}:{}:{}:{})",
                location.source_set,
                location.logical_name,
                location.range.start.line + 1,
                location.range.start.character + 1
            )?;
        }
        Ok(())
    }
}

/// Source location of a byte range inside a document.
#[must_use]
pub fn location(document: &Document, range: Option<OffsetRange>) -> SourceLocation {
    let range = match range {
        Some(range) if document.offsets_match_file() => document.line_index().range(range),
        _ => Range::default(),
    };
    SourceLocation::new(
        document.source_set(),
        document.logical_name().clone(),
        document.path(),
        range,
    )
}

/// True when any diagnostic is an error.
#[must_use]
pub fn has_errors(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_types::{LogicalName, Position};

    fn document() -> Document {
        Document::executable(
            "debug",
            LogicalName::new("com/example/A.graphql"),
            "/tmp/src/debug/graphql/com/example/A.graphql",
            "query A {\n  nope\n}",
        )
    }

    #[test]
    fn test_diagnostic_error() {
        let diag = Diagnostic::error(DiagnosticKind::MissingSchema, "No schema");
        assert_eq!(diag.severity, DiagnosticSeverity::Error);
        assert!(diag.location.is_none());
        assert_eq!(diag.to_string(), "error[missing-schema]: No schema");
    }

    #[test]
    fn test_in_document_converts_offsets() {
        let diag = Diagnostic::in_document(
            DiagnosticKind::UnknownSymbol,
            "Cannot query field 'nope' on type 'Query'",
            &document(),
            Some(OffsetRange::new(12, 16)),
        );
        let location = diag.location.as_ref().unwrap();
        assert_eq!(location.range.start, Position::new(1, 2));
        assert_eq!(
            diag.to_string(),
            "error[unknown-symbol]: Cannot query field 'nope' on type 'Query' (debug:com/example/A.graphql:2:3)"
        );
    }

    #[test]
    fn test_introspection_locations_point_at_file_start() {
        let doc = Document::schema(
            "main",
            LogicalName::new("schema.json"),
            "schema.json",
            r#"{"__schema": {"queryType": {"name": "Query"}, "types": [{"kind": "OBJECT", "name": "Query", "fields": [{"name": "a", "type": {"kind": "SCALAR", "name": "Int"}}]}]}}"#,
        );
        let loc = location(&doc, Some(OffsetRange::new(5, 10)));
        assert_eq!(loc.range, Range::default());
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DiagnosticKind::Io.code(), "io-error");
        assert_eq!(DiagnosticKind::CyclicFragment.code(), "cyclic-fragment");
        assert_eq!(DiagnosticKind::DuplicateDefinition.to_string(), "duplicate-definition");
    }
}
