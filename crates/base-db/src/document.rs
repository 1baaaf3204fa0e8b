use apollo_compiler::ast;
use graphql_config::FileType;
use graphql_syntax::{parse_graphql, summarize_definitions, LineIndex, ParseError};
use graphql_types::{DocumentKind, LogicalName};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Prefix of the error recorded on a `schema.json` that does not decode.
pub const INTROSPECTION_PARSE_FAILURE: &str = "Failed to parse GraphQL schema introspection query";

/// Outcome of parsing a document's text.
#[derive(Debug, Clone)]
pub enum ParseState {
    Parsed(Arc<ast::Document>),
    /// The AST is absent; the errors explain why.
    Poisoned(Arc<[ParseError]>),
}

/// One GraphQL file contributed by a source set.
///
/// Immutable after construction; shared between pipeline stages behind `Arc`.
#[derive(Debug, Clone)]
pub struct Document {
    logical_name: LogicalName,
    kind: DocumentKind,
    source_set: Arc<str>,
    path: PathBuf,
    text: Arc<str>,
    /// Text the AST came from. Differs from `text` for introspection JSON,
    /// where it holds the rendered SDL.
    parsed_text: Arc<str>,
    state: ParseState,
}

impl Document {
    /// Build a document from a file matched by a service's patterns.
    #[must_use]
    pub fn from_file(
        source_set: &str,
        logical_name: LogicalName,
        path: impl Into<PathBuf>,
        text: impl Into<Arc<str>>,
        file_type: FileType,
    ) -> Self {
        match file_type {
            FileType::Schema => Self::schema(source_set, logical_name, path, text),
            FileType::Document => Self::executable(source_set, logical_name, path, text),
        }
    }

    /// A schema document. `.json` files are decoded as introspection results,
    /// everything else is parsed as SDL.
    #[must_use]
    pub fn schema(
        source_set: &str,
        logical_name: LogicalName,
        path: impl Into<PathBuf>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        let text: Arc<str> = text.into();
        let path = path.into();

        let (parsed_text, state) = if logical_name.extension() == Some("json") {
            match graphql_introspect::introspection_json_to_sdl(&text) {
                Ok(sdl) => {
                    let sdl: Arc<str> = Arc::from(sdl);
                    let state = parse_state(&sdl, &path);
                    (sdl, state)
                }
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "Introspection decode failed");
                    let error = ParseError {
                        message: format!("{INTROSPECTION_PARSE_FAILURE}: {e}"),
                        offset: 0,
                    };
                    (text.clone(), ParseState::Poisoned(Arc::from(vec![error])))
                }
            }
        } else {
            (text.clone(), parse_state(&text, &path))
        };

        Self {
            logical_name,
            kind: DocumentKind::Schema,
            source_set: Arc::from(source_set),
            path,
            text,
            parsed_text,
            state,
        }
    }

    /// An executable document. It is a fragment document when it holds only
    /// fragment definitions, otherwise an operation document (poisoned
    /// documents included).
    #[must_use]
    pub fn executable(
        source_set: &str,
        logical_name: LogicalName,
        path: impl Into<PathBuf>,
        text: impl Into<Arc<str>>,
    ) -> Self {
        let text: Arc<str> = text.into();
        let path = path.into();
        let state = parse_state(&text, &path);

        let kind = match &state {
            ParseState::Parsed(ast) if summarize_definitions(ast).is_fragment_only() => {
                DocumentKind::Fragment
            }
            _ => DocumentKind::Operation,
        };

        Self {
            logical_name,
            kind,
            source_set: Arc::from(source_set),
            path,
            parsed_text: text.clone(),
            text,
            state,
        }
    }

    #[must_use]
    pub const fn logical_name(&self) -> &LogicalName {
        &self.logical_name
    }

    #[must_use]
    pub const fn kind(&self) -> DocumentKind {
        self.kind
    }

    #[must_use]
    pub fn source_set(&self) -> &str {
        &self.source_set
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw file content.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text that AST offsets refer to.
    #[must_use]
    pub fn parsed_text(&self) -> &str {
        &self.parsed_text
    }

    #[must_use]
    pub const fn state(&self) -> &ParseState {
        &self.state
    }

    #[must_use]
    pub fn ast(&self) -> Option<&ast::Document> {
        match &self.state {
            ParseState::Parsed(ast) => Some(ast.as_ref()),
            ParseState::Poisoned(_) => None,
        }
    }

    #[must_use]
    pub fn parse_errors(&self) -> &[ParseError] {
        match &self.state {
            ParseState::Parsed(_) => &[],
            ParseState::Poisoned(errors) => errors.as_ref(),
        }
    }

    #[must_use]
    pub const fn is_poisoned(&self) -> bool {
        matches!(self.state, ParseState::Poisoned(_))
    }

    /// Whether AST offsets map back onto the file on disk.
    #[must_use]
    pub fn offsets_match_file(&self) -> bool {
        Arc::ptr_eq(&self.text, &self.parsed_text)
    }

    #[must_use]
    pub fn line_index(&self) -> LineIndex {
        LineIndex::new(&self.parsed_text)
    }
}

/// Documents compare by identity and content, not by parse result.
impl PartialEq for Document {
    fn eq(&self, other: &Self) -> bool {
        self.logical_name == other.logical_name
            && self.kind == other.kind
            && self.source_set == other.source_set
            && self.text == other.text
    }
}

impl Eq for Document {}

fn parse_state(text: &str, path: &Path) -> ParseState {
    match parse_graphql(text, &path.to_string_lossy()) {
        Ok(ast) => ParseState::Parsed(Arc::new(ast)),
        Err(errors) => ParseState::Poisoned(Arc::from(errors)),
    }
}
