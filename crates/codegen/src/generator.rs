//! Code generator boundary.
//!
//! Decides which artifacts a compilation unit produces and where they go.
//! The text of each file comes from a [`CodeEmitter`]; [`JavaEmitter`] is the
//! default.

use crate::CompilationUnit;
use graphql_analysis::{Diagnostic, DiagnosticKind};
use graphql_base_db::Document;
use graphql_hir::OperationType;
use graphql_types::{LogicalName, OffsetRange};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Directory, under a package, holding fragment classes.
pub const FRAGMENT_PACKAGE: &str = "fragment";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Operation(OperationType),
    Fragment,
}

/// One definition handed to an emitter.
#[derive(Debug, Clone)]
pub struct EmitRequest<'a> {
    pub variant: &'a str,
    pub service: &'a str,
    pub logical_name: &'a LogicalName,
    /// Dotted package, empty for documents at the source root
    pub package: &'a str,
    pub class_name: &'a str,
    /// GraphQL name of the operation or fragment
    pub name: &'a str,
    pub kind: ArtifactKind,
    /// Fragment type condition
    pub type_condition: Option<&'a str>,
    /// Exact source text of the definition
    pub source: &'a str,
    /// Source text of every fragment the definition needs, sorted by
    /// fragment name
    pub fragments: Vec<&'a str>,
}

/// Renders the text of one generated file.
///
/// Output must depend only on the request so that unchanged input yields
/// byte-identical files.
pub trait CodeEmitter: Send + Sync {
    /// File extension without the dot.
    fn extension(&self) -> &str;

    fn emit(&self, request: &EmitRequest<'_>) -> String;
}

/// A generated file, identified by (variant, service, logical name, name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub variant: Arc<str>,
    pub service: Arc<str>,
    pub logical_name: LogicalName,
    pub name: Arc<str>,
    pub kind: ArtifactKind,
    /// Path below the unit's output directory
    pub relative_path: PathBuf,
    pub contents: String,
}

impl GeneratedArtifact {
    /// `<output_root>/<variant>/<service>/<relative_path>`
    #[must_use]
    pub fn path(&self, output_root: &Path) -> PathBuf {
        output_root
            .join(self.variant.as_ref())
            .join(self.service.as_ref())
            .join(&self.relative_path)
    }
}

/// Produce every artifact of a unit, sorted by service then path.
///
/// Fails when two definitions would be written to the same file.
#[tracing::instrument(skip(unit, emitter), fields(variant = unit.variant().name()))]
pub fn generate(
    unit: &CompilationUnit,
    emitter: &dyn CodeEmitter,
) -> Result<Vec<GeneratedArtifact>, Vec<Diagnostic>> {
    let variant: Arc<str> = Arc::from(unit.variant().name());
    let mut artifacts: BTreeMap<(Arc<str>, PathBuf), GeneratedArtifact> = BTreeMap::new();
    let mut diagnostics = Vec::new();

    for (service, input) in unit.services() {
        let service: Arc<str> = Arc::from(service);
        let validated = &input.validated;

        let mut planned = Vec::new();
        for operation in validated.operations() {
            let operation_type = operation.structure.operation_type;
            let fragments = validated
                .fragments_for(operation)
                .into_iter()
                .map(|f| definition_text(&f.document, f.structure.fragment_range))
                .collect();
            planned.push(Planned {
                document: &operation.document,
                name: operation.name(),
                name_range: operation.structure.name_range,
                class_name: operation_class_name(operation.name(), operation_type),
                kind: ArtifactKind::Operation(operation_type),
                type_condition: None,
                source: definition_text(&operation.document, operation.structure.operation_range),
                fragments,
            });
        }
        for fragment in validated.fragments() {
            let fragments = validated
                .fragment_dependencies(fragment)
                .into_iter()
                .map(|f| definition_text(&f.document, f.structure.fragment_range))
                .collect();
            planned.push(Planned {
                document: &fragment.document,
                name: fragment.name(),
                name_range: fragment.structure.name_range,
                class_name: capitalize(fragment.name()),
                kind: ArtifactKind::Fragment,
                type_condition: Some(fragment.structure.type_condition.as_ref()),
                source: definition_text(&fragment.document, fragment.structure.fragment_range),
                fragments,
            });
        }

        for plan in planned {
            let logical_name = plan.document.logical_name();
            let package_path = logical_name.package_path();
            let relative_path = artifact_path(package_path, plan.kind, &plan.class_name, emitter);
            let key = (Arc::clone(&service), relative_path);

            if let Some(existing) = artifacts.get(&key) {
                diagnostics.push(Diagnostic::in_document(
                    DiagnosticKind::DuplicateDefinition,
                    format!(
                        "'{}' and '{}' both generate {}",
                        existing.name,
                        plan.name,
                        key.1.display()
                    ),
                    plan.document,
                    plan.name_range,
                ));
                continue;
            }

            let package = package_path.replace('/', ".");
            let request = EmitRequest {
                variant: &variant,
                service: &service,
                logical_name,
                package: &package,
                class_name: &plan.class_name,
                name: plan.name,
                kind: plan.kind,
                type_condition: plan.type_condition,
                source: plan.source,
                fragments: plan.fragments,
            };
            let contents = emitter.emit(&request);

            artifacts.insert(
                key.clone(),
                GeneratedArtifact {
                    variant: Arc::clone(&variant),
                    service: Arc::clone(&service),
                    logical_name: logical_name.clone(),
                    name: Arc::from(plan.name),
                    kind: plan.kind,
                    relative_path: key.1,
                    contents,
                },
            );
        }
    }

    if !diagnostics.is_empty() {
        return Err(diagnostics);
    }

    tracing::debug!(artifacts = artifacts.len(), "Generated artifacts");
    Ok(artifacts.into_values().collect())
}

struct Planned<'a> {
    document: &'a Arc<Document>,
    name: &'a str,
    name_range: Option<OffsetRange>,
    class_name: String,
    kind: ArtifactKind,
    type_condition: Option<&'a str>,
    source: &'a str,
    fragments: Vec<&'a str>,
}

/// Class name of an operation: the name followed by its type, unless the
/// name already ends with it (`DroidDetails` -> `DroidDetailsQuery`).
#[must_use]
pub fn operation_class_name(name: &str, operation_type: OperationType) -> String {
    let suffix = match operation_type {
        OperationType::Query => "Query",
        OperationType::Mutation => "Mutation",
        OperationType::Subscription => "Subscription",
    };
    let base = capitalize(name);
    if base.ends_with(suffix) {
        base
    } else {
        format!("{base}{suffix}")
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

fn artifact_path(
    package_path: &str,
    kind: ArtifactKind,
    class_name: &str,
    emitter: &dyn CodeEmitter,
) -> PathBuf {
    let mut path: PathBuf = package_path.split('/').filter(|s| !s.is_empty()).collect();
    if kind == ArtifactKind::Fragment {
        path.push(FRAGMENT_PACKAGE);
    }
    path.push(format!("{class_name}.{}", emitter.extension()));
    path
}

/// Text of one definition, or the whole document when the range is unknown.
fn definition_text(document: &Document, range: Option<OffsetRange>) -> &str {
    let text = document.parsed_text();
    range
        .and_then(|range| text.get(range.start..range.end))
        .unwrap_or(text)
}

/// Emits one Java class per definition holding its GraphQL source as string
/// constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaEmitter;

impl CodeEmitter for JavaEmitter {
    fn extension(&self) -> &str {
        "java"
    }

    fn emit(&self, request: &EmitRequest<'_>) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "// Generated from {} (variant {}, service {}). Do not edit.",
            request.logical_name, request.variant, request.service
        );
        if request.package.is_empty() {
            out.push('\n');
        } else {
            let _ = writeln!(out, "package {};\n", request.package);
        }
        let _ = writeln!(out, "public final class {} {{", request.class_name);

        let mut document = String::from(request.source);
        for fragment in &request.fragments {
            document.push('\n');
            document.push_str(fragment);
        }

        match request.kind {
            ArtifactKind::Operation(operation_type) => {
                string_constant(&mut out, "OPERATION_NAME", request.name);
                string_constant(&mut out, "OPERATION_TYPE", operation_type.keyword());
                string_constant(&mut out, "OPERATION_DOCUMENT", &document);
            }
            ArtifactKind::Fragment => {
                string_constant(&mut out, "FRAGMENT_NAME", request.name);
                string_constant(
                    &mut out,
                    "TYPE_CONDITION",
                    request.type_condition.unwrap_or_default(),
                );
                string_constant(&mut out, "FRAGMENT_DEFINITION", &document);
            }
        }

        let _ = writeln!(out, "\n  private {}() {{\n  }}\n}}", request.class_name);
        out
    }
}

/// `public static final String NAME = ...;`, one source line per literal.
fn string_constant(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, "  public static final String {name} =");
    if !value.contains('\n') {
        let _ = writeln!(out, " {};", java_string(value));
        return;
    }
    for (index, line) in value.split_inclusive('\n').enumerate() {
        let joiner = if index == 0 { "" } else { "+ " };
        let _ = write!(out, "\n      {joiner}{}", java_string(line));
    }
    out.push_str(";\n");
}

fn java_string(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    for c in text.chars() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}
