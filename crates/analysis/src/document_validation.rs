// Validation of operations and fragments (stages 2 to 4)

use crate::fragment_cycles::{find_fragment_cycles, FragmentGraph};
use crate::{Diagnostic, DiagnosticKind};
use apollo_compiler::ast;
use graphql_base_db::Document;
use graphql_hir::{
    extract_executable, FragmentStructure, OperationStructure, SchemaTypes, TypeDefKind,
};
use graphql_syntax::{name_range, node_range, summarize_definitions};
use graphql_types::OffsetRange;
use graphql_variants::MergedDocumentSet;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// An operation together with the document that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDef {
    pub structure: OperationStructure,
    pub document: Arc<Document>,
}

impl OperationDef {
    /// Operations without a name are rejected during validation.
    #[must_use]
    pub fn name(&self) -> &str {
        self.structure.name.as_deref().unwrap_or_default()
    }
}

/// A fragment together with the document that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentDef {
    pub structure: FragmentStructure,
    pub document: Arc<Document>,
}

impl FragmentDef {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.structure.name
    }
}

/// Operations and fragments of a merged set, with duplicates separated out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutableIndex {
    /// Ordered by (logical name, position in document)
    pub operations: Vec<OperationDef>,
    /// First definition of each fragment name, in logical name order
    pub fragments: BTreeMap<Arc<str>, FragmentDef>,
    duplicate_operations: Vec<(OperationDef, Arc<Document>)>,
    duplicate_fragments: Vec<(FragmentDef, Arc<Document>)>,
}

impl ExecutableIndex {
    pub fn build(merged: &MergedDocumentSet) -> Self {
        let mut index = Self::default();
        let mut operation_owner: BTreeMap<Arc<str>, Arc<Document>> = BTreeMap::new();

        for document in merged.executable_documents() {
            let Some(ast) = document.ast() else {
                continue;
            };
            let structure = extract_executable(ast);

            for operation in structure.operations {
                let def = OperationDef {
                    structure: operation,
                    document: Arc::clone(document),
                };
                if let Some(name) = def.structure.name.clone() {
                    if let Some(first) = operation_owner.get(&name) {
                        index.duplicate_operations.push((def, Arc::clone(first)));
                        continue;
                    }
                    operation_owner.insert(name, Arc::clone(document));
                }
                index.operations.push(def);
            }

            for fragment in structure.fragments {
                let def = FragmentDef {
                    structure: fragment,
                    document: Arc::clone(document),
                };
                if let Some(first) = index.fragments.get(&def.structure.name) {
                    let owner = Arc::clone(&first.document);
                    index.duplicate_fragments.push((def, owner));
                    continue;
                }
                index.fragments.insert(def.structure.name.clone(), def);
            }
        }

        index
    }

    /// Spread edges between defined fragments.
    #[must_use]
    pub fn fragment_graph(&self) -> FragmentGraph {
        self.fragments
            .iter()
            .map(|(name, def)| (Arc::clone(name), def.structure.fragment_spreads.clone()))
            .collect()
    }

    /// Fragments reachable from a set of spreads, sorted by name. Undefined
    /// names are skipped and cycles terminate.
    #[must_use]
    pub fn fragment_closure(&self, spreads: &BTreeSet<Arc<str>>) -> Vec<&FragmentDef> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut stack: Vec<&Arc<str>> = spreads.iter().collect();

        while let Some(name) = stack.pop() {
            let Some(def) = self.fragments.get(name) else {
                continue;
            };
            if seen.insert(def.name()) {
                stack.extend(def.structure.fragment_spreads.iter());
            }
        }

        seen.into_iter()
            .filter_map(|name| self.fragments.get(name))
            .collect()
    }
}

/// Stage 2: documents that are unusable for generation on their own.
pub fn document_errors(merged: &MergedDocumentSet) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for document in merged.executable_documents() {
        let Some(ast) = document.ast() else {
            for error in document.parse_errors() {
                diagnostics.push(Diagnostic::in_document(
                    DiagnosticKind::DocumentParse,
                    format!("Failed to parse GraphQL document: {}", error.message),
                    document,
                    Some(OffsetRange::at(error.offset)),
                ));
            }
            continue;
        };

        if summarize_definitions(ast).type_system > 0 {
            for definition in &ast.definitions {
                if !matches!(
                    definition,
                    ast::Definition::OperationDefinition(_) | ast::Definition::FragmentDefinition(_)
                ) {
                    diagnostics.push(Diagnostic::in_document(
                        DiagnosticKind::DocumentParse,
                        "Type system definitions are not allowed in operation documents",
                        document,
                        definition_range(definition),
                    ));
                }
            }
        }

        for definition in &ast.definitions {
            if let ast::Definition::OperationDefinition(op) = definition {
                if op.name.is_none() {
                    diagnostics.push(Diagnostic::in_document(
                        DiagnosticKind::DocumentParse,
                        "Anonymous operations are not supported for code generation",
                        document,
                        node_range(op),
                    ));
                }
            }
        }
    }

    diagnostics
}

fn definition_range(definition: &ast::Definition) -> Option<OffsetRange> {
    definition
        .location()
        .map(|loc| OffsetRange::new(loc.offset(), loc.end_offset()))
}

/// Stage 3: references that do not resolve against the schema.
pub fn unknown_symbols(
    merged: &MergedDocumentSet,
    schema: &SchemaTypes,
    index: &ExecutableIndex,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for document in merged.executable_documents() {
        let Some(ast) = document.ast() else {
            continue;
        };
        let mut checker = SymbolChecker {
            schema,
            index,
            document,
            diagnostics: &mut diagnostics,
        };
        for definition in &ast.definitions {
            match definition {
                ast::Definition::OperationDefinition(op) => checker.operation(op),
                ast::Definition::FragmentDefinition(frag) => checker.fragment(frag),
                _ => {}
            }
        }
    }

    diagnostics
}

/// Stage 4: duplicate names and fragment cycles.
pub fn definition_errors(index: &ExecutableIndex) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (def, first) in &index.duplicate_operations {
        diagnostics.push(Diagnostic::in_document(
            DiagnosticKind::DuplicateDefinition,
            format!(
                "Operation '{}' is already defined in '{}'",
                def.name(),
                first.logical_name()
            ),
            &def.document,
            def.structure.name_range,
        ));
    }

    for (def, first) in &index.duplicate_fragments {
        diagnostics.push(Diagnostic::in_document(
            DiagnosticKind::DuplicateDefinition,
            format!(
                "Fragment '{}' is already defined in '{}'",
                def.name(),
                first.logical_name()
            ),
            &def.document,
            def.structure.name_range,
        ));
    }

    for cycle in find_fragment_cycles(&index.fragment_graph()) {
        let Some(def) = cycle.first().and_then(|name| index.fragments.get(name)) else {
            continue;
        };
        let path: Vec<&str> = cycle
            .iter()
            .chain(cycle.first())
            .map(AsRef::as_ref)
            .collect();
        diagnostics.push(Diagnostic::in_document(
            DiagnosticKind::CyclicFragment,
            format!(
                "Fragment '{}' spreads itself: {}",
                def.name(),
                path.join(" -> ")
            ),
            &def.document,
            def.structure.name_range,
        ));
    }

    diagnostics
}

struct SymbolChecker<'a> {
    schema: &'a SchemaTypes,
    index: &'a ExecutableIndex,
    document: &'a Document,
    diagnostics: &'a mut Vec<Diagnostic>,
}

impl SymbolChecker<'_> {
    fn report(&mut self, message: String, range: Option<OffsetRange>) {
        self.diagnostics.push(Diagnostic::in_document(
            DiagnosticKind::UnknownSymbol,
            message,
            self.document,
            range,
        ));
    }

    fn operation(&mut self, op: &ast::OperationDefinition) {
        let operation_type: graphql_hir::OperationType = op.operation_type.into();
        let op_name = op.name.as_ref().map_or("<anonymous>", |n| n.as_str());

        let mut declared = BTreeSet::new();
        for variable in &op.variables {
            declared.insert(variable.name.as_str());
            let type_name = variable.ty.inner_named_type();
            match self.schema.get(type_name.as_str()) {
                Some(def) if def.kind.is_input() => {}
                Some(def) => self.report(
                    format!(
                        "Variable '${}' cannot have {} type '{}'",
                        variable.name, def.kind, def.name
                    ),
                    name_range(type_name),
                ),
                None => {
                    let message = with_suggestion(
                        format!("Unknown type '{type_name}' for variable '${}'", variable.name),
                        type_name.as_str(),
                        self.schema.type_names(),
                    );
                    self.report(message, name_range(type_name));
                }
            }
        }

        let mut used = Vec::new();
        collect_selection_variables(&op.selection_set, &mut used);
        collect_directive_variables(&op.directives, &mut used);
        for name in used {
            if !declared.contains(name.as_str()) {
                self.report(
                    format!("Variable '${name}' is not defined by operation '{op_name}'"),
                    name_range(name),
                );
            }
        }

        let Some(root) = self.schema.root_type(operation_type) else {
            self.report(
                format!("Schema does not support {operation_type} operations"),
                op.name.as_ref().and_then(name_range),
            );
            return;
        };
        let root = root.to_string();
        self.selections(&op.selection_set, &root);
    }

    fn fragment(&mut self, frag: &ast::FragmentDefinition) {
        let type_name = frag.type_condition.as_str();
        match self.schema.get(type_name) {
            Some(def) if def.kind.is_composite() => {
                self.selections(&frag.selection_set, type_name);
            }
            Some(def) => self.report(
                format!(
                    "Fragment '{}' cannot be on {} type '{}'",
                    frag.name, def.kind, def.name
                ),
                name_range(&frag.type_condition),
            ),
            None => {
                let message = with_suggestion(
                    format!("Unknown type '{type_name}' in fragment '{}'", frag.name),
                    type_name,
                    self.schema.type_names(),
                );
                self.report(message, name_range(&frag.type_condition));
            }
        }
    }

    fn selections(&mut self, selections: &[ast::Selection], parent: &str) {
        for selection in selections {
            match selection {
                ast::Selection::Field(field) => self.field(field, parent),
                ast::Selection::FragmentSpread(spread) => {
                    let name = spread.fragment_name.as_str();
                    if !self.index.fragments.contains_key(name) {
                        let message = with_suggestion(
                            format!("Unknown fragment '{name}'"),
                            name,
                            self.index.fragments.keys().map(AsRef::as_ref),
                        );
                        self.report(message, name_range(&spread.fragment_name));
                    } else if let Some(fragment) = self.index.fragments.get(name) {
                        let condition = fragment.structure.type_condition.as_ref();
                        if !self.can_spread(condition, parent) {
                            self.report(
                                format!(
                                    "Fragment '{name}' cannot be spread here as objects of type '{parent}' can never be of type '{condition}'"
                                ),
                                name_range(&spread.fragment_name),
                            );
                        }
                    }
                }
                ast::Selection::InlineFragment(inline) => match &inline.type_condition {
                    None => self.selections(&inline.selection_set, parent),
                    Some(condition) => match self.schema.get(condition.as_str()) {
                        Some(def) if def.kind.is_composite() => {
                            if self.can_spread(condition.as_str(), parent) {
                                self.selections(&inline.selection_set, condition.as_str());
                            } else {
                                self.report(
                                    format!(
                                        "Inline fragment cannot be spread here as objects of type '{parent}' can never be of type '{condition}'"
                                    ),
                                    name_range(condition),
                                );
                            }
                        }
                        Some(def) => self.report(
                            format!(
                                "Inline fragment cannot be on {} type '{}'",
                                def.kind, def.name
                            ),
                            name_range(condition),
                        ),
                        None => {
                            let message = with_suggestion(
                                format!("Unknown type '{condition}' in inline fragment"),
                                condition.as_str(),
                                self.schema.type_names(),
                            );
                            self.report(message, name_range(condition));
                        }
                    },
                },
            }
        }
    }

    fn field(&mut self, field: &ast::Field, parent: &str) {
        let name = field.name.as_str();
        if name == "__typename" {
            return;
        }
        let is_query_root = self
            .schema
            .root_type(graphql_hir::OperationType::Query)
            .is_some_and(|root| root == parent);
        if is_query_root && (name == "__schema" || name == "__type") {
            return;
        }

        let Some(parent_def) = self.schema.get(parent) else {
            return;
        };
        let signature = match parent_def.kind {
            TypeDefKind::Object | TypeDefKind::Interface => self.schema.field(parent, name),
            _ => None,
        };
        let Some(signature) = signature else {
            let message = with_suggestion(
                format!("Cannot query field '{name}' on type '{parent}'"),
                name,
                parent_def.fields.iter().map(|f| f.name.as_ref()),
            );
            self.report(message, name_range(&field.name));
            return;
        };

        for argument in &field.arguments {
            let arg_name = argument.name.as_str();
            if !signature.arguments.iter().any(|a| a.name.as_ref() == arg_name) {
                let message = with_suggestion(
                    format!("Unknown argument '{arg_name}' on field '{parent}.{name}'"),
                    arg_name,
                    signature.arguments.iter().map(|a| a.name.as_ref()),
                );
                self.report(message, name_range(&argument.name));
            }
        }

        let child = signature.type_ref.name.to_string();
        match self.schema.get(&child) {
            Some(def) if def.kind.is_composite() => {
                if field.selection_set.is_empty() {
                    self.report(
                        format!(
                            "Field '{parent}.{name}' of type '{child}' must have a selection of subfields"
                        ),
                        name_range(&field.name),
                    );
                } else {
                    self.selections(&field.selection_set, &child);
                }
            }
            Some(def) if !field.selection_set.is_empty() => self.report(
                format!(
                    "Field '{parent}.{name}' of {} type '{child}' cannot have a selection of subfields",
                    def.kind
                ),
                name_range(&field.name),
            ),
            _ => {}
        }
    }

    /// A fragment on `condition` applies inside `parent` when the two share a
    /// possible object type. Unknown types are reported elsewhere.
    fn can_spread(&self, condition: &str, parent: &str) -> bool {
        if condition == parent {
            return true;
        }
        let (Some(condition_def), Some(parent_def)) =
            (self.schema.get(condition), self.schema.get(parent))
        else {
            return true;
        };
        if !condition_def.kind.is_composite() || !parent_def.kind.is_composite() {
            return true;
        }
        let parent_types = self.schema.possible_types(parent);
        self.schema
            .possible_types(condition)
            .iter()
            .any(|object| parent_types.contains(object))
    }
}

fn collect_selection_variables<'a>(selections: &'a [ast::Selection], used: &mut Vec<&'a apollo_compiler::Name>) {
    for selection in selections {
        match selection {
            ast::Selection::Field(field) => {
                for argument in &field.arguments {
                    collect_value_variables(&argument.value, used);
                }
                collect_directive_variables(&field.directives, used);
                collect_selection_variables(&field.selection_set, used);
            }
            ast::Selection::FragmentSpread(spread) => {
                collect_directive_variables(&spread.directives, used);
            }
            ast::Selection::InlineFragment(inline) => {
                collect_directive_variables(&inline.directives, used);
                collect_selection_variables(&inline.selection_set, used);
            }
        }
    }
}

fn collect_directive_variables<'a>(directives: &'a ast::DirectiveList, used: &mut Vec<&'a apollo_compiler::Name>) {
    for directive in directives {
        for argument in &directive.arguments {
            collect_value_variables(&argument.value, used);
        }
    }
}

fn collect_value_variables<'a>(value: &'a ast::Value, used: &mut Vec<&'a apollo_compiler::Name>) {
    match value {
        ast::Value::Variable(name) => used.push(name),
        ast::Value::List(items) => {
            for item in items {
                collect_value_variables(item, used);
            }
        }
        ast::Value::Object(fields) => {
            for (_, item) in fields {
                collect_value_variables(item, used);
            }
        }
        _ => {}
    }
}

/// Append "Did you mean ...?" when a candidate is close to `name`.
fn with_suggestion<'a>(
    message: String,
    name: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> String {
    let best = candidates
        .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
        .filter(|(score, _)| *score >= 0.85)
        .max_by(|a, b| a.0.total_cmp(&b.0).then_with(|| b.1.cmp(a.1)));

    match best {
        Some((_, candidate)) => format!("{message}. Did you mean '{candidate}'?"),
        None => message,
    }
}
