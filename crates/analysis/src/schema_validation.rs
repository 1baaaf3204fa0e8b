use crate::{Diagnostic, DiagnosticKind};
use graphql_base_db::{Document, INTROSPECTION_PARSE_FAILURE};
use graphql_hir::{
    collect_schema_types, FieldSignature, OperationType, SchemaTypes, TypeDef, TypeDefKind,
};
use graphql_syntax::summarize_definitions;
use graphql_types::{LogicalName, OffsetRange};
use graphql_variants::MergedDocumentSet;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The type system of one service, folded from every schema document of a
/// merged set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSchema {
    types: SchemaTypes,
    documents: Vec<LogicalName>,
}

impl ServiceSchema {
    /// Build and check the schema of a merged set.
    ///
    /// Returns `Ok(None)` when the set has no schema document. Any parse,
    /// merge or structural problem is reported as a `SchemaParse` diagnostic.
    #[tracing::instrument(skip(merged), fields(service = merged.service()))]
    pub fn load(merged: &MergedDocumentSet) -> Result<Option<Self>, Vec<Diagnostic>> {
        let documents: Vec<&Arc<Document>> = merged.schema_documents().collect();
        if documents.is_empty() {
            tracing::debug!("No schema documents");
            return Ok(None);
        }

        let mut diagnostics = Vec::new();
        for document in &documents {
            check_parsed(document, &mut diagnostics);
        }
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let by_name: BTreeMap<&LogicalName, &Arc<Document>> =
            documents.iter().map(|d| (d.logical_name(), *d)).collect();

        let (types, conflicts) = collect_schema_types(
            documents
                .iter()
                .filter_map(|d| d.ast().map(|ast| (d.logical_name(), ast))),
        );

        let report = |message: String, origin: Option<&LogicalName>, range: Option<OffsetRange>| {
            match origin.and_then(|o| by_name.get(o)) {
                Some(document) => {
                    Diagnostic::in_document(DiagnosticKind::SchemaParse, message, document, range)
                }
                None => Diagnostic::error(DiagnosticKind::SchemaParse, message),
            }
        };

        for conflict in &conflicts {
            diagnostics.push(report(conflict.message(), conflict.origin.as_ref(), conflict.range));
        }
        for (message, origin, range) in structural_errors(&types) {
            diagnostics.push(report(message, origin, range));
        }

        if !diagnostics.is_empty() {
            tracing::debug!(errors = diagnostics.len(), "Schema is invalid");
            return Err(diagnostics);
        }

        Ok(Some(Self {
            types,
            documents: documents.iter().map(|d| d.logical_name().clone()).collect(),
        }))
    }

    #[must_use]
    pub const fn types(&self) -> &SchemaTypes {
        &self.types
    }

    /// Logical names of the schema documents, in merge order.
    #[must_use]
    pub fn documents(&self) -> &[LogicalName] {
        &self.documents
    }
}

fn check_parsed(document: &Document, diagnostics: &mut Vec<Diagnostic>) {
    for error in document.parse_errors() {
        // Introspection failures already carry their own prefix.
        let message = if error.message.starts_with(INTROSPECTION_PARSE_FAILURE) {
            error.message.clone()
        } else {
            format!("Failed to parse GraphQL schema: {}", error.message)
        };
        diagnostics.push(Diagnostic::in_document(
            DiagnosticKind::SchemaParse,
            message,
            document,
            Some(OffsetRange::at(error.offset)),
        ));
    }

    if let Some(ast) = document.ast() {
        if summarize_definitions(ast).has_executable() {
            diagnostics.push(Diagnostic::in_document(
                DiagnosticKind::SchemaParse,
                "Schema documents cannot contain operations or fragments",
                document,
                None,
            ));
        }
    }
}

type StructuralError<'a> = (String, Option<&'a LogicalName>, Option<OffsetRange>);

/// Checks that need the whole type system: roots, type references,
/// interface implementations and union membership.
fn structural_errors(types: &SchemaTypes) -> Vec<StructuralError<'_>> {
    let mut errors = Vec::new();

    match types.root_type(OperationType::Query) {
        None => errors.push(("Schema does not define a query root type".to_string(), None, None)),
        Some(root) => {
            if types.get(root).map(|t| t.kind) != Some(TypeDefKind::Object) {
                errors.push((
                    format!("Query root type '{root}' must be a defined object type"),
                    None,
                    None,
                ));
            }
        }
    }
    for operation_type in [OperationType::Mutation, OperationType::Subscription] {
        if let Some(root) = types.root_type(operation_type) {
            if types.get(root).map(|t| t.kind) != Some(TypeDefKind::Object) {
                errors.push((
                    format!(
                        "{} root type '{root}' must be a defined object type",
                        operation_type.default_root_name()
                    ),
                    None,
                    None,
                ));
            }
        }
    }

    for type_def in types.iter() {
        for field in &type_def.fields {
            check_field(types, type_def, field, &mut errors);
        }
        for interface in &type_def.implements {
            match types.get(interface) {
                Some(target) if target.kind == TypeDefKind::Interface => {
                    check_implementation(type_def, target, &mut errors);
                }
                Some(_) => errors.push((
                    format!("Type '{}' implements '{interface}', which is not an interface", type_def.name),
                    type_def.origin.as_ref(),
                    type_def.name_range,
                )),
                None => errors.push((
                    format!("Type '{}' implements unknown interface '{interface}'", type_def.name),
                    type_def.origin.as_ref(),
                    type_def.name_range,
                )),
            }
        }
        for member in &type_def.union_members {
            if types.get(member).map(|t| t.kind) != Some(TypeDefKind::Object) {
                errors.push((
                    format!("Union '{}' member '{member}' must be an object type", type_def.name),
                    type_def.origin.as_ref(),
                    type_def.name_range,
                ));
            }
        }
    }

    errors
}

fn check_field<'a>(
    types: &SchemaTypes,
    owner: &'a TypeDef,
    field: &'a FieldSignature,
    errors: &mut Vec<StructuralError<'a>>,
) {
    let coordinate = format!("{}.{}", owner.name, field.name);
    let origin = field.origin.as_ref().or(owner.origin.as_ref());

    match types.get(&field.type_ref.name) {
        None => errors.push((
            format!("Unknown type '{}' on '{coordinate}'", field.type_ref.name),
            origin,
            field.name_range,
        )),
        Some(target) => {
            let input_owner = owner.kind == TypeDefKind::InputObject;
            if input_owner && !target.kind.is_input() {
                errors.push((
                    format!("Input field '{coordinate}' must have an input type, found {} '{}'", target.kind, target.name),
                    origin,
                    field.name_range,
                ));
            } else if !input_owner && target.kind == TypeDefKind::InputObject {
                errors.push((
                    format!("Field '{coordinate}' cannot return input object '{}'", target.name),
                    origin,
                    field.name_range,
                ));
            }
        }
    }

    for argument in &field.arguments {
        match types.get(&argument.type_ref.name) {
            Some(target) if target.kind.is_input() => {}
            Some(target) => errors.push((
                format!("Argument '{}' of '{coordinate}' must have an input type, found {} '{}'", argument.name, target.kind, target.name),
                origin,
                argument.name_range,
            )),
            None => errors.push((
                format!("Unknown type '{}' for argument '{}' of '{coordinate}'", argument.type_ref.name, argument.name),
                origin,
                argument.name_range,
            )),
        }
    }
}

fn check_implementation<'a>(
    implementor: &'a TypeDef,
    interface: &TypeDef,
    errors: &mut Vec<StructuralError<'a>>,
) {
    for field in &interface.fields {
        if !implementor.fields.iter().any(|f| f.name == field.name) {
            errors.push((
                format!(
                    "Type '{}' must define field '{}' required by interface '{}'",
                    implementor.name, field.name, interface.name
                ),
                implementor.origin.as_ref(),
                implementor.name_range,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_base_db::SourceSet;
    use graphql_variants::merge;

    fn merged(schemas: &[(&str, &str)]) -> MergedDocumentSet {
        let documents = schemas
            .iter()
            .map(|(name, text)| Document::schema("main", LogicalName::new(name), *name, *text))
            .collect();
        merge(&[SourceSet::new("main", "s", documents)], "s")
    }

    fn messages(result: Result<Option<ServiceSchema>, Vec<Diagnostic>>) -> Vec<String> {
        result
            .unwrap_err()
            .iter()
            .map(|d| d.message.to_string())
            .collect()
    }

    #[test]
    fn test_no_schema_documents() {
        assert!(ServiceSchema::load(&merged(&[])).unwrap().is_none());
    }

    #[test]
    fn test_valid_schema() {
        let schema = ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "type Query { a: Int }",
        )]))
        .unwrap()
        .unwrap();
        assert!(schema.types().contains("Query"));
        assert_eq!(schema.documents().len(), 1);
    }

    #[test]
    fn test_sdl_parse_error_is_prefixed() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "This is an invalid schema",
        )])));
        assert!(errors[0].starts_with("Failed to parse GraphQL schema: "), "{errors:?}");
    }

    #[test]
    fn test_introspection_error_keeps_message() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.json",
            "This is an invalid schema",
        )])));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Failed to parse GraphQL schema introspection query"));
    }

    #[test]
    fn test_missing_query_root() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "type Thing { a: Int }",
        )])));
        assert_eq!(errors, vec!["Schema does not define a query root type"]);
    }

    #[test]
    fn test_unknown_field_type() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "type Query { a: Missing }",
        )])));
        assert_eq!(errors, vec!["Unknown type 'Missing' on 'Query.a'"]);
    }

    #[test]
    fn test_interface_fields_must_be_provided() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "type Query { n: Node } interface Node { id: ID! } type User implements Node { name: String }",
        )])));
        assert_eq!(
            errors,
            vec!["Type 'User' must define field 'id' required by interface 'Node'"]
        );
    }

    #[test]
    fn test_union_members_must_be_objects() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "type Query { u: U } union U = Query | S scalar S",
        )])));
        assert_eq!(errors, vec!["Union 'U' member 'S' must be an object type"]);
    }

    #[test]
    fn test_schema_split_across_documents() {
        let schema = ServiceSchema::load(&merged(&[
            ("a.graphqls", "type Query { user: User }"),
            ("b.graphqls", "type User { id: ID! }"),
            ("c.graphqls", "extend type User { name: String }"),
        ]))
        .unwrap()
        .unwrap();
        assert!(schema.types().field("User", "name").is_some());
    }

    #[test]
    fn test_executable_definition_in_schema() {
        let errors = messages(ServiceSchema::load(&merged(&[(
            "schema.graphqls",
            "type Query { a: Int } query Q { a }",
        )])));
        assert_eq!(errors, vec!["Schema documents cannot contain operations or fragments"]);
    }
}
