//! Validation of merged document sets.

use graphql_analysis::{validate, Diagnostic, DiagnosticKind};
use graphql_base_db::{Document, SourceSet};
use graphql_test_utils::{fixtures, format_diagnostics};
use graphql_types::LogicalName;
use graphql_variants::{merge, MergedDocumentSet};
use std::sync::Arc;

const SERVICE: &str = "service0";

fn schema_doc(set: &str, name: &str, text: &str) -> Document {
    Document::schema(set, LogicalName::new(name), name, text)
}

fn exec_doc(set: &str, name: &str, text: &str) -> Document {
    Document::executable(set, LogicalName::new(name), name, text)
}

/// `main` with the fixture schema plus the given executable documents.
fn merged_with(documents: &[(&str, &str)]) -> Arc<MergedDocumentSet> {
    let mut docs = vec![schema_doc("main", "schema.graphqls", fixtures::SCHEMA_SDL)];
    docs.extend(documents.iter().map(|(name, text)| exec_doc("main", name, text)));
    Arc::new(merge(&[SourceSet::new("main", SERVICE, docs)], SERVICE))
}

fn errors(documents: &[(&str, &str)]) -> Vec<Diagnostic> {
    validate(merged_with(documents)).unwrap_err()
}

fn kinds(diagnostics: &[Diagnostic]) -> Vec<DiagnosticKind> {
    diagnostics.iter().map(|d| d.kind).collect()
}

#[test]
fn fixture_documents_are_valid() {
    let validated = validate(merged_with(&[
        ("DroidDetails.graphql", fixtures::DROID_DETAILS),
        ("Films.graphql", fixtures::FILMS),
        ("SpeciesInformation.graphql", fixtures::SPECIES_INFORMATION),
    ]))
    .unwrap();

    assert!(validated.schema().is_some());
    let names: Vec<_> = validated.operations().iter().map(|op| op.name()).collect();
    assert_eq!(names, vec!["DroidDetails", "Films"]);

    let droid = &validated.operations()[0];
    let fragments: Vec<_> = validated
        .fragments_for(droid)
        .iter()
        .map(|f| f.name())
        .collect();
    assert_eq!(fragments, vec!["SpeciesInformation"]);
}

#[test]
fn introspection_schema_is_accepted() {
    let docs = vec![
        schema_doc("main", "schema.json", fixtures::SCHEMA_JSON),
        exec_doc("main", "DroidDetails.graphql", fixtures::DROID_DETAILS),
        exec_doc("main", "SpeciesInformation.graphql", fixtures::SPECIES_INFORMATION),
    ];
    let merged = Arc::new(merge(&[SourceSet::new("main", SERVICE, docs)], SERVICE));
    let validated = validate(merged).unwrap();
    assert!(validated.schema().unwrap().types().contains("Species"));
}

#[test]
fn unknown_field_suggests_a_close_name() {
    let diagnostics = errors(&[("A.graphql", "query A { species(id: 1) { nme } }")]);
    insta::assert_snapshot!(format_diagnostics(&diagnostics), @"[1] error[unknown-symbol]: Cannot query field 'nme' on type 'Species'. Did you mean 'name'? (main:A.graphql:1:28)");
}

#[test]
fn unknown_symbols_are_all_reported() {
    let diagnostics = errors(&[(
        "A.graphql",
        "query A($x: Missing) { species(bogus: 1) { id ...Nope } allFilms { films { rating } } }",
    )]);
    let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_ref()).collect();
    assert_eq!(
        messages,
        vec![
            "Unknown type 'Missing' for variable '$x'",
            "Unknown argument 'bogus' on field 'Query.species'",
            "Unknown fragment 'Nope'",
            "Cannot query field 'rating' on type 'Film'",
        ]
    );
    assert!(kinds(&diagnostics)
        .iter()
        .all(|k| *k == DiagnosticKind::UnknownSymbol));
}

#[test]
fn undeclared_variable_is_unknown() {
    let diagnostics = errors(&[("A.graphql", "query A { species(id: $id) { id } }")]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Variable '$id' is not defined by operation 'A'"
    );
}

#[test]
fn meta_fields_resolve() {
    let merged = merged_with(&[(
        "A.graphql",
        "query A { __typename __schema { types { name } } node(id: 1) { __typename ... on Film { title } } }",
    )]);
    assert!(validate(merged).is_ok());
}

#[test]
fn inline_fragment_on_unknown_type() {
    let diagnostics = errors(&[("A.graphql", "query A { node(id: 1) { ... on Droid { id } } }")]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Unknown type 'Droid' in inline fragment"
    );
}

#[test]
fn mutation_without_mutation_root() {
    let diagnostics = errors(&[("A.graphql", "mutation Change { species { id } }")]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnknownSymbol]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Schema does not support mutation operations"
    );
}

#[test]
fn duplicate_operation_names() {
    let diagnostics = errors(&[
        ("a/First.graphql", "query Same { species { id } }"),
        ("b/Second.graphql", "query Same { species { name } }"),
    ]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DuplicateDefinition]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Operation 'Same' is already defined in 'a/First.graphql'"
    );
    let location = diagnostics[0].location.as_ref().unwrap();
    assert_eq!(location.logical_name.as_str(), "b/Second.graphql");
}

#[test]
fn duplicate_fragment_names() {
    let diagnostics = errors(&[
        ("a.graphql", "fragment F on Species { id }"),
        ("b.graphql", "fragment F on Species { name }"),
    ]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DuplicateDefinition]);
}

#[test]
fn fragment_cycle() {
    let diagnostics = errors(&[
        ("A.graphql", "fragment A on Species { ...B }"),
        ("B.graphql", "fragment B on Species { ...A }"),
    ]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::CyclicFragment]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Fragment 'A' spreads itself: A -> B -> A"
    );
}

#[test]
fn anonymous_operation_is_rejected() {
    let diagnostics = errors(&[("A.graphql", "{ species { id } }")]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DocumentParse]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Anonymous operations are not supported for code generation"
    );
}

#[test]
fn type_definitions_in_operation_documents() {
    let diagnostics = errors(&[("A.graphql", "query A { species { id } } type Extra { a: Int }")]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::DocumentParse]);
}

#[test]
fn parse_failures_do_not_hide_other_errors() {
    let diagnostics = errors(&[
        ("Broken.graphql", "query Broken {"),
        ("Fine.graphql", "query Fine { species { nope } }"),
    ]);
    let kinds = kinds(&diagnostics);
    assert_eq!(kinds.first(), Some(&DiagnosticKind::DocumentParse));
    assert_eq!(kinds.last(), Some(&DiagnosticKind::UnknownSymbol));
    assert!(diagnostics[0]
        .message
        .starts_with("Failed to parse GraphQL document"));
}

#[test]
fn invalid_schema_stops_validation() {
    let docs = vec![
        schema_doc("main", "schema.json", fixtures::INVALID_SCHEMA),
        exec_doc("main", "A.graphql", "query A { nothing }"),
    ];
    let merged = Arc::new(merge(&[SourceSet::new("main", SERVICE, docs)], SERVICE));
    let diagnostics = validate(merged).unwrap_err();

    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::SchemaParse]);
    assert!(diagnostics[0]
        .message
        .starts_with("Failed to parse GraphQL schema introspection query"));
}

#[test]
fn no_schema_still_checks_documents() {
    let docs = vec![exec_doc("main", "A.graphql", "query A { anything }")];
    let merged = Arc::new(merge(&[SourceSet::new("main", SERVICE, docs)], SERVICE));
    let validated = validate(merged).unwrap();
    assert!(validated.schema().is_none());

    let docs = vec![exec_doc("main", "A.graphql", "{ anything }")];
    let merged = Arc::new(merge(&[SourceSet::new("main", SERVICE, docs)], SERVICE));
    assert!(validate(merged).is_err());
}

#[test]
fn fragment_spread_on_unrelated_type() {
    let diagnostics = errors(&[
        ("SpeciesInformation.graphql", fixtures::SPECIES_INFORMATION),
        ("Bad.graphql", "query Bad { allFilms { films { ...SpeciesInformation } } }"),
    ]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnknownSymbol]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Fragment 'SpeciesInformation' cannot be spread here as objects of type 'Film' can never be of type 'Species'"
    );
}

#[test]
fn fragment_spreads_through_interfaces() {
    let merged = merged_with(&[
        ("SpeciesInformation.graphql", fixtures::SPECIES_INFORMATION),
        ("NodeFields.graphql", "fragment NodeFields on Node { id }"),
        (
            "A.graphql",
            "query A { node(id: 1) { ...SpeciesInformation } species { ...NodeFields } }",
        ),
    ]);
    assert!(validate(merged).is_ok());
}

#[test]
fn inline_fragment_on_unrelated_type() {
    let diagnostics = errors(&[("A.graphql", "query A { species { ... on Film { title } } }")]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Inline fragment cannot be spread here as objects of type 'Species' can never be of type 'Film'"
    );
}

#[test]
fn composite_field_needs_subfields() {
    let diagnostics = errors(&[("A.graphql", "query A { species }")]);
    assert_eq!(kinds(&diagnostics), vec![DiagnosticKind::UnknownSymbol]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Field 'Query.species' of type 'Species' must have a selection of subfields"
    );
}

#[test]
fn leaf_field_rejects_subfields() {
    let diagnostics = errors(&[("A.graphql", "query A { species { name { length } } }")]);
    assert_eq!(
        diagnostics[0].message.as_ref(),
        "Field 'Species.name' of scalar type 'String' cannot have a selection of subfields"
    );
}
