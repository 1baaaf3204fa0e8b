//! Merging source sets loaded from disk along resolved variant orderings.

use graphql_base_db::{DocumentStore, SourceSet};
use graphql_config::DEFAULT_SERVICE;
use graphql_test_utils::{fixtures, TestProject};
use graphql_types::DocumentKind;
use graphql_variants::{merge, resolve, MergedDocumentSet, Variant};

fn load(project: &TestProject, variant: &Variant) -> Vec<SourceSet> {
    let store = DocumentStore::from_config(&project.config(), project.root());
    variant
        .source_set_names()
        .map(|name| store.load(name, DEFAULT_SERVICE).unwrap())
        .collect()
}

fn merged_for(project: &TestProject, variant: &Variant) -> MergedDocumentSet {
    merge(&load(project, variant), DEFAULT_SERVICE)
}

fn find<'a>(variants: &'a [Variant], name: &str) -> &'a Variant {
    variants.iter().find(|v| v.name() == name).unwrap()
}

#[test]
fn more_specific_source_set_replaces_document() {
    let droid = fixtures::logical_name("DroidDetails.graphql");
    let project =
        TestProject::star_wars().file("debug", &droid, fixtures::DROID_DETAILS_DEBUG);
    let variants = resolve(&["debug", "release"], &[]).unwrap();

    let debug = merged_for(&project, find(&variants, "debug"));
    let doc = debug.get(DocumentKind::Operation, &droid).unwrap();
    assert_eq!(doc.text(), fixtures::DROID_DETAILS_DEBUG);
    assert_eq!(doc.source_set(), "debug");
    assert_eq!(debug.overrides().len(), 1);

    let release = merged_for(&project, find(&variants, "release"));
    let doc = release.get(DocumentKind::Operation, &droid).unwrap();
    assert_eq!(doc.text(), fixtures::DROID_DETAILS);
    assert!(release.overrides().is_empty());
}

#[test]
fn distinct_names_are_unioned() {
    let project = TestProject::star_wars()
        .file("free", "com/example/FreeOnly.graphql", "query FreeOnly { node(id: 1) { id } }")
        .file("freeDebug", "com/example/Extra.graphql", "query Extra { node(id: 2) { id } }");
    let variants = resolve(&["debug"], &[("tier", &["free", "paid"])]).unwrap();

    let free_debug = merged_for(&project, find(&variants, "freeDebug"));
    // schema + DroidDetails + Films + SpeciesInformation + FreeOnly + Extra
    assert_eq!(free_debug.len(), 6);
    assert_eq!(free_debug.documents(DocumentKind::Operation).count(), 4);
    assert_eq!(free_debug.documents(DocumentKind::Fragment).count(), 1);
    assert_eq!(free_debug.documents(DocumentKind::Schema).count(), 1);

    let paid_debug = merged_for(&project, find(&variants, "paidDebug"));
    assert_eq!(paid_debug.len(), 4);
    assert!(paid_debug
        .get(DocumentKind::Operation, "com/example/FreeOnly.graphql")
        .is_none());
}

#[test]
fn merging_twice_gives_identical_sets() {
    let project = TestProject::star_wars().file(
        "debug",
        &fixtures::logical_name("DroidDetails.graphql"),
        fixtures::DROID_DETAILS_DEBUG,
    );
    let variants = resolve(&["debug"], &[]).unwrap();

    let first = merged_for(&project, &variants[0]);
    let second = merged_for(&project, &variants[0]);
    assert_eq!(first, second);
}

#[test]
fn variant_source_set_beats_flavor_and_build_type() {
    let droid = fixtures::logical_name("DroidDetails.graphql");
    let project = TestProject::star_wars()
        .file("free", &droid, "query DroidDetails { species(id: \"free\") { id } }")
        .file("debug", &droid, "query DroidDetails { species(id: \"debug\") { id } }")
        .file("freeDebug", &droid, "query DroidDetails { species(id: \"freeDebug\") { id } }");
    let variants = resolve(&["debug", "release"], &[("tier", &["free", "paid"])]).unwrap();

    let text = |name: &str| {
        let merged = merged_for(&project, find(&variants, name));
        merged
            .get(DocumentKind::Operation, &droid)
            .unwrap()
            .text()
            .to_string()
    };

    assert!(text("freeDebug").contains("\"freeDebug\""));
    assert!(text("freeRelease").contains("\"free\""));
    assert!(text("paidDebug").contains("\"debug\""));
    assert_eq!(text("paidRelease"), fixtures::DROID_DETAILS);
}

#[test]
fn unused_source_set_is_inert() {
    let project = TestProject::star_wars().file(
        "staging",
        "com/example/Broken.graphql",
        "query Broken {",
    );
    let variants = resolve(&["debug", "release"], &[]).unwrap();

    for variant in &variants {
        assert!(!variant.contains_source_set("staging"));
        let merged = merged_for(&project, variant);
        assert!(merged.all_documents().all(|doc| !doc.is_poisoned()));
    }
}

#[test]
fn schema_override_replaces_schema_document() {
    let schema = fixtures::logical_name("schema.json");
    let project =
        TestProject::star_wars().file("freeDebug", &schema, fixtures::INVALID_SCHEMA);
    let variants = resolve(&["debug"], &[("tier", &["free", "paid"])]).unwrap();

    let free_debug = merged_for(&project, find(&variants, "freeDebug"));
    let doc = free_debug.get(DocumentKind::Schema, &schema).unwrap();
    assert!(doc.is_poisoned());
    assert_eq!(free_debug.schema_documents().count(), 1);

    let paid_debug = merged_for(&project, find(&variants, "paidDebug"));
    assert!(!paid_debug
        .get(DocumentKind::Schema, &schema)
        .unwrap()
        .is_poisoned());
}
