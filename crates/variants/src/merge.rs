use graphql_base_db::{Document, SourceSet};
use graphql_types::{DocumentKind, LogicalName};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A document displaced by a more specific source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    pub logical_name: LogicalName,
    pub kind: DocumentKind,
    /// Source set of the losing document
    pub replaced: Arc<str>,
    /// Source set of the winning document
    pub winner: Arc<str>,
}

/// The documents of one service that apply to one variant.
///
/// Each (kind, logical name) maps to exactly one document: the one from the
/// most specific source set that defines it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedDocumentSet {
    service: Arc<str>,
    source_sets: Vec<Arc<str>>,
    schema: BTreeMap<LogicalName, Arc<Document>>,
    operations: BTreeMap<LogicalName, Arc<Document>>,
    fragments: BTreeMap<LogicalName, Arc<Document>>,
    overrides: Vec<Override>,
}

impl MergedDocumentSet {
    fn new(service: &str) -> Self {
        Self {
            service: Arc::from(service),
            source_sets: Vec::new(),
            schema: BTreeMap::new(),
            operations: BTreeMap::new(),
            fragments: BTreeMap::new(),
            overrides: Vec::new(),
        }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Names of the merged source sets, least specific first.
    #[must_use]
    pub fn source_sets(&self) -> &[Arc<str>] {
        &self.source_sets
    }

    fn map(&self, kind: DocumentKind) -> &BTreeMap<LogicalName, Arc<Document>> {
        match kind {
            DocumentKind::Schema => &self.schema,
            DocumentKind::Operation => &self.operations,
            DocumentKind::Fragment => &self.fragments,
        }
    }

    fn map_mut(&mut self, kind: DocumentKind) -> &mut BTreeMap<LogicalName, Arc<Document>> {
        match kind {
            DocumentKind::Schema => &mut self.schema,
            DocumentKind::Operation => &mut self.operations,
            DocumentKind::Fragment => &mut self.fragments,
        }
    }

    #[must_use]
    pub fn get(&self, kind: DocumentKind, logical_name: &str) -> Option<&Arc<Document>> {
        self.map(kind).get(logical_name)
    }

    /// Documents of one kind in logical name order.
    pub fn documents(&self, kind: DocumentKind) -> impl Iterator<Item = &Arc<Document>> {
        self.map(kind).values()
    }

    pub fn schema_documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents(DocumentKind::Schema)
    }

    /// Operation and fragment documents in logical name order.
    pub fn executable_documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        let mut documents: Vec<&Arc<Document>> =
            self.operations.values().chain(self.fragments.values()).collect();
        documents.sort_by(|a, b| a.logical_name().cmp(b.logical_name()));
        documents.into_iter()
    }

    pub fn all_documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        DocumentKind::ALL.into_iter().flat_map(|kind| self.documents(kind))
    }

    #[must_use]
    pub fn has_schema(&self) -> bool {
        !self.schema.is_empty()
    }

    /// Replacements made while merging, in the order they happened.
    #[must_use]
    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.schema.len() + self.operations.len() + self.fragments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn insert(&mut self, document: &Arc<Document>) {
        let kind = document.kind();
        let logical_name = document.logical_name().clone();

        // Operation and fragment files share one namespace: an override may
        // turn an operation file into a fragment file or back.
        let displaced = match kind {
            DocumentKind::Schema => self.schema.insert(logical_name.clone(), Arc::clone(document)),
            DocumentKind::Operation | DocumentKind::Fragment => {
                let other = if kind == DocumentKind::Operation {
                    DocumentKind::Fragment
                } else {
                    DocumentKind::Operation
                };
                let previous = self.map_mut(other).remove(&logical_name);
                self.map_mut(kind)
                    .insert(logical_name.clone(), Arc::clone(document))
                    .or(previous)
            }
        };

        if let Some(previous) = displaced {
            tracing::debug!(
                logical_name = %logical_name,
                replaced = previous.source_set(),
                winner = document.source_set(),
                "Document overridden"
            );
            self.overrides.push(Override {
                logical_name,
                kind,
                replaced: Arc::from(previous.source_set()),
                winner: Arc::from(document.source_set()),
            });
        }
    }
}

/// Merge a service's source sets, given least specific first.
///
/// A document from a later source set fully replaces a same-named document of
/// the same kind from an earlier one; distinct names are unioned. Within a
/// source set documents are already in logical name order, so the result only
/// depends on document content and the precedence order.
#[tracing::instrument(skip(ordered), fields(source_sets = ordered.len()))]
pub fn merge(ordered: &[SourceSet], service: &str) -> MergedDocumentSet {
    let mut merged = MergedDocumentSet::new(service);

    for source_set in ordered {
        if source_set.service() != service {
            tracing::warn!(
                source_set = source_set.name(),
                owner = source_set.service(),
                "Skipping source set loaded for another service"
            );
            continue;
        }
        merged.source_sets.push(Arc::from(source_set.name()));
        for document in source_set.documents() {
            merged.insert(document);
        }
    }

    tracing::debug!(
        schema = merged.schema.len(),
        operations = merged.operations.len(),
        fragments = merged.fragments.len(),
        overrides = merged.overrides.len(),
        "Merged documents"
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(set: &str, name: &str, text: &str) -> Document {
        Document::executable(set, LogicalName::new(name), name, text)
    }

    #[test]
    fn test_later_source_set_wins() {
        let main = SourceSet::new("main", "s", vec![op("main", "A.graphql", "query A { a }")]);
        let debug = SourceSet::new("debug", "s", vec![op("debug", "A.graphql", "query A { b }")]);

        let merged = merge(&[main, debug], "s");
        let doc = merged.get(DocumentKind::Operation, "A.graphql").unwrap();
        assert_eq!(doc.text(), "query A { b }");
        assert_eq!(merged.overrides().len(), 1);
        assert_eq!(merged.overrides()[0].replaced.as_ref(), "main");
        assert_eq!(merged.overrides()[0].winner.as_ref(), "debug");
    }

    #[test]
    fn test_operation_overridden_by_fragment_file() {
        let main = SourceSet::new("main", "s", vec![op("main", "X.graphql", "query X { a }")]);
        let debug = SourceSet::new(
            "debug",
            "s",
            vec![op("debug", "X.graphql", "fragment X on T { a }")],
        );

        let merged = merge(&[main, debug], "s");
        assert!(merged.get(DocumentKind::Operation, "X.graphql").is_none());
        assert!(merged.get(DocumentKind::Fragment, "X.graphql").is_some());
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_foreign_service_is_skipped() {
        let main = SourceSet::new("main", "other", vec![op("main", "A.graphql", "query A { a }")]);
        let merged = merge(&[main], "s");
        assert!(merged.is_empty());
        assert!(merged.source_sets().is_empty());
    }
}
