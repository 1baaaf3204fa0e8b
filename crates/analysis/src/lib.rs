//! # GraphQL Analysis
//!
//! Validates one service's merged document set for one variant. Checks run in
//! a fixed order:
//!
//! 1. The schema parses and is structurally sound. Failure stops here.
//! 2. Every operation and fragment document parsed and is usable.
//! 3. Types, fields, arguments, variables and fragment spreads resolve.
//! 4. Operation and fragment names are unique and fragments do not cycle.
//!
//! Problems from stages 2 to 4 are collected together rather than stopping at
//! the first one. Nothing here is shared between variants.

mod diagnostics;
mod document_validation;
mod fragment_cycles;
mod schema_validation;

pub use diagnostics::{has_errors, location, Diagnostic, DiagnosticKind};
pub use document_validation::{ExecutableIndex, FragmentDef, OperationDef};
pub use fragment_cycles::{find_fragment_cycles, FragmentGraph};
pub use schema_validation::ServiceSchema;

pub use graphql_types::DiagnosticSeverity;

use graphql_variants::MergedDocumentSet;
use std::sync::Arc;

/// A merged document set that passed validation.
///
/// The schema is absent when the service has no schema document; the
/// compilation unit builder turns that into a `MissingSchema` failure.
#[derive(Debug, Clone)]
pub struct ValidatedSet {
    merged: Arc<MergedDocumentSet>,
    schema: Option<Arc<ServiceSchema>>,
    index: ExecutableIndex,
}

impl ValidatedSet {
    #[must_use]
    pub fn service(&self) -> &str {
        self.merged.service()
    }

    #[must_use]
    pub fn merged(&self) -> &Arc<MergedDocumentSet> {
        &self.merged
    }

    #[must_use]
    pub fn schema(&self) -> Option<&Arc<ServiceSchema>> {
        self.schema.as_ref()
    }

    /// Named operations, ordered by logical name then position.
    #[must_use]
    pub fn operations(&self) -> &[OperationDef] {
        &self.index.operations
    }

    /// Fragments in name order.
    pub fn fragments(&self) -> impl Iterator<Item = &FragmentDef> {
        self.index.fragments.values()
    }

    #[must_use]
    pub fn fragment(&self, name: &str) -> Option<&FragmentDef> {
        self.index.fragments.get(name)
    }

    /// Every fragment an operation needs, directly or through other
    /// fragments, in name order.
    #[must_use]
    pub fn fragments_for(&self, operation: &OperationDef) -> Vec<&FragmentDef> {
        self.index
            .fragment_closure(&operation.structure.fragment_spreads)
    }

    /// Fragments another fragment needs, excluding itself.
    #[must_use]
    pub fn fragment_dependencies(&self, fragment: &FragmentDef) -> Vec<&FragmentDef> {
        self.index
            .fragment_closure(&fragment.structure.fragment_spreads)
            .into_iter()
            .filter(|dependency| dependency.name() != fragment.name())
            .collect()
    }
}

/// Validate a merged document set against the schema it contains.
#[tracing::instrument(skip(merged), fields(service = merged.service()))]
pub fn validate(merged: Arc<MergedDocumentSet>) -> Result<ValidatedSet, Vec<Diagnostic>> {
    let schema = ServiceSchema::load(&merged)?.map(Arc::new);
    validate_with_schema(schema, merged)
}

/// Validate operations and fragments against an already checked schema.
///
/// With no schema only the schema-independent checks run.
pub fn validate_with_schema(
    schema: Option<Arc<ServiceSchema>>,
    merged: Arc<MergedDocumentSet>,
) -> Result<ValidatedSet, Vec<Diagnostic>> {
    let mut diagnostics = document_validation::document_errors(&merged);

    let index = ExecutableIndex::build(&merged);
    if let Some(schema) = &schema {
        diagnostics.extend(document_validation::unknown_symbols(
            &merged,
            schema.types(),
            &index,
        ));
    }
    diagnostics.extend(document_validation::definition_errors(&index));

    if has_errors(&diagnostics) {
        tracing::debug!(errors = diagnostics.len(), "Validation failed");
        return Err(diagnostics);
    }

    tracing::debug!(
        operations = index.operations.len(),
        fragments = index.fragments.len(),
        "Validation passed"
    );
    Ok(ValidatedSet {
        merged,
        schema,
        index,
    })
}
