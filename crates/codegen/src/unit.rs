use graphql_analysis::{Diagnostic, DiagnosticKind, ServiceSchema, ValidatedSet};
use graphql_variants::Variant;
use std::collections::BTreeMap;
use std::sync::Arc;

/// The validated input of one service inside a compilation unit.
#[derive(Debug, Clone)]
pub struct ServiceInput {
    pub schema: Arc<ServiceSchema>,
    pub validated: ValidatedSet,
}

/// Everything needed to generate code for one variant.
///
/// Built fresh for every run and never shared between variants.
#[derive(Debug, Clone)]
pub struct CompilationUnit {
    variant: Variant,
    services: BTreeMap<Arc<str>, ServiceInput>,
}

impl CompilationUnit {
    /// Assemble a unit from validated sets, one per service.
    ///
    /// Fails with one `MissingSchema` diagnostic per service that has no
    /// schema document.
    pub fn build(
        variant: &Variant,
        validated: impl IntoIterator<Item = ValidatedSet>,
    ) -> Result<Self, Vec<Diagnostic>> {
        let mut services = BTreeMap::new();
        let mut diagnostics = Vec::new();

        for set in validated {
            let Some(schema) = set.schema().cloned() else {
                diagnostics.push(Diagnostic::error(
                    DiagnosticKind::MissingSchema,
                    format!(
                        "No schema found for service '{}' in variant '{}'",
                        set.service(),
                        variant.name()
                    ),
                ));
                continue;
            };
            services.insert(
                Arc::from(set.service()),
                ServiceInput {
                    schema,
                    validated: set,
                },
            );
        }

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        Ok(Self {
            variant: variant.clone(),
            services,
        })
    }

    #[must_use]
    pub const fn variant(&self) -> &Variant {
        &self.variant
    }

    /// Services in name order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &ServiceInput)> {
        self.services.iter().map(|(name, input)| (name.as_ref(), input))
    }

    #[must_use]
    pub fn service(&self, name: &str) -> Option<&ServiceInput> {
        self.services.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphql_base_db::{Document, SourceSet};
    use graphql_types::LogicalName;
    use graphql_variants::{merge, resolve};

    fn validated(service: &str, with_schema: bool) -> ValidatedSet {
        let mut docs = vec![Document::executable(
            "main",
            LogicalName::new("A.graphql"),
            "A.graphql",
            "query A { a }",
        )];
        if with_schema {
            docs.push(Document::schema(
                "main",
                LogicalName::new("schema.graphqls"),
                "schema.graphqls",
                "type Query { a: Int }",
            ));
        }
        let merged = merge(&[SourceSet::new("main", service, docs)], service);
        graphql_analysis::validate(Arc::new(merged)).unwrap()
    }

    fn debug_variant() -> Variant {
        resolve(&["debug"], &[]).unwrap().remove(0)
    }

    #[test]
    fn test_build_with_schema() {
        let unit = CompilationUnit::build(&debug_variant(), [validated("s", true)]).unwrap();
        assert_eq!(unit.variant().name(), "debug");
        assert!(unit.service("s").is_some());
        assert_eq!(unit.services().count(), 1);
    }

    #[test]
    fn test_missing_schema() {
        let errors = CompilationUnit::build(
            &debug_variant(),
            [validated("a", true), validated("b", false)],
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, DiagnosticKind::MissingSchema);
        assert_eq!(
            errors[0].message.as_ref(),
            "No schema found for service 'b' in variant 'debug'"
        );
    }
}
