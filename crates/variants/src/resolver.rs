use crate::variant::{combine, Flavor, SourceSetRank, SourceSetRef, Variant};
use crate::ResolveError;
use graphql_base_db::MAIN_SOURCE_SET;
use graphql_config::{FlavorPrecedence, VariantsConfig};
use std::collections::HashSet;
use std::sync::Arc;

/// A flavor dimension, e.g. `tier: [free, paid]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlavorDimension {
    pub name: Arc<str>,
    pub flavors: Vec<Arc<str>>,
}

impl FlavorDimension {
    pub fn new<I, S>(name: &str, flavors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: Arc::from(name),
            flavors: flavors.into_iter().map(|f| Arc::from(f.as_ref())).collect(),
        }
    }
}

/// Declared variant dimensions: build types crossed with one flavor per
/// dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDimensions {
    build_types: Vec<Arc<str>>,
    flavor_dimensions: Vec<FlavorDimension>,
    precedence: FlavorPrecedence,
}

impl VariantDimensions {
    pub fn new<I, S>(build_types: I, flavor_dimensions: Vec<FlavorDimension>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            build_types: build_types
                .into_iter()
                .map(|b| Arc::from(b.as_ref()))
                .collect(),
            flavor_dimensions,
            precedence: FlavorPrecedence::default(),
        }
    }

    #[must_use]
    pub fn with_precedence(mut self, precedence: FlavorPrecedence) -> Self {
        self.precedence = precedence;
        self
    }

    #[must_use]
    pub fn from_config(config: &VariantsConfig) -> Self {
        let dimensions = config
            .flavor_dimensions
            .iter()
            .map(|d| FlavorDimension::new(&d.name, &d.flavors))
            .collect();
        Self::new(&config.build_types, dimensions).with_precedence(config.flavor_precedence)
    }

    #[must_use]
    pub fn build_types(&self) -> &[Arc<str>] {
        &self.build_types
    }

    #[must_use]
    pub fn flavor_dimensions(&self) -> &[FlavorDimension] {
        &self.flavor_dimensions
    }

    /// Compute every variant with its ordered source sets.
    ///
    /// Variants come out flavor combination major, build type minor, both in
    /// declaration order: `freeDebug, freeRelease, paidDebug, paidRelease`.
    #[tracing::instrument(skip(self), fields(
        build_types = self.build_types.len(),
        dimensions = self.flavor_dimensions.len()
    ))]
    pub fn resolve(&self) -> Result<Vec<Variant>, ResolveError> {
        self.check()?;

        let mut combinations: Vec<Vec<Flavor>> = vec![Vec::new()];
        for dimension in &self.flavor_dimensions {
            combinations = combinations
                .into_iter()
                .flat_map(|prefix| {
                    dimension.flavors.iter().map(move |flavor| {
                        let mut combination = prefix.clone();
                        combination.push(Flavor {
                            dimension: dimension.name.clone(),
                            name: flavor.clone(),
                        });
                        combination
                    })
                })
                .collect();
        }

        let mut variants = Vec::with_capacity(combinations.len() * self.build_types.len());
        let mut seen = HashSet::new();

        for flavors in &combinations {
            for build_type in &self.build_types {
                let source_sets = self.source_sets(flavors, build_type);
                let variant = Variant::new(build_type.clone(), flavors.clone(), source_sets);

                let mut names = HashSet::new();
                for source_set in variant.source_sets() {
                    if !names.insert(source_set.name.as_ref()) {
                        return Err(ResolveError::SourceSetCollision {
                            variant: variant.name().to_string(),
                            name: source_set.name.to_string(),
                        });
                    }
                }
                if !seen.insert(variant.name().to_string()) {
                    return Err(ResolveError::VariantCollision(variant.name().to_string()));
                }

                tracing::trace!(
                    variant = variant.name(),
                    source_sets = ?variant.source_set_names().collect::<Vec<_>>(),
                    "Resolved variant"
                );
                variants.push(variant);
            }
        }

        tracing::debug!(variants = variants.len(), "Resolved variants");
        Ok(variants)
    }

    /// Contributing source sets of one variant, least specific first.
    fn source_sets(&self, flavors: &[Flavor], build_type: &Arc<str>) -> Vec<SourceSetRef> {
        let mut source_sets = vec![SourceSetRef {
            name: Arc::from(MAIN_SOURCE_SET),
            rank: SourceSetRank::Main,
        }];

        let count = flavors.len();
        for (index, flavor) in flavors.iter().enumerate() {
            let position = match self.precedence {
                FlavorPrecedence::DeclarationOrder => index,
                FlavorPrecedence::ReverseDeclarationOrder => count - 1 - index,
            };
            source_sets.push(SourceSetRef {
                name: flavor.name.clone(),
                rank: SourceSetRank::Flavor { position },
            });
        }

        // With a single dimension the combination is the flavor itself.
        if count > 1 {
            source_sets.push(SourceSetRef {
                name: Arc::from(combine(flavors.iter().map(|f| f.name.as_ref()))),
                rank: SourceSetRank::FlavorCombination,
            });
        }

        source_sets.push(SourceSetRef {
            name: build_type.clone(),
            rank: SourceSetRank::BuildType,
        });

        // Without flavors the variant is the build type itself.
        if count > 0 {
            source_sets.push(SourceSetRef {
                name: Arc::from(combine(
                    flavors
                        .iter()
                        .map(|f| f.name.as_ref())
                        .chain(std::iter::once(build_type.as_ref())),
                )),
                rank: SourceSetRank::Variant,
            });
        }

        source_sets.sort_by_key(|s| s.rank);
        source_sets
    }

    fn check(&self) -> Result<(), ResolveError> {
        if self.build_types.is_empty() {
            return Err(ResolveError::NoBuildTypes);
        }

        let mut values = HashSet::new();
        let mut dimensions = HashSet::new();

        for build_type in &self.build_types {
            check_value(build_type)?;
            if !values.insert(build_type.as_ref()) {
                return Err(ResolveError::DuplicateName(build_type.to_string()));
            }
        }

        for dimension in &self.flavor_dimensions {
            if !dimensions.insert(dimension.name.as_ref()) {
                return Err(ResolveError::DuplicateName(dimension.name.to_string()));
            }
            if dimension.flavors.is_empty() {
                return Err(ResolveError::EmptyDimension(dimension.name.to_string()));
            }
            for flavor in &dimension.flavors {
                check_value(flavor)?;
                if !values.insert(flavor.as_ref()) {
                    return Err(ResolveError::DuplicateName(flavor.to_string()));
                }
            }
        }

        Ok(())
    }
}

/// Convenience for [`VariantDimensions::resolve`] with declaration-order
/// flavor precedence.
pub fn resolve(
    build_types: &[&str],
    flavor_dimensions: &[(&str, &[&str])],
) -> Result<Vec<Variant>, ResolveError> {
    let dimensions = flavor_dimensions
        .iter()
        .map(|(name, flavors)| FlavorDimension::new(name, flavors.iter()))
        .collect();
    VariantDimensions::new(build_types.iter(), dimensions).resolve()
}

fn check_value(value: &str) -> Result<(), ResolveError> {
    if value == MAIN_SOURCE_SET {
        return Err(ResolveError::ReservedName(value.to_string()));
    }
    let mut chars = value.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric()) {
        return Err(ResolveError::InvalidName(value.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(variants: &[Variant]) -> Vec<&str> {
        variants.iter().map(Variant::name).collect()
    }

    #[test]
    fn test_build_types_only() {
        let variants = resolve(&["debug", "release"], &[]).unwrap();
        assert_eq!(names(&variants), vec!["debug", "release"]);
        let sets: Vec<_> = variants[0].source_set_names().collect();
        assert_eq!(sets, vec!["main", "debug"]);
    }

    #[test]
    fn test_single_dimension() {
        let variants = resolve(&["debug", "release"], &[("tier", &["free", "paid"])]).unwrap();
        assert_eq!(
            names(&variants),
            vec!["freeDebug", "freeRelease", "paidDebug", "paidRelease"]
        );
        let sets: Vec<_> = variants[0].source_set_names().collect();
        assert_eq!(sets, vec!["main", "free", "debug", "freeDebug"]);
    }

    #[test]
    fn test_two_dimensions() {
        let variants = resolve(
            &["debug"],
            &[("tier", &["free", "paid"]), ("color", &["blue", "red"])],
        )
        .unwrap();
        assert_eq!(
            names(&variants),
            vec!["freeBlueDebug", "freeRedDebug", "paidBlueDebug", "paidRedDebug"]
        );
        let sets: Vec<_> = variants[0].source_set_names().collect();
        assert_eq!(
            sets,
            vec!["main", "free", "blue", "freeBlue", "debug", "freeBlueDebug"]
        );
    }

    #[test]
    fn test_reverse_declaration_order() {
        let dimensions = VariantDimensions::new(
            ["debug"],
            vec![
                FlavorDimension::new("tier", ["free"]),
                FlavorDimension::new("color", ["blue"]),
            ],
        )
        .with_precedence(FlavorPrecedence::ReverseDeclarationOrder);
        let variants = dimensions.resolve().unwrap();
        let sets: Vec<_> = variants[0].source_set_names().collect();
        assert_eq!(
            sets,
            vec!["main", "blue", "free", "freeBlue", "debug", "freeBlueDebug"]
        );
    }

    #[test]
    fn test_ranks_are_strictly_increasing() {
        let variants = resolve(
            &["debug", "release"],
            &[("tier", &["free", "paid"]), ("color", &["blue", "red"])],
        )
        .unwrap();
        for variant in &variants {
            let ranks: Vec<_> = variant.source_sets().iter().map(|s| s.rank).collect();
            assert!(ranks.windows(2).all(|w| w[0] < w[1]), "{ranks:?}");
        }
    }

    #[test]
    fn test_errors() {
        assert_eq!(resolve(&[], &[]).unwrap_err(), ResolveError::NoBuildTypes);
        assert_eq!(
            resolve(&["debug"], &[("tier", &[])]).unwrap_err(),
            ResolveError::EmptyDimension("tier".to_string())
        );
        assert_eq!(
            resolve(&["main"], &[]).unwrap_err(),
            ResolveError::ReservedName("main".to_string())
        );
        assert_eq!(
            resolve(&["debug"], &[("tier", &["debug"])]).unwrap_err(),
            ResolveError::DuplicateName("debug".to_string())
        );
        assert_eq!(
            resolve(&["1debug"], &[]).unwrap_err(),
            ResolveError::InvalidName("1debug".to_string())
        );
        assert_eq!(
            resolve(&["debug"], &[("tier", &["free_tier"])]).unwrap_err(),
            ResolveError::InvalidName("free_tier".to_string())
        );
    }

    #[test]
    fn test_variant_collision() {
        // "a" + "bC" and "aB" + "c" both derive "aBC"
        let err = resolve(&["debug"], &[("x", &["a", "aB"]), ("y", &["bC", "c"])]).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::VariantCollision(_) | ResolveError::SourceSetCollision { .. }
        ));
    }

    #[test]
    fn test_from_config() {
        let config: VariantsConfig = VariantsConfig {
            build_types: vec!["debug".to_string()],
            flavor_dimensions: vec![graphql_config::FlavorDimensionConfig {
                name: "tier".to_string(),
                flavors: vec!["free".to_string()],
            }],
            flavor_precedence: FlavorPrecedence::DeclarationOrder,
        };
        let variants = VariantDimensions::from_config(&config).resolve().unwrap();
        assert_eq!(names(&variants), vec!["freeDebug"]);
        assert_eq!(variants[0].flavors()[0].dimension.as_ref(), "tier");
    }
}
