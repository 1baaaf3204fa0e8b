use std::fmt;
use std::sync::Arc;

/// Specificity of a source set within one variant.
///
/// The derived ordering is the override precedence: a document in a source set
/// with a greater rank replaces a same-named document from a lesser rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceSetRank {
    /// `main`, shared by every variant.
    Main,
    /// A single flavor. `position` orders flavors of different dimensions.
    Flavor { position: usize },
    /// All flavors of the variant combined, e.g. `freeBlue`. Only present
    /// when there is more than one flavor dimension.
    FlavorCombination,
    /// The build type, e.g. `debug`.
    BuildType,
    /// Flavors and build type combined, e.g. `freeDebug`.
    Variant,
}

impl fmt::Display for SourceSetRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => f.write_str("main"),
            Self::Flavor { position } => write!(f, "flavor[{position}]"),
            Self::FlavorCombination => f.write_str("flavor combination"),
            Self::BuildType => f.write_str("build type"),
            Self::Variant => f.write_str("variant"),
        }
    }
}

/// A named source set contributing to a variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSetRef {
    pub name: Arc<str>,
    pub rank: SourceSetRank,
}

/// One flavor chosen from a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Flavor {
    pub dimension: Arc<str>,
    pub name: Arc<str>,
}

/// A concrete build configuration: one build type crossed with one flavor
/// per declared dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variant {
    name: Arc<str>,
    build_type: Arc<str>,
    flavors: Vec<Flavor>,
    /// Least specific first
    source_sets: Vec<SourceSetRef>,
}

impl Variant {
    pub(crate) fn new(
        build_type: Arc<str>,
        flavors: Vec<Flavor>,
        source_sets: Vec<SourceSetRef>,
    ) -> Self {
        let flavor_names: Vec<&str> = flavors.iter().map(|f| f.name.as_ref()).collect();
        let name = variant_name(&flavor_names, &build_type);
        Self {
            name: Arc::from(name),
            build_type,
            flavors,
            source_sets,
        }
    }

    /// Derived name, e.g. `freeDebug`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn build_type(&self) -> &str {
        &self.build_type
    }

    /// Flavors in dimension declaration order.
    #[must_use]
    pub fn flavors(&self) -> &[Flavor] {
        &self.flavors
    }

    /// Contributing source sets, least specific first.
    #[must_use]
    pub fn source_sets(&self) -> &[SourceSetRef] {
        &self.source_sets
    }

    /// Source set names, least specific first.
    pub fn source_set_names(&self) -> impl Iterator<Item = &str> {
        self.source_sets.iter().map(|s| s.name.as_ref())
    }

    #[must_use]
    pub fn contains_source_set(&self, name: &str) -> bool {
        self.source_set_names().any(|s| s == name)
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Join dimension values into a camelCase name: the first part as-is, every
/// following part with its first letter capitalized.
///
/// `["free", "blue"]` + `"debug"` gives `freeBlueDebug`; no flavors gives the
/// build type alone.
#[must_use]
pub fn variant_name(flavors: &[&str], build_type: &str) -> String {
    combine(flavors.iter().copied().chain(std::iter::once(build_type)))
}

pub(crate) fn combine<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut name = String::new();
    for part in parts {
        if name.is_empty() {
            name.push_str(part);
        } else {
            name.push_str(&capitalize(part));
        }
    }
    name
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
