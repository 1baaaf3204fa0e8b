use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Service name used when the config declares no services.
pub const DEFAULT_SERVICE: &str = "service0";

/// Top-level project configuration.
///
/// Source set `<name>` lives at `<sourceRoot>/<name>/<graphqlDir>`, relative to
/// the directory containing the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQLConfig {
    #[serde(default = "default_source_root")]
    pub source_root: String,

    #[serde(default = "default_graphql_dir")]
    pub graphql_dir: String,

    /// Root of generated output; artifacts land in `<outputDir>/<variant>/<service>/`
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default)]
    pub variants: VariantsConfig,

    #[serde(default = "default_services")]
    pub services: BTreeMap<String, ServiceConfig>,
}

fn default_source_root() -> String {
    "src".to_string()
}

fn default_graphql_dir() -> String {
    "graphql".to_string()
}

fn default_output_dir() -> String {
    "build/generated/source/apollo".to_string()
}

fn default_services() -> BTreeMap<String, ServiceConfig> {
    BTreeMap::from([(DEFAULT_SERVICE.to_string(), ServiceConfig::default())])
}

impl Default for GraphQLConfig {
    fn default() -> Self {
        Self {
            source_root: default_source_root(),
            graphql_dir: default_graphql_dir(),
            output_dir: default_output_dir(),
            variants: VariantsConfig::default(),
            services: default_services(),
        }
    }
}

impl GraphQLConfig {
    /// Iterate services in name order.
    pub fn services(&self) -> impl Iterator<Item = (&str, &ServiceConfig)> {
        self.services
            .iter()
            .map(|(name, config)| (name.as_str(), config))
    }

    #[must_use]
    pub fn get_service(&self, name: &str) -> Option<&ServiceConfig> {
        self.services.get(name)
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    /// Directory holding all source sets, resolved against `base_dir`.
    #[must_use]
    pub fn source_root(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.source_root)
    }

    /// Root of generated output, resolved against `base_dir`.
    #[must_use]
    pub fn output_root(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.output_dir)
    }
}

/// Variant dimension declarations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantsConfig {
    #[serde(default = "default_build_types")]
    pub build_types: Vec<String>,

    #[serde(default)]
    pub flavor_dimensions: Vec<FlavorDimensionConfig>,

    #[serde(default)]
    pub flavor_precedence: FlavorPrecedence,
}

fn default_build_types() -> Vec<String> {
    vec!["debug".to_string(), "release".to_string()]
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            build_types: default_build_types(),
            flavor_dimensions: Vec::new(),
            flavor_precedence: FlavorPrecedence::default(),
        }
    }
}

/// One flavor dimension, e.g. `tier: [free, paid]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorDimensionConfig {
    pub name: String,
    pub flavors: Vec<String>,
}

/// How single-flavor source sets of different dimensions rank against each other.
///
/// With `declarationOrder`, the flavor of the last declared dimension is the
/// most specific and wins overrides between flavor source sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlavorPrecedence {
    #[default]
    DeclarationOrder,
    ReverseDeclarationOrder,
}

/// Configuration for one service: an independently schema'd namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Sub-folder of every source set's GraphQL directory owned by this service
    #[serde(default)]
    pub source_folder: String,

    #[serde(default = "default_schema_patterns")]
    pub schema: Patterns,

    #[serde(default = "default_document_patterns")]
    pub documents: Patterns,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

fn default_schema_patterns() -> Patterns {
    Patterns::Many(vec![
        "**/schema.json".to_string(),
        "**/*.graphqls".to_string(),
        "**/*.sdl".to_string(),
    ])
}

fn default_document_patterns() -> Patterns {
    Patterns::One("**/*.{graphql,gql}".to_string())
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            source_folder: String::new(),
            schema: default_schema_patterns(),
            documents: default_document_patterns(),
            exclude: Vec::new(),
        }
    }
}

/// What a file contributes to a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileType {
    Schema,
    Document,
}

impl ServiceConfig {
    /// Classify a path relative to the service folder.
    ///
    /// Excludes win, then schema patterns, then document patterns. Returns
    /// `None` for files the service does not own.
    #[must_use]
    pub fn file_type(&self, rel_path: &str) -> Option<FileType> {
        let rel_path = rel_path.replace('\\', "/");

        if matches_any(self.exclude.iter().map(String::as_str), &rel_path) {
            return None;
        }
        if matches_any(self.schema.patterns(), &rel_path) {
            return Some(FileType::Schema);
        }
        if matches_any(self.documents.patterns(), &rel_path) {
            return Some(FileType::Document);
        }
        None
    }

    /// Directory owned by this service inside a source set's GraphQL directory.
    #[must_use]
    pub fn root_in(&self, graphql_dir: &Path) -> PathBuf {
        if self.source_folder.is_empty() {
            graphql_dir.to_path_buf()
        } else {
            graphql_dir.join(&self.source_folder)
        }
    }
}

/// A single glob pattern or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Patterns {
    One(String),
    Many(Vec<String>),
}

impl Patterns {
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        let slice = match self {
            Self::One(pattern) => std::slice::from_ref(pattern),
            Self::Many(patterns) => patterns.as_slice(),
        };
        slice.iter().map(String::as_str)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns().next().is_none()
    }
}

fn matches_any<'a>(patterns: impl IntoIterator<Item = &'a str>, rel_path: &str) -> bool {
    patterns.into_iter().any(|pattern| {
        expand_braces(pattern).iter().any(|expanded| {
            glob::Pattern::new(expanded).is_ok_and(|glob_pattern| glob_pattern.matches(rel_path))
        })
    })
}

/// Normalize a glob pattern for consistent matching
///
/// Handles:
/// - Leading "./" prefix (removes it)
/// - Leading "/" prefix (removes it - patterns are relative to the service folder)
/// - Consecutive slashes (collapses to single slash)
fn normalize_pattern(pattern: &str) -> String {
    let mut normalized = pattern.trim();
    normalized = normalized.strip_prefix("./").unwrap_or(normalized);
    normalized = normalized.strip_prefix('/').unwrap_or(normalized);

    let mut normalized = normalized.to_string();
    while normalized.contains("//") {
        normalized = normalized.replace("//", "/");
    }
    normalized
}

/// Expand brace patterns like `**/*.{graphql,gql}` into separate patterns.
/// Handles a single brace group.
pub(crate) fn expand_braces(pattern: &str) -> Vec<String> {
    let normalized = normalize_pattern(pattern);

    if let (Some(start), Some(end)) = (normalized.find('{'), normalized.find('}')) {
        if start < end {
            let before = &normalized[..start];
            let after = &normalized[end + 1..];
            return normalized[start + 1..end]
                .split(',')
                .map(|opt| format!("{before}{}{after}", opt.trim()))
                .collect();
        }
    }

    vec![normalized]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GraphQLConfig::default();
        assert_eq!(config.source_root, "src");
        assert_eq!(config.graphql_dir, "graphql");
        assert_eq!(config.variants.build_types, vec!["debug", "release"]);
        assert!(config.variants.flavor_dimensions.is_empty());
        assert_eq!(
            config.variants.flavor_precedence,
            FlavorPrecedence::DeclarationOrder
        );
        assert_eq!(config.service_count(), 1);
        assert!(config.get_service(DEFAULT_SERVICE).is_some());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config: GraphQLConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, GraphQLConfig::default());
    }

    #[test]
    fn test_parse_flavored_config() {
        let yaml = r"
variants:
  buildTypes: [debug, release]
  flavorDimensions:
    - name: tier
      flavors: [free, paid]
  flavorPrecedence: reverseDeclarationOrder
services:
  starwars:
    sourceFolder: starwars
    schema: schema.json
";
        let config: GraphQLConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.variants.flavor_dimensions.len(), 1);
        assert_eq!(config.variants.flavor_dimensions[0].name, "tier");
        assert_eq!(
            config.variants.flavor_dimensions[0].flavors,
            vec!["free", "paid"]
        );
        assert_eq!(
            config.variants.flavor_precedence,
            FlavorPrecedence::ReverseDeclarationOrder
        );

        let service = config.get_service("starwars").unwrap();
        assert_eq!(service.source_folder, "starwars");
        assert_eq!(service.schema, Patterns::One("schema.json".to_string()));
        assert_eq!(service.documents, default_document_patterns());
        assert!(config.get_service(DEFAULT_SERVICE).is_none());
    }

    #[test]
    fn test_services_iterate_in_name_order() {
        let yaml = r"
services:
  zeta: {}
  alpha: {}
";
        let config: GraphQLConfig = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<_> = config.services().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn test_file_type_defaults() {
        let service = ServiceConfig::default();
        assert_eq!(
            service.file_type("com/example/schema.json"),
            Some(FileType::Schema)
        );
        assert_eq!(service.file_type("schema.json"), Some(FileType::Schema));
        assert_eq!(
            service.file_type("com/example/types.graphqls"),
            Some(FileType::Schema)
        );
        assert_eq!(
            service.file_type("com/example/DroidDetails.graphql"),
            Some(FileType::Document)
        );
        assert_eq!(
            service.file_type("com/example/Films.gql"),
            Some(FileType::Document)
        );
        assert_eq!(service.file_type("com/example/notes.txt"), None);
        assert_eq!(service.file_type("com/example/other.json"), None);
    }

    #[test]
    fn test_file_type_exclude_wins() {
        let service = ServiceConfig {
            exclude: vec!["**/legacy/**".to_string()],
            ..ServiceConfig::default()
        };
        assert_eq!(service.file_type("com/legacy/Old.graphql"), None);
        assert_eq!(
            service.file_type("com/example/New.graphql"),
            Some(FileType::Document)
        );
    }

    #[test]
    fn test_file_type_schema_checked_before_documents() {
        let service = ServiceConfig {
            schema: Patterns::One("**/schema.graphql".to_string()),
            ..ServiceConfig::default()
        };
        assert_eq!(
            service.file_type("com/example/schema.graphql"),
            Some(FileType::Schema)
        );
    }

    #[test]
    fn test_root_in() {
        let graphql_dir = Path::new("src/main/graphql");
        assert_eq!(ServiceConfig::default().root_in(graphql_dir), graphql_dir);

        let service = ServiceConfig {
            source_folder: "starwars".to_string(),
            ..ServiceConfig::default()
        };
        assert_eq!(
            service.root_in(graphql_dir),
            Path::new("src/main/graphql/starwars")
        );
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(
            expand_braces("**/*.{graphql,gql}"),
            vec!["**/*.graphql", "**/*.gql"]
        );
        assert_eq!(expand_braces("./schema.json"), vec!["schema.json"]);
        assert_eq!(expand_braces("/a//b.graphql"), vec!["a/b.graphql"]);
    }

    #[test]
    fn test_patterns() {
        let one = Patterns::One("a.graphql".to_string());
        assert_eq!(one.patterns().collect::<Vec<_>>(), vec!["a.graphql"]);
        assert!(Patterns::Many(vec![]).is_empty());
    }
}
