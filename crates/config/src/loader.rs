use crate::{ConfigError, GraphQLConfig, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Config file names to search for, in order of preference
pub const CONFIG_FILES: &[&str] = &[
    ".graphqlrc.yml",
    ".graphqlrc.yaml",
    ".graphqlrc.json",
    "graphql.config.yml",
    "graphql.config.yaml",
    "graphql.config.json",
];

/// Source set that every variant includes; no flavor or build type may shadow it.
const MAIN_SOURCE_SET: &str = "main";

/// Find a config file by walking up the directory tree from the given start directory.
#[tracing::instrument(fields(start = %start_dir.display()))]
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();
    let mut checked_dirs = 0;

    loop {
        tracing::trace!(dir = %current_dir.display(), "Checking directory for config files");
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                tracing::info!(path = %config_path.display(), checked_dirs, "Found config file");
                return Ok(Some(config_path));
            }
        }

        checked_dirs += 1;
        if !current_dir.pop() {
            tracing::debug!(checked_dirs, "No config file found");
            break;
        }
    }

    Ok(None)
}

/// Load a config from the specified path.
/// Detects the format from the file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<GraphQLConfig> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        services = config.service_count(),
        build_types = config.variants.build_types.len(),
        flavor_dimensions = config.variants.flavor_dimensions.len(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Load a config from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    tracing::debug!("Validating config");
    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    // An empty YAML document means "all defaults".
    if contents.trim().is_empty() {
        return Ok(GraphQLConfig::default());
    }
    serde_yaml::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<GraphQLConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

/// Validate the loaded configuration
#[tracing::instrument(skip(config, path), fields(path = %path.display(), services = config.service_count()))]
fn validate_config(config: &GraphQLConfig, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    let variants = &config.variants;
    if variants.build_types.is_empty() {
        return Err(invalid("At least one build type is required".to_string()));
    }

    let mut dimension_names = HashSet::new();
    let mut seen_names: HashSet<&str> = HashSet::new();

    for build_type in &variants.build_types {
        check_dimension_value(build_type, "Build type").map_err(&invalid)?;
        if !seen_names.insert(build_type.as_str()) {
            return Err(invalid(format!("Build type '{build_type}' is declared twice")));
        }
    }

    for dimension in &variants.flavor_dimensions {
        if dimension.name.trim().is_empty() {
            return Err(invalid("Flavor dimension has an empty name".to_string()));
        }
        if !dimension_names.insert(dimension.name.as_str()) {
            return Err(invalid(format!(
                "Flavor dimension '{}' is declared twice",
                dimension.name
            )));
        }
        if dimension.flavors.is_empty() {
            return Err(invalid(format!(
                "Flavor dimension '{}' has no flavors",
                dimension.name
            )));
        }
        for flavor in &dimension.flavors {
            check_dimension_value(flavor, "Flavor").map_err(&invalid)?;
            if !seen_names.insert(flavor.as_str()) {
                return Err(invalid(format!(
                    "Flavor '{flavor}' in dimension '{}' clashes with another flavor or build type",
                    dimension.name
                )));
            }
        }
    }

    if config.services.is_empty() {
        return Err(invalid("At least one service is required".to_string()));
    }

    for (service_name, service) in config.services() {
        tracing::trace!(service = service_name, "Validating service config");

        if service_name.trim().is_empty()
            || service_name.contains(['/', '\\'])
            || service_name == "."
            || service_name == ".."
        {
            return Err(invalid(format!(
                "Service name '{service_name}' must be a non-empty name without path separators"
            )));
        }

        let source_folder = Path::new(&service.source_folder);
        if source_folder.is_absolute()
            || source_folder
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            return Err(invalid(format!(
                "Service '{service_name}' has a sourceFolder outside the GraphQL directory: {}",
                service.source_folder
            )));
        }

        for (label, patterns) in [("schema", &service.schema), ("documents", &service.documents)] {
            if patterns.is_empty() {
                return Err(invalid(format!(
                    "Service '{service_name}' has empty {label} configuration"
                )));
            }
            if patterns.patterns().any(|p| p.trim().is_empty()) {
                return Err(invalid(format!(
                    "Service '{service_name}' has an empty {label} pattern"
                )));
            }
        }

        if service.exclude.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid(format!(
                "Service '{service_name}' has an empty exclude pattern"
            )));
        }
    }

    Ok(())
}

/// Build types and flavors become source set names and path components.
fn check_dimension_value(name: &str, label: &str) -> std::result::Result<(), String> {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !chars.all(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "{label} '{name}' must start with a letter and contain only ASCII letters or digits"
        ));
    }
    if name == MAIN_SOURCE_SET {
        return Err(format!("{label} cannot be named '{MAIN_SOURCE_SET}'"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FlavorPrecedence, DEFAULT_SERVICE};
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn load_yaml(yaml: &str) -> Result<GraphQLConfig> {
        load_config_from_str(yaml, Path::new(".graphqlrc.yml"))
    }

    fn expect_invalid(yaml: &str, needle: &str) {
        match load_yaml(yaml) {
            Err(ConfigError::Invalid { message, .. }) => {
                assert!(message.contains(needle), "unexpected message: {message}");
            }
            other => panic!("Expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn test_load_yaml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".yml").unwrap();
        writeln!(
            temp_file,
            r"
variants:
  flavorDimensions:
    - name: tier
      flavors: [free, paid]
"
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.variants.flavor_dimensions[0].flavors.len(), 2);
        assert_eq!(config.service_count(), 1);
    }

    #[test]
    fn test_load_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        writeln!(
            temp_file,
            r#"{{"outputDir": "out", "variants": {{"buildTypes": ["debug"], "flavorPrecedence": "reverseDeclarationOrder"}}}}"#
        )
        .unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.output_dir, "out");
        assert_eq!(config.variants.build_types, vec!["debug"]);
        assert_eq!(
            config.variants.flavor_precedence,
            FlavorPrecedence::ReverseDeclarationOrder
        );
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let config = load_yaml("").unwrap();
        assert_eq!(config, GraphQLConfig::default());
        assert!(config.get_service(DEFAULT_SERVICE).is_some());
    }

    #[test]
    fn test_unsupported_format() {
        let result = load_config_from_str("{}", Path::new("graphql.config.toml"));
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_yaml_syntax_error() {
        expect_invalid("variants: [unclosed", "YAML parse error");
    }

    #[test]
    fn test_find_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join(".graphqlrc.yml");
        fs::write(&config_path, "outputDir: out").unwrap();

        let sub_dir = temp_dir.path().join("src").join("main");
        fs::create_dir_all(&sub_dir).unwrap();

        let found = find_config(&sub_dir).unwrap();
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_prefers_earlier_names() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("graphql.config.json"), "{}").unwrap();
        fs::write(temp_dir.path().join(".graphqlrc.yaml"), "").unwrap();

        let found = find_config(temp_dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), ".graphqlrc.yaml");
    }

    #[test]
    fn test_rejects_empty_build_types() {
        expect_invalid("variants:\n  buildTypes: []\n", "At least one build type");
    }

    #[test]
    fn test_rejects_flavor_dimension_without_flavors() {
        expect_invalid(
            "variants:\n  flavorDimensions:\n    - name: tier\n      flavors: []\n",
            "has no flavors",
        );
    }

    #[test]
    fn test_rejects_duplicate_dimension() {
        expect_invalid(
            r"
variants:
  flavorDimensions:
    - name: tier
      flavors: [free]
    - name: tier
      flavors: [paid]
",
            "declared twice",
        );
    }

    #[test]
    fn test_rejects_flavor_named_like_build_type() {
        expect_invalid(
            "variants:\n  flavorDimensions:\n    - name: tier\n      flavors: [debug]\n",
            "clashes",
        );
    }

    #[test]
    fn test_rejects_underscore_in_flavor() {
        expect_invalid(
            "variants:\n  flavorDimensions:\n    - name: tier\n      flavors: [free_tier]\n",
            "only ASCII letters or digits",
        );
    }

    #[test]
    fn test_rejects_main_as_build_type() {
        expect_invalid("variants:\n  buildTypes: [main]\n", "cannot be named 'main'");
    }

    #[test]
    fn test_rejects_invalid_flavor_characters() {
        expect_invalid(
            "variants:\n  flavorDimensions:\n    - name: tier\n      flavors: [free-tier]\n",
            "must start with a letter",
        );
    }

    #[test]
    fn test_rejects_empty_services() {
        expect_invalid("services: {}\n", "At least one service");
    }

    #[test]
    fn test_rejects_service_with_path_separator() {
        expect_invalid("services:\n  a/b: {}\n", "without path separators");
    }

    #[test]
    fn test_rejects_escaping_source_folder() {
        expect_invalid(
            "services:\n  api:\n    sourceFolder: ../other\n",
            "outside the GraphQL directory",
        );
    }

    #[test]
    fn test_rejects_empty_schema_pattern() {
        expect_invalid(
            "services:\n  api:\n    schema: \"\"\n",
            "empty schema pattern",
        );
    }
}
