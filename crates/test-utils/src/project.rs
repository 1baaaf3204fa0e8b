//! Temporary on-disk projects with source sets.

use crate::fixtures;
use graphql_config::GraphQLConfig;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builds a project in a temporary directory using the default layout:
/// source set `<set>` lives at `src/<set>/graphql/`.
///
/// ```ignore
/// let project = TestProject::new()
///     .with_config("variants:\n  buildTypes: [debug]\n")
///     .file("main", "com/example/schema.graphqls", fixtures::SCHEMA_SDL);
/// let config = project.config();
/// ```
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// An empty project. Panics if the temporary directory cannot be created.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// `main` holds the introspection schema, `DroidDetails`, `Films` and
    /// `SpeciesInformation` under `com/example`.
    #[must_use]
    pub fn star_wars() -> Self {
        Self::new()
            .file("main", &fixtures::logical_name("schema.json"), fixtures::SCHEMA_JSON)
            .file(
                "main",
                &fixtures::logical_name("DroidDetails.graphql"),
                fixtures::DROID_DETAILS,
            )
            .file("main", &fixtures::logical_name("Films.graphql"), fixtures::FILMS)
            .file(
                "main",
                &fixtures::logical_name("SpeciesInformation.graphql"),
                fixtures::SPECIES_INFORMATION,
            )
    }

    /// Write `.graphqlrc.yml` at the project root.
    #[must_use]
    pub fn with_config(self, yaml: &str) -> Self {
        self.write_file(".graphqlrc.yml", yaml);
        self
    }

    /// Add a file to a source set.
    #[must_use]
    pub fn file(self, source_set: &str, relative_path: &str, contents: &str) -> Self {
        self.write(source_set, relative_path, contents);
        self
    }

    /// Write (or overwrite) a file in a source set after construction.
    pub fn write(&self, source_set: &str, relative_path: &str, contents: &str) {
        let path = self.source_set_dir(source_set).join(relative_path);
        self.write_file(&path, contents);
    }

    #[allow(clippy::expect_used)]
    pub fn remove(&self, source_set: &str, relative_path: &str) {
        let path = self.source_set_dir(source_set).join(relative_path);
        fs::remove_file(path).expect("failed to remove file");
    }

    #[allow(clippy::expect_used)]
    fn write_file(&self, path: impl AsRef<Path>, contents: &str) {
        let path = self.dir.path().join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create directories");
        }
        fs::write(&path, contents).expect("failed to write file");
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    #[must_use]
    pub fn source_set_dir(&self, source_set: &str) -> PathBuf {
        self.root().join("src").join(source_set).join("graphql")
    }

    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root().join(".graphqlrc.yml")
    }

    /// The written config, or the default config when none was written.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn config(&self) -> GraphQLConfig {
        let path = self.config_path();
        if path.exists() {
            graphql_config::load_config(&path).expect("invalid test config")
        } else {
            GraphQLConfig::default()
        }
    }

    /// Output root for the default config.
    #[must_use]
    pub fn output_root(&self) -> PathBuf {
        self.config().output_root(self.root())
    }

    /// Output directory of one (variant, service) unit.
    #[must_use]
    pub fn unit_output(&self, variant: &str, service: &str) -> PathBuf {
        self.output_root().join(variant).join(service)
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Every file under `dir` keyed by its `/`-separated relative path. Empty
/// when `dir` does not exist.
#[must_use]
#[allow(clippy::expect_used)]
pub fn read_tree(dir: &Path) -> BTreeMap<String, String> {
    let mut files = BTreeMap::new();
    if !dir.exists() {
        return files;
    }
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.expect("failed to walk directory");
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(dir)
            .expect("walked path outside root")
            .to_string_lossy()
            .replace('\\', "/");
        let contents = fs::read_to_string(entry.path()).expect("failed to read file");
        files.insert(relative, contents);
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_land_in_source_set_dir() {
        let project = TestProject::new().file("debug", "com/example/A.graphql", "query A { a }");
        let path = project.root().join("src/debug/graphql/com/example/A.graphql");
        assert_eq!(fs::read_to_string(path).unwrap(), "query A { a }");
    }

    #[test]
    fn test_default_config_without_file() {
        let project = TestProject::new();
        assert_eq!(project.config(), GraphQLConfig::default());
    }

    #[test]
    fn test_read_tree() {
        let project = TestProject::star_wars();
        let tree = read_tree(&project.source_set_dir("main"));
        let names: Vec<_> = tree.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            vec![
                "com/example/DroidDetails.graphql",
                "com/example/Films.graphql",
                "com/example/SpeciesInformation.graphql",
                "com/example/schema.json",
            ]
        );
    }
}
