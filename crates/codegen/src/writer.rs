use crate::{CodegenError, GeneratedArtifact};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What a write changed on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    pub written: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Writes the artifacts of one (variant, service) unit.
///
/// A unit owns `<output_root>/<variant>/<service>/` and nothing else, so units
/// can be written concurrently without coordination.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_root: PathBuf,
}

impl ArtifactWriter {
    #[must_use]
    pub fn new(output_root: impl Into<PathBuf>) -> Self {
        Self {
            output_root: output_root.into(),
        }
    }

    #[must_use]
    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    #[must_use]
    pub fn unit_dir(&self, variant: &str, service: &str) -> PathBuf {
        self.output_root.join(variant).join(service)
    }

    /// Make the unit directory hold exactly `artifacts`.
    ///
    /// Files with identical bytes are left alone; files no longer generated
    /// are removed.
    #[tracing::instrument(skip(self, artifacts), fields(artifacts = artifacts.len()))]
    pub fn write(
        &self,
        variant: &str,
        service: &str,
        artifacts: &[GeneratedArtifact],
    ) -> Result<WriteSummary, CodegenError> {
        let dir = self.unit_dir(variant, service);
        let mut summary = WriteSummary::default();
        let mut expected = BTreeSet::new();

        for artifact in artifacts {
            let path = dir.join(&artifact.relative_path);
            match fs::read(&path) {
                Ok(existing) if existing == artifact.contents.as_bytes() => {
                    summary.unchanged += 1;
                }
                Ok(_) => {
                    fs::write(&path, &artifact.contents).map_err(|e| CodegenError::io(&path, e))?;
                    summary.written += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent).map_err(|e| CodegenError::io(parent, e))?;
                    }
                    fs::write(&path, &artifact.contents).map_err(|e| CodegenError::io(&path, e))?;
                    summary.written += 1;
                }
                Err(e) => return Err(CodegenError::io(&path, e)),
            }
            expected.insert(path);
        }

        for path in existing_files(&dir)? {
            if !expected.contains(&path) {
                tracing::trace!(path = %path.display(), "Removing stale artifact");
                fs::remove_file(&path).map_err(|e| CodegenError::io(&path, e))?;
                summary.removed += 1;
            }
        }
        if summary.removed > 0 {
            prune_empty_dirs(&dir)?;
        }

        tracing::debug!(
            written = summary.written,
            unchanged = summary.unchanged,
            removed = summary.removed,
            "Artifacts written"
        );
        Ok(summary)
    }

    /// Remove every artifact of a unit. Returns the number of files removed.
    #[tracing::instrument(skip(self))]
    pub fn clear(&self, variant: &str, service: &str) -> Result<usize, CodegenError> {
        let dir = self.unit_dir(variant, service);
        let files = existing_files(&dir)?;
        for path in &files {
            fs::remove_file(path).map_err(|e| CodegenError::io(path, e))?;
        }
        if !files.is_empty() {
            prune_empty_dirs(&dir)?;
            tracing::debug!(removed = files.len(), "Cleared artifacts");
        }
        Ok(files.len())
    }
}

fn existing_files(dir: &Path) -> Result<Vec<PathBuf>, CodegenError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| CodegenError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Remove empty directories below `dir`, keeping `dir` itself.
fn prune_empty_dirs(dir: &Path) -> Result<(), CodegenError> {
    for entry in WalkDir::new(dir).min_depth(1).contents_first(true) {
        let entry = entry.map_err(|source| CodegenError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let path = entry.path();
        let is_empty = fs::read_dir(path)
            .map_err(|e| CodegenError::io(path, e))?
            .next()
            .is_none();
        if is_empty {
            fs::remove_dir(path).map_err(|e| CodegenError::io(path, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArtifactKind;
    use graphql_types::LogicalName;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn artifact(relative_path: &str, contents: &str) -> GeneratedArtifact {
        GeneratedArtifact {
            variant: Arc::from("debug"),
            service: Arc::from("service0"),
            logical_name: LogicalName::new("A.graphql"),
            name: Arc::from("A"),
            kind: ArtifactKind::Fragment,
            relative_path: PathBuf::from(relative_path),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn test_unchanged_files_are_not_rewritten() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let artifacts = vec![artifact("a/A.java", "one"), artifact("B.java", "two")];

        let first = writer.write("debug", "service0", &artifacts).unwrap();
        assert_eq!(first.written, 2);

        let second = writer.write("debug", "service0", &artifacts).unwrap();
        assert_eq!(
            second,
            WriteSummary {
                written: 0,
                unchanged: 2,
                removed: 0
            }
        );
    }

    #[test]
    fn test_stale_files_and_empty_dirs_are_removed() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        writer
            .write("debug", "service0", &[artifact("a/A.java", "one"), artifact("B.java", "two")])
            .unwrap();

        let summary = writer
            .write("debug", "service0", &[artifact("B.java", "changed")])
            .unwrap();
        assert_eq!(summary.written, 1);
        assert_eq!(summary.removed, 1);

        let unit = writer.unit_dir("debug", "service0");
        assert!(!unit.join("a").exists());
        assert_eq!(fs::read_to_string(unit.join("B.java")).unwrap(), "changed");
    }

    #[test]
    fn test_other_units_are_untouched() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        writer.write("release", "service0", &[artifact("R.java", "r")]).unwrap();

        writer.write("debug", "service0", &[]).unwrap();
        writer.clear("debug", "service0").unwrap();

        let other = writer.unit_dir("release", "service0").join("R.java");
        assert_eq!(fs::read_to_string(other).unwrap(), "r");
    }

    #[test]
    fn test_clear_missing_unit() {
        let dir = tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        assert_eq!(writer.clear("debug", "service0").unwrap(), 0);
    }
}
