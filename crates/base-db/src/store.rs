use crate::{Document, StoreError};
use graphql_config::{GraphQLConfig, ServiceConfig};
use graphql_types::{DocumentKind, LogicalName};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use walkdir::WalkDir;

/// The least specific source set, shared by every variant.
pub const MAIN_SOURCE_SET: &str = "main";

/// Documents one source set contributes to one service.
///
/// Documents are ordered by (kind, logical name), so iteration never depends
/// on filesystem enumeration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    name: Arc<str>,
    service: Arc<str>,
    documents: Vec<Arc<Document>>,
}

impl SourceSet {
    #[must_use]
    pub fn new(name: &str, service: &str, documents: Vec<Document>) -> Self {
        let mut documents: Vec<Arc<Document>> = documents.into_iter().map(Arc::new).collect();
        documents.sort_by(|a, b| {
            (a.kind(), a.logical_name()).cmp(&(b.kind(), b.logical_name()))
        });
        Self {
            name: Arc::from(name),
            service: Arc::from(service),
            documents,
        }
    }

    /// A source set with no documents (e.g. its directory does not exist).
    #[must_use]
    pub fn empty(name: &str, service: &str) -> Self {
        Self::new(name, service, Vec::new())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    #[must_use]
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    /// Documents of one kind, in logical name order.
    pub fn documents_of(&self, kind: DocumentKind) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.iter().filter(move |doc| doc.kind() == kind)
    }

    #[must_use]
    pub fn get(&self, kind: DocumentKind, logical_name: &str) -> Option<&Arc<Document>> {
        self.documents_of(kind)
            .find(|doc| doc.logical_name().as_str() == logical_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Reads source sets from disk.
///
/// Source set `<name>` for a service lives at
/// `<source_root>/<name>/<graphql_dir>/<service source folder>`.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    source_root: PathBuf,
    graphql_dir: String,
    services: BTreeMap<String, ServiceConfig>,
}

impl DocumentStore {
    #[must_use]
    pub fn new(
        source_root: impl Into<PathBuf>,
        graphql_dir: impl Into<String>,
        services: BTreeMap<String, ServiceConfig>,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            graphql_dir: graphql_dir.into(),
            services,
        }
    }

    /// Paths in `config` resolve against `base_dir` (the config file's directory).
    #[must_use]
    pub fn from_config(config: &GraphQLConfig, base_dir: &Path) -> Self {
        Self::new(
            config.source_root(base_dir),
            config.graphql_dir.clone(),
            config.services.clone(),
        )
    }

    pub fn service_names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// GraphQL directory of a source set, shared by all services.
    #[must_use]
    pub fn graphql_dir(&self, source_set: &str) -> PathBuf {
        self.source_root.join(source_set).join(&self.graphql_dir)
    }

    /// Directory a service reads inside a source set.
    pub fn service_dir(&self, source_set: &str, service: &str) -> Result<PathBuf, StoreError> {
        let config = self
            .services
            .get(service)
            .ok_or_else(|| StoreError::UnknownService(service.to_string()))?;
        Ok(config.root_in(&self.graphql_dir(source_set)))
    }

    /// Load every document a service owns in one source set.
    ///
    /// A missing directory is an empty source set. Files that fail to parse
    /// are returned poisoned; only I/O failures are errors.
    #[tracing::instrument(skip(self), fields(documents = tracing::field::Empty))]
    pub fn load(&self, source_set: &str, service: &str) -> Result<SourceSet, StoreError> {
        let config = self
            .services
            .get(service)
            .ok_or_else(|| StoreError::UnknownService(service.to_string()))?;
        let graphql_dir = self.graphql_dir(source_set);
        let root = config.root_in(&graphql_dir);

        match std::fs::metadata(&root) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::trace!(path = %root.display(), "Source set directory absent");
                return Ok(SourceSet::empty(source_set, service));
            }
            Err(source) => return Err(StoreError::Io { path: root, source }),
            Ok(metadata) if !metadata.is_dir() => return Err(StoreError::NotADirectory(root)),
            Ok(_) => {}
        }

        // Folders owned by other services nested under this one's root.
        let nested_roots: Vec<PathBuf> = self
            .services
            .iter()
            .filter(|(name, _)| name.as_str() != service)
            .map(|(_, other)| other.root_in(&graphql_dir))
            .filter(|other_root| other_root != &root && other_root.starts_with(&root))
            .collect();

        let mut documents = Vec::new();
        let walker = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !nested_roots.iter().any(|nested| entry.path() == nested));

        for entry in walker {
            let entry = entry.map_err(|source| StoreError::Walk {
                path: root.clone(),
                source,
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Ok(rel_path) = path.strip_prefix(&root) else {
                continue;
            };
            let rel_path = rel_path.to_string_lossy();
            let Some(file_type) = config.file_type(&rel_path) else {
                tracing::trace!(path = %path.display(), "Skipping file not owned by service");
                continue;
            };

            let text = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let document = Document::from_file(
                source_set,
                LogicalName::new(&rel_path),
                path,
                text,
                file_type,
            );
            if document.is_poisoned() {
                tracing::debug!(path = %path.display(), "Document failed to parse");
            }
            documents.push(document);
        }

        tracing::Span::current().record("documents", documents.len());
        Ok(SourceSet::new(source_set, service, documents))
    }
}
