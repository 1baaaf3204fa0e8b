use crate::{generate, ArtifactWriter, CodeEmitter, CodegenError, CompilationUnit, JavaEmitter};
use graphql_analysis::{validate, Diagnostic, DiagnosticKind};
use graphql_base_db::DocumentStore;
use graphql_config::GraphQLConfig;
use graphql_variants::{merge, Variant, VariantDimensions};
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use threadpool::ThreadPool;

/// How far a unit runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Validate, generate and write artifacts.
    #[default]
    Generate,
    /// Stop after building the compilation unit. Nothing is written.
    ValidateOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
    Generated {
        /// Artifact paths below the unit's output directory
        artifacts: Vec<PathBuf>,
        written: usize,
        unchanged: usize,
        removed: usize,
    },
    Validated {
        operations: usize,
        fragments: usize,
    },
    Failed {
        diagnostics: Vec<Diagnostic>,
    },
}

/// Result of one (variant, service) unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
    pub variant: Arc<str>,
    pub service: Arc<str>,
    pub outcome: UnitOutcome,
}

impl UnitReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self.outcome, UnitOutcome::Failed { .. })
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match &self.outcome {
            UnitOutcome::Failed { diagnostics } => diagnostics,
            _ => &[],
        }
    }
}

/// Which units to run. Empty lists select everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitFilter {
    pub variants: Vec<String>,
    pub services: Vec<String>,
}

impl UnitFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn variant(mut self, name: &str) -> Self {
        self.variants.push(name.to_string());
        self
    }

    #[must_use]
    pub fn service(mut self, name: &str) -> Self {
        self.services.push(name.to_string());
        self
    }
}

/// Runs the pipeline for independent (variant, service) units.
///
/// Each unit loads its own source sets, merges, validates, builds its
/// compilation unit and writes into its own output directory. Cloning is
/// cheap and clones share nothing mutable.
#[derive(Clone)]
pub struct CodegenPipeline {
    store: Arc<DocumentStore>,
    variants: Arc<[Variant]>,
    writer: ArtifactWriter,
    emitter: Arc<dyn CodeEmitter>,
    mode: RunMode,
    jobs: usize,
}

impl fmt::Debug for CodegenPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodegenPipeline")
            .field("store", &self.store)
            .field("variants", &self.variants)
            .field("writer", &self.writer)
            .field("mode", &self.mode)
            .field("jobs", &self.jobs)
            .finish_non_exhaustive()
    }
}

impl CodegenPipeline {
    #[must_use]
    pub fn new(store: DocumentStore, variants: Vec<Variant>, output_root: impl Into<PathBuf>) -> Self {
        Self {
            store: Arc::new(store),
            variants: Arc::from(variants),
            writer: ArtifactWriter::new(output_root),
            emitter: Arc::new(JavaEmitter),
            mode: RunMode::default(),
            jobs: std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
        }
    }

    /// Resolve variants and locate source sets from a loaded config. Paths
    /// resolve against `base_dir`.
    pub fn from_config(config: &GraphQLConfig, base_dir: &Path) -> Result<Self, CodegenError> {
        let variants = VariantDimensions::from_config(&config.variants).resolve()?;
        tracing::debug!(variants = variants.len(), "Resolved variants");
        Ok(Self::new(
            DocumentStore::from_config(config, base_dir),
            variants,
            config.output_root(base_dir),
        ))
    }

    #[must_use]
    pub fn with_emitter(mut self, emitter: impl CodeEmitter + 'static) -> Self {
        self.emitter = Arc::new(emitter);
        self
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    /// Worker threads used by [`Self::run_all`]. At least one is used.
    #[must_use]
    pub const fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }

    #[must_use]
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.store.service_names()
    }

    #[must_use]
    pub const fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    /// Units matching a filter: variants in resolution order, services in
    /// name order within each.
    pub fn select(&self, filter: &UnitFilter) -> Result<Vec<(Variant, Arc<str>)>, CodegenError> {
        for name in &filter.variants {
            if !self.variants.iter().any(|v| v.name() == name) {
                return Err(CodegenError::UnknownVariant {
                    name: name.clone(),
                    available: self
                        .variants
                        .iter()
                        .map(Variant::name)
                        .collect::<Vec<_>>()
                        .join(", "),
                });
            }
        }
        for name in &filter.services {
            if !self.services().any(|s| s == name) {
                return Err(CodegenError::UnknownService {
                    name: name.clone(),
                    available: self.services().collect::<Vec<_>>().join(", "),
                });
            }
        }

        let selected = |names: &[String], name: &str| names.is_empty() || names.iter().any(|n| n == name);
        let mut units = Vec::new();
        for variant in self.variants.iter().filter(|v| selected(&filter.variants, v.name())) {
            for service in self.services().filter(|s| selected(&filter.services, s)) {
                units.push((variant.clone(), Arc::from(service)));
            }
        }
        Ok(units)
    }

    /// Run one unit. Failures are reported, never propagated: other units
    /// are unaffected.
    #[tracing::instrument(skip(self, variant), fields(variant = variant.name()))]
    pub fn run_unit(&self, variant: &Variant, service: &str) -> UnitReport {
        let outcome = match self.compile(variant, service) {
            Ok(outcome) => outcome,
            Err(mut diagnostics) => {
                // A failed unit keeps no artifacts from earlier runs.
                if self.mode == RunMode::Generate {
                    if let Err(e) = self.writer.clear(variant.name(), service) {
                        diagnostics.push(Diagnostic::error(DiagnosticKind::Io, e.to_string()));
                    }
                }
                tracing::warn!(errors = diagnostics.len(), "Unit failed");
                UnitOutcome::Failed { diagnostics }
            }
        };

        UnitReport {
            variant: Arc::from(variant.name()),
            service: Arc::from(service),
            outcome,
        }
    }

    /// [`Self::run_unit`], turning a panic into a failed report.
    fn run_unit_caught(&self, variant: &Variant, service: &str) -> UnitReport {
        match panic::catch_unwind(AssertUnwindSafe(|| self.run_unit(variant, service))) {
            Ok(report) => report,
            Err(payload) => {
                let message = format!("Unit panicked: {}", panic_message(payload.as_ref()));
                tracing::error!(variant = variant.name(), service, "{message}");
                let mut diagnostics = vec![Diagnostic::error(DiagnosticKind::Internal, message)];
                if self.mode == RunMode::Generate {
                    if let Err(e) = self.writer.clear(variant.name(), service) {
                        diagnostics.push(Diagnostic::error(DiagnosticKind::Io, e.to_string()));
                    }
                }
                UnitReport {
                    variant: Arc::from(variant.name()),
                    service: Arc::from(service),
                    outcome: UnitOutcome::Failed { diagnostics },
                }
            }
        }
    }

    fn compile(&self, variant: &Variant, service: &str) -> Result<UnitOutcome, Vec<Diagnostic>> {
        let mut source_sets = Vec::new();
        let mut io_errors = Vec::new();
        for name in variant.source_set_names() {
            match self.store.load(name, service) {
                Ok(set) => source_sets.push(set),
                Err(e) => io_errors.push(Diagnostic::error(
                    DiagnosticKind::Io,
                    format!("Failed to load source set '{name}': {e}"),
                )),
            }
        }
        if !io_errors.is_empty() {
            return Err(io_errors);
        }

        let merged = Arc::new(merge(&source_sets, service));
        let validated = validate(merged)?;
        let unit = CompilationUnit::build(variant, [validated])?;

        if self.mode == RunMode::ValidateOnly {
            let (operations, fragments) = unit.service(service).map_or((0, 0), |input| {
                (
                    input.validated.operations().len(),
                    input.validated.fragments().count(),
                )
            });
            tracing::info!(operations, fragments, "Unit validated");
            return Ok(UnitOutcome::Validated {
                operations,
                fragments,
            });
        }

        let artifacts = generate(&unit, self.emitter.as_ref())?;
        let summary = self
            .writer
            .write(variant.name(), service, &artifacts)
            .map_err(|e| vec![Diagnostic::error(DiagnosticKind::Io, e.to_string())])?;

        tracing::info!(
            artifacts = artifacts.len(),
            written = summary.written,
            "Unit generated"
        );
        Ok(UnitOutcome::Generated {
            artifacts: artifacts.into_iter().map(|a| a.relative_path).collect(),
            written: summary.written,
            unchanged: summary.unchanged,
            removed: summary.removed,
        })
    }

    /// Run every selected unit on a thread pool.
    ///
    /// Reports come back sorted by (variant, service) regardless of the
    /// order units finish in.
    #[tracing::instrument(skip(self, filter), fields(jobs = self.jobs))]
    pub fn run_all(&self, filter: &UnitFilter) -> Result<Vec<UnitReport>, CodegenError> {
        let units = self.select(filter)?;
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let expected: Vec<(Arc<str>, Arc<str>)> = units
            .iter()
            .map(|(variant, service)| (Arc::from(variant.name()), Arc::clone(service)))
            .collect();
        let pool = ThreadPool::with_name(
            "graphql-codegen".to_string(),
            self.jobs.clamp(1, expected.len()),
        );
        let (sender, receiver) = crossbeam_channel::unbounded();

        for (variant, service) in units {
            let pipeline = self.clone();
            let sender = sender.clone();
            pool.execute(move || {
                let report = pipeline.run_unit_caught(&variant, &service);
                // The receiver lives until every sender is dropped.
                let _ = sender.send(report);
            });
        }
        drop(sender);

        let mut reports: Vec<UnitReport> = receiver.iter().collect();
        if reports.len() != expected.len() {
            let reported: BTreeSet<(Arc<str>, Arc<str>)> = reports
                .iter()
                .map(|r| (Arc::clone(&r.variant), Arc::clone(&r.service)))
                .collect();
            let missing: Vec<UnitReport> = expected
                .into_iter()
                .filter(|unit| !reported.contains(unit))
                .map(|(variant, service)| UnitReport {
                    variant,
                    service,
                    outcome: UnitOutcome::Failed {
                        diagnostics: vec![Diagnostic::error(
                            DiagnosticKind::Internal,
                            "Unit did not report back",
                        )],
                    },
                })
                .collect();
            reports.extend(missing);
        }
        reports.sort_by(|a, b| (&a.variant, &a.service).cmp(&(&b.variant, &b.service)));

        tracing::info!(
            units = reports.len(),
            failed = reports.iter().filter(|r| !r.is_success()).count(),
            "Codegen finished"
        );
        Ok(reports)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}
