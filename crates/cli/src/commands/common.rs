use crate::{progress, ExitCode, OutputFormat, OutputOptions, UnitArgs};
use anyhow::Result;
use colored::Colorize;
use graphql_analysis::Diagnostic;
use graphql_codegen::{CodegenError, CodegenPipeline, RunMode, UnitFilter, UnitOutcome, UnitReport};
use graphql_config::{ConfigError, GraphQLConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Loaded configuration plus the directory its paths resolve against.
pub struct CommandContext {
    pub config: GraphQLConfig,
    pub base_dir: PathBuf,
}

impl CommandContext {
    /// Load the config at `config_path`, or discover one from the working
    /// directory. Without a config file the defaults apply to the working
    /// directory.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir()?;
        let config_path = match config_path {
            Some(path) => Some(path),
            None => graphql_config::find_config(&cwd)?,
        };

        let Some(path) = config_path else {
            tracing::info!(dir = %cwd.display(), "No config file found, using defaults");
            return Ok(Self {
                config: GraphQLConfig::default(),
                base_dir: cwd,
            });
        };

        let config = graphql_config::load_config(&path)?;
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => cwd,
        };
        Ok(Self { config, base_dir })
    }
}

/// Print a failure that stops the command before any unit runs.
pub fn report_error(format: OutputFormat, context: &str, error: &dyn std::fmt::Display) {
    match format {
        OutputFormat::Human => eprintln!("{} {}: {error}", "✗".red().bold(), context.red()),
        OutputFormat::Json => eprintln!(
            "{}",
            serde_json::json!({ "error": format!("{context}: {error}") })
        ),
    }
}

/// Shared body of `generate` and `validate`.
pub fn run_units(
    config_path: Option<PathBuf>,
    args: &UnitArgs,
    mode: RunMode,
    output_opts: OutputOptions,
) -> Result<ExitCode> {
    let start_time = Instant::now();

    let ctx = match CommandContext::load(config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            report_error(args.format, "Failed to load config", &e);
            return Ok(ExitCode::ConfigError);
        }
    };

    let mut pipeline = match CodegenPipeline::from_config(&ctx.config, &ctx.base_dir) {
        Ok(pipeline) => pipeline.with_mode(mode),
        Err(e) => {
            report_error(args.format, "Invalid variants", &e);
            return Ok(ExitCode::ConfigError);
        }
    };
    if let Some(jobs) = args.jobs {
        pipeline = pipeline.with_jobs(jobs);
    }

    let filter = UnitFilter {
        variants: args.variants.clone(),
        services: args.services.clone(),
    };

    let spinner = (args.format == OutputFormat::Human && output_opts.show_progress).then(|| {
        progress::spinner(match mode {
            RunMode::Generate => "Generating code...",
            RunMode::ValidateOnly => "Validating variants...",
        })
    });
    let result = pipeline.run_all(&filter);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let reports = match result {
        Ok(reports) => reports,
        Err(
            e @ (CodegenError::UnknownVariant { .. }
            | CodegenError::UnknownService { .. }
            | CodegenError::Variants(_)),
        ) => {
            report_error(args.format, "Invalid selection", &e);
            return Ok(ExitCode::ConfigError);
        }
        Err(e) => return Err(e.into()),
    };

    match args.format {
        OutputFormat::Human => print_human(&reports, mode, output_opts, start_time.elapsed()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&reports_json(&reports))?);
        }
    }

    Ok(ExitCode::for_reports(&reports))
}

fn print_human(reports: &[UnitReport], mode: RunMode, output_opts: OutputOptions, elapsed: Duration) {
    for report in reports {
        let unit = format!("{}/{}", report.variant, report.service);
        match &report.outcome {
            UnitOutcome::Generated {
                artifacts,
                written,
                unchanged,
                removed,
            } => {
                if output_opts.show_info {
                    println!(
                        "{} {} {}",
                        "✓".green(),
                        unit.bold(),
                        format!(
                            "{} artifact(s): {written} written, {unchanged} unchanged, {removed} removed",
                            artifacts.len()
                        )
                        .dimmed()
                    );
                }
            }
            UnitOutcome::Validated {
                operations,
                fragments,
            } => {
                if output_opts.show_info {
                    println!(
                        "{} {} {}",
                        "✓".green(),
                        unit.bold(),
                        format!("{operations} operation(s), {fragments} fragment(s)").dimmed()
                    );
                }
            }
            UnitOutcome::Failed { diagnostics } => {
                println!(
                    "{} {} {}",
                    "✗".red().bold(),
                    unit.bold(),
                    format!("{} error(s)", diagnostics.len()).red()
                );
                for diagnostic in diagnostics {
                    println!("    {}", human_diagnostic(diagnostic));
                }
            }
        }
    }

    if !output_opts.show_info {
        return;
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    println!();
    if failed == 0 {
        let verb = match mode {
            RunMode::Generate => "generated",
            RunMode::ValidateOnly => "validated",
        };
        println!(
            "{}",
            format!("✓ {} unit(s) {verb}", reports.len()).green().bold()
        );
    } else {
        println!(
            "{}",
            format!("✗ {failed} of {} unit(s) failed", reports.len()).red()
        );
    }
    println!("  {} total: {:.2}s", "⏱".dimmed(), elapsed.as_secs_f64());
}

/// `path:line:col: error[code]: message`
fn human_diagnostic(diagnostic: &Diagnostic) -> String {
    let label = format!("{}[{}]:", diagnostic.severity, diagnostic.kind);
    match &diagnostic.location {
        Some(location) => format!(
            "{location}: {} {}",
            label.red().bold(),
            diagnostic.message
        ),
        None => format!("{} {}", label.red().bold(), diagnostic.message),
    }
}

pub fn reports_json(reports: &[UnitReport]) -> serde_json::Value {
    let units: Vec<serde_json::Value> = reports.iter().map(unit_json).collect();
    let diagnostics: Vec<serde_json::Value> = reports
        .iter()
        .flat_map(|report| {
            report
                .diagnostics()
                .iter()
                .map(move |diagnostic| diagnostic_json(report, diagnostic))
        })
        .collect();

    serde_json::json!({
        "success": reports.iter().all(UnitReport::is_success),
        "units": units,
        "diagnostics": diagnostics,
    })
}

fn unit_json(report: &UnitReport) -> serde_json::Value {
    let mut unit = serde_json::json!({
        "variant": report.variant.as_ref(),
        "service": report.service.as_ref(),
    });
    match &report.outcome {
        UnitOutcome::Generated {
            artifacts,
            written,
            unchanged,
            removed,
        } => {
            unit["status"] = "generated".into();
            unit["artifacts"] = artifacts
                .iter()
                .map(|path| path.to_string_lossy().replace('\\', "/"))
                .collect::<Vec<_>>()
                .into();
            unit["written"] = (*written).into();
            unit["unchanged"] = (*unchanged).into();
            unit["removed"] = (*removed).into();
        }
        UnitOutcome::Validated {
            operations,
            fragments,
        } => {
            unit["status"] = "validated".into();
            unit["operations"] = (*operations).into();
            unit["fragments"] = (*fragments).into();
        }
        UnitOutcome::Failed { diagnostics } => {
            unit["status"] = "failed".into();
            unit["errors"] = diagnostics.len().into();
        }
    }
    unit
}

fn diagnostic_json(report: &UnitReport, diagnostic: &Diagnostic) -> serde_json::Value {
    let mut value = serde_json::json!({
        "variant": report.variant.as_ref(),
        "service": report.service.as_ref(),
        "kind": diagnostic.kind.code(),
        "severity": diagnostic.severity.to_string(),
        "message": diagnostic.message.as_ref(),
    });
    if let Some(location) = &diagnostic.location {
        value["location"] = serde_json::json!({
            "sourceSet": location.source_set.as_ref(),
            "logicalName": location.logical_name.as_str(),
            "file": location.path.to_string_lossy(),
            "line": location.range.start.line + 1,
            "column": location.range.start.character + 1,
        });
    }
    value
}
