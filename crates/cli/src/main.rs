mod commands;
mod exit_code;
mod progress;

pub use exit_code::ExitCode;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "graphql")]
#[command(about = "Variant-aware GraphQL code generation", long_about = None)]
#[command(version)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// Path to GraphQL config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Force colored output even when not a TTY
    #[arg(long, global = true, conflicts_with = "no_color")]
    color: bool,

    /// Disable colored output
    #[arg(long, global = true, conflicts_with = "color")]
    no_color: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Suppress progress indicators (spinners)
    #[arg(long, global = true)]
    no_progress: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output verbosity options
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    /// Whether to show progress indicators (spinners)
    pub show_progress: bool,
    /// Whether to show informational output (success messages, summaries)
    pub show_info: bool,
}

/// Which (variant, service) units to run
#[derive(Debug, Clone, Args)]
pub struct UnitArgs {
    /// Only run this variant (repeatable)
    #[arg(long = "variant", value_name = "NAME")]
    pub variants: Vec<String>,

    /// Only run this service (repeatable)
    #[arg(long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// Number of units to run in parallel (defaults to available cores)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code for every selected variant and service
    ///
    /// Each (variant, service) unit is merged, validated and written to its
    /// own output directory. A failing unit does not stop the others.
    Generate(UnitArgs),

    /// Validate every selected variant and service without writing anything
    Validate(UnitArgs),

    /// List the resolved variants and their source sets
    Variants {
        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output with colors
    Human,
    /// JSON output for tooling
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing();
    configure_colors(cli.color, cli.no_color);

    let output_opts = OutputOptions {
        show_progress: !cli.quiet && !cli.no_progress,
        show_info: !cli.quiet,
    };

    let exit_code = match cli.command {
        Commands::Generate(args) => commands::generate::run(cli.config, &args, output_opts)?,
        Commands::Validate(args) => commands::validate::run(cli.config, &args, output_opts)?,
        Commands::Variants { format } => commands::variants::run(cli.config, format)?,
    };

    if exit_code != ExitCode::Success {
        exit_code.exit();
    }
    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Configure colored output based on flags and environment variables.
///
/// Priority order (highest to lowest):
/// 1. `--color` flag (force colors on)
/// 2. `--no-color` flag (force colors off)
/// 3. `NO_COLOR` environment variable (if set to any value, disable colors)
/// 4. `CLICOLOR_FORCE` environment variable (if set to non-zero, force colors)
/// 5. `CLICOLOR` environment variable (if set to "0", disable colors)
/// 6. Default: colors enabled if stdout is a TTY (handled by `colored` crate)
///
/// See: <https://no-color.org/> and <https://bixense.com/clicolors/>
fn configure_colors(force_color: bool, no_color: bool) {
    use colored::control;

    if force_color {
        control::set_override(true);
    } else if no_color || std::env::var_os("NO_COLOR").is_some() {
        control::set_override(false);
    } else if let Ok(val) = std::env::var("CLICOLOR_FORCE") {
        if !val.is_empty() && val != "0" {
            control::set_override(true);
        }
    } else if std::env::var("CLICOLOR").is_ok_and(|val| val == "0") {
        control::set_override(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::parse_from([
            "graphql",
            "--config",
            "app/.graphqlrc.yml",
            "generate",
            "--variant",
            "freeDebug",
            "--variant",
            "paidDebug",
            "--jobs",
            "2",
            "--format",
            "json",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("app/.graphqlrc.yml")));
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.variants, vec!["freeDebug", "paidDebug"]);
        assert!(args.services.is_empty());
        assert_eq!(args.jobs, Some(2));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Cli::try_parse_from(["graphql", "--color", "--no-color", "variants"]).is_err());
    }
}
