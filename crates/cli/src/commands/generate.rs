use crate::commands::common::run_units;
use crate::{ExitCode, OutputOptions, UnitArgs};
use anyhow::Result;
use graphql_codegen::RunMode;
use std::path::PathBuf;

#[tracing::instrument(skip(config_path, args, output_opts), fields(variants = ?args.variants, services = ?args.services))]
pub fn run(config_path: Option<PathBuf>, args: &UnitArgs, output_opts: OutputOptions) -> Result<ExitCode> {
    run_units(config_path, args, RunMode::Generate, output_opts)
}
