use crate::commands::common::{report_error, CommandContext};
use crate::{ExitCode, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use graphql_variants::{Variant, VariantDimensions};
use std::path::PathBuf;

pub fn run(config_path: Option<PathBuf>, format: OutputFormat) -> Result<ExitCode> {
    let ctx = match CommandContext::load(config_path) {
        Ok(ctx) => ctx,
        Err(e) => {
            report_error(format, "Failed to load config", &e);
            return Ok(ExitCode::ConfigError);
        }
    };

    let variants = match VariantDimensions::from_config(&ctx.config.variants).resolve() {
        Ok(variants) => variants,
        Err(e) => {
            report_error(format, "Invalid variants", &e);
            return Ok(ExitCode::ConfigError);
        }
    };

    match format {
        OutputFormat::Human => {
            for variant in &variants {
                let chain: Vec<&str> = variant.source_set_names().collect();
                println!("{}", variant.name().bold());
                println!("  {}", chain.join(" -> ").dimmed());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&variants_json(&variants))?);
        }
    }

    Ok(ExitCode::Success)
}

fn variants_json(variants: &[Variant]) -> serde_json::Value {
    let variants: Vec<serde_json::Value> = variants
        .iter()
        .map(|variant| {
            serde_json::json!({
                "name": variant.name(),
                "buildType": variant.build_type(),
                "flavors": variant
                    .flavors()
                    .iter()
                    .map(|flavor| serde_json::json!({
                        "dimension": flavor.dimension.as_ref(),
                        "name": flavor.name.as_ref(),
                    }))
                    .collect::<Vec<_>>(),
                "sourceSets": variant
                    .source_sets()
                    .iter()
                    .map(|set| serde_json::json!({
                        "name": set.name.as_ref(),
                        "rank": set.rank.to_string(),
                    }))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::json!({ "variants": variants })
}
