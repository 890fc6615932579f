use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use proteomics_cleaner::app::merge_use_case::MergeUseCase;
use proteomics_cleaner::constants::{
    DEFAULT_MERGE_OUTPUT_DIR, DEFAULT_PRIMARY_INPUT, DEFAULT_SECONDARY_INPUT, LOG_DIR_NAME,
};
use proteomics_cleaner::infra::artifact_output_adapter::FileArtifactAdapter;
use proteomics_cleaner::logging;
use proteomics_cleaner::MergeConfig;

/// Merge the cleaned proteomics sheet with the COMBAT sheet
#[derive(Parser)]
#[command(name = "merge-sheets")]
#[command(version)]
struct Args {
    #[arg(long, default_value = DEFAULT_PRIMARY_INPUT)]
    primary: PathBuf,
    #[arg(long, default_value = DEFAULT_SECONDARY_INPUT)]
    secondary: PathBuf,
    #[arg(long, default_value = DEFAULT_MERGE_OUTPUT_DIR)]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let output = Arc::new(FileArtifactAdapter::new(&args.output_dir)?);
    let _guard = logging::init_logging(&args.output_dir.join(LOG_DIR_NAME))?;
    let (outcome, artifacts) = MergeUseCase::new(MergeConfig::default(), output)
        .run(&args.primary, &args.secondary)
        .with_context(|| {
            format!(
                "Failed to merge {} with {}",
                args.primary.display(),
                args.secondary.display()
            )
        })?;

    info!("Merge completed successfully");
    println!("✅ Merged {} rows x {} proteins", outcome.report.merged_rows, outcome.report.total_proteins);
    let without_key = outcome.report.primary_rows_without_key + outcome.report.secondary_rows_without_key;
    if without_key > 0 {
        println!(
            "⚠️  Left out rows without a complete key: {} primary, {} secondary",
            outcome.report.primary_rows_without_key, outcome.report.secondary_rows_without_key
        );
    }
    println!("   {}", artifacts.merged);
    println!("   {}", artifacts.summary);
    Ok(())
}
