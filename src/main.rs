use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use proteomics_cleaner::app::merge_use_case::MergeUseCase;
use proteomics_cleaner::app::ports::ArtifactSink;
use proteomics_cleaner::constants::LOG_DIR_NAME;
use proteomics_cleaner::infra::artifact_output_adapter::FileArtifactAdapter;
use proteomics_cleaner::logging;
use proteomics_cleaner::pipeline::{CleaningPipeline, QualityDecision};
use proteomics_cleaner::Config;

#[derive(Parser)]
#[command(name = "proteomics-cleaner")]
#[command(about = "Proteomics data cleaning pipeline and dataset merge utility")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a wide protein-by-sample sheet, writing an artifact per step
    Clean {
        /// Input CSV file
        #[arg(long)]
        input: PathBuf,
        /// Directory for the step artifacts and logs
        #[arg(long)]
        output_dir: PathBuf,
        /// Index of the alternative label column (spreadsheet column AF)
        #[arg(long)]
        column_af: Option<usize>,
        /// Index of the first sample column
        #[arg(long)]
        patient_start: Option<usize>,
        /// Minimum coverage percentage for a protein to be kept
        #[arg(long)]
        min_coverage: Option<f64>,
        /// TOML settings file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Merge two cleaned datasets on PatientID and Timepoint
    Merge {
        /// Primary dataset; its values win on conflict
        #[arg(long)]
        primary: PathBuf,
        /// Secondary dataset used to fill gaps
        #[arg(long)]
        secondary: PathBuf,
        #[arg(long, default_value = "merged_results")]
        output_dir: PathBuf,
        #[arg(long)]
        merged_name: Option<String>,
        #[arg(long)]
        summary_name: Option<String>,
        /// Suffix for secondary columns that collide with primary columns
        #[arg(long)]
        suffix: Option<String>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

/// Output directory first, so an unusable directory surfaces as an output
/// error, then logging under `<output-dir>/logs`
fn open_output(output_dir: &Path) -> anyhow::Result<(Arc<dyn ArtifactSink>, WorkerGuard)> {
    let output: Arc<dyn ArtifactSink> = Arc::new(FileArtifactAdapter::new(output_dir)?);
    let guard = logging::init_logging(&output_dir.join(LOG_DIR_NAME))?;
    Ok((output, guard))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Clean {
            input,
            output_dir,
            column_af,
            patient_start,
            min_coverage,
            config,
        } => {
            let (output, _guard) = open_output(&output_dir)?;
            let mut settings = Config::load_or_default(config.as_deref())
                .context("Failed to load configuration")?
                .cleaner;
            if let Some(index) = column_af {
                settings.column_af_index = index;
            }
            if let Some(index) = patient_start {
                settings.patient_start_index = index;
            }
            if let Some(pct) = min_coverage {
                settings.min_coverage_pct = pct;
            }

            println!("🧹 Cleaning {}...", input.display());
            let pipeline = CleaningPipeline::new(settings, output);
            let result = match pipeline.run(&input) {
                Ok(result) => result,
                Err(e) => {
                    error!("Cleaning failed: {}", e);
                    return Err(e).context(format!("Cleaning {} failed", input.display()));
                }
            };
            info!("Cleaning finished");

            println!("\n📊 Cleaning Results:");
            println!("   Samples: {}", result.transformed.height());
            println!("   Proteins kept: {}", result.transformed.width().saturating_sub(2));
            println!("   Proteins with statistics: {}", result.statistics.len());
            println!("   Artifacts: {}", result.artifacts.len());
            println!("   Output directory: {}", output_dir.display());
            if result.report.decision == QualityDecision::AcceptWithWarnings {
                println!("\n⚠️  Validation passed with warnings, see validation_report.json");
            } else {
                println!("\n✅ Validation passed");
            }
        }
        Commands::Merge {
            primary,
            secondary,
            output_dir,
            merged_name,
            summary_name,
            suffix,
            config,
        } => {
            let (output, _guard) = open_output(&output_dir)?;
            let mut settings = Config::load_or_default(config.as_deref())
                .context("Failed to load configuration")?
                .merge;
            if let Some(name) = merged_name {
                settings.merged_filename = name;
            }
            if let Some(name) = summary_name {
                settings.summary_filename = name;
            }
            if let Some(suffix) = suffix {
                settings.suffix = suffix;
            }

            println!("🔗 Merging {} with {}...", primary.display(), secondary.display());
            let (outcome, artifacts) = MergeUseCase::new(settings, output)
                .run(&primary, &secondary)
                .context("Merge failed")?;

            println!("\n📊 Merge Results:");
            println!("   Rows: {}", outcome.report.merged_rows);
            println!("   Proteins: {}", outcome.report.total_proteins);
            println!("   Unique patients: {}", outcome.report.unique_patients);
            println!("   Unique timepoints: {}", outcome.report.unique_timepoints);
            println!("   Values filled from secondary: {}", outcome.report.reconciliation.total_filled());
            println!(
                "   Rows without a key (primary/secondary): {}/{}",
                outcome.report.primary_rows_without_key, outcome.report.secondary_rows_without_key
            );
            println!("   Merged data: {}", artifacts.merged);
            println!("   Protein summary: {}", artifacts.summary);
            println!("   Report: {}", artifacts.report);
            if outcome.report.primary_rows_without_key + outcome.report.secondary_rows_without_key > 0 {
                println!("\n⚠️  Rows without a complete PatientID/Timepoint were left out of the merge");
            }
        }
    }

    Ok(())
}
