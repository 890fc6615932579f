use std::path::Path;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::app::ports::ArtifactSink;
use crate::config::MergeConfig;
use crate::error::Result;
use crate::merge::{merge_tables, MergeOutcome};
use crate::stats::summary_table;
use crate::table::read_csv;

/// Where the merge artifacts were written
#[derive(Debug, Clone)]
pub struct MergeArtifacts {
    pub merged: String,
    pub summary: String,
    pub report: String,
}

/// Use case for merging a cleaned dataset with a second cleaned dataset
pub struct MergeUseCase {
    config: MergeConfig,
    output: Arc<dyn ArtifactSink>,
}

impl MergeUseCase {
    pub fn new(config: MergeConfig, output: Arc<dyn ArtifactSink>) -> Self {
        Self { config, output }
    }

    /// Load both files, merge them and write the merged table, the protein
    /// summary and the merge report
    #[instrument(skip_all, fields(primary = %primary_path.display(), secondary = %secondary_path.display()))]
    pub fn run(&self, primary_path: &Path, secondary_path: &Path) -> Result<(MergeOutcome, MergeArtifacts)> {
        self.config.validate()?;

        info!("Loading primary data from {}", primary_path.display());
        let primary = read_csv(primary_path)?;
        info!("Loading secondary data from {}", secondary_path.display());
        let secondary = read_csv(secondary_path)?;

        let outcome = merge_tables(primary, secondary, &self.config)?;
        let artifacts = self.write(&outcome)?;
        Ok((outcome, artifacts))
    }

    fn write(&self, outcome: &MergeOutcome) -> Result<MergeArtifacts> {
        let merged = self.output.write_table(&self.config.merged_filename, &outcome.merged)?;
        info!("Saved merged dataset to {}", merged);

        let summary = self
            .output
            .write_table(&self.config.summary_filename, &summary_table(&outcome.summary))?;
        info!("Protein summary saved to {}", summary);

        let report = self
            .output
            .write_json(&self.config.report_filename, &serde_json::to_value(&outcome.report)?)?;

        Ok(MergeArtifacts {
            merged,
            summary,
            report,
        })
    }
}
