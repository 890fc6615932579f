use tracing::info;

use super::{sample_value_count, CleaningStep, StepContext};
use crate::constants::COVERAGE_FILTERED_ARTIFACT;
use crate::error::Result;
use crate::pipeline::quality_gate::{QualityIssue, QualityIssueType, QualitySeverity};
use crate::stats::percentage;
use crate::table::Table;

/// Drops proteins measured in fewer than `min_coverage_pct` percent of samples
pub struct CoverageFilterStep;

fn row_coverage(table: &Table, samples: &[&str], row: usize) -> f64 {
    percentage(sample_value_count(table, samples, row), samples.len())
}

impl CleaningStep for CoverageFilterStep {
    fn step_name(&self) -> &'static str {
        "coverage_filter"
    }

    fn artifact_name(&self) -> &'static str {
        COVERAGE_FILTERED_ARTIFACT
    }

    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table> {
        let samples = ctx.layout.samples();
        let threshold = ctx.config.min_coverage_pct;

        let mask: Vec<bool> = (0..table.height())
            .map(|row| row_coverage(table, &samples, row) >= threshold)
            .collect();
        let out = table.filter_rows(&mask);

        info!(
            "Coverage filter (>= {}%): kept {} of {} proteins",
            threshold,
            out.height(),
            table.height()
        );
        Ok(out)
    }

    fn validate(&self, _before: &Table, after: &Table, ctx: &StepContext) -> Vec<QualityIssue> {
        let samples = ctx.layout.samples();
        let threshold = ctx.config.min_coverage_pct;
        (0..after.height())
            .filter_map(|row| {
                let coverage = row_coverage(after, &samples, row);
                (coverage < threshold).then(|| {
                    let protein = after
                        .cell(&ctx.layout.id_column, row)
                        .and_then(|v| v.key_text())
                        .unwrap_or_default();
                    QualityIssue::new(
                        QualityIssueType::BelowCoverage,
                        QualitySeverity::Error,
                        format!("'{}' has coverage {:.2}% below {}%", protein, coverage, threshold),
                    )
                    .on_field(ctx.layout.id_column.clone())
                })
            })
            .collect()
    }
}
