use std::path::Path;
use std::sync::Arc;

use tracing::{error, info, info_span, warn};

use super::quality_gate::{decide, shape_checks, QualityDecision, QualitySeverity, ValidationReport};
use super::steps::{default_steps, CleaningStep, SheetLayout, StepContext, StepResult};
use crate::app::ports::ArtifactSink;
use crate::config::CleanerConfig;
use crate::constants::{
    MISSINGNESS_ARTIFACT, PATIENT_ID_COLUMN, RAW_DATA_ARTIFACT, STATISTICS_ARTIFACT, TIMEPOINT_COLUMN,
    VALIDATION_REPORT_ARTIFACT,
};
use crate::error::{CleanerError, Result};
use crate::stats::{percentage, statistics_table, summarize_columns, ProteinSummary};
use crate::table::{read_csv, Column, Table, Value};

/// Result of a complete cleaning run
#[derive(Debug)]
pub struct PipelineResult {
    /// One row per sample, `PatientID`, `Timepoint`, then proteins
    pub transformed: Table,
    pub statistics: Vec<ProteinSummary>,
    pub report: ValidationReport,
    /// Locations of every artifact written, in order
    pub artifacts: Vec<String>,
}

/// Runs the cleaning steps in order, saving each step's table and checking it
/// before the next step starts
pub struct CleaningPipeline {
    config: CleanerConfig,
    steps: Vec<Box<dyn CleaningStep>>,
    output: Arc<dyn ArtifactSink>,
}

impl CleaningPipeline {
    pub fn new(config: CleanerConfig, output: Arc<dyn ArtifactSink>) -> Self {
        Self {
            config,
            steps: default_steps(),
            output,
        }
    }

    pub fn run(&self, input: &Path) -> Result<PipelineResult> {
        info!("Processing file: {}", input.display());
        let raw = read_csv(input)?;
        self.run_table(raw, &input.display().to_string())
    }

    /// Run on an already loaded sheet; `input` labels the validation report
    pub fn run_table(&self, raw: Table, input: &str) -> Result<PipelineResult> {
        self.config.validate()?;
        let mut artifacts = Vec::new();
        let mut results = Vec::new();

        let layout = SheetLayout::resolve(&raw, &self.config)?;
        info!(
            "Sheet has {} rows, {} columns, {} sample columns",
            raw.height(),
            raw.width(),
            layout.sample_columns.len()
        );
        let mut ctx = StepContext {
            config: self.config.clone(),
            layout,
        };

        artifacts.push(self.output.write_table(RAW_DATA_ARTIFACT, &raw)?);
        let load_issues = shape_checks(&raw, &raw, false);
        results.push(StepResult {
            step: "load".to_string(),
            artifact: RAW_DATA_ARTIFACT.to_string(),
            rows: raw.height(),
            columns: raw.width(),
            decision: decide(&load_issues),
            issues: load_issues,
        });

        let mut table = raw;
        for step in &self.steps {
            let span = info_span!("step", name = step.step_name());
            let _enter = span.enter();

            let next = step.execute(&table, &mut ctx)?;
            artifacts.push(self.output.write_table(step.artifact_name(), &next)?);

            let mut issues = shape_checks(&table, &next, step.is_filter());
            issues.extend(step.validate(&table, &next, &ctx));
            let decision = decide(&issues);
            for issue in &issues {
                match decision {
                    QualityDecision::Reject => error!("{:?}: {}", issue.issue_type, issue.description),
                    _ => info!("{:?}: {}", issue.issue_type, issue.description),
                }
            }
            results.push(StepResult {
                step: step.step_name().to_string(),
                artifact: step.artifact_name().to_string(),
                rows: next.height(),
                columns: next.width(),
                issues,
                decision,
            });

            if decision == QualityDecision::Reject {
                let report = ValidationReport::new(input, self.config.min_coverage_pct, results);
                self.output
                    .write_json(VALIDATION_REPORT_ARTIFACT, &serde_json::to_value(&report)?)?;
                return Err(CleanerError::Validation {
                    step: step.step_name().to_string(),
                    message: format!(
                        "{} error(s), see {}",
                        report.issue_count(QualitySeverity::Error),
                        VALIDATION_REPORT_ARTIFACT
                    ),
                });
            }
            if decision == QualityDecision::AcceptWithWarnings {
                warn!("Step '{}' passed with warnings", step.step_name());
            }
            table = next;
        }

        let proteins: Vec<&str> = table
            .column_names()
            .into_iter()
            .filter(|n| *n != PATIENT_ID_COLUMN && *n != TIMEPOINT_COLUMN)
            .collect();
        let statistics = summarize_columns(&table, &proteins);
        artifacts.push(self.output.write_table(STATISTICS_ARTIFACT, &statistics_table(&statistics))?);
        artifacts.push(self.output.write_table(MISSINGNESS_ARTIFACT, &sample_missingness(&table, &proteins))?);

        let report = ValidationReport::new(input, self.config.min_coverage_pct, results);
        artifacts.push(
            self.output
                .write_json(VALIDATION_REPORT_ARTIFACT, &serde_json::to_value(&report)?)?,
        );
        info!(
            "Cleaning finished: {} samples x {} proteins, decision {:?}",
            table.height(),
            proteins.len(),
            report.decision
        );

        Ok(PipelineResult {
            transformed: table,
            statistics,
            report,
            artifacts,
        })
    }
}

/// Per sample: key, number of proteins without a value and that share in percent
fn sample_missingness(table: &Table, proteins: &[&str]) -> Table {
    let rows = table.height();
    let missing: Vec<usize> = (0..rows)
        .map(|row| {
            proteins
                .iter()
                .filter(|p| table.cell(p, row).map_or(true, |v| v.as_f64().is_none()))
                .count()
        })
        .collect();

    let key_column = |name: &str| {
        table
            .column(name)
            .cloned()
            .unwrap_or_else(|| Column::new(name, vec![Value::Missing; rows]))
    };
    let columns = vec![
        key_column(PATIENT_ID_COLUMN),
        key_column(TIMEPOINT_COLUMN),
        Column::new("Missing Count", missing.iter().map(|m| Value::Number(*m as f64)).collect()),
        Column::new(
            "Missing (%)",
            missing.iter().map(|m| Value::from(percentage(*m, proteins.len()))).collect(),
        ),
    ];
    Table::from_columns(columns).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{COVERAGE_FILTERED_ARTIFACT, TRANSFORMED_ARTIFACT};
    use crate::infra::artifact_output_adapter::InMemoryArtifactAdapter;

    fn config() -> CleanerConfig {
        CleanerConfig {
            id_column_index: 0,
            column_af_index: 1,
            patient_start_index: 2,
            min_coverage_pct: 50.0,
            ..CleanerConfig::default()
        }
    }

    fn raw() -> Table {
        Table::from_columns(vec![
            Column::from_texts("Accession", &["P1", "P2", "P3"]),
            Column::from_texts("Gene", &["ALB", "", "TTR"]),
            Column::from_numbers("S1_T0", &[Some(1.0), Some(2.0), None]),
            Column::from_numbers("S1_T1", &[Some(3.0), None, None]),
            Column::from_numbers("S2_T0", &[None, None, Some(9.0)]),
        ])
        .unwrap()
    }

    #[test]
    fn test_pipeline_writes_every_artifact() {
        let sink = Arc::new(InMemoryArtifactAdapter::new());
        let pipeline = CleaningPipeline::new(config(), sink.clone());

        let result = pipeline.run_table(raw(), "memory").unwrap();

        assert_eq!(
            sink.names(),
            vec![
                "01_raw_data.csv",
                "02_rows_removed.csv",
                "03_columns_removed.csv",
                "04_ids_fused.csv",
                "05_labels_combined.csv",
                "06_coverage_filtered.csv",
                "07_transformed_data.csv",
                "08_protein_statistics.csv",
                "09_sample_missingness.csv",
                "validation_report.json",
            ]
        );
        // ALB is in 2 of 3 samples; P2 and TTR only in one
        let filtered = sink.table(COVERAGE_FILTERED_ARTIFACT).unwrap();
        assert_eq!(filtered.height(), 1);

        let transformed = sink.table(TRANSFORMED_ARTIFACT).unwrap();
        assert_eq!(transformed.column_names(), vec!["PatientID", "Timepoint", "ALB"]);
        assert_eq!(transformed, result.transformed);
        assert_eq!(result.statistics.len(), 1);
        assert_eq!(result.report.decision, QualityDecision::Accept);
        assert_eq!(result.artifacts.len(), 10);
    }

    #[test]
    fn test_sample_missingness() {
        let table = Table::from_columns(vec![
            Column::from_texts("PatientID", &["1", "2"]),
            Column::from_texts("Timepoint", &["T0", "T0"]),
            Column::from_numbers("A", &[Some(1.0), None]),
            Column::from_numbers("B", &[None, None]),
        ])
        .unwrap();

        let out = sample_missingness(&table, &["A", "B"]);

        assert_eq!(out.cell("Missing Count", 0), Some(&Value::Number(1.0)));
        assert_eq!(out.cell("Missing (%)", 1), Some(&Value::Number(100.0)));
    }
}
