use std::collections::HashSet;

use tracing::{info, warn};

use super::{CleaningStep, StepContext};
use crate::constants::{PATIENT_ID_COLUMN, TIMEPOINT_COLUMN, TRANSFORMED_ARTIFACT};
use crate::error::{CleanerError, Result};
use crate::pipeline::quality_gate::{QualityIssue, QualityIssueType, QualitySeverity};
use crate::table::{Column, Table, Value};

/// Turns the protein-by-sample sheet into one row per sample with
/// `PatientID`, `Timepoint` and one column per protein
pub struct TransformStep;

/// Split a sample header at the last `separator` into (patient, timepoint)
pub fn parse_sample_header(header: &str, separator: &str) -> Result<(String, String)> {
    let error = || CleanerError::SampleHeader {
        header: header.to_string(),
        separator: separator.to_string(),
    };
    let (patient, timepoint) = header.rsplit_once(separator).ok_or_else(error)?;
    let (patient, timepoint) = (patient.trim(), timepoint.trim());
    if patient.is_empty() || timepoint.is_empty() {
        return Err(error());
    }
    Ok((patient.to_string(), timepoint.to_string()))
}

impl CleaningStep for TransformStep {
    fn step_name(&self) -> &'static str {
        "transform"
    }

    fn artifact_name(&self) -> &'static str {
        TRANSFORMED_ARTIFACT
    }

    fn is_filter(&self) -> bool {
        false
    }

    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table> {
        let separator = &ctx.config.sample_separator;
        let samples = ctx.layout.samples();
        let keys = samples
            .iter()
            .map(|s| parse_sample_header(s, separator))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Table::new();
        out.push_column(Column::new(
            PATIENT_ID_COLUMN,
            keys.iter().map(|(p, _)| Value::Text(p.clone())).collect(),
        ))?;
        out.push_column(Column::new(
            TIMEPOINT_COLUMN,
            keys.iter().map(|(_, t)| Value::Text(t.clone())).collect(),
        ))?;

        let ids = table.require_column(&ctx.layout.id_column, "input")?;
        for row in 0..table.height() {
            let Some(protein) = ids.values[row].key_text() else {
                warn!("Skipping row {} without a protein name", row);
                continue;
            };
            let values = samples
                .iter()
                .map(|s| table.cell(s, row).cloned().unwrap_or_default())
                .collect();
            out.push_column(Column::new(protein, values))?;
        }

        info!(
            "Transformed {} proteins x {} samples into {} sample rows",
            table.height(),
            samples.len(),
            out.height()
        );
        Ok(out)
    }

    fn validate(&self, _before: &Table, after: &Table, _ctx: &StepContext) -> Vec<QualityIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();
        for row in 0..after.height() {
            let patient = after.cell(PATIENT_ID_COLUMN, row).and_then(|v| v.key_text());
            let timepoint = after.cell(TIMEPOINT_COLUMN, row).and_then(|v| v.key_text());
            match (patient, timepoint) {
                (Some(p), Some(t)) => {
                    if !seen.insert((p.clone(), t.clone())) {
                        issues.push(QualityIssue::new(
                            QualityIssueType::DuplicateIdentifier,
                            QualitySeverity::Warning,
                            format!("sample {}/{} occurs more than once", p, t),
                        ));
                    }
                }
                _ => issues.push(QualityIssue::new(
                    QualityIssueType::MissingKey,
                    QualitySeverity::Error,
                    format!("row {} has no complete patient/timepoint key", row),
                )),
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sheet;
    use super::*;

    #[test]
    fn test_parse_sample_header() {
        assert_eq!(
            parse_sample_header("P001_T1", "_").unwrap(),
            ("P001".to_string(), "T1".to_string())
        );
        assert_eq!(
            parse_sample_header("site_A_day7", "_").unwrap(),
            ("site_A".to_string(), "day7".to_string())
        );
        assert!(matches!(
            parse_sample_header("P001", "_"),
            Err(CleanerError::SampleHeader { .. })
        ));
        assert!(parse_sample_header("P001_", "_").is_err());
    }

    #[test]
    fn test_transpose_to_sample_rows() {
        let (table, mut ctx) = sheet(&[
            ("P1", "G1", [Some(1.0), None, Some(3.0)]),
            ("P2", "G2", [Some(4.0), Some(5.0), None]),
        ]);
        let table = table.select(&["Accession", "P1_T0", "P1_T1", "P2_T0"]);

        let out = TransformStep.execute(&table, &mut ctx).unwrap();

        assert_eq!(out.column_names(), vec!["PatientID", "Timepoint", "P1", "P2"]);
        assert_eq!(out.height(), 3);
        assert_eq!(out.cell("PatientID", 2), Some(&Value::Text("P2".into())));
        assert_eq!(out.cell("Timepoint", 1), Some(&Value::Text("T1".into())));
        assert_eq!(out.cell("P1", 1), Some(&Value::Missing));
        assert_eq!(out.cell("P2", 1), Some(&Value::Number(5.0)));
        assert!(TransformStep.validate(&table, &out, &ctx).is_empty());
    }

    #[test]
    fn test_malformed_header_is_fatal() {
        let (table, mut ctx) = sheet(&[("P1", "G1", [Some(1.0), None, None])]);
        ctx.layout.sample_columns = vec!["Baseline".to_string()];
        let err = TransformStep.execute(&table, &mut ctx).unwrap_err();
        assert!(matches!(err, CleanerError::SampleHeader { .. }));
    }
}
