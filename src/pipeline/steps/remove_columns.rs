use tracing::info;

use super::{CleaningStep, StepContext};
use crate::constants::COLUMNS_REMOVED_ARTIFACT;
use crate::error::Result;
use crate::table::Table;

/// Keeps the identifier, the label and the sample columns that hold at least
/// one value; every other annotation column is dropped
pub struct RemoveColumnsStep;

impl CleaningStep for RemoveColumnsStep {
    fn step_name(&self) -> &'static str {
        "remove_columns"
    }

    fn artifact_name(&self) -> &'static str {
        COLUMNS_REMOVED_ARTIFACT
    }

    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table> {
        let layout = &ctx.layout;
        let mut keep: Vec<&str> = vec![layout.id_column.as_str()];
        if let Some(label) = &layout.label_column {
            keep.push(label);
        }

        let mut empty_samples = Vec::new();
        for sample in &layout.sample_columns {
            match table.column(sample) {
                Some(column) if column.numeric_values().is_empty() => empty_samples.push(sample.clone()),
                Some(_) => keep.push(sample),
                None => {}
            }
        }

        let out = table.select(&keep);
        info!(
            "Kept {} of {} columns ({} empty sample columns dropped)",
            out.width(),
            table.width(),
            empty_samples.len()
        );
        ctx.layout.retain_samples(&out);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sheet;
    use super::*;

    #[test]
    fn test_keeps_id_label_and_non_empty_samples() {
        let (table, mut ctx) = sheet(&[
            ("P1", "G1", [Some(1.0), None, Some(2.0)]),
            ("P2", "G2", [Some(3.0), None, None]),
        ]);

        let out = RemoveColumnsStep.execute(&table, &mut ctx).unwrap();

        assert_eq!(out.column_names(), vec!["Accession", "Gene", "P1_T0", "P2_T0"]);
        assert_eq!(ctx.layout.samples(), vec!["P1_T0", "P2_T0"]);
    }
}
