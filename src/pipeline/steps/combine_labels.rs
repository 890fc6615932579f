use tracing::info;

use super::{collapse_duplicates, CleaningStep, StepContext};
use crate::constants::{LABELS_COMBINED_ARTIFACT, PROTEIN_COLUMN};
use crate::error::Result;
use crate::pipeline::quality_gate::{duplicate_check, QualityIssue};
use crate::table::{Column, Table, Value};

/// Replaces the identifier and label columns with a single `Protein` column.
///
/// The label wins when present; rows without one fall back to the fused id.
pub struct CombineLabelsStep;

impl CleaningStep for CombineLabelsStep {
    fn step_name(&self) -> &'static str {
        "combine_labels"
    }

    fn artifact_name(&self) -> &'static str {
        LABELS_COMBINED_ARTIFACT
    }

    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table> {
        let ids = table.require_column(&ctx.layout.id_column, "input")?;
        let labels = match &ctx.layout.label_column {
            Some(name) => Some(table.require_column(name, "input")?),
            None => None,
        };

        let mut from_label = 0;
        let proteins: Vec<Value> = (0..table.height())
            .map(|row| {
                let label = labels.and_then(|l| l.values[row].key_text());
                if label.is_some() {
                    from_label += 1;
                }
                label
                    .or_else(|| ids.values[row].key_text())
                    .map(Value::Text)
                    .unwrap_or(Value::Missing)
            })
            .collect();

        let mut out = table.clone();
        out.remove_column(&ctx.layout.id_column);
        if let Some(label) = &ctx.layout.label_column {
            out.remove_column(label);
        }
        out.insert_column(0, Column::new(PROTEIN_COLUMN, proteins))?;

        let collapsed = collapse_duplicates(&out, PROTEIN_COLUMN, &ctx.layout.sample_columns);
        info!(
            "Combined labels: {} of {} proteins labelled from the label column, {} rows after merging shared labels",
            from_label,
            table.height(),
            collapsed.height()
        );

        ctx.layout.id_column = PROTEIN_COLUMN.to_string();
        ctx.layout.label_column = None;
        Ok(collapsed)
    }

    fn validate(&self, _before: &Table, after: &Table, _ctx: &StepContext) -> Vec<QualityIssue> {
        duplicate_check(after, PROTEIN_COLUMN)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sheet;
    use super::*;

    #[test]
    fn test_label_preferred_over_id_and_shared_labels_merge() {
        let (table, mut ctx) = sheet(&[
            ("P1", "ALB", [Some(1.0), None, None]),
            ("P2", "", [Some(2.0), None, None]),
            ("P3", "ALB", [None, Some(3.0), None]),
        ]);

        let out = CombineLabelsStep.execute(&table, &mut ctx).unwrap();

        assert_eq!(out.column_names(), vec!["Protein", "Description", "P1_T0", "P1_T1", "P2_T0"]);
        assert_eq!(out.height(), 2);
        assert_eq!(out.cell("Protein", 0), Some(&Value::Text("ALB".into())));
        assert_eq!(out.cell("P1_T1", 0), Some(&Value::Number(3.0)));
        assert_eq!(out.cell("Protein", 1), Some(&Value::Text("P2".into())));
        assert_eq!(ctx.layout.id_column, "Protein");
        assert!(ctx.layout.label_column.is_none());
        assert!(CombineLabelsStep.validate(&table, &out, &ctx).is_empty());
    }
}
