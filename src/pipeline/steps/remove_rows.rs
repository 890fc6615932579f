use tracing::info;

use super::{sample_value_count, CleaningStep, StepContext};
use crate::constants::ROWS_REMOVED_ARTIFACT;
use crate::error::Result;
use crate::table::Table;

/// Drops rows without a protein identifier and rows with no sample values
pub struct RemoveRowsStep;

impl CleaningStep for RemoveRowsStep {
    fn step_name(&self) -> &'static str {
        "remove_rows"
    }

    fn artifact_name(&self) -> &'static str {
        ROWS_REMOVED_ARTIFACT
    }

    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table> {
        let ids = table.require_column(&ctx.layout.id_column, "input")?;
        let samples = ctx.layout.samples();

        let mut missing_id = 0;
        let mut no_values = 0;
        let mask: Vec<bool> = (0..table.height())
            .map(|row| {
                if ids.values[row].key_text().is_none() {
                    missing_id += 1;
                    false
                } else if sample_value_count(table, &samples, row) == 0 {
                    no_values += 1;
                    false
                } else {
                    true
                }
            })
            .collect();

        info!(
            "Removed {} rows without a protein id and {} rows without sample values",
            missing_id, no_values
        );
        Ok(table.filter_rows(&mask))
    }
}
