use std::collections::HashMap;

use serde::Serialize;

use super::quality_gate::{QualityDecision, QualityIssue};
use crate::config::CleanerConfig;
use crate::error::{CleanerError, Result};
use crate::table::{Column, Table, Value};

/// Common trait for all cleaning steps
pub trait CleaningStep {
    /// Name of this step in logs and the validation report
    fn step_name(&self) -> &'static str;

    /// File the step's output table is saved as
    fn artifact_name(&self) -> &'static str;

    /// Produce the step's output from the previous step's table. Steps that
    /// change which columns are samples or identifiers update `ctx.layout`.
    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table>;

    /// Step-specific checks of the output, in addition to the shape checks
    fn validate(&self, _before: &Table, _after: &Table, _ctx: &StepContext) -> Vec<QualityIssue> {
        Vec::new()
    }

    /// Whether the step only removes data (rows/columns must not grow)
    fn is_filter(&self) -> bool {
        true
    }
}

/// Result of executing one cleaning step
#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub step: String,
    pub artifact: String,
    pub rows: usize,
    pub columns: usize,
    pub issues: Vec<QualityIssue>,
    pub decision: QualityDecision,
}

/// Column roles in the wide protein-by-sample sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub id_column: String,
    pub label_column: Option<String>,
    pub sample_columns: Vec<String>,
}

impl SheetLayout {
    /// Map the configured column indices onto the loaded sheet's headers
    pub fn resolve(table: &Table, config: &CleanerConfig) -> Result<Self> {
        let names = table.column_names();
        let name_at = |index: usize, what: &str| {
            names.get(index).map(|n| n.to_string()).ok_or_else(|| {
                CleanerError::Config(format!(
                    "{} index {} is out of range, the sheet has {} columns",
                    what,
                    index,
                    names.len()
                ))
            })
        };
        let id_column = name_at(config.id_column_index, "protein id column")?;
        let label_column = name_at(config.column_af_index, "label column")?;
        if config.patient_start_index >= names.len() {
            return Err(CleanerError::Config(format!(
                "patient start index {} is out of range, the sheet has {} columns",
                config.patient_start_index,
                names.len()
            )));
        }
        let sample_columns = names[config.patient_start_index..].iter().map(|n| n.to_string()).collect();
        Ok(Self {
            id_column,
            label_column: Some(label_column),
            sample_columns,
        })
    }

    pub fn samples(&self) -> Vec<&str> {
        self.sample_columns.iter().map(String::as_str).collect()
    }

    /// Forget sample columns that are no longer in `table`
    pub fn retain_samples(&mut self, table: &Table) {
        self.sample_columns.retain(|name| table.has_column(name));
    }
}

/// State carried from step to step
#[derive(Debug, Clone)]
pub struct StepContext {
    pub config: CleanerConfig,
    pub layout: SheetLayout,
}

/// Number of samples of `row` holding a numeric value
pub(crate) fn sample_value_count(table: &Table, samples: &[&str], row: usize) -> usize {
    samples
        .iter()
        .filter_map(|name| table.cell(name, row))
        .filter(|v| v.as_f64().is_some())
        .count()
}

/// Collapse rows sharing the same `key_column` value into one row.
///
/// Groups keep the position of their first row. Sample cells take the first
/// non-missing value of the group in row order; other cells come from the
/// group's first row. Rows without a key are never grouped.
pub(crate) fn collapse_duplicates(table: &Table, key_column: &str, samples: &[String]) -> Table {
    let Some(keys) = table.column(key_column) else {
        return table.clone();
    };

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for (row, value) in keys.values.iter().enumerate() {
        match value.key_text() {
            Some(key) => match by_key.get(&key) {
                Some(&group) => groups[group].push(row),
                None => {
                    by_key.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            },
            None => groups.push(vec![row]),
        }
    }
    if groups.len() == table.height() {
        return table.clone();
    }

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let is_sample = samples.iter().any(|s| *s == column.name);
            let values = groups
                .iter()
                .map(|rows| {
                    if is_sample {
                        rows.iter()
                            .map(|&r| &column.values[r])
                            .find(|v| !v.is_missing())
                            .cloned()
                            .unwrap_or(Value::Missing)
                    } else {
                        column.values[rows[0]].clone()
                    }
                })
                .collect();
            Column::new(column.name.clone(), values)
        })
        .collect();
    // same names as the input, equal lengths
    Table::from_columns(columns).unwrap_or_default()
}

pub mod combine_labels;
pub mod coverage;
pub mod fuse_ids;
pub mod remove_columns;
pub mod remove_rows;
pub mod transform;

pub use combine_labels::CombineLabelsStep;
pub use coverage::CoverageFilterStep;
pub use fuse_ids::FuseIdsStep;
pub use remove_columns::RemoveColumnsStep;
pub use remove_rows::RemoveRowsStep;
pub use transform::TransformStep;

/// The cleaning steps in execution order
pub fn default_steps() -> Vec<Box<dyn CleaningStep>> {
    vec![
        Box::new(RemoveRowsStep),
        Box::new(RemoveColumnsStep),
        Box::new(FuseIdsStep),
        Box::new(CombineLabelsStep),
        Box::new(CoverageFilterStep),
        Box::new(TransformStep),
    ]
}
