use serde::Serialize;
use tracing::debug;

use super::{count_outliers, percentage, Describe};
use crate::constants::PROTEIN_COLUMN;
use crate::table::{Column, Table, Value};

/// Per-protein coverage and descriptive statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProteinSummary {
    pub protein: String,
    pub coverage_pct: f64,
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std: Option<f64>,
    pub outliers: usize,
}

/// Summarize the given columns of `table`.
///
/// Coverage is the share of rows holding a numeric value. Columns without any
/// numeric value are left out. Rows come back sorted by coverage, highest
/// first, with ties in the order of `columns`.
pub fn summarize_columns(table: &Table, columns: &[&str]) -> Vec<ProteinSummary> {
    let total = table.height();
    let mut rows: Vec<ProteinSummary> = columns
        .iter()
        .filter_map(|name| table.column(name))
        .filter_map(|column| summarize_column(column, total))
        .collect();

    // sort_by is stable, which keeps input order for equal coverage
    rows.sort_by(|a, b| b.coverage_pct.total_cmp(&a.coverage_pct));
    rows
}

fn summarize_column(column: &Column, total: usize) -> Option<ProteinSummary> {
    let values = column.numeric_values();
    let Some(describe) = Describe::of(&values) else {
        debug!("Column '{}' has no values, left out of the summary", column.name);
        return None;
    };
    Some(ProteinSummary {
        protein: column.name.clone(),
        coverage_pct: percentage(describe.count, total),
        count: describe.count,
        min: describe.min,
        max: describe.max,
        mean: describe.mean,
        std: describe.std,
        outliers: count_outliers(&values),
    })
}

/// `Protein, Coverage (%), Count, Min, Max, Mean, Std`
pub fn summary_table(rows: &[ProteinSummary]) -> Table {
    assemble(base_columns(rows))
}

/// The summary columns followed by an `Outliers` count
pub fn statistics_table(rows: &[ProteinSummary]) -> Table {
    let mut columns = base_columns(rows);
    columns.push(Column::new(
        "Outliers",
        rows.iter().map(|r| Value::Number(r.outliers as f64)).collect(),
    ));
    assemble(columns)
}

fn base_columns(rows: &[ProteinSummary]) -> Vec<Column> {
    vec![
        Column::new(PROTEIN_COLUMN, rows.iter().map(|r| Value::Text(r.protein.clone())).collect()),
        Column::new("Coverage (%)", rows.iter().map(|r| Value::from(r.coverage_pct)).collect()),
        Column::new("Count", rows.iter().map(|r| Value::Number(r.count as f64)).collect()),
        Column::new("Min", rows.iter().map(|r| Value::from(r.min)).collect()),
        Column::new("Max", rows.iter().map(|r| Value::from(r.max)).collect()),
        Column::new("Mean", rows.iter().map(|r| Value::from(r.mean)).collect()),
        Column::new("Std", rows.iter().map(|r| Value::from(r.std)).collect()),
    ]
}

fn assemble(columns: Vec<Column>) -> Table {
    // names are fixed and distinct, lengths all equal rows.len()
    Table::from_columns(columns).unwrap_or_default()
}
