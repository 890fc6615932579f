//! Merge of two cleaned sample-by-protein tables.
//!
//! Load → key normalization → outer join → reconciliation → summary. The I/O
//! around it lives in [`crate::app::merge_use_case`].

pub mod join;
pub mod keys;
pub mod reconcile;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, info_span};

pub use join::{outer_join, JoinOutput};
pub use keys::{normalize_keys, CompositeKey, KeyColumns};
pub use reconcile::{reconcile, ColumnReconciliation, ReconcileReport};

use crate::config::MergeConfig;
use crate::error::Result;
use crate::stats::{summarize_columns, ProteinSummary};
use crate::table::Table;

/// Audit record of a merge run
#[derive(Debug, Clone, Serialize)]
pub struct MergeReport {
    pub generated_at: DateTime<Utc>,
    pub primary_rows: usize,
    pub secondary_rows: usize,
    pub primary_rows_without_key: usize,
    pub secondary_rows_without_key: usize,
    pub primary_duplicate_keys: usize,
    pub secondary_duplicate_keys: usize,
    pub merged_rows: usize,
    pub total_proteins: usize,
    pub unique_patients: usize,
    pub unique_timepoints: usize,
    pub overlapping_columns: usize,
    pub summarized_proteins: usize,
    pub reconciliation: ReconcileReport,
}

/// Merged table plus everything derived from it
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub merged: Table,
    pub summary: Vec<ProteinSummary>,
    pub report: MergeReport,
}

/// Merge `secondary` into `primary` in memory.
///
/// Primary values always win; the secondary table only fills gaps in columns
/// both tables share, and contributes its own columns as they are.
pub fn merge_tables(mut primary: Table, mut secondary: Table, config: &MergeConfig) -> Result<MergeOutcome> {
    let span = info_span!("merge", suffix = %config.suffix);
    let _enter = span.enter();

    let keys = config.key_columns();
    let primary_rows = primary.height();
    let secondary_rows = secondary.height();

    let primary_rows_without_key = normalize_keys(&mut primary, &keys, "primary")?;
    let secondary_rows_without_key = normalize_keys(&mut secondary, &keys, "secondary")?;

    info!("Merging datasets on {} and {}", keys.patient, keys.timepoint);
    let JoinOutput {
        table: mut merged,
        overlapping,
        primary_duplicate_keys,
        secondary_duplicate_keys,
    } = outer_join(&primary, &secondary, &keys, &config.suffix)?;
    info!("Found {} overlapping protein columns", overlapping.len());

    let reconciliation = reconcile(&mut merged, &overlapping, &config.suffix);

    let proteins: Vec<&str> = merged
        .column_names()
        .into_iter()
        .filter(|name| !keys.contains(name))
        .collect();
    let summary = summarize_columns(&merged, &proteins);

    let report = MergeReport {
        generated_at: Utc::now(),
        primary_rows,
        secondary_rows,
        primary_rows_without_key,
        secondary_rows_without_key,
        primary_duplicate_keys,
        secondary_duplicate_keys,
        merged_rows: merged.height(),
        total_proteins: proteins.len(),
        unique_patients: distinct(&merged, &keys.patient),
        unique_timepoints: distinct(&merged, &keys.timepoint),
        overlapping_columns: overlapping.len(),
        summarized_proteins: summary.len(),
        reconciliation,
    };
    info!(
        "Merged dataset contains {} proteins, {} unique patients, and {} timepoints",
        report.total_proteins, report.unique_patients, report.unique_timepoints
    );

    Ok(MergeOutcome {
        merged,
        summary,
        report,
    })
}

fn distinct(table: &Table, column: &str) -> usize {
    table
        .column(column)
        .map(|c| c.values.iter().filter_map(|v| v.key_text()).collect::<HashSet<_>>().len())
        .unwrap_or(0)
}
