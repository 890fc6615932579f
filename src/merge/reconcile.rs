use serde::Serialize;
use tracing::{info, warn};

use crate::table::Table;

/// Value counts of one overlapping column before and after reconciliation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReconciliation {
    pub column: String,
    pub primary_count: usize,
    pub secondary_count: usize,
    pub filled: usize,
    pub merged_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub columns: Vec<ColumnReconciliation>,
}

impl ReconcileReport {
    pub fn total_filled(&self) -> usize {
        self.columns.iter().map(|c| c.filled).sum()
    }
}

/// Fold every `<name><suffix>` column back into `<name>`.
///
/// Missing primary cells take the secondary value; present primary cells are
/// kept as they are. The suffixed column is removed afterwards.
pub fn reconcile(table: &mut Table, overlapping: &[String], suffix: &str) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for name in overlapping {
        let secondary_name = format!("{}{}", name, suffix);
        if !table.has_column(name) {
            warn!("Column '{}' missing from merged table, keeping '{}'", name, secondary_name);
            continue;
        }
        let Some(secondary) = table.remove_column(&secondary_name) else {
            warn!("Column '{}' has no '{}' counterpart to reconcile", name, secondary_name);
            continue;
        };
        let Some(primary) = table.column_mut(name) else {
            continue;
        };

        let primary_count = primary.non_missing_count();
        let secondary_count = secondary.non_missing_count();
        info!(
            column = %name,
            primary_count,
            secondary_count,
            "Column exists in both datasets"
        );

        let filled = primary.fill_missing_from(&secondary);
        let merged_count = primary.non_missing_count();
        info!(column = %name, filled, merged_count, "Merged values");

        report.columns.push(ColumnReconciliation {
            column: name.clone(),
            primary_count,
            secondary_count,
            filled,
            merged_count,
        });
    }

    report
}
