use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{PATIENT_ID_COLUMN, TIMEPOINT_COLUMN};
use crate::error::{CleanerError, Result};
use crate::table::{Column, Table, Value};

/// Names of the two columns forming the composite sample key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyColumns {
    pub patient: String,
    pub timepoint: String,
}

impl Default for KeyColumns {
    fn default() -> Self {
        Self {
            patient: PATIENT_ID_COLUMN.to_string(),
            timepoint: TIMEPOINT_COLUMN.to_string(),
        }
    }
}

impl KeyColumns {
    pub fn names(&self) -> [&str; 2] {
        [&self.patient, &self.timepoint]
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patient == name || self.timepoint == name
    }
}

/// (PatientID, Timepoint) of one row, in canonical text form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey {
    pub patient: String,
    pub timepoint: String,
}

impl CompositeKey {
    /// Key of `row`, `None` when either part is missing
    pub fn of_row(table: &Table, keys: &KeyColumns, row: usize) -> Option<Self> {
        let patient = table.cell(&keys.patient, row)?.key_text()?;
        let timepoint = table.cell(&keys.timepoint, row)?.key_text()?;
        Some(Self { patient, timepoint })
    }
}

impl Ord for CompositeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_key_part(&self.patient, &other.patient)
            .then_with(|| compare_key_part(&self.timepoint, &other.timepoint))
    }
}

impl PartialOrd for CompositeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Numeric parts sort numerically and ahead of text parts; text sorts lexically.
fn compare_key_part(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y).then_with(|| a.cmp(b)),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Bring the key columns of `table` to canonical text so keys compare equal
/// across tables regardless of how each file spelled them (`7` vs `7.0`).
///
/// Fails when a key column is absent. Rows with a missing key part cannot be
/// joined and are dropped with a warning; the number dropped is returned.
pub fn normalize_keys(table: &mut Table, keys: &KeyColumns, table_label: &str) -> Result<usize> {
    for name in keys.names() {
        let column = table.require_column(name, table_label)?;
        let normalized: Vec<Value> = column
            .values
            .iter()
            .map(|v| v.key_text().map(Value::Text).unwrap_or(Value::Missing))
            .collect();
        if let Some(col) = table.column_mut(name) {
            *col = Column::new(name, normalized);
        }
    }

    let mask: Vec<bool> = (0..table.height())
        .map(|row| CompositeKey::of_row(table, keys, row).is_some())
        .collect();
    let dropped = mask.iter().filter(|keep| !**keep).count();
    if dropped > 0 {
        warn!(
            "{} table: dropping {} rows without a complete {}/{} key",
            table_label, dropped, keys.patient, keys.timepoint
        );
        *table = table.filter_rows(&mask);
    }
    Ok(dropped)
}

/// Keys of every row, failing on the first incomplete one
pub fn row_keys(table: &Table, keys: &KeyColumns, table_label: &str) -> Result<Vec<CompositeKey>> {
    (0..table.height())
        .map(|row| {
            CompositeKey::of_row(table, keys, row).ok_or_else(|| CleanerError::MissingKey {
                table: table_label.to_string(),
                column: keys.patient.clone(),
                row,
            })
        })
        .collect()
}
