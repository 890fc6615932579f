use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use super::keys::{row_keys, CompositeKey, KeyColumns};
use crate::error::{CleanerError, Result};
use crate::table::{Column, Table, Value};

/// Result of [`outer_join`]
#[derive(Debug, Clone)]
pub struct JoinOutput {
    pub table: Table,
    /// Non-key columns present in both inputs, in primary-table order
    pub overlapping: Vec<String>,
    /// Rows whose key already appeared earlier in the primary table
    pub primary_duplicate_keys: usize,
    /// Rows whose key already appeared earlier in the secondary table
    pub secondary_duplicate_keys: usize,
}

/// Pairing of one output row with its source rows
struct RowPair {
    key: CompositeKey,
    primary: Option<usize>,
    secondary: Option<usize>,
}

/// Full outer join of `primary` and `secondary` on the composite key.
///
/// Every row of both inputs shows up in the result. A key repeated on one side
/// is paired with every row carrying that key on the other side. Secondary
/// columns whose name is also a primary non-key column get `suffix` appended.
///
/// Output columns: the primary columns in order (key cells taken from whichever
/// side supplied the row), then the secondary non-key columns. Output rows are
/// sorted by key, primary-first within equal keys.
pub fn outer_join(primary: &Table, secondary: &Table, keys: &KeyColumns, suffix: &str) -> Result<JoinOutput> {
    for name in keys.names() {
        primary.require_column(name, "primary")?;
        secondary.require_column(name, "secondary")?;
    }
    let primary_keys = row_keys(primary, keys, "primary")?;
    let secondary_keys = row_keys(secondary, keys, "secondary")?;

    let primary_duplicate_keys = count_duplicates(&primary_keys);
    let secondary_duplicate_keys = count_duplicates(&secondary_keys);
    if primary_duplicate_keys > 0 || secondary_duplicate_keys > 0 {
        warn!(
            "Duplicate join keys (primary: {}, secondary: {}); matching rows are expanded pairwise",
            primary_duplicate_keys, secondary_duplicate_keys
        );
    }

    let mut secondary_index: HashMap<&CompositeKey, Vec<usize>> = HashMap::new();
    for (row, key) in secondary_keys.iter().enumerate() {
        secondary_index.entry(key).or_default().push(row);
    }

    let mut pairs = Vec::with_capacity(primary.height().max(secondary.height()));
    let mut matched = vec![false; secondary.height()];
    for (p_row, key) in primary_keys.iter().enumerate() {
        match secondary_index.get(key) {
            Some(rows) => {
                for &s_row in rows {
                    matched[s_row] = true;
                    pairs.push(RowPair {
                        key: key.clone(),
                        primary: Some(p_row),
                        secondary: Some(s_row),
                    });
                }
            }
            None => pairs.push(RowPair {
                key: key.clone(),
                primary: Some(p_row),
                secondary: None,
            }),
        }
    }
    for (s_row, key) in secondary_keys.iter().enumerate() {
        if !matched[s_row] {
            pairs.push(RowPair {
                key: key.clone(),
                primary: None,
                secondary: Some(s_row),
            });
        }
    }
    pairs.sort_by(|a, b| a.key.cmp(&b.key));

    let primary_names: HashSet<&str> = primary.column_names().into_iter().collect();
    let mut overlapping = Vec::new();
    let mut merged = Table::new();

    for column in primary.columns() {
        let values = if column.name == keys.patient {
            pairs.iter().map(|p| Value::Text(p.key.patient.clone())).collect()
        } else if column.name == keys.timepoint {
            pairs.iter().map(|p| Value::Text(p.key.timepoint.clone())).collect()
        } else {
            if secondary.has_column(&column.name) {
                overlapping.push(column.name.clone());
            }
            gather(column, pairs.iter().map(|p| p.primary))
        };
        merged.push_column(Column::new(column.name.clone(), values))?;
    }

    for column in secondary.columns().iter().filter(|c| !keys.contains(&c.name)) {
        let name = if primary_names.contains(column.name.as_str()) {
            format!("{}{}", column.name, suffix)
        } else {
            column.name.clone()
        };
        if merged.has_column(&name) {
            return Err(CleanerError::ColumnCollision(name));
        }
        let values = gather(column, pairs.iter().map(|p| p.secondary));
        merged.push_column(Column::new(name, values))?;
    }

    debug!(
        "Outer join: {} primary rows + {} secondary rows -> {} rows, {} overlapping columns",
        primary.height(),
        secondary.height(),
        merged.height(),
        overlapping.len()
    );

    Ok(JoinOutput {
        table: merged,
        overlapping,
        primary_duplicate_keys,
        secondary_duplicate_keys,
    })
}

fn gather(column: &Column, rows: impl Iterator<Item = Option<usize>>) -> Vec<Value> {
    rows.map(|row| row.map(|r| column.values[r].clone()).unwrap_or(Value::Missing))
        .collect()
}

fn count_duplicates(keys: &[CompositeKey]) -> usize {
    let mut seen = HashSet::new();
    keys.iter().filter(|k| !seen.insert(*k)).count()
}
