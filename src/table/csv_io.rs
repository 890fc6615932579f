use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use tracing::{debug, warn};

use super::{Column, Table, Value};
use crate::error::{CleanerError, Result};

/// Load a CSV file whose first row is the header.
///
/// Blank header cells are named `Unnamed: <index>` and repeated names get a
/// `.1`, `.2`, ... suffix so every column stays addressable.
pub fn read_csv(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|source| CleanerError::InputFile {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = dedupe_headers(reader.headers()?.iter());
    let mut values: Vec<Vec<Value>> = vec![Vec::new(); headers.len()];

    for (row_idx, record) in reader.records().enumerate() {
        let record = record?;
        if record.len() != headers.len() {
            debug!(
                "Row {} of {} has {} fields, header has {}",
                row_idx + 1,
                path.display(),
                record.len(),
                headers.len()
            );
        }
        for (col_idx, column) in values.iter_mut().enumerate() {
            column.push(record.get(col_idx).map(Value::parse).unwrap_or_default());
        }
    }

    let columns = headers
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    let table = Table::from_columns(columns)?;
    debug!(
        "Loaded {} rows x {} columns from {}",
        table.height(),
        table.width(),
        path.display()
    );
    Ok(table)
}

fn dedupe_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut names = Vec::new();
    for (idx, header) in raw.enumerate() {
        let trimmed = header.trim();
        let base = if trimmed.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            trimmed.to_string()
        };
        let mut name = base.clone();
        while let Some(count) = seen.get_mut(&name) {
            *count += 1;
            name = format!("{}.{}", base, count);
        }
        if name != base {
            warn!("Duplicate column header '{}' renamed to '{}'", base, name);
        }
        seen.insert(name.clone(), 0);
        names.push(name);
    }
    names
}

/// Write `table` to `path`, header first, replacing any existing file
pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.column_names())?;
    for row in 0..table.height() {
        writer.write_record(table.columns().iter().map(|c| c.values[row].to_string()))?;
    }
    writer.flush()?;
    Ok(())
}
