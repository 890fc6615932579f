//! In-memory column-oriented table used by every stage of the cleaner.
//!
//! A [`Table`] is an ordered list of uniquely named [`Column`]s of equal length.
//! Cells are [`Value`]s: a number, a piece of text, or missing.

pub mod csv_io;

use std::collections::HashSet;
use std::fmt;

use crate::constants::MISSING_TOKENS;
use crate::error::{CleanerError, Result};

pub use csv_io::{read_csv, write_csv};

/// A single table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

impl Value {
    /// Parse a raw CSV field. Missing-value tokens become [`Value::Missing`],
    /// finite numbers become [`Value::Number`], everything else is kept as text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if MISSING_TOKENS.contains(&trimmed) {
            return Value::Missing;
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            Ok(_) => Value::Missing,
            Err(_) => Value::Text(trimmed.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text rendering used for identifiers and join keys.
    ///
    /// Integral numbers render without a fractional part so that `7` and `7.0`
    /// produce the same key.
    pub fn key_text(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => Some(format!("{}", *n as i64)),
            Value::Number(n) => Some(n.to_string()),
            Value::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Missing => Ok(()),
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        if n.is_finite() {
            Value::Number(n)
        } else {
            Value::Missing
        }
    }
}

impl From<Option<f64>> for Value {
    fn from(n: Option<f64>) -> Self {
        n.map(Value::from).unwrap_or(Value::Missing)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// A named sequence of values
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Numeric column from optional floats, `None` being missing
    pub fn from_numbers(name: impl Into<String>, values: &[Option<f64>]) -> Self {
        Self::new(name, values.iter().map(|v| Value::from(*v)).collect())
    }

    pub fn from_texts(name: impl Into<String>, values: &[&str]) -> Self {
        Self::new(name, values.iter().map(|v| Value::parse(v)).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn non_missing_count(&self) -> usize {
        self.values.iter().filter(|v| !v.is_missing()).count()
    }

    /// Numeric cells in row order; text and missing cells are skipped
    pub fn numeric_values(&self) -> Vec<f64> {
        self.values.iter().filter_map(Value::as_f64).collect()
    }

    /// Copy `other`'s value into every missing cell of `self`.
    /// Present values are never overwritten. Returns how many cells were filled.
    pub fn fill_missing_from(&mut self, other: &Column) -> usize {
        let mut filled = 0;
        for (mine, theirs) in self.values.iter_mut().zip(other.values.iter()) {
            if mine.is_missing() && !theirs.is_missing() {
                *mine = theirs.clone();
                filled += 1;
            }
        }
        filled
    }
}

/// Ordered collection of equally long, uniquely named columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table, checking that names are unique and lengths agree
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut table = Table::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Like [`Table::column`] but fails with [`CleanerError::MissingColumn`]
    pub fn require_column(&self, name: &str, table_label: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| CleanerError::MissingColumn {
            table: table_label.to_string(),
            column: name.to_string(),
        })
    }

    pub fn push_column(&mut self, column: Column) -> Result<()> {
        let position = self.width();
        self.insert_column(position, column)
    }

    pub fn insert_column(&mut self, position: usize, column: Column) -> Result<()> {
        if self.has_column(&column.name) {
            return Err(CleanerError::ColumnCollision(column.name));
        }
        if !self.columns.is_empty() && column.len() != self.height() {
            let actual = column.len();
            return Err(CleanerError::ShapeMismatch {
                column: column.name,
                expected: self.height(),
                actual,
            });
        }
        let position = position.min(self.columns.len());
        self.columns.insert(position, column);
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Column> {
        let idx = self.index_of(name)?;
        Some(self.columns.remove(idx))
    }

    pub fn cell(&self, column: &str, row: usize) -> Option<&Value> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Keep the rows whose mask entry is `true`
    pub fn filter_rows(&self, mask: &[bool]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let values = c
                    .values
                    .iter()
                    .zip(mask.iter())
                    .filter(|(_, keep)| **keep)
                    .map(|(v, _)| v.clone())
                    .collect();
                Column::new(c.name.clone(), values)
            })
            .collect();
        Table { columns }
    }

    /// Projection onto `names`, in that order. Unknown names are skipped.
    pub fn select(&self, names: &[&str]) -> Table {
        let mut seen = HashSet::new();
        let columns = names
            .iter()
            .filter(|n| seen.insert(**n))
            .filter_map(|n| self.column(n).cloned())
            .collect();
        Table { columns }
    }
}
