use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{debug, info};

use crate::app::ports::ArtifactSink;
use crate::error::{CleanerError, Result};
use crate::table::{write_csv, Table};

/// File-based implementation of [`ArtifactSink`].
/// Tables are written as CSV and reports as pretty-printed JSON under one directory.
pub struct FileArtifactAdapter {
    output_dir: PathBuf,
}

impl FileArtifactAdapter {
    /// Create the adapter, creating `output_dir` and its parents if needed
    pub fn new(output_dir: &Path) -> Result<Self> {
        fs::create_dir_all(output_dir).map_err(|source| CleanerError::OutputDir {
            path: output_dir.to_path_buf(),
            source,
        })?;
        info!("Writing artifacts to {}", output_dir.display());
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

impl ArtifactSink for FileArtifactAdapter {
    fn write_table(&self, name: &str, table: &Table) -> Result<String> {
        let path = self.path_for(name);
        write_csv(table, &path)?;
        debug!(
            "Saved {} rows x {} columns to {}",
            table.height(),
            table.width(),
            path.display()
        );
        Ok(path.to_string_lossy().to_string())
    }

    fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<String> {
        let path = self.path_for(name);
        let json_content = serde_json::to_string_pretty(value)?;
        fs::write(&path, json_content)?;
        debug!("Saved report to {}", path.display());
        Ok(path.to_string_lossy().to_string())
    }
}

/// Keeps artifacts in memory; used by tests and dry runs
#[derive(Default)]
pub struct InMemoryArtifactAdapter {
    tables: Mutex<HashMap<String, Table>>,
    reports: Mutex<HashMap<String, serde_json::Value>>,
}

impl InMemoryArtifactAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<Table> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.get(name).cloned()
    }

    pub fn report(&self, name: &str) -> Option<serde_json::Value> {
        let reports = self.reports.lock().unwrap_or_else(|e| e.into_inner());
        reports.get(name).cloned()
    }

    /// Names of all stored artifacts, sorted
    pub fn names(&self) -> Vec<String> {
        let tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        let reports = self.reports.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = tables.keys().chain(reports.keys()).cloned().collect();
        names.sort();
        names
    }
}

impl ArtifactSink for InMemoryArtifactAdapter {
    fn write_table(&self, name: &str, table: &Table) -> Result<String> {
        let mut tables = self.tables.lock().unwrap_or_else(|e| e.into_inner());
        tables.insert(name.to_string(), table.clone());
        Ok(name.to_string())
    }

    fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<String> {
        let mut reports = self.reports.lock().unwrap_or_else(|e| e.into_inner());
        reports.insert(name.to_string(), value.clone());
        Ok(name.to_string())
    }
}
