use crate::error::Result;
use crate::table::Table;

/// Destination for the artifacts a run produces (tables and JSON reports).
///
/// Each call writes one named artifact and returns where it ended up. Writing
/// the same name twice replaces the earlier artifact.
pub trait ArtifactSink {
    fn write_table(&self, name: &str, table: &Table) -> Result<String>;

    fn write_json(&self, name: &str, value: &serde_json::Value) -> Result<String>;
}
