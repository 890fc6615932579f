use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{
    DEFAULT_COLUMN_AF_INDEX, DEFAULT_ID_COLUMN_INDEX, DEFAULT_MIN_COVERAGE_PCT, DEFAULT_PATIENT_START_INDEX,
    DEFAULT_SAMPLE_SEPARATOR, MERGED_FILENAME, MERGE_REPORT_FILENAME, PATIENT_ID_COLUMN, SECONDARY_SUFFIX,
    SUMMARY_FILENAME, TIMEPOINT_COLUMN,
};
use crate::error::{CleanerError, Result};
use crate::merge::KeyColumns;

/// Settings file layout. Both sections are optional.
///
/// ```toml
/// [cleaner]
/// column_af_index = 31
/// patient_start_index = 47
/// min_coverage_pct = 10.0
///
/// [merge]
/// suffix = "_combat"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cleaner: CleanerConfig,
    pub merge: MergeConfig,
}

/// Layout of the wide input sheet and cleaning thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanerConfig {
    /// Column holding the protein accession(s)
    pub id_column_index: usize,
    /// Column holding the alternative protein label (spreadsheet column AF)
    pub column_af_index: usize,
    /// First sample column; every column from here on is a sample
    pub patient_start_index: usize,
    /// Minimum percentage of samples with a value for a protein to be kept
    pub min_coverage_pct: f64,
    /// Separator between patient and timepoint in sample headers
    pub sample_separator: String,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            id_column_index: DEFAULT_ID_COLUMN_INDEX,
            column_af_index: DEFAULT_COLUMN_AF_INDEX,
            patient_start_index: DEFAULT_PATIENT_START_INDEX,
            min_coverage_pct: DEFAULT_MIN_COVERAGE_PCT,
            sample_separator: DEFAULT_SAMPLE_SEPARATOR.to_string(),
        }
    }
}

impl CleanerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_coverage_pct) {
            return Err(CleanerError::Config(format!(
                "min_coverage_pct must be between 0 and 100, got {}",
                self.min_coverage_pct
            )));
        }
        if self.id_column_index == self.column_af_index {
            return Err(CleanerError::Config(
                "id_column_index and column_af_index must point at different columns".to_string(),
            ));
        }
        if self.id_column_index >= self.patient_start_index || self.column_af_index >= self.patient_start_index {
            return Err(CleanerError::Config(format!(
                "annotation columns ({}, {}) must come before patient_start_index {}",
                self.id_column_index, self.column_af_index, self.patient_start_index
            )));
        }
        if self.sample_separator.is_empty() {
            return Err(CleanerError::Config("sample_separator must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Join keys, suffix and output names of the merge utility
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub patient_column: String,
    pub timepoint_column: String,
    /// Appended to secondary columns that collide with primary columns
    pub suffix: String,
    pub merged_filename: String,
    pub summary_filename: String,
    pub report_filename: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            patient_column: PATIENT_ID_COLUMN.to_string(),
            timepoint_column: TIMEPOINT_COLUMN.to_string(),
            suffix: SECONDARY_SUFFIX.to_string(),
            merged_filename: MERGED_FILENAME.to_string(),
            summary_filename: SUMMARY_FILENAME.to_string(),
            report_filename: MERGE_REPORT_FILENAME.to_string(),
        }
    }
}

impl MergeConfig {
    pub fn key_columns(&self) -> KeyColumns {
        KeyColumns {
            patient: self.patient_column.clone(),
            timepoint: self.timepoint_column.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.patient_column.is_empty() || self.timepoint_column.is_empty() {
            return Err(CleanerError::Config("key column names must not be empty".to_string()));
        }
        if self.patient_column == self.timepoint_column {
            return Err(CleanerError::Config(format!(
                "patient and timepoint columns must differ, both are '{}'",
                self.patient_column
            )));
        }
        if self.suffix.is_empty() {
            return Err(CleanerError::Config("suffix must not be empty".to_string()));
        }
        let names = [&self.merged_filename, &self.summary_filename, &self.report_filename];
        if names.iter().any(|n| n.is_empty()) {
            return Err(CleanerError::Config("output filenames must not be empty".to_string()));
        }
        if names[0] == names[1] || names[0] == names[2] || names[1] == names[2] {
            return Err(CleanerError::Config("output filenames must be distinct".to_string()));
        }
        Ok(())
    }
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            CleanerError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.cleaner.validate()?;
        config.merge.validate()?;
        Ok(config)
    }

    /// Settings from `config_path` when given, defaults otherwise
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[cleaner]\nmin_coverage_pct = 25.0\n").unwrap();
        assert_eq!(config.cleaner.min_coverage_pct, 25.0);
        assert_eq!(config.cleaner.column_af_index, 31);
        assert_eq!(config.merge, MergeConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cleaner.toml");
        fs::write(&path, "[merge]\nsuffix = \"_b\"\npatient_column = \"Subject\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.merge.suffix, "_b");
        assert_eq!(config.merge.key_columns().patient, "Subject");
        assert_eq!(config.merge.key_columns().timepoint, "Timepoint");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }

    #[test]
    fn test_invalid_file_is_rejected_on_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cleaner.toml");
        fs::write(&path, "[merge]\nsuffix = \"\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, CleanerError::Config(_)));
    }

    #[test]
    fn test_validation() {
        assert!(CleanerConfig::default().validate().is_ok());
        assert!(MergeConfig::default().validate().is_ok());

        let bad_coverage = CleanerConfig {
            min_coverage_pct: 120.0,
            ..CleanerConfig::default()
        };
        assert!(bad_coverage.validate().is_err());

        let label_in_samples = CleanerConfig {
            column_af_index: 50,
            ..CleanerConfig::default()
        };
        assert!(label_in_samples.validate().is_err());

        let same_keys = MergeConfig {
            timepoint_column: "PatientID".to_string(),
            ..MergeConfig::default()
        };
        assert!(same_keys.validate().is_err());
    }
}
