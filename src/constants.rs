/// Column and file name constants shared by the cleaning pipeline and the merge utility.

// Composite key columns
pub const PATIENT_ID_COLUMN: &str = "PatientID";
pub const TIMEPOINT_COLUMN: &str = "Timepoint";

// Suffix given to secondary-table columns that collide with primary-table columns
pub const SECONDARY_SUFFIX: &str = "_combat";

// Column holding the combined protein label after the label step
pub const PROTEIN_COLUMN: &str = "Protein";

// Merge utility defaults
pub const DEFAULT_PRIMARY_INPUT: &str = "07_transformed_data.csv";
pub const DEFAULT_SECONDARY_INPUT: &str = "COMBAT_cleaned_sheet1.csv";
pub const DEFAULT_MERGE_OUTPUT_DIR: &str = "merged_results";
pub const MERGED_FILENAME: &str = "merged_proteomics_data.csv";
pub const SUMMARY_FILENAME: &str = "protein_summary.csv";
pub const MERGE_REPORT_FILENAME: &str = "merge_report.json";

// Cleaning pipeline artifacts
pub const RAW_DATA_ARTIFACT: &str = "01_raw_data.csv";
pub const ROWS_REMOVED_ARTIFACT: &str = "02_rows_removed.csv";
pub const COLUMNS_REMOVED_ARTIFACT: &str = "03_columns_removed.csv";
pub const IDS_FUSED_ARTIFACT: &str = "04_ids_fused.csv";
pub const LABELS_COMBINED_ARTIFACT: &str = "05_labels_combined.csv";
pub const COVERAGE_FILTERED_ARTIFACT: &str = "06_coverage_filtered.csv";
pub const TRANSFORMED_ARTIFACT: &str = "07_transformed_data.csv";
pub const STATISTICS_ARTIFACT: &str = "08_protein_statistics.csv";
pub const MISSINGNESS_ARTIFACT: &str = "09_sample_missingness.csv";
pub const VALIDATION_REPORT_ARTIFACT: &str = "validation_report.json";

// Cleaning pipeline defaults (spreadsheet column AF is index 31)
pub const DEFAULT_ID_COLUMN_INDEX: usize = 0;
pub const DEFAULT_COLUMN_AF_INDEX: usize = 31;
pub const DEFAULT_PATIENT_START_INDEX: usize = 47;
pub const DEFAULT_MIN_COVERAGE_PCT: f64 = 10.0;
pub const DEFAULT_SAMPLE_SEPARATOR: &str = "_";

// Cell contents read as missing values
pub const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "NAN", "#N/A", "null", "NULL", "None", "-",
];

pub const LOG_DIR_NAME: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "proteomics-cleaner";
