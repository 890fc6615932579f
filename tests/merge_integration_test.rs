use std::fs;
use std::sync::Arc;

use anyhow::Result;
use proteomics_cleaner::app::merge_use_case::MergeUseCase;
use proteomics_cleaner::infra::artifact_output_adapter::FileArtifactAdapter;
use proteomics_cleaner::table::read_csv;
use proteomics_cleaner::{CleanerError, MergeConfig, Value};
use tempfile::tempdir;

const PRIMARY: &str = "\
PatientID,Timepoint,ProtX,ProtY
1,T0,1.5,
2,T0,,2.0
3,T1,4.0,1.0
";

const SECONDARY: &str = "\
PatientID,Timepoint,ProtX,ProtZ
1,T0,9.0,7
2.0,T0,5.0,
4,T0,NA,3
";

#[test]
fn test_merge_writes_merged_table_summary_and_report() -> Result<()> {
    let temp_dir = tempdir()?;
    let primary = temp_dir.path().join("07_transformed_data.csv");
    let secondary = temp_dir.path().join("COMBAT_cleaned_sheet1.csv");
    fs::write(&primary, PRIMARY)?;
    fs::write(&secondary, SECONDARY)?;
    let output_dir = temp_dir.path().join("merged_results");

    let output = Arc::new(FileArtifactAdapter::new(&output_dir)?);
    let (outcome, artifacts) = MergeUseCase::new(MergeConfig::default(), output).run(&primary, &secondary)?;

    // Every key from either side, in key order
    let merged = read_csv(&output_dir.join("merged_proteomics_data.csv"))?;
    assert_eq!(merged.column_names(), vec!["PatientID", "Timepoint", "ProtX", "ProtY", "ProtZ"]);
    let patients: Vec<Option<String>> = merged.column("PatientID").unwrap().values.iter().map(|v| v.key_text()).collect();
    assert_eq!(
        patients,
        vec![Some("1".into()), Some("2".into()), Some("3".into()), Some("4".into())]
    );

    // Primary wins, gaps are filled from the secondary table
    let prot_x = &merged.column("ProtX").unwrap().values;
    assert_eq!(
        prot_x,
        &vec![Value::Number(1.5), Value::Number(5.0), Value::Number(4.0), Value::Missing]
    );
    // Secondary-only column, missing where the secondary table had no row
    assert_eq!(merged.cell("ProtZ", 2), Some(&Value::Missing));
    assert_eq!(merged.cell("ProtZ", 3), Some(&Value::Number(3.0)));

    let summary_text = fs::read_to_string(&artifacts.summary)?;
    assert!(summary_text.starts_with("Protein,Coverage (%),Count,Min,Max,Mean,Std\n"));
    let summary = read_csv(&output_dir.join("protein_summary.csv"))?;
    let order: Vec<Option<String>> = summary.column("Protein").unwrap().values.iter().map(|v| v.key_text()).collect();
    assert_eq!(order, vec![Some("ProtX".into()), Some("ProtY".into()), Some("ProtZ".into())]);
    assert_eq!(summary.cell("Coverage (%)", 0), Some(&Value::Number(75.0)));

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&artifacts.report)?)?;
    assert_eq!(report["merged_rows"], 4);
    assert_eq!(report["unique_patients"], 4);
    assert_eq!(report["overlapping_columns"], 1);
    assert_eq!(report["reconciliation"]["columns"][0]["column"], "ProtX");
    assert_eq!(report["reconciliation"]["columns"][0]["filled"], 1);
    assert_eq!(outcome.report.reconciliation.total_filled(), 1);

    Ok(())
}

#[test]
fn test_custom_suffix_and_names() -> Result<()> {
    let temp_dir = tempdir()?;
    let primary = temp_dir.path().join("a.csv");
    let secondary = temp_dir.path().join("b.csv");
    fs::write(&primary, PRIMARY)?;
    fs::write(&secondary, SECONDARY)?;

    let config = MergeConfig {
        suffix: "_b".to_string(),
        merged_filename: "all.csv".to_string(),
        summary_filename: "coverage.csv".to_string(),
        ..MergeConfig::default()
    };
    let output_dir = temp_dir.path().join("out");
    let output = Arc::new(FileArtifactAdapter::new(&output_dir)?);
    MergeUseCase::new(config, output).run(&primary, &secondary)?;

    let merged = read_csv(&output_dir.join("all.csv"))?;
    assert!(merged.column_names().iter().all(|name| !name.ends_with("_b")));
    assert!(output_dir.join("coverage.csv").exists());
    assert!(!output_dir.join("merged_proteomics_data.csv").exists());
    Ok(())
}

#[test]
fn test_secondary_without_key_column_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    let primary = temp_dir.path().join("a.csv");
    let secondary = temp_dir.path().join("b.csv");
    fs::write(&primary, PRIMARY)?;
    fs::write(&secondary, "Subject,Timepoint,ProtX\n1,T0,1\n")?;

    let output = Arc::new(FileArtifactAdapter::new(&temp_dir.path().join("out"))?);
    let err = MergeUseCase::new(MergeConfig::default(), output)
        .run(&primary, &secondary)
        .unwrap_err();

    match err {
        CleanerError::MissingColumn { column, .. } => assert_eq!(column, "PatientID"),
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_uncreatable_output_dir_fails() -> Result<()> {
    let temp_dir = tempdir()?;
    let blocker = temp_dir.path().join("file");
    fs::write(&blocker, "not a directory")?;

    let err = FileArtifactAdapter::new(&blocker.join("out")).err().unwrap();
    assert!(matches!(err, CleanerError::OutputDir { .. }));
    Ok(())
}

#[test]
fn test_rerun_overwrites_with_identical_tables() -> Result<()> {
    let temp_dir = tempdir()?;
    let primary = temp_dir.path().join("a.csv");
    let secondary = temp_dir.path().join("b.csv");
    fs::write(&primary, PRIMARY)?;
    fs::write(&secondary, SECONDARY)?;
    let output_dir = temp_dir.path().join("merged_results");

    let mut runs = Vec::new();
    for _ in 0..2 {
        let output = Arc::new(FileArtifactAdapter::new(&output_dir)?);
        MergeUseCase::new(MergeConfig::default(), output).run(&primary, &secondary)?;
        runs.push((
            fs::read(output_dir.join("merged_proteomics_data.csv"))?,
            fs::read(output_dir.join("protein_summary.csv"))?,
        ));
    }

    assert!(!runs[0].0.is_empty());
    assert_eq!(runs[0].0, runs[1].0);
    assert_eq!(runs[0].1, runs[1].1);
    Ok(())
}

#[test]
fn test_rows_without_key_are_counted_in_report() -> Result<()> {
    let temp_dir = tempdir()?;
    let primary = temp_dir.path().join("a.csv");
    let secondary = temp_dir.path().join("b.csv");
    fs::write(&primary, "PatientID,Timepoint,ProtX\n1,T0,1\n,T0,2\n1,T0,3\n")?;
    fs::write(&secondary, "PatientID,Timepoint,ProtY\n1,T0,10\n1,T0,20\n")?;
    let output_dir = temp_dir.path().join("out");

    let output = Arc::new(FileArtifactAdapter::new(&output_dir)?);
    let (outcome, artifacts) = MergeUseCase::new(MergeConfig::default(), output).run(&primary, &secondary)?;

    // Two primary rows on 1/T0 against two secondary rows expand pairwise
    assert_eq!(outcome.merged.height(), 4);
    assert_eq!(outcome.report.primary_rows_without_key, 1);
    assert_eq!(outcome.report.secondary_rows_without_key, 0);
    assert_eq!(outcome.report.primary_duplicate_keys, 1);
    assert_eq!(outcome.report.secondary_duplicate_keys, 1);

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(&artifacts.report)?)?;
    assert_eq!(report["primary_rows_without_key"], 1);
    Ok(())
}
