use std::collections::{BTreeMap, HashSet};

use proptest::prelude::*;
use proteomics_cleaner::merge::{merge_tables, CompositeKey};
use proteomics_cleaner::{Column, MergeConfig, Table, Value};

type Rows = BTreeMap<(u8, u8), (Option<f64>, Option<f64>)>;

fn rows() -> impl Strategy<Value = Rows> {
    prop::collection::btree_map(
        (0u8..6, 0u8..3),
        (prop::option::of(-50.0f64..50.0), prop::option::of(-50.0f64..50.0)),
        0..12,
    )
}

fn key(patient: u8, timepoint: u8) -> CompositeKey {
    CompositeKey {
        patient: patient.to_string(),
        timepoint: format!("T{}", timepoint),
    }
}

/// PatientID, Timepoint, ProtX, then `other`
fn table(rows: &Rows, other: &str) -> Table {
    let patients = rows.keys().map(|(p, _)| Value::Number(f64::from(*p))).collect();
    let timepoints = rows.keys().map(|(_, t)| Value::Text(format!("T{}", t))).collect();
    let shared: Vec<Option<f64>> = rows.values().map(|v| v.0).collect();
    let own: Vec<Option<f64>> = rows.values().map(|v| v.1).collect();
    Table::from_columns(vec![
        Column::new("PatientID", patients),
        Column::new("Timepoint", timepoints),
        Column::from_numbers("ProtX", &shared),
        Column::from_numbers(other, &own),
    ])
    .unwrap()
}

fn merged_keys(merged: &Table) -> Vec<CompositeKey> {
    (0..merged.height())
        .map(|row| CompositeKey {
            patient: merged.cell("PatientID", row).and_then(|v| v.key_text()).unwrap(),
            timepoint: merged.cell("Timepoint", row).and_then(|v| v.key_text()).unwrap(),
        })
        .collect()
}

proptest! {
    #[test]
    fn merge_keeps_every_key_once(a in rows(), b in rows()) {
        let outcome = merge_tables(table(&a, "ProtY"), table(&b, "ProtZ"), &MergeConfig::default()).unwrap();
        let keys = merged_keys(&outcome.merged);

        let expected: HashSet<CompositeKey> = a.keys().chain(b.keys()).map(|(p, t)| key(*p, *t)).collect();
        let found: HashSet<CompositeKey> = keys.iter().cloned().collect();
        prop_assert_eq!(&found, &expected);
        prop_assert_eq!(keys.len(), expected.len());
        prop_assert!(outcome.merged.height() >= a.len().max(b.len()));
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn merge_has_unique_columns_and_no_suffixed_leftovers(a in rows(), b in rows()) {
        let outcome = merge_tables(table(&a, "ProtY"), table(&b, "ProtZ"), &MergeConfig::default()).unwrap();
        let names = outcome.merged.column_names();

        let distinct: HashSet<&str> = names.iter().copied().collect();
        prop_assert_eq!(distinct.len(), names.len());
        prop_assert_eq!(names, vec!["PatientID", "Timepoint", "ProtX", "ProtY", "ProtZ"]);
    }

    #[test]
    fn primary_wins_and_secondary_fills(a in rows(), b in rows()) {
        let outcome = merge_tables(table(&a, "ProtY"), table(&b, "ProtZ"), &MergeConfig::default()).unwrap();
        let merged = &outcome.merged;
        let keys = merged_keys(merged);

        let mut filled = 0;
        for (p, t) in a.keys().chain(b.keys()).collect::<HashSet<_>>() {
            let row = keys.iter().position(|k| *k == key(*p, *t)).unwrap();
            let primary = a.get(&(*p, *t)).and_then(|v| v.0);
            let secondary = b.get(&(*p, *t)).and_then(|v| v.0);
            if primary.is_none() && secondary.is_some() {
                filled += 1;
            }
            let expected = Value::from(primary.or(secondary));
            prop_assert_eq!(merged.cell("ProtX", row), Some(&expected));
        }
        prop_assert_eq!(outcome.report.reconciliation.total_filled(), filled);

        let merged_count = merged.column("ProtX").unwrap().non_missing_count();
        let a_count = a.values().filter(|v| v.0.is_some()).count();
        let b_count = b.values().filter(|v| v.0.is_some()).count();
        prop_assert!(merged_count >= a_count.max(b_count));
    }

    #[test]
    fn summary_is_bounded_and_sorted(a in rows(), b in rows()) {
        let outcome = merge_tables(table(&a, "ProtY"), table(&b, "ProtZ"), &MergeConfig::default()).unwrap();
        let height = outcome.merged.height();

        for row in &outcome.summary {
            prop_assert!((0.0..=100.0).contains(&row.coverage_pct));
            prop_assert!(row.count >= 1 && row.count <= height);
            prop_assert!(row.min <= row.mean + 1e-9 && row.mean <= row.max + 1e-9);
        }
        prop_assert!(outcome
            .summary
            .windows(2)
            .all(|w| w[0].coverage_pct >= w[1].coverage_pct));
    }
}
