use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::steps::StepResult;
use crate::table::Table;

/// Individual issue found while checking a step's output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityIssue {
    pub issue_type: QualityIssueType,
    pub severity: QualitySeverity,
    pub description: String,
    /// Column that triggered the issue, if any
    pub field: Option<String>,
}

impl QualityIssue {
    pub fn new(issue_type: QualityIssueType, severity: QualitySeverity, description: impl Into<String>) -> Self {
        Self {
            issue_type,
            severity,
            description: description.into(),
            field: None,
        }
    }

    pub fn on_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityIssueType {
    /// Step produced no rows or no columns
    EmptyTable,
    /// A filtering step grew the table
    ShapeGrowth,
    /// An identifier that must be unique appears more than once
    DuplicateIdentifier,
    /// A protein below the coverage threshold survived filtering
    BelowCoverage,
    /// A row lacks part of its sample key
    MissingKey,
    /// Rows or columns were discarded
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum QualitySeverity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QualityDecision {
    /// Step output meets every check
    Accept,
    /// Step output is usable but flagged
    AcceptWithWarnings,
    /// Step output violates a check; the pipeline stops
    Reject,
}

/// Decision implied by the most severe issue
pub fn decide(issues: &[QualityIssue]) -> QualityDecision {
    match issues.iter().map(|i| i.severity).max() {
        Some(QualitySeverity::Error) => QualityDecision::Reject,
        Some(QualitySeverity::Warning) => QualityDecision::AcceptWithWarnings,
        _ => QualityDecision::Accept,
    }
}

/// Checks shared by every step: empty output is a warning, and a filtering
/// step must never add rows or columns.
pub fn shape_checks(before: &Table, after: &Table, filtering: bool) -> Vec<QualityIssue> {
    let mut issues = Vec::new();
    if after.is_empty() || after.width() == 0 {
        issues.push(QualityIssue::new(
            QualityIssueType::EmptyTable,
            QualitySeverity::Warning,
            format!("table is empty ({} rows x {} columns)", after.height(), after.width()),
        ));
    }
    if filtering && (after.height() > before.height() || after.width() > before.width()) {
        issues.push(QualityIssue::new(
            QualityIssueType::ShapeGrowth,
            QualitySeverity::Error,
            format!(
                "filtering grew the table from {}x{} to {}x{}",
                before.height(),
                before.width(),
                after.height(),
                after.width()
            ),
        ));
    }
    let dropped_rows = before.height().saturating_sub(after.height());
    let dropped_cols = before.width().saturating_sub(after.width());
    if filtering && (dropped_rows > 0 || dropped_cols > 0) {
        issues.push(QualityIssue::new(
            QualityIssueType::Discarded,
            QualitySeverity::Info,
            format!("removed {} rows and {} columns", dropped_rows, dropped_cols),
        ));
    }
    issues
}

/// Error for every value of `column` that occurs more than once
pub fn duplicate_check(table: &Table, column: &str) -> Vec<QualityIssue> {
    let Some(col) = table.column(column) else {
        return Vec::new();
    };
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for key in col.values.iter().filter_map(|v| v.key_text()) {
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter(|key| counts[key] > 1)
        .map(|key| {
            QualityIssue::new(
                QualityIssueType::DuplicateIdentifier,
                QualitySeverity::Error,
                format!("'{}' appears {} times", key, counts[&key]),
            )
            .on_field(column)
        })
        .collect()
}

/// Everything the validation checks found during one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub min_coverage_pct: f64,
    pub steps: Vec<StepResult>,
    pub decision: QualityDecision,
}

impl ValidationReport {
    pub fn new(input: &str, min_coverage_pct: f64, steps: Vec<StepResult>) -> Self {
        let all_issues: Vec<QualityIssue> = steps.iter().flat_map(|s| s.issues.iter().cloned()).collect();
        Self {
            generated_at: Utc::now(),
            input: input.to_string(),
            min_coverage_pct,
            decision: decide(&all_issues),
            steps,
        }
    }

    pub fn issue_count(&self, severity: QualitySeverity) -> usize {
        self.steps
            .iter()
            .flat_map(|s| s.issues.iter())
            .filter(|i| i.severity == severity)
            .count()
    }
}
