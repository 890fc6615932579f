use tracing::{debug, info};

use super::{collapse_duplicates, CleaningStep, StepContext};
use crate::constants::IDS_FUSED_ARTIFACT;
use crate::error::Result;
use crate::pipeline::quality_gate::{duplicate_check, QualityIssue};
use crate::table::{Column, Table, Value};

/// Normalizes protein accessions and merges rows that share one
pub struct FuseIdsStep;

/// Canonical form of a raw accession cell.
///
/// Accessions are split on `;` and `,`, UniProt FASTA headers
/// (`sp|P12345|NAME_HUMAN`) are reduced to the accession, repeats are dropped
/// and the rest joined with `;`. `None` when nothing usable is left.
pub fn fuse_protein_id(raw: &str) -> Option<String> {
    let mut accessions: Vec<&str> = Vec::new();
    for token in raw.split([';', ',']) {
        let token = token.trim();
        let accession = match token.split_once('|') {
            Some((db, rest)) if db == "sp" || db == "tr" => rest.split('|').next().unwrap_or_default().trim(),
            _ => token,
        };
        if !accession.is_empty() && !accessions.contains(&accession) {
            accessions.push(accession);
        }
    }
    if accessions.is_empty() {
        None
    } else {
        Some(accessions.join(";"))
    }
}

impl CleaningStep for FuseIdsStep {
    fn step_name(&self) -> &'static str {
        "fuse_ids"
    }

    fn artifact_name(&self) -> &'static str {
        IDS_FUSED_ARTIFACT
    }

    fn execute(&self, table: &Table, ctx: &mut StepContext) -> Result<Table> {
        let id_name = ctx.layout.id_column.clone();
        let ids = table.require_column(&id_name, "input")?;

        let fused: Vec<Value> = ids
            .values
            .iter()
            .map(|v| {
                v.key_text()
                    .and_then(|raw| fuse_protein_id(&raw))
                    .map(Value::Text)
                    .unwrap_or(Value::Missing)
            })
            .collect();
        let changed = ids
            .values
            .iter()
            .zip(fused.iter())
            .filter(|(before, after)| before.key_text() != after.key_text())
            .count();
        debug!("Rewrote {} protein ids", changed);

        let mut out = table.clone();
        if let Some(col) = out.column_mut(&id_name) {
            *col = Column::new(id_name.clone(), fused);
        }
        let keep: Vec<bool> = (0..out.height())
            .map(|row| out.cell(&id_name, row).is_some_and(|v| !v.is_missing()))
            .collect();
        let out = out.filter_rows(&keep);

        let collapsed = collapse_duplicates(&out, &id_name, &ctx.layout.sample_columns);
        info!(
            "Fused protein ids: {} rows -> {} unique proteins",
            table.height(),
            collapsed.height()
        );
        Ok(collapsed)
    }

    fn validate(&self, _before: &Table, after: &Table, ctx: &StepContext) -> Vec<QualityIssue> {
        duplicate_check(after, &ctx.layout.id_column)
    }
}
