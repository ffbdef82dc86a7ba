//! 実行サマリー（JSON）

use crate::error::Result;
use crate::pipeline::{GeoFileStats, RunOutcome};
use crate::scanner::FileFailure;
use chrono::{DateTime, Local};
use geo_match_common::GeoCoverage;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub generated_at: DateTime<Local>,
    pub assortment: String,
    pub total_items: usize,
    pub coverage: &'a [GeoCoverage],
    pub files: &'a [GeoFileStats],
    pub failures: &'a [FileFailure],
    /// 移行候補の件数（対象GEO指定時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_candidates: Option<usize>,
}

impl<'a> RunSummary<'a> {
    pub fn new(assortment: &Path, outcome: &'a RunOutcome, migration_candidates: Option<usize>) -> Self {
        Self {
            generated_at: Local::now(),
            assortment: assortment.display().to_string(),
            total_items: outcome.items.len(),
            coverage: &outcome.report.coverage,
            files: &outcome.files,
            failures: &outcome.failures,
            migration_candidates,
        }
    }
}

pub fn generate_summary(summary: &RunSummary<'_>, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(output_path, json)?;
    Ok(())
}
