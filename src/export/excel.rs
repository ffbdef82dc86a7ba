//! Excel生成（CLI版）
//!
//! 共通ライブラリの excel_core でバッファを作り、ファイルに保存する。

use crate::error::{GeoMatchError, Result};
use geo_match_common::export::excel_core::generate_report_buffer;
use geo_match_common::{CoverageReport, GeoCode, TableOptions};
use std::path::Path;

pub fn generate_excel(
    report: &CoverageReport,
    output_path: &Path,
    options: &TableOptions,
    migration_geos: Option<&[GeoCode]>,
) -> Result<()> {
    let buffer = generate_report_buffer(report, options, migration_geos)
        .map_err(GeoMatchError::ExcelGeneration)?;

    std::fs::write(output_path, buffer)
        .map_err(|e| GeoMatchError::ExcelGeneration(format!("ファイル保存エラー: {}", e)))?;

    Ok(())
}
