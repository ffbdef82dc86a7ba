//! Excel生成（共通ライブラリ）
//!
//! 照合レポートを以下のシート構成でバッファに書き出す:
//! - Results: 詳細結果（SKU + GEO別 ID/Source）
//! - Coverage: GEO別カバレッジ
//! - Migration: 移行候補（指定時のみ）

use crate::report::{CoverageReport, TableOptions};
use crate::table::Table;
use crate::types::GeoCode;
use rust_xlsxwriter::*;

const SKU_COL_WIDTH: f64 = 22.0;
const VALUE_COL_WIDTH: f64 = 16.0;

fn header_format() -> Format {
    Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA))
}

fn write_table_sheet(workbook: &mut Workbook, name: &str, table: &Table) -> Result<(), String> {
    let header = header_format();
    let not_found = Format::new().set_font_color(Color::RGB(0xC0392B));

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(name)
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, title) in table.headers.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write_string_with_format(0, col, title, &header)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
        let width = if col == 0 { SKU_COL_WIDTH } else { VALUE_COL_WIDTH };
        worksheet
            .set_column_width(col, width)
            .map_err(|e| format!("列幅設定エラー: {}", e))?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = r as u32 + 1;
        for (c, value) in row.iter().enumerate() {
            let result = if value == crate::report::NOT_FOUND {
                worksheet.write_string_with_format(row_num, c as u16, value, &not_found)
            } else {
                worksheet.write_string(row_num, c as u16, value)
            };
            result.map_err(|e| format!("セル書き込みエラー: {}", e))?;
        }
    }

    worksheet
        .set_freeze_panes(1, 1)
        .map_err(|e| format!("ウィンドウ枠固定エラー: {}", e))?;

    Ok(())
}

fn write_coverage_sheet(workbook: &mut Workbook, report: &CoverageReport) -> Result<(), String> {
    let header = header_format();
    let percent = Format::new().set_num_format("0.0%");

    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Coverage")
        .map_err(|e| format!("シート名設定エラー: {}", e))?;

    for (col, title) in ["GEO", "Found", "Total", "Coverage"].iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *title, &header)
            .map_err(|e| format!("ヘッダー書き込みエラー: {}", e))?;
    }

    for (r, cov) in report.coverage.iter().enumerate() {
        let row = r as u32 + 1;
        worksheet
            .write_string(row, 0, cov.geo.as_str())
            .and_then(|ws| ws.write_number(row, 1, cov.found as f64))
            .and_then(|ws| ws.write_number(row, 2, cov.total as f64))
            .and_then(|ws| ws.write_number_with_format(row, 3, cov.ratio(), &percent))
            .map_err(|e| format!("カバレッジ書き込みエラー: {}", e))?;
    }

    Ok(())
}

/// レポートをExcelバッファに生成
///
/// # Arguments
/// * `report` - 照合レポート
/// * `options` - Source列の有無・ラベル
/// * `migration_geos` - 移行候補シートの対象GEO（`None` ならシートなし）
pub fn generate_report_buffer(
    report: &CoverageReport,
    options: &TableOptions,
    migration_geos: Option<&[GeoCode]>,
) -> Result<Vec<u8>, String> {
    let mut workbook = Workbook::new();

    write_table_sheet(&mut workbook, "Results", &report.to_table(options))?;
    write_coverage_sheet(&mut workbook, report)?;

    if let Some(geos) = migration_geos {
        let candidates = report.migration_candidates(geos);
        let table = CoverageReport::rows_to_table(&report.geos, candidates.into_iter(), options);
        write_table_sheet(&mut workbook, "Migration", &table)?;
    }

    workbook
        .save_to_buffer()
        .map_err(|e| format!("Excel保存エラー: {}", e))
}
