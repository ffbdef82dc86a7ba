pub mod csv;
pub mod excel;
pub mod summary;

use crate::cli::ExportFormat;
use crate::error::Result;
use geo_match_common::{CoverageReport, GeoCode, TableOptions};
use std::path::{Path, PathBuf};

fn output_path_for_format(output: &Path, name: &str, extension: &str) -> PathBuf {
    if output.is_dir() || output.extension().is_none() {
        output.join(format!("{}.{}", name, extension))
    } else {
        output.with_extension(extension)
    }
}

/// 出力先と同じ場所に `<stem><suffix>.<ext>` を作る
pub fn sibling_path(path: &Path, suffix: &str, extension: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report");
    path.with_file_name(format!("{}{}.{}", stem, suffix, extension))
}

/// レポートを指定形式で出力し、作成したファイルを返す
pub fn export_report(
    report: &CoverageReport,
    format: &ExportFormat,
    output: &Path,
    name: &str,
    options: &TableOptions,
    migration_geos: Option<&[GeoCode]>,
) -> Result<Vec<PathBuf>> {
    if output.extension().is_none() {
        std::fs::create_dir_all(output)?;
    }

    let mut written = Vec::new();

    if matches!(format, ExportFormat::Csv | ExportFormat::Both) {
        let csv_path = output_path_for_format(output, name, "csv");
        println!("- CSVを生成中...");
        csv::generate_csv(&report.to_table(options), &csv_path)?;
        println!("✔ CSV出力: {}", csv_path.display());
        written.push(csv_path.clone());

        if let Some(geos) = migration_geos {
            let candidates = report.migration_candidates(geos);
            let table = CoverageReport::rows_to_table(&report.geos, candidates.into_iter(), options);
            let migration_path = sibling_path(&csv_path, "_migration", "csv");
            csv::generate_csv(&table, &migration_path)?;
            println!("✔ 移行候補CSV出力: {}", migration_path.display());
            written.push(migration_path);
        }
    }

    if matches!(format, ExportFormat::Excel | ExportFormat::Both) {
        let excel_path = output_path_for_format(output, name, "xlsx");
        println!("- Excelを生成中...");
        excel::generate_excel(report, &excel_path, options, migration_geos)?;
        println!("✔ Excel出力: {}", excel_path.display());
        written.push(excel_path);
    }

    Ok(written)
}
