//! CSV出力
//!
//! ヘッダー固定: `SKU, <GEO> ID[, <GEO> Source]...`

use crate::error::Result;
use geo_match_common::Table;
use std::io::Write;
use std::path::Path;

/// テーブルをCSVとして書き出す
pub fn write_table<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = ::csv::Writer::from_writer(writer);

    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn generate_csv(table: &Table, output_path: &Path) -> Result<()> {
    let file = std::fs::File::create(output_path)?;
    write_table(table, std::io::BufWriter::new(file))
}
