//! 入力ファイルの読み込み
//!
//! CSV系はバイト列をデコードしてから区切りテキストとしてパース、
//! Excel（xlsx/xls）は先頭シートをテーブルとして読む。

use crate::error::{GeoMatchError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use geo_match_common::{decode_text, Table, TextEncoding};
use std::path::Path;

/// 読み込み設定
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub delimiter: u8,
    pub allow_legacy_encoding: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            allow_legacy_encoding: true,
        }
    }
}

/// 読み込み結果
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub table: Table,
    /// テキストファイルの場合のみ
    pub encoding: Option<TextEncoding>,
}

fn is_excel(path: &Path) -> bool {
    path.extension()
        .map(|e| matches!(e.to_string_lossy().to_lowercase().as_str(), "xlsx" | "xls" | "xlsm"))
        .unwrap_or(false)
}

pub fn load_table(path: &Path, options: &LoadOptions) -> Result<LoadedTable> {
    if !path.is_file() {
        return Err(GeoMatchError::FileNotFound(path.display().to_string()));
    }

    if is_excel(path) {
        return Ok(LoadedTable {
            table: load_excel(path)?,
            encoding: None,
        });
    }

    let bytes = std::fs::read(path)?;
    let (text, encoding) = decode_text(&bytes, options.allow_legacy_encoding)?;
    if encoding == TextEncoding::Legacy {
        tracing::info!("{}: {} として読み込み", path.display(), encoding);
    }

    // .tsv は区切り文字指定に関わらずタブ
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => options.delimiter,
    };

    Ok(LoadedTable {
        table: Table::parse(&text, delimiter)?,
        encoding: Some(encoding),
    })
}

/// 数値セルは整数なら小数部なしで文字列化
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{:.0}", f),
        other => other.to_string(),
    }
}

fn load_excel(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| GeoMatchError::ExcelRead(format!("{}: {}", path.display(), e)))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| GeoMatchError::ExcelRead(format!("{}: シートがありません", path.display())))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| GeoMatchError::ExcelRead(format!("{} [{}]: {}", path.display(), sheet, e)))?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(|c| cell_to_string(c).trim().to_string()).collect())
        .unwrap_or_default();
    let body = rows
        .map(|r| r.iter().map(cell_to_string).collect())
        .collect();

    Ok(Table::new(headers, body))
}
