//! 表形式データの読み込み
//!
//! バイト列のデコード（UTF-8 → レガシー西欧エンコーディング）と、
//! 区切りテキストのヘッダー付きテーブル化、列指定の解決を行う。

use crate::error::{Error, Result};
use encoding_rs::WINDOWS_1252;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// デコードに使ったエンコーディング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    Utf8,
    /// Windows-1252（Latin-1上位互換）
    Legacy,
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextEncoding::Utf8 => write!(f, "UTF-8"),
            TextEncoding::Legacy => write!(f, "windows-1252"),
        }
    }
}

/// バイト列をテキストにデコード
///
/// UTF-8（BOM可）で失敗した場合、`allow_legacy` ならWindows-1252で再試行する。
pub fn decode_text(bytes: &[u8], allow_legacy: bool) -> Result<(String, TextEncoding)> {
    let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    match std::str::from_utf8(body) {
        Ok(text) => Ok((text.to_string(), TextEncoding::Utf8)),
        Err(e) if allow_legacy => {
            tracing::debug!("UTF-8デコード失敗 ({}), windows-1252で再試行", e);
            let (cow, _) = WINDOWS_1252.decode_without_bom_handling(body);
            Ok((cow.into_owned(), TextEncoding::Legacy))
        }
        Err(_) => Err(Error::Decode {
            encoding: TextEncoding::Utf8.to_string(),
        }),
    }
}

/// ヘッダー付きテーブル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// 区切りテキストをパース（1行目はヘッダー）
    ///
    /// 列数が揃わない行も受け付け、不足セルは空として扱う。
    pub fn parse(text: &str, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        Ok(Self { headers, rows })
    }

    /// 行の指定列セル（範囲外は空）
    pub fn cell<'a>(row: &'a [String], index: usize) -> &'a str {
        row.get(index).map(|s| s.as_str()).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 列指定（位置 or ヘッダー名）
///
/// 文字列表現: `#7` または `7` は位置、それ以外はヘッダー名。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    /// テーブルのヘッダーに対して列位置を解決
    pub fn resolve(&self, headers: &[String], role: &str) -> Result<usize> {
        match self {
            ColumnRef::Index(i) if *i < headers.len() => Ok(*i),
            ColumnRef::Index(_) => Err(Error::structural(role, self)),
            ColumnRef::Name(name) => {
                let wanted = name.trim().to_lowercase();
                headers
                    .iter()
                    .position(|h| h.trim().to_lowercase() == wanted)
                    .ok_or_else(|| Error::structural(role, self))
            }
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{}", i),
            ColumnRef::Name(name) => write!(f, "\"{}\"", name),
        }
    }
}

impl FromStr for ColumnRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("列指定が空です".to_string());
        }
        let digits = s.strip_prefix('#').unwrap_or(s);
        match digits.parse::<usize>() {
            Ok(i) => Ok(ColumnRef::Index(i)),
            Err(_) if s.starts_with('#') => Err(format!("不正な列位置: {}", s)),
            Err(_) => Ok(ColumnRef::Name(s.to_string())),
        }
    }
}

impl TryFrom<String> for ColumnRef {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ColumnRef> for String {
    fn from(value: ColumnRef) -> Self {
        match value {
            ColumnRef::Index(i) => format!("#{}", i),
            ColumnRef::Name(name) => name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_with_bom() {
        let bytes = b"\xEF\xBB\xBFsku,id\n1,2\n";
        let (text, enc) = decode_text(bytes, false).unwrap();
        assert!(text.starts_with("sku"));
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_decode_legacy_fallback() {
        // "Caf\xe9" はUTF-8として不正
        let bytes = b"name\nCaf\xe9\n";
        let (text, enc) = decode_text(bytes, true).unwrap();
        assert!(text.contains("Café"));
        assert_eq!(enc, TextEncoding::Legacy);
    }

    #[test]
    fn test_decode_error_without_fallback() {
        let bytes = b"name\nCaf\xe9\n";
        let result = decode_text(bytes, false);
        assert!(matches!(result, Err(Error::Decode { .. })));
    }

    #[test]
    fn test_parse_table_flexible_rows() {
        let text = "a,b,c\n1,2,3\n4,5\n";
        let table = Table::parse(text, b',').unwrap();
        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.len(), 2);
        assert_eq!(Table::cell(&table.rows[1], 2), "");
    }

    #[test]
    fn test_parse_table_semicolon() {
        let table = Table::parse("a;b\n\"x;y\";2\n", b';').unwrap();
        assert_eq!(table.rows[0][0], "x;y");
    }

    #[test]
    fn test_column_ref_parse() {
        assert_eq!("#7".parse::<ColumnRef>().unwrap(), ColumnRef::Index(7));
        assert_eq!("5".parse::<ColumnRef>().unwrap(), ColumnRef::Index(5));
        assert_eq!(
            "Barcode".parse::<ColumnRef>().unwrap(),
            ColumnRef::Name("Barcode".into())
        );
        assert!("#x".parse::<ColumnRef>().is_err());
        assert!("".parse::<ColumnRef>().is_err());
    }

    #[test]
    fn test_column_ref_resolve() {
        let headers: Vec<String> = vec!["ID".into(), " Barcode ".into()];
        assert_eq!(ColumnRef::Index(1).resolve(&headers, "barcode").unwrap(), 1);
        assert_eq!(
            ColumnRef::Name("barcode".into()).resolve(&headers, "barcode").unwrap(),
            1
        );

        let err = ColumnRef::Index(7).resolve(&headers, "barcode").unwrap_err();
        assert!(matches!(err, Error::Structural { .. }));
        let err = ColumnRef::Name("sku".into()).resolve(&headers, "sku").unwrap_err();
        assert!(format!("{}", err).contains("\"sku\""));
    }

    #[test]
    fn test_column_ref_serde() {
        let json = serde_json::to_string(&ColumnRef::Index(5)).unwrap();
        assert_eq!(json, "\"#5\"");
        let parsed: ColumnRef = serde_json::from_str("\"Partner ID\"").unwrap();
        assert_eq!(parsed, ColumnRef::Name("Partner ID".into()));
    }
}
