//! アソートメント・GEOエクスポートのパーサー
//!
//! テーブルから列指定に従って値を取り出し、キー正規化を通して
//! [`AssortmentItem`] / [`GeoRecord`] 列に変換する。

use crate::error::Result;
use crate::key::KeyNormalizer;
use crate::table::{ColumnRef, Table};
use crate::types::{AssortmentItem, GeoCode, GeoRecord};
use crate::Key;
use serde::{Deserialize, Serialize};

/// GEOエクスポートの列指定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLayout {
    /// マーケットプレイス内部ID（A列）
    pub internal_id: ColumnRef,
    /// パートナー商品ID（F列）。`None` ならSKUのみ照合
    pub alt_id: Option<ColumnRef>,
    /// バーコード/SKU（H列）
    pub barcode: ColumnRef,
}

impl Default for GeoLayout {
    fn default() -> Self {
        Self {
            internal_id: ColumnRef::Index(0),
            alt_id: Some(ColumnRef::Index(5)),
            barcode: ColumnRef::Index(7),
        }
    }
}

impl GeoLayout {
    pub fn sku_only(&self) -> Self {
        Self {
            alt_id: None,
            ..self.clone()
        }
    }
}

/// アソートメントの列指定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssortmentLayout {
    pub sku: ColumnRef,
    pub alt_id1: Option<ColumnRef>,
    pub alt_id2: Option<ColumnRef>,
}

impl Default for AssortmentLayout {
    fn default() -> Self {
        Self {
            sku: ColumnRef::Index(0),
            alt_id1: Some(ColumnRef::Index(1)),
            alt_id2: Some(ColumnRef::Index(2)),
        }
    }
}

impl AssortmentLayout {
    pub fn sku_only(&self) -> Self {
        Self {
            sku: self.sku.clone(),
            alt_id1: None,
            alt_id2: None,
        }
    }
}

/// 正規化オプション
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// バーコード/SKUの先頭ゼロを除去する
    pub strip_leading_zeros: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strip_leading_zeros: true,
        }
    }
}

impl ParseOptions {
    fn barcode_normalizer(&self) -> KeyNormalizer {
        KeyNormalizer {
            strip_leading_zeros: self.strip_leading_zeros,
        }
    }
}

fn resolve_optional(
    column: Option<&ColumnRef>,
    headers: &[String],
    role: &str,
) -> Result<Option<usize>> {
    column.map(|c| c.resolve(headers, role)).transpose()
}

fn key_at(normalizer: &KeyNormalizer, row: &[String], index: Option<usize>) -> Key {
    match index {
        Some(i) => normalizer.normalize(Table::cell(row, i)),
        None => Key::Empty,
    }
}

/// GEOエクスポートをパース
///
/// 列が解決できない場合は `Error::Structural`。
pub fn parse_geo_records(
    table: &Table,
    geo: GeoCode,
    layout: &GeoLayout,
    options: &ParseOptions,
) -> Result<Vec<GeoRecord>> {
    let id_col = layout.internal_id.resolve(&table.headers, "internal id")?;
    let barcode_col = layout.barcode.resolve(&table.headers, "barcode")?;
    let alt_col = resolve_optional(layout.alt_id.as_ref(), &table.headers, "alt id")?;

    let plain = KeyNormalizer::plain();
    let barcode = options.barcode_normalizer();

    let records = table
        .rows
        .iter()
        .map(|row| GeoRecord {
            geo,
            internal_id: plain.normalize(Table::cell(row, id_col)),
            barcode: barcode.normalize(Table::cell(row, barcode_col)),
            alt_id: key_at(&plain, row, alt_col),
        })
        .collect();

    Ok(records)
}

/// アソートメントをパース
pub fn parse_assortment(
    table: &Table,
    layout: &AssortmentLayout,
    options: &ParseOptions,
) -> Result<Vec<AssortmentItem>> {
    let sku_col = layout.sku.resolve(&table.headers, "sku")?;
    let alt1_col = resolve_optional(layout.alt_id1.as_ref(), &table.headers, "alt id 1")?;
    let alt2_col = resolve_optional(layout.alt_id2.as_ref(), &table.headers, "alt id 2")?;

    let plain = KeyNormalizer::plain();
    let barcode = options.barcode_normalizer();

    let items = table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| AssortmentItem {
            line: idx + 1,
            sku: barcode.normalize(Table::cell(row, sku_col)),
            alt_id1: key_at(&plain, row, alt1_col),
            alt_id2: key_at(&plain, row, alt2_col),
        })
        .collect();

    Ok(items)
}
