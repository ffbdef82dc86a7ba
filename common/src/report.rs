//! カバレッジレポートの組み立て
//!
//! アソートメントを軸に、GEOごとの照合結果を横持ちの1テーブルへ統合する。
//! 行順は入力順、列順は [`GeoCode`] の宣言順。GEOの処理順には依存しない。

use crate::error::{Error, Result};
use crate::table::Table;
use crate::types::{AssortmentItem, GeoCode, MatchResult, MatchedVia};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Not Found セルの表示
pub const NOT_FOUND: &str = "Not Found";

/// 一致元列の表示ラベル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceLabels {
    pub barcode: String,
    pub alt_id1: String,
    pub alt_id2: String,
    pub none: String,
}

impl Default for SourceLabels {
    fn default() -> Self {
        Self {
            barcode: "SKU".into(),
            alt_id1: "Netta ID".into(),
            alt_id2: "Opt ID".into(),
            none: "-".into(),
        }
    }
}

impl SourceLabels {
    pub fn label(&self, via: MatchedVia) -> &str {
        match via {
            MatchedVia::Barcode => &self.barcode,
            MatchedVia::AltId1 => &self.alt_id1,
            MatchedVia::AltId2 => &self.alt_id2,
            MatchedVia::None => &self.none,
        }
    }
}

/// テーブル出力オプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// `<GEO> Source` 列を出力する
    pub include_source: bool,
    pub labels: SourceLabels,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            include_source: true,
            labels: SourceLabels::default(),
        }
    }
}

/// レポート1行（アソートメント1アイテム）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub line: usize,
    pub sku: String,
    pub per_geo: BTreeMap<GeoCode, MatchResult>,
}

impl ReportRow {
    pub fn result(&self, geo: GeoCode) -> Option<&MatchResult> {
        self.per_geo.get(&geo)
    }

    fn is_found_in(&self, geo: GeoCode) -> bool {
        self.result(geo).map(|r| r.is_found()).unwrap_or(false)
    }
}

/// GEO別カバレッジ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoCoverage {
    pub geo: GeoCode,
    pub found: usize,
    pub total: usize,
}

impl GeoCoverage {
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.found as f64 / self.total as f64
        }
    }
}

impl fmt::Display for GeoCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.found, self.total)
    }
}

/// 照合レポート全体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub geos: Vec<GeoCode>,
    pub rows: Vec<ReportRow>,
    pub coverage: Vec<GeoCoverage>,
}

impl CoverageReport {
    /// GEO別の照合結果を統合
    ///
    /// 各GEOの結果は `items` と同じ長さ・同じ順でなければならない。
    pub fn assemble<I>(items: &[AssortmentItem], per_geo: I) -> Result<Self>
    where
        I: IntoIterator<Item = (GeoCode, Vec<MatchResult>)>,
    {
        let mut by_geo: BTreeMap<GeoCode, Vec<MatchResult>> = BTreeMap::new();
        for (geo, results) in per_geo {
            if results.len() != items.len() {
                return Err(Error::Report(format!(
                    "{} の結果件数 {} がアソートメント件数 {} と一致しません",
                    geo,
                    results.len(),
                    items.len()
                )));
            }
            if by_geo.insert(geo, results).is_some() {
                return Err(Error::Report(format!("{} が重複しています", geo)));
            }
        }

        let geos: Vec<GeoCode> = by_geo.keys().copied().collect();
        let mut columns: Vec<std::vec::IntoIter<MatchResult>> =
            by_geo.into_values().map(|v| v.into_iter()).collect();

        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let mut per_geo = BTreeMap::new();
            for (geo, column) in geos.iter().zip(columns.iter_mut()) {
                let result = column
                    .next()
                    .unwrap_or_else(|| MatchResult::not_found(*geo));
                per_geo.insert(*geo, result);
            }
            rows.push(ReportRow {
                line: item.line,
                sku: item.sku.as_str().to_string(),
                per_geo,
            });
        }

        let coverage = geos
            .iter()
            .map(|&geo| GeoCoverage {
                geo,
                found: rows.iter().filter(|r| r.is_found_in(geo)).count(),
                total: rows.len(),
            })
            .collect();

        Ok(Self {
            geos,
            rows,
            coverage,
        })
    }

    pub fn coverage_for(&self, geo: GeoCode) -> Option<&GeoCoverage> {
        self.coverage.iter().find(|c| c.geo == geo)
    }

    /// 移行候補: 指定GEO群のどこかで見つかり、別のどこかで見つからない行
    ///
    /// レポートに存在するGEOが2つ未満なら候補なし。
    pub fn migration_candidates(&self, subset: &[GeoCode]) -> Vec<&ReportRow> {
        let present: BTreeSet<GeoCode> = subset
            .iter()
            .copied()
            .filter(|g| self.geos.contains(g))
            .collect();

        if present.len() < 2 {
            return Vec::new();
        }

        self.rows
            .iter()
            .filter(|row| {
                let found = present.iter().filter(|&&g| row.is_found_in(g)).count();
                found > 0 && found < present.len()
            })
            .collect()
    }

    /// 出力用テーブルに変換
    pub fn to_table(&self, options: &TableOptions) -> Table {
        Self::rows_to_table(&self.geos, self.rows.iter(), options)
    }

    /// 任意の行集合（移行候補など）をテーブルに変換
    pub fn rows_to_table<'a>(
        geos: &[GeoCode],
        rows: impl Iterator<Item = &'a ReportRow>,
        options: &TableOptions,
    ) -> Table {
        let mut headers = vec!["SKU".to_string()];
        for geo in geos {
            headers.push(format!("{} ID", geo));
            if options.include_source {
                headers.push(format!("{} Source", geo));
            }
        }

        let body = rows
            .map(|row| {
                let mut cells = vec![row.sku.clone()];
                for geo in geos {
                    let (id, via) = match row.result(*geo) {
                        Some(r) => (r.internal_id.as_deref(), r.matched_via),
                        None => (None, MatchedVia::None),
                    };
                    cells.push(id.unwrap_or(NOT_FOUND).to_string());
                    if options.include_source {
                        cells.push(options.labels.label(via).to_string());
                    }
                }
                cells
            })
            .collect();

        Table::new(headers, body)
    }
}
