//! 1 GEOファイル分の照合処理
//!
//! パース → インデックス構築 → 照合 を1つの単位にまとめる。
//! GEOごとに独立しており、状態を共有しない。

use crate::error::Result;
use crate::index::{DuplicatePolicy, GeoIndex, IndexStats};
use crate::parser::{parse_geo_records, GeoLayout, ParseOptions};
use crate::reconcile::reconcile_all;
use crate::table::Table;
use crate::types::{AssortmentItem, GeoCode, MatchResult};

/// GEO照合の設定
#[derive(Debug, Clone, Default)]
pub struct GeoJobOptions {
    pub layout: GeoLayout,
    pub parse: ParseOptions,
    pub duplicate_policy: DuplicatePolicy,
}

/// 1 GEO分の照合結果
#[derive(Debug, Clone)]
pub struct GeoMatches {
    pub geo: GeoCode,
    pub results: Vec<MatchResult>,
    pub stats: IndexStats,
}

impl GeoMatches {
    pub fn found_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_found()).count()
    }
}

/// GEOエクスポートのテーブルを照合
pub fn match_geo_table(
    items: &[AssortmentItem],
    table: &Table,
    geo: GeoCode,
    options: &GeoJobOptions,
) -> Result<GeoMatches> {
    let records = parse_geo_records(table, geo, &options.layout, &options.parse)?;
    let index = GeoIndex::build(geo, &records, options.duplicate_policy);
    let results = reconcile_all(items, &index);

    Ok(GeoMatches {
        geo,
        results,
        stats: index.stats().clone(),
    })
}
