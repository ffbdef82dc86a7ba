//! GEO別ルックアップインデックス
//!
//! GEOエクスポートのレコード列から `barcode → 内部ID` と
//! `alt id → 内部ID` の2つのマップを構築する。

use crate::types::{GeoCode, GeoRecord};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// 重複キーの解決方針
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicatePolicy {
    /// ファイル順で最初の行を採用（既定）
    #[default]
    KeepFirst,
    /// ファイル順で最後の行を採用
    KeepLast,
}

/// インデックス構築の統計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// 入力レコード数
    pub records: usize,
    /// 内部IDが空でスキップした行数
    pub skipped_blank_ids: usize,
    /// 捨てられた重複バーコード数
    pub duplicate_barcodes: usize,
    /// 捨てられた重複alt id数
    pub duplicate_alt_ids: usize,
}

/// 1 GEO分のインデックス（構築後は読み取り専用）
#[derive(Debug, Clone)]
pub struct GeoIndex {
    geo: GeoCode,
    by_barcode: HashMap<String, String>,
    by_alt_id: HashMap<String, String>,
    stats: IndexStats,
}

/// 方針に従って挿入。重複で値を捨てたら true
fn insert_with_policy(
    map: &mut HashMap<String, String>,
    key: &str,
    value: &str,
    policy: DuplicatePolicy,
) -> bool {
    match map.entry(key.to_string()) {
        Entry::Vacant(slot) => {
            slot.insert(value.to_string());
            false
        }
        Entry::Occupied(mut slot) => {
            if policy == DuplicatePolicy::KeepLast {
                slot.insert(value.to_string());
            }
            true
        }
    }
}

impl GeoIndex {
    pub fn build(geo: GeoCode, records: &[GeoRecord], policy: DuplicatePolicy) -> Self {
        let mut by_barcode = HashMap::with_capacity(records.len());
        let mut by_alt_id = HashMap::new();
        let mut stats = IndexStats {
            records: records.len(),
            ..Default::default()
        };

        for record in records {
            let Some(internal_id) = record.internal_id.as_lookup() else {
                stats.skipped_blank_ids += 1;
                continue;
            };

            if let Some(barcode) = record.barcode.as_lookup() {
                if insert_with_policy(&mut by_barcode, barcode, internal_id, policy) {
                    stats.duplicate_barcodes += 1;
                }
            }

            if let Some(alt_id) = record.alt_id.as_lookup() {
                if insert_with_policy(&mut by_alt_id, alt_id, internal_id, policy) {
                    stats.duplicate_alt_ids += 1;
                }
            }
        }

        tracing::debug!(
            "{} インデックス: barcode {}件, alt id {}件, 重複 {}/{}",
            geo,
            by_barcode.len(),
            by_alt_id.len(),
            stats.duplicate_barcodes,
            stats.duplicate_alt_ids
        );

        Self {
            geo,
            by_barcode,
            by_alt_id,
            stats,
        }
    }

    pub fn geo(&self) -> GeoCode {
        self.geo
    }

    pub fn by_barcode(&self, key: &str) -> Option<&str> {
        self.by_barcode.get(key).map(|s| s.as_str())
    }

    pub fn by_alt_id(&self, key: &str) -> Option<&str> {
        self.by_alt_id.get(key).map(|s| s.as_str())
    }

    pub fn barcode_count(&self) -> usize {
        self.by_barcode.len()
    }

    pub fn alt_id_count(&self) -> usize {
        self.by_alt_id.len()
    }

    pub fn stats(&self) -> &IndexStats {
        &self.stats
    }
}
