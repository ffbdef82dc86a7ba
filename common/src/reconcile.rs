//! 照合エンジン
//!
//! 優先順位は固定（バーコードが正、alt idは再キーされた商品の救済）:
//! 1. SKU → barcodeインデックス
//! 2. alt id 1 → alt idインデックス
//! 3. alt id 2 → alt idインデックス
//!
//! 完全一致のみ。部分一致・あいまい一致は行わない。

use crate::index::GeoIndex;
use crate::types::{AssortmentItem, MatchResult, MatchedVia};

/// 1アイテムを1 GEOに対して照合
pub fn reconcile_item(item: &AssortmentItem, index: &GeoIndex) -> MatchResult {
    let attempts = [
        (item.sku.as_lookup(), MatchedVia::Barcode),
        (item.alt_id1.as_lookup(), MatchedVia::AltId1),
        (item.alt_id2.as_lookup(), MatchedVia::AltId2),
    ];

    for (key, via) in attempts {
        let Some(key) = key else { continue };
        let hit = match via {
            MatchedVia::Barcode => index.by_barcode(key),
            _ => index.by_alt_id(key),
        };
        if let Some(internal_id) = hit {
            return MatchResult::found(index.geo(), internal_id, via);
        }
    }

    MatchResult::not_found(index.geo())
}

/// アソートメント全体を照合（入力順を保持）
pub fn reconcile_all(items: &[AssortmentItem], index: &GeoIndex) -> Vec<MatchResult> {
    items.iter().map(|item| reconcile_item(item, index)).collect()
}
