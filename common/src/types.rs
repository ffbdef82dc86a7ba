//! 照合処理の型定義
//!
//! - GeoCode: マーケット（GEO）コード
//! - AssortmentItem: アソートメント1行（照合の軸）
//! - GeoRecord: GEOエクスポート1行
//! - MatchResult: アイテム×GEOの照合結果

use crate::key::Key;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// マーケットコード
///
/// 宣言順がレポートの列順になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeoCode {
    HK,
    US,
    DE,
    CH,
    JP,
    AU,
    Unknown,
}

impl GeoCode {
    /// ファイル名推定の対象となる既知コード
    pub const KNOWN: [GeoCode; 6] = [
        GeoCode::HK,
        GeoCode::US,
        GeoCode::DE,
        GeoCode::CH,
        GeoCode::JP,
        GeoCode::AU,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GeoCode::HK => "HK",
            GeoCode::US => "US",
            GeoCode::DE => "DE",
            GeoCode::CH => "CH",
            GeoCode::JP => "JP",
            GeoCode::AU => "AU",
            GeoCode::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for GeoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeoCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HK" => Ok(GeoCode::HK),
            "US" => Ok(GeoCode::US),
            "DE" => Ok(GeoCode::DE),
            "CH" => Ok(GeoCode::CH),
            "JP" => Ok(GeoCode::JP),
            "AU" => Ok(GeoCode::AU),
            "UNKNOWN" => Ok(GeoCode::Unknown),
            _ => Err(format!(
                "Unknown GEO code: {}. Use HK, US, DE, CH, JP, AU or Unknown",
                s
            )),
        }
    }
}

/// アソートメント1行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssortmentItem {
    /// 元ファイルのデータ行番号（1始まり、ヘッダー除く）
    pub line: usize,
    pub sku: Key,
    pub alt_id1: Key,
    pub alt_id2: Key,
}

impl AssortmentItem {
    /// SKUのみのアイテム
    pub fn sku_only(line: usize, sku: Key) -> Self {
        Self {
            line,
            sku,
            alt_id1: Key::Empty,
            alt_id2: Key::Empty,
        }
    }
}

/// GEOエクスポート1行（正規化済み）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub geo: GeoCode,
    pub internal_id: Key,
    pub barcode: Key,
    pub alt_id: Key,
}

/// どのキーで一致したか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchedVia {
    Barcode,
    AltId1,
    AltId2,
    None,
}

/// アイテム×GEOの照合結果
///
/// `internal_id` が `None` ⇔ `matched_via == MatchedVia::None`（Not Found）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub geo: GeoCode,
    pub internal_id: Option<String>,
    pub matched_via: MatchedVia,
}

impl MatchResult {
    pub fn found(geo: GeoCode, internal_id: impl Into<String>, via: MatchedVia) -> Self {
        debug_assert!(via != MatchedVia::None);
        Self {
            geo,
            internal_id: Some(internal_id.into()),
            matched_via: via,
        }
    }

    pub fn not_found(geo: GeoCode) -> Self {
        Self {
            geo,
            internal_id: None,
            matched_via: MatchedVia::None,
        }
    }

    pub fn is_found(&self) -> bool {
        self.internal_id.is_some()
    }
}
