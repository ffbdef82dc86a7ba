//! Geo Match Common Library
//!
//! アソートメントとGEO別エクスポートを照合するコア処理。
//! ファイルI/Oは持たず、バイト列・テーブルを受け取って結果を返す。

pub mod error;
pub mod export;
pub mod index;
pub mod job;
pub mod key;
pub mod parser;
pub mod reconcile;
pub mod report;
pub mod table;
pub mod types;

pub use error::{Error, Result};
pub use index::{DuplicatePolicy, GeoIndex, IndexStats};
pub use job::{match_geo_table, GeoJobOptions, GeoMatches};
pub use key::{Key, KeyNormalizer};
pub use parser::{parse_assortment, parse_geo_records, AssortmentLayout, GeoLayout, ParseOptions};
pub use reconcile::{reconcile_all, reconcile_item};
pub use report::{CoverageReport, GeoCoverage, ReportRow, SourceLabels, TableOptions, NOT_FOUND};
pub use table::{decode_text, ColumnRef, Table, TextEncoding};
pub use types::{AssortmentItem, GeoCode, GeoRecord, MatchResult, MatchedVia};
