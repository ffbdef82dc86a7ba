use clap::{Parser, Subcommand};
use geo_match_common::{ColumnRef, GeoCode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geo-match")]
#[command(about = "アソートメント×GEOエクスポート照合・カバレッジレポート生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// アソートメントをGEOエクスポートと照合してレポートを出力
    Check {
        /// アソートメントファイル（CSV/Excel）
        #[arg(short, long, required = true)]
        assortment: PathBuf,

        /// GEOファイルの明示指定（例: US=export_us.csv、複数可）
        #[arg(short, long = "geo")]
        geo: Vec<GeoFileArg>,

        /// GEOファイルのフォルダ（GEOはファイル名から推定）
        #[arg(long)]
        geo_dir: Option<PathBuf>,

        /// 出力ファイル/ディレクトリ
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 出力形式 (csv/excel/both)
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,

        /// Source列を出力しない
        #[arg(long)]
        no_source: bool,

        /// バーコード/SKUの先頭ゼロを保持
        #[arg(long)]
        keep_zeros: bool,

        /// SKUのみで照合（代替IDを使わない）
        #[arg(long)]
        sku_only: bool,

        /// 移行候補の対象GEO（カンマ区切り、例: HK,US,DE）
        #[arg(long, value_delimiter = ',')]
        migration: Vec<GeoCode>,

        /// CSV区切り文字
        #[arg(short, long)]
        delimiter: Option<char>,

        /// レガシーエンコーディング（windows-1252）での再試行を無効化
        #[arg(long)]
        no_legacy_encoding: bool,

        /// 実行サマリーJSONも出力
        #[arg(long)]
        summary: bool,

        #[command(flatten)]
        columns: ColumnArgs,
    },

    /// ファイルのヘッダーと列位置を表示
    Inspect {
        /// 対象ファイル（CSV/Excel）
        #[arg(required = true)]
        file: PathBuf,

        /// 表示するデータ行数
        #[arg(short, long, default_value = "3")]
        rows: usize,

        /// CSV区切り文字
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// 設定を表示/初期化
    Config {
        /// 既定値で設定ファイルを作成（既存は上書き）
        #[arg(long)]
        init: bool,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}

/// 列指定の上書き（`#7` で位置、それ以外はヘッダー名）
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ColumnArgs {
    /// アソートメントのSKU列
    #[arg(long)]
    pub sku_col: Option<ColumnRef>,

    /// アソートメントの代替ID1列
    #[arg(long)]
    pub alt1_col: Option<ColumnRef>,

    /// アソートメントの代替ID2列
    #[arg(long)]
    pub alt2_col: Option<ColumnRef>,

    /// GEOエクスポートの内部ID列
    #[arg(long)]
    pub geo_id_col: Option<ColumnRef>,

    /// GEOエクスポートのパートナーID列
    #[arg(long)]
    pub geo_alt_col: Option<ColumnRef>,

    /// GEOエクスポートのバーコード列
    #[arg(long)]
    pub geo_barcode_col: Option<ColumnRef>,
}

/// `US=path/to/export.csv`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeoFileArg {
    pub geo: GeoCode,
    pub path: PathBuf,
}

impl std::str::FromStr for GeoFileArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (code, path) = s
            .split_once('=')
            .ok_or_else(|| format!("GEO=ファイル の形式で指定してください: {}", s))?;
        let path = path.trim();
        if path.is_empty() {
            return Err(format!("ファイルパスが空です: {}", s));
        }
        Ok(GeoFileArg {
            geo: code.parse()?,
            path: PathBuf::from(path),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Both,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "both" => Ok(ExportFormat::Both),
            _ => Err(format!("Unknown format: {}. Use csv, excel, or both", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportFormat::Csv => write!(f, "csv"),
            ExportFormat::Excel => write!(f, "excel"),
            ExportFormat::Both => write!(f, "both"),
        }
    }
}
