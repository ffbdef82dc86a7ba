use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoMatchError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("照合可能なGEOファイルがありません。`--geo US=export.csv` または `--geo-dir` で指定してください")]
    NoGeoFiles,

    #[error("アソートメントにデータ行がありません: {0}")]
    EmptyAssortment(String),

    #[error("Excel読み込みエラー: {0}")]
    ExcelRead(String),

    #[error("Excel生成エラー: {0}")]
    ExcelGeneration(String),

    #[error("CSVエラー: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] geo_match_common::Error),
}

pub type Result<T> = std::result::Result<T, GeoMatchError>;
