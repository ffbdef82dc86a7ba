//! エラー型定義

use thiserror::Error;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// UTF-8でもレガシーエンコーディングでも読めない
    #[error("Decode error: cannot decode as {encoding}")]
    Decode { encoding: String },

    /// 必要な列が見つからない
    #[error("Structural error: {role} column {column} not found")]
    Structural { role: String, column: String },

    #[error("Report error: {0}")]
    Report(String),
}

impl Error {
    pub fn structural(role: impl Into<String>, column: impl std::fmt::Display) -> Self {
        Error::Structural {
            role: role.into(),
            column: column.to_string(),
        }
    }
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;
