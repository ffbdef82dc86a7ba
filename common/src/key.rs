//! キー正規化モジュール
//!
//! SKU・バーコード・代替IDを比較可能な形に揃える。
//!
//! ## 処理順
//! 1. 前後の空白を除去
//! 2. 数値セル由来の末尾 `.0` を除去（数字のみの場合）
//! 3. 先頭ゼロを除去（バーコードモードのみ。全てゼロなら `0` を残す）
//! 4. 1〜3を変化がなくなるまで繰り返し、最後に大文字化
//!
//! 空セルは [`Key::Empty`] になり、照合には一切参加しない。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 正規化済みキー
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Value(String),
    /// 空・欠損セル
    Empty,
}

impl Key {
    /// 照合に使う文字列（空キーは `None`）
    pub fn as_lookup(&self) -> Option<&str> {
        match self {
            Key::Value(v) => Some(v.as_str()),
            Key::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Key::Empty)
    }

    /// 表示用文字列（空キーは空文字）
    pub fn as_str(&self) -> &str {
        self.as_lookup().unwrap_or("")
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// キー正規化器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyNormalizer {
    /// 先頭ゼロを除去する（システム間でゼロ埋めが揃わないバーコード用）
    pub strip_leading_zeros: bool,
}

impl KeyNormalizer {
    /// 代替ID・内部ID用
    pub const fn plain() -> Self {
        Self {
            strip_leading_zeros: false,
        }
    }

    /// バーコード・SKU用
    pub const fn barcode() -> Self {
        Self {
            strip_leading_zeros: true,
        }
    }

    pub fn normalize(&self, raw: &str) -> Key {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Key::Empty;
        }

        let mut value = trimmed;
        loop {
            let next = self.reduce(value);
            if next == value {
                break;
            }
            value = next;
        }

        Key::Value(value.to_uppercase())
    }

    fn reduce<'a>(&self, value: &'a str) -> &'a str {
        let value = strip_float_artifact(value.trim());
        if !self.strip_leading_zeros {
            return value;
        }
        let stripped = value.trim_start_matches('0').trim_start();
        if stripped.is_empty() {
            "0"
        } else {
            stripped
        }
    }
}

/// `123.0` → `123`（`.0` の前が数字のみの場合に限る）
fn strip_float_artifact(value: &str) -> &str {
    match value.strip_suffix(".0") {
        Some(head) if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) => head,
        _ => value,
    }
}
