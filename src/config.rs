use crate::error::{GeoMatchError, Result};
use geo_match_common::{
    AssortmentLayout, DuplicatePolicy, GeoCode, GeoJobOptions, GeoLayout, ParseOptions,
    SourceLabels, TableOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV区切り文字
    pub delimiter: char,
    /// バーコード/SKUの先頭ゼロを除去
    pub strip_leading_zeros: bool,
    /// UTF-8で読めない場合にwindows-1252で再試行
    pub legacy_encoding_fallback: bool,
    pub duplicate_policy: DuplicatePolicy,
    pub geo_layout: GeoLayout,
    pub assortment_layout: AssortmentLayout,
    /// `<GEO> Source` 列を出力
    pub include_source: bool,
    pub source_labels: SourceLabels,
    /// 移行候補の対象GEO（空なら移行候補を出さない）
    pub migration_geos: Vec<GeoCode>,
    /// 出力ファイル名（拡張子なし）
    pub output_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: ',',
            strip_leading_zeros: true,
            legacy_encoding_fallback: true,
            duplicate_policy: DuplicatePolicy::KeepFirst,
            geo_layout: GeoLayout::default(),
            assortment_layout: AssortmentLayout::default(),
            include_source: true,
            source_labels: SourceLabels::default(),
            migration_geos: Vec::new(),
            output_name: "farfetch_validation".into(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// 指定パスから読み込み（存在しなければ既定値）
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            config.delimiter_byte()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 既定値で設定ファイルを作成（既存ファイルは読まずに上書き）
    pub fn init_at(path: &Path) -> Result<Self> {
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| GeoMatchError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("geo-match").join("config.json"))
    }

    /// 区切り文字（ASCII 1文字のみ）
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() && !self.delimiter.is_ascii_alphanumeric() {
            Ok(self.delimiter as u8)
        } else {
            Err(GeoMatchError::Config(format!(
                "区切り文字はASCII記号1文字で指定してください: {:?}",
                self.delimiter
            )))
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strip_leading_zeros: self.strip_leading_zeros,
        }
    }

    pub fn geo_job_options(&self) -> GeoJobOptions {
        GeoJobOptions {
            layout: self.geo_layout.clone(),
            parse: self.parse_options(),
            duplicate_policy: self.duplicate_policy,
        }
    }

    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            include_source: self.include_source,
            labels: self.source_labels.clone(),
        }
    }

    /// SKUのみ照合（alt id列を両側で無視）
    pub fn use_sku_only(&mut self) {
        self.geo_layout = self.geo_layout.sku_only();
        self.assortment_layout = self.assortment_layout.sku_only();
    }
}
