//! GEOファイルの収集とGEO割り当て
//!
//! 明示指定（`US=path`）を優先し、フォルダ指定分はファイル名から推定する。
//! ファイル名推定は英字トークン単位の完全一致のみ（`export_US_2024.csv` → US）。

use crate::cli::GeoFileArg;
use crate::error::{GeoMatchError, Result};
use geo_match_common::GeoCode;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const TABLE_EXTENSIONS: &[&str] = &["csv", "txt", "tsv", "xlsx", "xls"];

lazy_static! {
    static ref NON_LETTERS: Regex = Regex::new(r"[^A-Za-z]+").expect("valid regex");
}

/// 照合対象のGEOファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInput {
    pub geo: GeoCode,
    pub path: PathBuf,
}

impl GeoInput {
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }
}

/// ファイル単位の失敗（実行は継続）
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileFailure {
    pub file: String,
    pub geo: Option<GeoCode>,
    pub reason: String,
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// 表形式ファイルの拡張子か
pub fn is_table_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            TABLE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// フォルダ直下の表形式ファイルを列挙（名前順）
pub fn scan_folder(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(GeoMatchError::FolderNotFound(folder.display().to_string()));
    }

    let mut files: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1) // 直下のみ（再帰しない）
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && is_table_file(p))
        .collect();

    files.sort_by_key(|p| display_name(p));
    Ok(files)
}

/// ファイル名からGEOを推定
///
/// 該当なしは `Unknown`、複数の異なるコードを含む場合はエラー。
pub fn infer_geo(file_name: &str) -> std::result::Result<GeoCode, String> {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| file_name.to_string());

    let mut found: Vec<GeoCode> = Vec::new();
    for token in NON_LETTERS.split(&stem) {
        if let Some(code) = GeoCode::KNOWN
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(token))
        {
            if !found.contains(code) {
                found.push(*code);
            }
        }
    }

    match found.as_slice() {
        [] => Ok(GeoCode::Unknown),
        [single] => Ok(*single),
        many => Err(format!(
            "ファイル名に複数のGEOコードが含まれています ({})。`--geo CODE=path` で明示してください",
            many.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", ")
        )),
    }
}

/// 比較用の正規化パス（解決できなければそのまま）
fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

/// 明示指定とフォルダ指定からGEO割り当てを確定
///
/// 同じGEOに2つ目のファイルが来た場合、後のファイルを失敗として記録する。
pub fn resolve_inputs(
    explicit: &[GeoFileArg],
    folder: Option<&Path>,
) -> Result<(Vec<GeoInput>, Vec<FileFailure>)> {
    let mut assigned: BTreeMap<GeoCode, PathBuf> = BTreeMap::new();
    let mut inputs = Vec::new();
    let mut failures = Vec::new();

    let mut candidates: Vec<(std::result::Result<GeoCode, String>, PathBuf)> = explicit
        .iter()
        .map(|arg| (Ok(arg.geo), arg.path.clone()))
        .collect();

    if let Some(dir) = folder {
        let explicit_paths: Vec<PathBuf> = explicit.iter().map(|arg| canonical(&arg.path)).collect();
        for path in scan_folder(dir)? {
            if explicit_paths.contains(&canonical(&path)) {
                continue;
            }
            candidates.push((infer_geo(&display_name(&path)), path));
        }
    }

    for (geo, path) in candidates {
        let geo = match geo {
            Ok(geo) => geo,
            Err(reason) => {
                failures.push(FileFailure {
                    file: display_name(&path),
                    geo: None,
                    reason,
                });
                continue;
            }
        };

        if let Some(existing) = assigned.get(&geo) {
            failures.push(FileFailure {
                file: display_name(&path),
                geo: Some(geo),
                reason: format!("{} は既に {} に割り当て済み", geo, display_name(existing)),
            });
            continue;
        }

        if geo == GeoCode::Unknown {
            tracing::warn!("GEOを推定できません: {} (Unknown として処理)", display_name(&path));
        }

        assigned.insert(geo, path.clone());
        inputs.push(GeoInput { geo, path });
    }

    Ok((inputs, failures))
}
