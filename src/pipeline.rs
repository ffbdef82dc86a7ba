//! 照合パイプライン
//!
//! 1. アソートメント読み込み
//! 2. GEOファイルごとに 読み込み→パース→インデックス→照合（並列・独立）
//! 3. GEOキーでレポートに統合
//!
//! GEOファイル単位のエラーは `FileFailure` として記録し、処理は継続する。

use crate::config::Config;
use crate::error::{GeoMatchError, Result};
use crate::loader::{load_table, LoadOptions};
use crate::scanner::{display_name, FileFailure, GeoInput};
use geo_match_common::{
    match_geo_table, parse_assortment, AssortmentItem, CoverageReport, GeoCode, GeoMatches,
    IndexStats, TextEncoding,
};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use std::path::Path;

/// GEOファイルごとの処理結果
#[derive(Debug, Clone, Serialize)]
pub struct GeoFileStats {
    pub geo: GeoCode,
    pub file: String,
    pub encoding: Option<TextEncoding>,
    pub index: IndexStats,
    pub found: usize,
}

/// 1回の照合実行の結果
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub items: Vec<AssortmentItem>,
    pub report: CoverageReport,
    pub files: Vec<GeoFileStats>,
    pub failures: Vec<FileFailure>,
}

fn load_options(config: &Config) -> Result<LoadOptions> {
    Ok(LoadOptions {
        delimiter: config.delimiter_byte()?,
        allow_legacy_encoding: config.legacy_encoding_fallback,
    })
}

/// アソートメントを読み込んで正規化
pub fn load_assortment(path: &Path, config: &Config) -> Result<Vec<AssortmentItem>> {
    let loaded = load_table(path, &load_options(config)?)?;
    let items = parse_assortment(&loaded.table, &config.assortment_layout, &config.parse_options())?;

    if items.is_empty() {
        return Err(GeoMatchError::EmptyAssortment(path.display().to_string()));
    }

    let blank = items.iter().filter(|i| i.sku.is_empty()).count();
    if blank > 0 {
        tracing::warn!("SKUが空の行: {}件 (全GEOで Not Found になります)", blank);
    }

    Ok(items)
}

fn process_geo_file(
    items: &[AssortmentItem],
    input: &GeoInput,
    config: &Config,
    load: &LoadOptions,
) -> std::result::Result<(GeoMatches, GeoFileStats), FileFailure> {
    let fail = |e: GeoMatchError| FileFailure {
        file: input.file_name(),
        geo: Some(input.geo),
        reason: e.to_string(),
    };

    let loaded = load_table(&input.path, load).map_err(fail)?;
    let matches = match_geo_table(items, &loaded.table, input.geo, &config.geo_job_options())
        .map_err(|e| fail(e.into()))?;

    tracing::debug!(
        "{} ({}): {}行, 一致 {}/{}",
        input.geo,
        input.file_name(),
        matches.stats.records,
        matches.found_count(),
        items.len()
    );

    let stats = GeoFileStats {
        geo: input.geo,
        file: input.file_name(),
        encoding: loaded.encoding,
        index: matches.stats.clone(),
        found: matches.found_count(),
    };
    Ok((matches, stats))
}

/// GEOファイル群を照合してレポートを作成
///
/// GEOごとの処理は並列に行い、結果はGEOキーで統合するため処理順に依存しない。
pub fn reconcile_files(
    items: Vec<AssortmentItem>,
    inputs: &[GeoInput],
    config: &Config,
    show_progress: bool,
) -> Result<RunOutcome> {
    let load = load_options(config)?;

    let progress = if show_progress {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("  {bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcomes: Vec<_> = inputs
        .par_iter()
        .map(|input| {
            let outcome = process_geo_file(&items, input, config, &load);
            progress.inc(1);
            outcome
        })
        .collect();
    progress.finish_and_clear();

    let mut per_geo = Vec::new();
    let mut files = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok((matches, stats)) => {
                per_geo.push((matches.geo, matches.results));
                files.push(stats);
            }
            Err(failure) => {
                tracing::warn!("{} をスキップ: {}", failure.file, failure.reason);
                failures.push(failure);
            }
        }
    }

    let report = CoverageReport::assemble(&items, per_geo)?;

    Ok(RunOutcome {
        items,
        report,
        files,
        failures,
    })
}

/// アソートメント読み込みから照合まで一括実行
pub fn run(
    assortment: &Path,
    inputs: &[GeoInput],
    config: &Config,
    show_progress: bool,
) -> Result<RunOutcome> {
    if inputs.is_empty() {
        return Err(GeoMatchError::NoGeoFiles);
    }

    let items = load_assortment(assortment, config)?;
    tracing::info!("{}: {}件", display_name(assortment), items.len());

    let outcome = reconcile_files(items, inputs, config, show_progress)?;
    if outcome.report.geos.is_empty() {
        return Err(GeoMatchError::NoGeoFiles);
    }
    Ok(outcome)
}
