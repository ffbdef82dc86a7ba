//! 照合パイプラインの統合テスト
//!
//! 実ファイル（一時ディレクトリ）を使って 読み込み→照合→レポート を検証

use geo_match_rust::cli::GeoFileArg;
use geo_match_rust::config::Config;
use geo_match_rust::error::GeoMatchError;
use geo_match_rust::pipeline;
use geo_match_rust::scanner::{self, GeoInput};
use geo_match_common::{GeoCode, MatchedVia, TableOptions, TextEncoding};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const GEO_HEADER: &str = "FF ID,Brand,Name,Category,Price,Partner ID,Stock,Barcode";

/// GEOエクスポート1行（A列=内部ID、F列=パートナーID、H列=バーコード）
fn geo_row(id: &str, alt: &str, barcode: &str) -> String {
    format!("{},Brand,Item,Cat,100,{},1,{}", id, alt, barcode)
}

fn write_geo(dir: &Path, name: &str, rows: &[String]) -> PathBuf {
    let mut content = String::from(GEO_HEADER);
    for row in rows {
        content.push('\n');
        content.push_str(row);
    }
    let path = dir.join(name);
    std::fs::write(&path, content).expect("GEOファイル書き込み失敗");
    path
}

fn write_assortment(dir: &Path, rows: &[(&str, &str, &str)]) -> PathBuf {
    let mut content = String::from("SKU,Netta ID,Opt ID");
    for (sku, alt1, alt2) in rows {
        content.push_str(&format!("\n{},{},{}", sku, alt1, alt2));
    }
    let path = dir.join("assortment.csv");
    std::fs::write(&path, content).expect("アソートメント書き込み失敗");
    path
}

fn input(geo: GeoCode, path: PathBuf) -> GeoInput {
    GeoInput { geo, path }
}

fn plain_options() -> TableOptions {
    TableOptions {
        include_source: false,
        ..Default::default()
    }
}

/// 2GEO・2SKUの基本シナリオ
#[test]
fn test_end_to_end_us_au() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("123", "", ""), ("456", "", "")]);
    let us = write_geo(dir.path(), "us.csv", &[geo_row("P1", "", "123")]);
    let au = write_geo(dir.path(), "au.csv", &[geo_row("P9", "", "456")]);

    let outcome = pipeline::run(
        &assortment,
        &[input(GeoCode::US, us), input(GeoCode::AU, au)],
        &Config::default(),
        false,
    )
    .expect("照合に失敗");

    let table = outcome.report.to_table(&plain_options());
    assert_eq!(table.headers, vec!["SKU", "US ID", "AU ID"]);
    assert_eq!(table.rows[0], vec!["123", "P1", "Not Found"]);
    assert_eq!(table.rows[1], vec!["456", "Not Found", "P9"]);

    for geo in [GeoCode::US, GeoCode::AU] {
        let cov = outcome.report.coverage_for(geo).expect("カバレッジがない");
        assert_eq!((cov.found, cov.total), (1, 2));
    }
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.files.len(), 2);
}

/// バーコード→代替ID1→代替ID2 の優先順
#[test]
fn test_match_priority_through_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(
        dir.path(),
        &[("0000123", "N1", "O1"), ("999", "N2", "O2"), ("888", "x", "O3")],
    );
    let hk = write_geo(
        dir.path(),
        "hk.csv",
        &[
            geo_row("BY-BARCODE", "N1", "123.0"),
            geo_row("BY-ALT1", "N2", "555"),
            geo_row("BY-ALT2", "O3", "777"),
        ],
    );

    let outcome = pipeline::run(&assortment, &[input(GeoCode::HK, hk)], &Config::default(), false)
        .expect("照合に失敗");

    let via: Vec<_> = outcome
        .report
        .rows
        .iter()
        .map(|r| {
            let result = r.result(GeoCode::HK).expect("HKの結果がない");
            (result.internal_id.clone(), result.matched_via)
        })
        .collect();

    assert_eq!(
        via,
        vec![
            (Some("BY-BARCODE".to_string()), MatchedVia::Barcode),
            (Some("BY-ALT1".to_string()), MatchedVia::AltId1),
            (Some("BY-ALT2".to_string()), MatchedVia::AltId2),
        ]
    );
}

/// 同じバーコードが2行ある場合は先の行が採用される
#[test]
fn test_duplicate_barcode_first_wins() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("123", "", "")]);
    let de = write_geo(
        dir.path(),
        "de.csv",
        &[geo_row("FIRST", "", "123"), geo_row("SECOND", "", "123")],
    );

    let outcome = pipeline::run(&assortment, &[input(GeoCode::DE, de)], &Config::default(), false)
        .expect("照合に失敗");

    let result = outcome.report.rows[0].result(GeoCode::DE).expect("DEの結果がない");
    assert_eq!(result.internal_id.as_deref(), Some("FIRST"));
    assert_eq!(outcome.files[0].index.duplicate_barcodes, 1);
}

/// windows-1252 のファイルも読み込める
#[test]
fn test_legacy_encoding_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("123", "", "")]);

    // "Café" を windows-1252 (0xE9) で含む
    let mut bytes = GEO_HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(b"\nP1,Caf\xe9,Item,Cat,100,,1,123");
    let jp = dir.path().join("jp.csv");
    std::fs::write(&jp, bytes).expect("書き込み失敗");

    let outcome = pipeline::run(&assortment, &[input(GeoCode::JP, jp.clone())], &Config::default(), false)
        .expect("照合に失敗");
    assert_eq!(outcome.files[0].encoding, Some(TextEncoding::Legacy));
    assert_eq!(outcome.report.coverage_for(GeoCode::JP).map(|c| c.found), Some(1));

    // フォールバック無効なら失敗として記録され、他のGEOがないので全体エラー
    let config = Config {
        legacy_encoding_fallback: false,
        ..Default::default()
    };
    let result = pipeline::run(&assortment, &[input(GeoCode::JP, jp)], &config, false);
    assert!(matches!(result, Err(GeoMatchError::NoGeoFiles)));
}

/// 列が足りないGEOファイルはスキップし、他のGEOは処理を続ける
#[test]
fn test_structural_failure_is_per_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("123", "", "")]);
    let us = write_geo(dir.path(), "us.csv", &[geo_row("P1", "", "123")]);
    let broken = dir.path().join("ch.csv");
    std::fs::write(&broken, "FF ID,Barcode\nP2,123").expect("書き込み失敗");

    let outcome = pipeline::run(
        &assortment,
        &[input(GeoCode::US, us), input(GeoCode::CH, broken)],
        &Config::default(),
        false,
    )
    .expect("照合に失敗");

    assert_eq!(outcome.report.geos, vec![GeoCode::US]);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].file, "ch.csv");
    assert_eq!(outcome.failures[0].geo, Some(GeoCode::CH));
}

/// 列名指定でも照合できる
#[test]
fn test_named_columns() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("123", "", "")]);
    let us = dir.path().join("us.csv");
    std::fs::write(&us, "Barcode;Id\n123;P1").expect("書き込み失敗");

    let mut config = Config {
        delimiter: ';',
        ..Default::default()
    };
    config.geo_layout.internal_id = "Id".parse().expect("列指定");
    config.geo_layout.barcode = "barcode".parse().expect("列指定");
    config.geo_layout.alt_id = None;
    std::fs::write(&assortment, "SKU;Netta ID;Opt ID\n123;;").expect("書き込み失敗");

    let outcome = pipeline::run(&assortment, &[input(GeoCode::US, us)], &config, false)
        .expect("照合に失敗");
    let result = outcome.report.rows[0].result(GeoCode::US).expect("USの結果がない");
    assert_eq!(result.internal_id.as_deref(), Some("P1"));
}

/// 同じ入力で2回実行すると同じレポートになる
#[test]
fn test_reprocessing_is_idempotent() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("1", "", ""), ("2", "a", ""), ("3", "", "b")]);
    let inputs: Vec<GeoInput> = [
        (GeoCode::HK, vec![geo_row("H1", "a", "1")]),
        (GeoCode::US, vec![geo_row("U3", "b", "9")]),
        (GeoCode::AU, vec![geo_row("A2", "", "2")]),
    ]
    .into_iter()
    .map(|(geo, rows)| input(geo, write_geo(dir.path(), &format!("{}.csv", geo), &rows)))
    .collect();

    let config = Config::default();
    let first = pipeline::run(&assortment, &inputs, &config, false).expect("照合に失敗");
    let mut reversed = inputs.clone();
    reversed.reverse();
    let second = pipeline::run(&assortment, &reversed, &config, false).expect("照合に失敗");

    assert_eq!(first.report, second.report);
}

/// フォルダ指定ではファイル名からGEOを推定し、重複GEOは後のファイルを失敗扱い
#[test]
fn test_resolve_inputs_from_folder() {
    let dir = tempdir().expect("Failed to create temp dir");
    write_geo(dir.path(), "export_US.csv", &[]);
    write_geo(dir.path(), "export_us_v2.csv", &[]);
    write_geo(dir.path(), "HK_vs_JP.csv", &[]);
    write_geo(dir.path(), "AU-2024.csv", &[]);
    std::fs::write(dir.path().join("notes.json"), "{}").expect("書き込み失敗");

    let (inputs, failures) = scanner::resolve_inputs(&[], Some(dir.path())).expect("解決に失敗");

    let geos: Vec<_> = inputs.iter().map(|i| i.geo).collect();
    assert_eq!(geos, vec![GeoCode::AU, GeoCode::US]);
    assert_eq!(failures.len(), 2);
    assert!(failures.iter().any(|f| f.file == "HK_vs_JP.csv" && f.geo.is_none()));
    assert!(failures
        .iter()
        .any(|f| f.file == "export_us_v2.csv" && f.geo == Some(GeoCode::US)));
}

/// 明示指定はフォルダ推定より優先される
#[test]
fn test_explicit_mapping_takes_precedence() {
    let dir = tempdir().expect("Failed to create temp dir");
    let explicit = write_geo(dir.path(), "export_US.csv", &[]);
    write_geo(dir.path(), "us_backup.csv", &[]);

    let args = vec![GeoFileArg {
        geo: GeoCode::DE,
        path: explicit,
    }];
    let (inputs, failures) = scanner::resolve_inputs(&args, Some(dir.path())).expect("解決に失敗");

    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs[0].geo, GeoCode::DE);
    assert_eq!(inputs[1].geo, GeoCode::US);
    assert_eq!(inputs[1].file_name(), "us_backup.csv");
    assert!(failures.is_empty());
}

/// GEOファイル未指定
#[test]
fn test_run_without_geo_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[("123", "", "")]);

    let result = pipeline::run(&assortment, &[], &Config::default(), false);
    assert!(matches!(result, Err(GeoMatchError::NoGeoFiles)));
}

/// ヘッダーのみのアソートメント
#[test]
fn test_empty_assortment() {
    let dir = tempdir().expect("Failed to create temp dir");
    let assortment = write_assortment(dir.path(), &[]);
    let us = write_geo(dir.path(), "us.csv", &[geo_row("P1", "", "123")]);

    let result = pipeline::run(&assortment, &[input(GeoCode::US, us)], &Config::default(), false);
    assert!(matches!(result, Err(GeoMatchError::EmptyAssortment(_))));
}

/// 明示指定とフォルダ内のファイルが同一なら、表記が違っても二重に数えない
#[test]
fn test_explicit_path_deduped_after_canonicalize() {
    let dir = tempdir().expect("Failed to create temp dir");
    std::fs::create_dir(dir.path().join("sub")).expect("フォルダ作成失敗");
    write_geo(dir.path(), "export_US.csv", &[]);

    let indirect = dir.path().join("sub").join("..").join("export_US.csv");
    let args = vec![GeoFileArg {
        geo: GeoCode::DE,
        path: indirect,
    }];
    let (inputs, failures) = scanner::resolve_inputs(&args, Some(dir.path())).expect("解決に失敗");

    assert_eq!(inputs.len(), 1);
    assert_eq!(inputs[0].geo, GeoCode::DE);
    assert!(failures.is_empty(), "余計な失敗: {:?}", failures);
}

/// GEOを推定できないファイルは Unknown 列として照合され、2つ目は重複扱い
#[test]
fn test_unknown_geo_flows_through_report() {
    let dir = tempdir().expect("Failed to create temp dir");
    let geo_dir = dir.path().join("exports");
    std::fs::create_dir(&geo_dir).expect("フォルダ作成失敗");
    let assortment = write_assortment(dir.path(), &[("123", "", ""), ("456", "", "")]);
    write_geo(&geo_dir, "export_US.csv", &[geo_row("P1", "", "123")]);
    write_geo(&geo_dir, "products.csv", &[geo_row("X9", "", "456")]);
    write_geo(&geo_dir, "stock.csv", &[geo_row("X8", "", "123")]);

    let (inputs, failures) = scanner::resolve_inputs(&[], Some(&geo_dir)).expect("解決に失敗");
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].file, "stock.csv");
    assert_eq!(failures[0].geo, Some(GeoCode::Unknown));

    let outcome = pipeline::run(&assortment, &inputs, &Config::default(), false)
        .expect("照合に失敗");

    let table = outcome.report.to_table(&plain_options());
    assert_eq!(table.headers, vec!["SKU", "US ID", "Unknown ID"]);
    assert_eq!(table.rows[0], vec!["123", "P1", "Not Found"]);
    assert_eq!(table.rows[1], vec!["456", "Not Found", "X9"]);
}
