use clap::Parser;
use geo_match_rust::{cli, config, error, export, loader, pipeline, scanner};
use cli::{Cli, ColumnArgs, Commands};
use config::Config;
use error::Result;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// CLIの列指定で設定を上書き
fn apply_column_args(config: &mut Config, columns: ColumnArgs) {
    if let Some(col) = columns.sku_col {
        config.assortment_layout.sku = col;
    }
    if let Some(col) = columns.alt1_col {
        config.assortment_layout.alt_id1 = Some(col);
    }
    if let Some(col) = columns.alt2_col {
        config.assortment_layout.alt_id2 = Some(col);
    }
    if let Some(col) = columns.geo_id_col {
        config.geo_layout.internal_id = col;
    }
    if let Some(col) = columns.geo_alt_col {
        config.geo_layout.alt_id = Some(col);
    }
    if let Some(col) = columns.geo_barcode_col {
        config.geo_layout.barcode = col;
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            assortment,
            geo,
            geo_dir,
            output,
            format,
            no_source,
            keep_zeros,
            sku_only,
            migration,
            delimiter,
            no_legacy_encoding,
            summary,
            columns,
        } => {
            println!("🔎 geo-match - GEO照合\n");

            let mut config = Config::load()?;
            apply_column_args(&mut config, columns);
            if sku_only {
                config.use_sku_only();
            }
            if keep_zeros {
                config.strip_leading_zeros = false;
            }
            if no_source {
                config.include_source = false;
            }
            if no_legacy_encoding {
                config.legacy_encoding_fallback = false;
            }
            if let Some(d) = delimiter {
                config.delimiter = d;
            }
            if !migration.is_empty() {
                config.migration_geos = migration;
            }

            // 1. 入力確認
            println!("[1/3] 入力ファイルを確認中...");
            let (inputs, pre_failures) = scanner::resolve_inputs(&geo, geo_dir.as_deref())?;
            for failure in &pre_failures {
                println!("⚠ {}: {}", failure.file, failure.reason);
            }
            for input in &inputs {
                println!("  {}: {}", input.geo, input.file_name());
            }
            println!("✔ {}件のGEOファイルを検出\n", inputs.len());

            // 2. 照合
            println!("[2/3] 照合中...");
            let mut outcome = pipeline::run(&assortment, &inputs, &config, !cli.verbose)?;
            for failure in &outcome.failures {
                println!("⚠ {} を処理できませんでした: {}", failure.file, failure.reason);
            }
            let mut failures = pre_failures;
            failures.append(&mut outcome.failures);
            outcome.failures = failures;
            println!("✔ 照合完了 ({}件)\n", outcome.items.len());

            println!("カバレッジ:");
            for cov in &outcome.report.coverage {
                println!("  {:<8} {:>12}  ({:.1}%)", cov.geo, cov.to_string(), cov.ratio() * 100.0);
            }

            let migration_geos = if config.migration_geos.is_empty() {
                None
            } else {
                Some(config.migration_geos.as_slice())
            };
            let migration_count = migration_geos.map(|geos| {
                let count = outcome.report.migration_candidates(geos).len();
                println!("  移行候補: {}件", count);
                count
            });
            println!();

            // 3. 出力
            println!("[3/3] 出力中...");
            let output = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            let written = export::export_report(
                &outcome.report,
                &format,
                &output,
                &config.output_name,
                &config.table_options(),
                migration_geos,
            )?;

            if summary {
                if let Some(first) = written.first() {
                    let summary_path = export::sibling_path(first, "_summary", "json");
                    let run_summary =
                        export::summary::RunSummary::new(&assortment, &outcome, migration_count);
                    export::summary::generate_summary(&run_summary, &summary_path)?;
                    println!("✔ サマリー出力: {}", summary_path.display());
                }
            }

            println!("\n✅ 完了");
        }

        Commands::Inspect { file, rows, delimiter } => {
            let mut config = Config::load()?;
            if let Some(d) = delimiter {
                config.delimiter = d;
            }
            let options = loader::LoadOptions {
                delimiter: config.delimiter_byte()?,
                allow_legacy_encoding: config.legacy_encoding_fallback,
            };

            let loaded = loader::load_table(&file, &options)?;
            println!("📄 {}", file.display());
            if let Some(encoding) = loaded.encoding {
                println!("  エンコーディング: {}", encoding);
            }
            println!("  データ行数: {}", loaded.table.len());
            println!("\n列:");
            for (i, header) in loaded.table.headers.iter().enumerate() {
                let samples: Vec<&str> = loaded
                    .table
                    .rows
                    .iter()
                    .take(rows)
                    .map(|r| geo_match_common::Table::cell(r, i))
                    .collect();
                println!("  #{:<3} {:<24} {}", i, header, samples.join(" | "));
            }
        }

        Commands::Config { init, show } => {
            let path = Config::config_path()?;

            // 壊れた設定ファイルも --init で上書きできるよう、初期化時は読み込まない
            let current = if init {
                let config = Config::init_at(&path)?;
                println!("✔ 設定ファイルを作成しました: {}", path.display());
                config
            } else {
                Config::load_from(&path)?
            };

            if show || !init {
                println!("設定 ({}):", path.display());
                println!("{}", serde_json::to_string_pretty(&current)?);
            }
        }
    }

    Ok(())
}
