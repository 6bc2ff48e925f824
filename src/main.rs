use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use vendor_import::{cli, config, error, export, ingest, interactive, pipeline, store};
use cli::{Cli, Commands};
use config::Config;
use pipeline::{ImportOutcome, ImportRequest};
use vendor_import_common::{infer_mapping_report, ImportPreview, TenantId, VendorField};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = Config::load().context("設定の読み込みに失敗しました")?;

    match cli.command {
        Commands::Preview { file, limit } => {
            println!("📄 vendor-import - プレビュー\n");

            let limit = limit.unwrap_or(config.preview_limit);
            let preview = ingest::read_preview_async(file.clone(), Some(limit)).await?;
            print_preview(&preview);
        }

        Commands::Mapping { file, threshold } => {
            println!("🔗 vendor-import - 列マッピング推定\n");

            let threshold = threshold.unwrap_or(config.similarity_threshold);
            let preview = ingest::read_preview_async(file, Some(1)).await?;
            let report = infer_mapping_report(&preview.headers, &VendorField::ALL, threshold);

            for field in VendorField::ALL {
                match report.matches.iter().find(|m| m.field == field) {
                    Some(m) => println!(
                        "  {:<20} ← #{} {} ({:.2})",
                        field.key(),
                        m.column,
                        m.header,
                        m.score
                    ),
                    None => println!("  {:<20} ← （未割り当て）", field.key()),
                }
            }

            if !report.unclaimed_headers.is_empty() {
                println!("\n未使用の列:");
                for (column, header) in &report.unclaimed_headers {
                    println!("  #{} {}", column, header);
                }
            }

            if !report.mapping.is_mapped(VendorField::VendorName) {
                println!("\n⚠ vendor_name の列が見つかりません。--map vendor_name=<列名> で指定してください");
            }
        }

        Commands::Import {
            file,
            mode,
            overrides,
            interactive: use_interactive,
            dry_run,
            store: store_path,
            tenant,
            report,
            threshold,
        } => {
            println!("📥 vendor-import - 取り込み\n");

            let tenant = match tenant {
                Some(id) => id
                    .parse::<TenantId>()
                    .map_err(|e| error::ImportError::Config(e.to_string()))?,
                None => config.get_tenant_id()?,
            };
            let mode = mode.unwrap_or(config.default_mode);
            let store_path = match store_path {
                Some(path) => path,
                None => config.resolved_store_path()?,
            };

            let mut request = ImportRequest::new(&file, mode, tenant);
            request.overrides = overrides;
            request.threshold = threshold.unwrap_or(config.similarity_threshold);
            request.dry_run = dry_run;

            if use_interactive {
                let preview = ingest::read_preview_async(file.clone(), Some(1)).await?;
                let mapping = pipeline::resolve_mapping(&preview, &request)?;
                request.mapping = Some(interactive::review_mapping_interactive(&preview, mapping)?);
                request.overrides.clear();
            }

            let outcome = run_with_spinner(&request, &store_path).await?;
            print_outcome(&outcome, &store_path);

            if let Some(report_path) = report {
                outcome.write_report(&report_path)?;
                println!("✔ レポートを保存: {}", report_path.display());
            }
        }

        Commands::Convert { input, output } => {
            println!("📊 vendor-import - CSV → XLSX 変換\n");

            let output = export::xlsx_output_path(&input, output.as_deref());
            let rows = export::xlsx::convert_csv_to_xlsx(&input, &output)?;
            println!("✔ {}行を変換: {}", rows, output.display());
        }

        Commands::Template { output } => {
            export::write_vendor_template(&output)?;
            println!("✔ テンプレートを出力: {}", output.display());
        }

        Commands::Config { set_tenant, set_threshold, set_preview_limit, show } => {
            if let Some(id) = set_tenant {
                config.set_tenant_id(&id)?;
                println!("✔ テナントIDを設定しました");
            }
            if let Some(threshold) = set_threshold {
                config.set_threshold(threshold)?;
                println!("✔ 閾値を {} に設定しました", threshold);
            }
            if let Some(limit) = set_preview_limit {
                config.set_preview_limit(limit)?;
                println!("✔ プレビュー件数を {} に設定しました", limit);
            }

            if show {
                println!("設定ファイル: {}", Config::config_path()?.display());
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_with_spinner(request: &ImportRequest, store_path: &Path) -> anyhow::Result<ImportOutcome> {
    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(format!("{} を取り込み中...", request.path.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut repo = store::JsonVendorStore::new(store_path);
    let result = pipeline::run_import(request, &mut repo, &cancel).await;
    spinner.finish_and_clear();

    result.with_context(|| format!("取り込みに失敗しました: {}", request.path.display()))
}

fn print_preview(preview: &ImportPreview) {
    println!("ファイル: {}", preview.file_name);
    println!("列: {}", preview.headers.join(" | "));
    println!("{}", "-".repeat(40));
    for row in &preview.rows {
        println!("{}", row.join(" | "));
    }
    println!("{}", "-".repeat(40));
    println!("{}行中 {}行を表示", preview.total_rows, preview.rows.len());
    if preview.adjusted_rows > 0 {
        println!("⚠ 列数が合わない行を {}行 補正しました", preview.adjusted_rows);
    }
}

fn print_outcome(outcome: &ImportOutcome, store_path: &Path) {
    let stats = &outcome.stats;
    println!("ファイル: {} ({}行, モード: {})", outcome.file_name, outcome.total_rows, outcome.mode);
    println!("  追加: {}", stats.added);
    println!("  更新: {}", stats.updated);
    println!("  削除: {}", stats.deleted);
    println!("  スキップ: {}", stats.skipped);

    if outcome.dropped_count() > 0 {
        println!("\n⚠ 業者名がないため {}行 を取り込みませんでした", outcome.dropped_count());
        for row in outcome.dropped.iter().take(10) {
            println!("  {}行目: {}", row.line_number, row.reason);
        }
    }
    if outcome.adjusted_rows > 0 {
        println!("⚠ 列数が合わない行を {}行 補正しました", outcome.adjusted_rows);
    }

    if outcome.dry_run {
        println!("\n（ドライラン: 保存していません）");
    } else if stats.has_changes() {
        println!("\n✅ 保存しました: {}", store_path.display());
    } else {
        println!("\n✅ 変更はありません");
    }
}
