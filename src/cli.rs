use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vendor_import_common::ImportMode;

#[derive(Parser)]
#[command(name = "vendor-import")]
#[command(about = "業者リスト(CSV/XLSX)取り込みツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ファイルの先頭行を表示
    Preview {
        /// CSV / XLSX ファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 表示する行数（デフォルト: 設定値）
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// 列マッピングの推定結果を表示
    Mapping {
        /// CSV / XLSX ファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 一致判定の閾値（0.0〜1.0）
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// 業者一覧へ取り込み
    Import {
        /// CSV / XLSX ファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 取り込みモード (add/sync)
        #[arg(short, long)]
        mode: Option<ImportMode>,

        /// マッピング上書き（例: vendor_name=Business, email=#3, phone_number=）
        #[arg(long = "map", value_name = "FIELD=COLUMN")]
        overrides: Vec<String>,

        /// 対話式でマッピングを確認
        #[arg(short, long)]
        interactive: bool,

        /// 保存せず結果のみ表示
        #[arg(long)]
        dry_run: bool,

        /// 業者データの保存先JSON
        #[arg(long)]
        store: Option<PathBuf>,

        /// テナントID（デフォルト: 環境変数 / 設定値）
        #[arg(long)]
        tenant: Option<String>,

        /// 結果レポートJSONの出力先
        #[arg(long)]
        report: Option<PathBuf>,

        /// 一致判定の閾値（0.0〜1.0）
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// CSVをXLSXに変換
    Convert {
        /// 入力CSVファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力XLSXファイル（デフォルト: 入力と同名.xlsx）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 取り込み用テンプレートを出力（.csv / .xlsx）
    Template {
        /// 出力ファイル
        #[arg(default_value = "vendor-template.xlsx")]
        output: PathBuf,
    },

    /// 設定を管理
    Config {
        /// テナントIDを設定
        #[arg(long)]
        set_tenant: Option<String>,

        /// 一致判定の閾値を設定
        #[arg(long)]
        set_threshold: Option<f64>,

        /// プレビュー件数を設定
        #[arg(long)]
        set_preview_limit: Option<usize>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}
