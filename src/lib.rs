//! vendor-import
//!
//! CSV / XLSX の業者リストをテナントの業者一覧へ取り込む。
//! 列マッピング・変換・マージの純粋ロジックは `vendor_import_common` にある。

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ingest;
pub mod interactive;
pub mod pipeline;
pub mod store;
