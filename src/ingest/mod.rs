//! ファイル読み込みモジュール
//!
//! CSV / XLSX を読み込み、ヘッダー行 + データ行の ImportPreview を作る。
//! 拡張子が .xlsx ならExcel、それ以外は区切りテキストとして扱う。

mod delimited;
mod spreadsheet;

pub use delimited::parse_csv_str;
pub(crate) use delimited::LineTracker;

use crate::error::{ImportError, Result};
use std::path::{Path, PathBuf};
use vendor_import_common::ImportPreview;

/// ファイル形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => FileFormat::Xlsx,
            _ => FileFormat::Csv,
        }
    }
}

/// ファイルを読み込む
///
/// # Arguments
/// * `path` - CSV / XLSX ファイル
/// * `preview_limit` - 保持するデータ行数（None は全行）
///
/// total_rows は常にファイル全体のデータ行数。
pub fn read_preview(path: &Path, preview_limit: Option<usize>) -> Result<ImportPreview> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let preview = match FileFormat::detect(path) {
        FileFormat::Csv => delimited::read_csv(path, preview_limit)?,
        FileFormat::Xlsx => spreadsheet::read_xlsx(path, preview_limit)?,
    };

    tracing::debug!(
        file = %preview.file_name,
        columns = preview.headers.len(),
        total_rows = preview.total_rows,
        kept_rows = preview.rows.len(),
        "file ingested"
    );

    Ok(preview)
}

/// 読み込みをブロッキングスレッドで実行する
pub async fn read_preview_async(
    path: PathBuf,
    preview_limit: Option<usize>,
) -> Result<ImportPreview> {
    tokio::task::spawn_blocking(move || read_preview(&path, preview_limit))
        .await
        .map_err(|e| ImportError::Task(e.to_string()))?
}

pub(crate) fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 行を受け取りながら ImportPreview を組み立てる
pub(crate) struct PreviewBuilder {
    file_name: String,
    limit: Option<usize>,
    headers: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
    source_lines: Vec<usize>,
    total_rows: usize,
    adjusted_rows: usize,
}

impl PreviewBuilder {
    pub(crate) fn new(file_name: String, limit: Option<usize>) -> Self {
        Self {
            file_name,
            limit,
            headers: None,
            rows: Vec::new(),
            source_lines: Vec::new(),
            total_rows: 0,
            adjusted_rows: 0,
        }
    }

    /// 行番号が取れない場合の推定値（空行なしとみなす）
    pub(crate) fn next_line(&self) -> usize {
        match self.headers {
            Some(_) => self.total_rows + 2,
            None => 1,
        }
    }

    /// 1行追加（全セル空の行は無視）
    ///
    /// `line` はファイル上の行番号（1始まり）。
    pub(crate) fn push(&mut self, mut row: Vec<String>, line: usize) {
        if row.iter().all(|cell| cell.trim().is_empty()) {
            return;
        }

        let width = match self.headers.as_ref().map(Vec::len) {
            None => {
                self.headers = Some(row.into_iter().map(|h| h.trim().to_string()).collect());
                return;
            }
            Some(width) => width,
        };

        if row.len() != width {
            tracing::warn!(
                file = %self.file_name,
                line,
                expected = width,
                found = row.len(),
                "row column count adjusted to header width"
            );
            row.resize(width, String::new());
            self.adjusted_rows += 1;
        }

        self.total_rows += 1;
        if self.limit.map_or(true, |limit| self.rows.len() < limit) {
            self.rows.push(row);
            self.source_lines.push(line);
        }
    }

    pub(crate) fn finish(self) -> Result<ImportPreview> {
        let headers = self
            .headers
            .ok_or_else(|| ImportError::EmptyFile(self.file_name.clone()))?;

        Ok(ImportPreview {
            file_name: self.file_name,
            headers,
            rows: self.rows,
            total_rows: self.total_rows,
            adjusted_rows: self.adjusted_rows,
            source_lines: self.source_lines,
        })
    }
}
