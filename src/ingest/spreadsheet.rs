//! XLSX読み込み（先頭シートのみ）

use super::{file_name_of, PreviewBuilder};
use crate::error::{ImportError, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use vendor_import_common::ImportPreview;

pub(super) fn read_xlsx(path: &Path, preview_limit: Option<usize>) -> Result<ImportPreview> {
    let mut workbook: Xlsx<_> = open_workbook(path)
        .map_err(|e| ImportError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            ImportError::Spreadsheet(format!("ワークシートがありません: {}", path.display()))
        })?
        .map_err(|e| ImportError::Spreadsheet(format!("{}: {}", path.display(), e)))?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    // シート上の使用範囲の先頭行（0始まり）
    let first_row = range.start().map_or(0, |(row, _)| row as usize);

    let mut builder = PreviewBuilder::new(file_name_of(path), preview_limit);
    for (i, row) in trim_trailing_columns(rows).into_iter().enumerate() {
        builder.push(row, first_row + i + 1);
    }

    builder.finish()
}

/// 末尾の空列を除去する
fn trim_trailing_columns(mut rows: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = rows
        .iter()
        .filter_map(|row| row.iter().rposition(|cell| !cell.trim().is_empty()))
        .max()
        .map_or(0, |last| last + 1);

    for row in &mut rows {
        row.truncate(width);
    }
    rows
}

/// セル値を文字列に変換
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .map(|d| d.date().format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| format_number(dt.as_f64())),
        Data::DateTime(dt) => format_number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    }
}

/// 整数値は小数点なしで表示
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
