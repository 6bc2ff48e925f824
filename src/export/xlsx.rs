//! CSV → XLSX 変換
//!
//! ヘッダー行は太字・グレー背景、列幅は内容に合わせる（最大50文字）。

use crate::error::{ImportError, Result};
use crate::ingest::{self, LineTracker};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};
use std::path::Path;

const MAX_COLUMN_WIDTH: usize = 50;
const HEADER_FILL: u32 = 0xD3D3D3;

/// 列幅（最長セル + 2、最大50）
pub fn column_width<S: AsRef<str>>(header: &str, cells: impl Iterator<Item = S>) -> usize {
    let longest = cells
        .map(|c| c.as_ref().chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);
    (longest + 2).min(MAX_COLUMN_WIDTH)
}

fn column_index(col: usize) -> Result<u16> {
    u16::try_from(col).map_err(|_| ImportError::ExcelGeneration(format!("列数が多すぎます: {}", col + 1)))
}

fn row_index(row: usize) -> Result<u32> {
    u32::try_from(row).map_err(|_| ImportError::ExcelGeneration(format!("行数が多すぎます: {}", row + 1)))
}

/// 表をXLSXに書き出す（先頭シート "Sheet1"）
///
/// 行の長さはヘッダーと揃っていなくてよい。空行は空のまま残す。
pub fn write_table(path: &Path, headers: &[String], rows: &[Vec<String>]) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_font_size(11)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_align(FormatAlign::Left)
        .set_align(FormatAlign::VerticalCenter);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Sheet1")?;

    for (col, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, column_index(col)?, header.as_str(), &header_format)?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        let row_num = row_index(row_idx + 1)?;
        for (col, value) in row.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row_num, column_index(col)?, value.as_str())?;
        }
    }

    let width = rows.iter().map(Vec::len).chain(std::iter::once(headers.len())).max().unwrap_or(0);
    for col in 0..width {
        let header = headers.get(col).map(String::as_str).unwrap_or("");
        let chars = column_width(header, rows.iter().filter_map(|r| r.get(col)));
        worksheet.set_column_width(column_index(col)?, chars as f64)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// CSVを読み込む（セルは加工せず、空行も1行として残す）
fn read_csv_records(csv_path: &Path) -> Result<Vec<Vec<String>>> {
    let bytes = std::fs::read(csv_path).map_err(|source| ImportError::Unreadable {
        path: csv_path.display().to_string(),
        source,
    })?;
    let content = std::str::from_utf8(&bytes)
        .map_err(|e| ImportError::InvalidText(format!("{}: {}", csv_path.display(), e)))?;
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut lines = LineTracker::new(content);
    let mut records: Vec<Vec<String>> = Vec::new();
    // 次に来るはずの行番号（空行は csv が読み飛ばすので差分で補う）
    let mut next_line = 1usize;
    for record in reader.records() {
        let record = record?;
        let line = record
            .position()
            .map_or(next_line, |p| lines.record_line(p.byte()));
        for _ in next_line..line {
            records.push(Vec::new());
        }
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        let embedded_newlines: usize = cells.iter().map(|c| c.matches('\n').count()).sum();
        next_line = line + embedded_newlines + 1;
        records.push(cells);
    }

    Ok(records)
}

/// CSVファイルをXLSXに変換する
///
/// 全セルをそのまま書き出す。戻り値はヘッダーを除いた行数。
pub fn convert_csv_to_xlsx(csv_path: &Path, xlsx_path: &Path) -> Result<usize> {
    if !csv_path.exists() {
        return Err(ImportError::FileNotFound(csv_path.display().to_string()));
    }
    if ingest::FileFormat::detect(csv_path) != ingest::FileFormat::Csv {
        return Err(ImportError::Config(format!(
            "CSVファイルを指定してください: {}",
            csv_path.display()
        )));
    }

    let mut records = read_csv_records(csv_path)?;
    if records.is_empty() {
        return Err(ImportError::EmptyFile(csv_path.display().to_string()));
    }
    let headers = records.remove(0);
    write_table(xlsx_path, &headers, &records)?;

    tracing::debug!(
        from = %csv_path.display(),
        to = %xlsx_path.display(),
        rows = records.len(),
        "csv converted to xlsx"
    );
    Ok(records.len())
}
