//! CSV（区切りテキスト）読み込み

use super::{file_name_of, PreviewBuilder};
use crate::error::{ImportError, Result};
use std::path::Path;
use vendor_import_common::ImportPreview;

const UTF8_BOM: char = '\u{feff}';

pub(super) fn read_csv(path: &Path, preview_limit: Option<usize>) -> Result<ImportPreview> {
    let bytes = std::fs::read(path).map_err(|source| ImportError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;

    let content = std::str::from_utf8(&bytes)
        .map_err(|e| ImportError::InvalidText(format!("{}: {}", path.display(), e)))?;

    parse_csv_str(&file_name_of(path), content, preview_limit)
}

/// レコードの開始位置からファイル上の行番号（1始まり）を求める
///
/// csv は空行を読み飛ばすため、レコードの位置が直前の改行を指すことがある。
/// 改行を読み飛ばした先をレコードの先頭とする。
pub(crate) struct LineTracker<'a> {
    content: &'a [u8],
    byte: usize,
    line: usize,
}

impl<'a> LineTracker<'a> {
    pub(crate) fn new(content: &'a str) -> Self {
        Self {
            content: content.as_bytes(),
            byte: 0,
            line: 1,
        }
    }

    pub(crate) fn record_line(&mut self, byte: u64) -> usize {
        let target = usize::try_from(byte).map_or(self.content.len(), |b| b.min(self.content.len()));
        if target > self.byte {
            self.line += self.content[self.byte..target]
                .iter()
                .filter(|&&b| b == b'\n')
                .count();
            self.byte = target;
        }
        while let Some(&b) = self.content.get(self.byte) {
            match b {
                b'\n' => self.line += 1,
                b'\r' => {}
                _ => break,
            }
            self.byte += 1;
        }
        self.line
    }
}

/// CSV文字列を読み込む
///
/// 引用符で囲まれたセル内のカンマ・改行に対応。先頭行はヘッダー。
pub fn parse_csv_str(
    file_name: &str,
    content: &str,
    preview_limit: Option<usize>,
) -> Result<ImportPreview> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut lines = LineTracker::new(content);
    let mut builder = PreviewBuilder::new(file_name.to_string(), preview_limit);
    for record in reader.records() {
        let record = record?;
        let line = match record.position() {
            Some(position) => lines.record_line(position.byte()),
            None => builder.next_line(),
        };
        builder.push(record.iter().map(str::to_string).collect(), line);
    }

    builder.finish()
}
