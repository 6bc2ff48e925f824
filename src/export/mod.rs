pub mod xlsx;

use crate::error::Result;
use std::path::{Path, PathBuf};
use vendor_import_common::VendorField;

/// テンプレートの記入例（VendorField::ALL と同じ順）
const TEMPLATE_EXAMPLE: [&str; 17] = [
    "Acme Catering",
    "Catering",
    "Jane Doe",
    "555-0100",
    "info@acme.example",
    "https://acme.example",
    "$1,200.00",
    "Yes",
    "2025-06-14",
    "1 Main St",
    "Suite 2",
    "Springfield",
    "IL",
    "62701",
    "USA",
    "",
    "Tasting scheduled",
];

/// テンプレートのヘッダー行
pub fn template_headers() -> Vec<String> {
    VendorField::ALL
        .iter()
        .map(|f| f.canonical_name().to_string())
        .collect()
}

/// 取り込み用テンプレートを書き出す（拡張子 .csv ならCSV、それ以外はXLSX）
pub fn write_vendor_template(path: &Path) -> Result<()> {
    let headers = template_headers();
    let example: Vec<String> = TEMPLATE_EXAMPLE.iter().map(|s| s.to_string()).collect();

    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&headers)?;
        writer.write_record(&example)?;
        writer.flush()?;
    } else {
        xlsx::write_table(path, &headers, &[example])?;
    }

    Ok(())
}

/// 変換先のパス（未指定なら拡張子を .xlsx に変える）
pub fn xlsx_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => {
            let stem = input.file_stem().map(|s| s.to_os_string()).unwrap_or_default();
            path.join(stem).with_extension("xlsx")
        }
        Some(path) => path.to_path_buf(),
        None => input.with_extension("xlsx"),
    }
}
