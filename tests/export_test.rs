//! テンプレート出力・CSV変換の結合テスト

use calamine::{open_workbook, Data, Reader, Xlsx};
use tempfile::tempdir;
use vendor_import::export::{self, xlsx};
use vendor_import::ingest;
use vendor_import_common::{infer_vendor_mapping, VendorField};

#[test]
fn test_xlsx_template_maps_every_field() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("template.xlsx");

    export::write_vendor_template(&path).unwrap();
    let preview = ingest::read_preview(&path, None).unwrap();

    assert_eq!(preview.headers, export::template_headers());
    assert_eq!(preview.total_rows, 1);

    let mapping = infer_vendor_mapping(&preview.headers);
    assert_eq!(mapping.len(), VendorField::ALL.len());
    for (i, field) in VendorField::ALL.iter().enumerate() {
        assert_eq!(mapping.get(*field), Some(i), "{}", field);
    }
}

#[test]
fn test_csv_template() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("template.csv");

    export::write_vendor_template(&path).unwrap();
    let preview = ingest::read_preview(&path, None).unwrap();

    assert_eq!(preview.headers.len(), 17);
    assert_eq!(preview.cell(0, 0), "Acme Catering");
    assert_eq!(preview.cell(0, 6), "$1,200.00");
}

#[test]
fn test_convert_csv_to_xlsx() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("vendors.csv");
    std::fs::write(
        &csv_path,
        "Vendor,City\nAcme,Springfield\n\"Bloom, Inc.\",Shelbyville\n",
    )
    .unwrap();

    let xlsx_path = export::xlsx_output_path(&csv_path, None);
    assert_eq!(xlsx_path, dir.path().join("vendors.xlsx"));

    let rows = xlsx::convert_csv_to_xlsx(&csv_path, &xlsx_path).unwrap();
    assert_eq!(rows, 2);

    let preview = ingest::read_preview(&xlsx_path, None).unwrap();
    assert_eq!(preview.headers, vec!["Vendor", "City"]);
    assert_eq!(preview.cell(1, 0), "Bloom, Inc.");
    assert_eq!(preview.cell(1, 1), "Shelbyville");
}

/// 変換はセルを加工しない（空白・列数超過・空行をそのまま残す）
#[test]
fn test_convert_keeps_cells_as_read() {
    let dir = tempdir().expect("Failed to create temp dir");
    let csv_path = dir.path().join("ragged.csv");
    std::fs::write(
        &csv_path,
        " Name ,City\nAcme,Springfield,EXTRA\n\nBloom,Shelbyville\n",
    )
    .unwrap();
    let xlsx_path = dir.path().join("ragged.xlsx");

    let rows = xlsx::convert_csv_to_xlsx(&csv_path, &xlsx_path).unwrap();
    assert_eq!(rows, 3);

    let mut workbook: Xlsx<_> = open_workbook(&xlsx_path).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    let text = |row: u32, col: u32| match range.get_value((row, col)) {
        Some(Data::String(s)) => s.clone(),
        _ => String::new(),
    };

    assert_eq!(text(0, 0), " Name ");
    assert_eq!(text(1, 2), "EXTRA");
    assert_eq!(text(2, 0), "");
    assert_eq!(text(3, 0), "Bloom");
    assert_eq!(text(3, 1), "Shelbyville");
}
