//! レコード変換モジュール
//!
//! ImportPreview の各行に FieldMapping を適用して CandidateRecord を作る。
//! 純粋関数（I/Oなし）で、セルの変換失敗は None として続行する。

use crate::coerce::{coerce_amount, coerce_bool, coerce_date, coerce_text};
use crate::types::{CandidateRecord, FieldMapping, ImportPreview, TenantId, VendorDetails, VendorField};
use serde::Serialize;

/// 取り込まなかった行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRow {
    /// データ行番号（0始まり、ヘッダー除く）
    pub source_row: usize,
    /// ファイル上の行番号（1始まり）
    pub line_number: usize,
    pub reason: DropReason,
}

/// 取り込まなかった理由
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DropReason {
    /// 業者名の列が割り当てられていない
    NameUnmapped,
    /// 業者名が空
    EmptyName,
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DropReason::NameUnmapped => write!(f, "業者名の列が未割り当て"),
            DropReason::EmptyName => write!(f, "業者名が空"),
        }
    }
}

/// 変換結果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub records: Vec<CandidateRecord>,
    pub dropped: Vec<DroppedRow>,
}

impl Conversion {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// 1フィールド分のセルを変換して設定
fn set_field(details: &mut VendorDetails, field: VendorField, cell: &str) {
    match field {
        VendorField::VendorName => details.vendor_name = coerce_text(cell).unwrap_or_default(),
        VendorField::VendorType => details.vendor_type = coerce_text(cell),
        VendorField::ContactName => details.contact_name = coerce_text(cell),
        VendorField::PhoneNumber => details.phone_number = coerce_text(cell),
        VendorField::Email => details.email = coerce_text(cell),
        VendorField::Website => details.website = coerce_text(cell),
        VendorField::QuotedAmount => details.quoted_amount = coerce_amount(cell),
        VendorField::IsBooked => details.is_booked = coerce_bool(cell),
        VendorField::DateBooked => details.date_booked = coerce_date(cell),
        VendorField::StreetAddress => details.street_address = coerce_text(cell),
        VendorField::StreetAddress2 => details.street_address_2 = coerce_text(cell),
        VendorField::City => details.city = coerce_text(cell),
        VendorField::State => details.state = coerce_text(cell),
        VendorField::PostalCode => details.postal_code = coerce_text(cell),
        VendorField::Country => details.country = coerce_text(cell),
        VendorField::BudgetCategoryId => details.budget_category_id = coerce_text(cell),
        VendorField::Notes => details.notes = coerce_text(cell),
    }
}

/// 1行を変換する（業者名が空なら None）
pub fn convert_row(
    preview: &ImportPreview,
    row: usize,
    mapping: &FieldMapping,
    tenant_id: TenantId,
) -> Option<CandidateRecord> {
    let mut details = VendorDetails::default();
    for (field, column) in mapping.iter() {
        set_field(&mut details, field, preview.cell(row, column));
    }

    if details.vendor_name.is_empty() {
        return None;
    }

    Some(CandidateRecord {
        tenant_id,
        source_row: row,
        details,
    })
}

/// プレビューの全行を変換する
///
/// 業者名が空の行は取り込まず、dropped に記録する。
pub fn convert_rows(
    preview: &ImportPreview,
    mapping: &FieldMapping,
    tenant_id: TenantId,
) -> Conversion {
    let mut conversion = Conversion::default();
    let name_mapped = mapping.is_mapped(VendorField::VendorName);

    for row in 0..preview.rows.len() {
        let record = if name_mapped {
            convert_row(preview, row, mapping, tenant_id)
        } else {
            None
        };

        match record {
            Some(record) => conversion.records.push(record),
            None => conversion.dropped.push(DroppedRow {
                source_row: row,
                line_number: preview.line_number(row),
                reason: if name_mapped {
                    DropReason::EmptyName
                } else {
                    DropReason::NameUnmapped
                },
            }),
        }
    }

    if !conversion.dropped.is_empty() {
        tracing::warn!(
            dropped = conversion.dropped.len(),
            file = %preview.file_name,
            "rows without a vendor name were not converted"
        );
    }

    conversion
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn preview(headers: &[&str], rows: &[&[&str]]) -> ImportPreview {
        ImportPreview {
            file_name: "vendors.csv".into(),
            headers: headers.iter().map(|s| s.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
            total_rows: rows.len(),
            ..Default::default()
        }
    }

    #[test]
    fn test_convert_example_row() {
        let p = preview(
            &["Vendor Name", "Category", "Email"],
            &[&["Acme Catering", "Catering", "info@acme.com"]],
        );
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);
        mapping.assign(VendorField::VendorType, 1);
        mapping.assign(VendorField::Email, 2);

        let tenant = TenantId::new_random();
        let conversion = convert_rows(&p, &mapping, tenant);
        assert_eq!(conversion.records.len(), 1);
        assert_eq!(conversion.dropped_count(), 0);

        let record = &conversion.records[0];
        assert_eq!(record.tenant_id, tenant);
        assert_eq!(record.details.vendor_name, "Acme Catering");
        assert_eq!(record.details.vendor_type.as_deref(), Some("Catering"));
        assert_eq!(record.details.email.as_deref(), Some("info@acme.com"));
        assert_eq!(record.details.phone_number, None);
    }

    #[test]
    fn test_convert_typed_fields() {
        let p = preview(
            &["Name", "Quote", "Booked", "Booked On"],
            &[
                &["Florist", "$1,200.00", "Yes", "2025-06-14"],
                &["Band", "call us", "no", "someday"],
            ],
        );
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);
        mapping.assign(VendorField::QuotedAmount, 1);
        mapping.assign(VendorField::IsBooked, 2);
        mapping.assign(VendorField::DateBooked, 3);

        let conversion = convert_rows(&p, &mapping, TenantId::new_random());
        let florist = &conversion.records[0].details;
        assert_eq!(florist.quoted_amount, Some(1200.0));
        assert_eq!(florist.is_booked, Some(true));
        assert_eq!(florist.date_booked, NaiveDate::from_ymd_opt(2025, 6, 14));

        // 変換失敗は None（行は残る）
        let band = &conversion.records[1].details;
        assert_eq!(band.quoted_amount, None);
        assert_eq!(band.is_booked, Some(false));
        assert_eq!(band.date_booked, None);
    }

    #[test]
    fn test_rows_without_name_are_dropped() {
        let p = preview(
            &["Vendor Name", "Email"],
            &[&["Acme", "a@x.com"], &["   ", "b@x.com"], &["Bistro", ""]],
        );
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);
        mapping.assign(VendorField::Email, 1);

        let conversion = convert_rows(&p, &mapping, TenantId::new_random());
        assert_eq!(conversion.records.len(), 2);
        assert_eq!(conversion.records[1].source_row, 2);
        assert_eq!(
            conversion.dropped,
            vec![DroppedRow {
                source_row: 1,
                line_number: 3,
                reason: DropReason::EmptyName,
            }]
        );
    }

    #[test]
    fn test_unmapped_name_drops_every_row() {
        let p = preview(&["Email"], &[&["a@x.com"], &["b@x.com"]]);
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::Email, 0);

        let conversion = convert_rows(&p, &mapping, TenantId::new_random());
        assert!(conversion.records.is_empty());
        assert_eq!(conversion.dropped_count(), 2);
        assert!(conversion
            .dropped
            .iter()
            .all(|d| d.reason == DropReason::NameUnmapped));
    }

    #[test]
    fn test_dropped_row_uses_recorded_line() {
        let mut p = preview(&["Vendor", "Notes"], &[&["Acme", "a\nb"], &["", "orphan"]]);
        p.source_lines = vec![2, 5];
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);

        let conversion = convert_rows(&p, &mapping, TenantId::new_random());
        assert_eq!(conversion.dropped[0].source_row, 1);
        assert_eq!(conversion.dropped[0].line_number, 5);
    }

    #[test]
    fn test_out_of_range_column_reads_empty() {
        let p = preview(&["Vendor Name"], &[&["Acme"]]);
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);
        mapping.assign(VendorField::Notes, 9);

        let conversion = convert_rows(&p, &mapping, TenantId::new_random());
        assert_eq!(conversion.records.len(), 1);
        assert_eq!(conversion.records[0].details.notes, None);
    }

    #[test]
    fn test_fully_mapped_round_trip() {
        let cells = [
            "Acme", "Catering", "Jane", "555-0100", "j@acme.com", "acme.com", "$1,200.00", "Yes",
            "06/14/2025", "1 Main St", "Suite 2", "Springfield", "IL", "62701", "USA", "cat-7",
            "Vegan options",
        ];
        let headers: Vec<&str> = VendorField::ALL.iter().map(|f| f.canonical_name()).collect();
        let p = preview(&headers, &[&cells]);
        let mut mapping = FieldMapping::new();
        for (i, field) in VendorField::ALL.iter().enumerate() {
            mapping.assign(*field, i);
        }

        let conversion = convert_rows(&p, &mapping, TenantId::new_random());
        let d = &conversion.records[0].details;
        assert_eq!(d.vendor_name, "Acme");
        assert_eq!(d.vendor_type.as_deref(), Some("Catering"));
        assert_eq!(d.contact_name.as_deref(), Some("Jane"));
        assert_eq!(d.phone_number.as_deref(), Some("555-0100"));
        assert_eq!(d.email.as_deref(), Some("j@acme.com"));
        assert_eq!(d.website.as_deref(), Some("acme.com"));
        assert_eq!(d.quoted_amount, Some(1200.0));
        assert_eq!(d.is_booked, Some(true));
        assert_eq!(d.date_booked, NaiveDate::from_ymd_opt(2025, 6, 14));
        assert_eq!(d.street_address.as_deref(), Some("1 Main St"));
        assert_eq!(d.street_address_2.as_deref(), Some("Suite 2"));
        assert_eq!(d.city.as_deref(), Some("Springfield"));
        assert_eq!(d.state.as_deref(), Some("IL"));
        assert_eq!(d.postal_code.as_deref(), Some("62701"));
        assert_eq!(d.country.as_deref(), Some("USA"));
        assert_eq!(d.budget_category_id.as_deref(), Some("cat-7"));
        assert_eq!(d.notes.as_deref(), Some("Vegan options"));
    }
}
