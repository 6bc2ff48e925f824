//! 取り込みデータの型定義
//!
//! CLIと取り込みパイプラインで共有される型:
//! - ImportPreview: ファイル読み込み結果（ヘッダー + 行）
//! - FieldMapping: 取り込み先フィールド → 列番号の対応
//! - CandidateRecord: 変換済み・未保存の業者レコード
//! - Vendor: 保存済みの業者
//! - ImportStats / ImportMode: 取り込み結果と取り込み方式

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 値の型（セル変換方法を決める）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Boolean,
    Amount,
    Date,
}

/// 取り込み先フィールド
///
/// 宣言順がマッピング推定の優先順位になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VendorField {
    VendorName,
    VendorType,
    ContactName,
    PhoneNumber,
    Email,
    Website,
    QuotedAmount,
    IsBooked,
    DateBooked,
    StreetAddress,
    #[serde(rename = "street_address_2")]
    StreetAddress2,
    City,
    State,
    PostalCode,
    Country,
    BudgetCategoryId,
    Notes,
}

impl VendorField {
    /// 全フィールド（優先順）
    pub const ALL: [VendorField; 17] = [
        VendorField::VendorName,
        VendorField::VendorType,
        VendorField::ContactName,
        VendorField::PhoneNumber,
        VendorField::Email,
        VendorField::Website,
        VendorField::QuotedAmount,
        VendorField::IsBooked,
        VendorField::DateBooked,
        VendorField::StreetAddress,
        VendorField::StreetAddress2,
        VendorField::City,
        VendorField::State,
        VendorField::PostalCode,
        VendorField::Country,
        VendorField::BudgetCategoryId,
        VendorField::Notes,
    ];

    /// 設定ファイル・CLIで使うキー
    pub fn key(&self) -> &'static str {
        match self {
            VendorField::VendorName => "vendor_name",
            VendorField::VendorType => "vendor_type",
            VendorField::ContactName => "contact_name",
            VendorField::PhoneNumber => "phone_number",
            VendorField::Email => "email",
            VendorField::Website => "website",
            VendorField::QuotedAmount => "quoted_amount",
            VendorField::IsBooked => "is_booked",
            VendorField::DateBooked => "date_booked",
            VendorField::StreetAddress => "street_address",
            VendorField::StreetAddress2 => "street_address_2",
            VendorField::City => "city",
            VendorField::State => "state",
            VendorField::PostalCode => "postal_code",
            VendorField::Country => "country",
            VendorField::BudgetCategoryId => "budget_category_id",
            VendorField::Notes => "notes",
        }
    }

    /// テンプレートのヘッダーに使う表示名
    pub fn canonical_name(&self) -> &'static str {
        match self {
            VendorField::VendorName => "Vendor Name",
            VendorField::VendorType => "Vendor Type",
            VendorField::ContactName => "Contact Name",
            VendorField::PhoneNumber => "Phone Number",
            VendorField::Email => "Email",
            VendorField::Website => "Website",
            VendorField::QuotedAmount => "Quoted Amount",
            VendorField::IsBooked => "Is Booked",
            VendorField::DateBooked => "Date Booked",
            VendorField::StreetAddress => "Street Address",
            VendorField::StreetAddress2 => "Street Address 2",
            VendorField::City => "City",
            VendorField::State => "State",
            VendorField::PostalCode => "Postal Code",
            VendorField::Country => "Country",
            VendorField::BudgetCategoryId => "Budget Category Id",
            VendorField::Notes => "Notes",
        }
    }

    /// 表記ゆれ（列名の別名）
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            VendorField::VendorName => &[
                "vendor",
                "business name",
                "company",
                "company name",
                "business",
                "vendor business name",
                "name",
            ],
            VendorField::VendorType => &[
                "category",
                "type",
                "vendor category",
                "service",
                "service type",
            ],
            VendorField::ContactName => &[
                "contact",
                "contact person",
                "primary contact",
                "point of contact",
            ],
            VendorField::PhoneNumber => &["phone", "telephone", "tel", "mobile", "cell", "phone no"],
            VendorField::Email => &["e mail", "email address", "mail"],
            VendorField::Website => &["web", "url", "site", "web site", "homepage"],
            VendorField::QuotedAmount => &[
                "quote",
                "quoted price",
                "price",
                "amount",
                "cost",
                "estimate",
            ],
            VendorField::IsBooked => &["booked", "booking status", "confirmed", "is confirmed"],
            VendorField::DateBooked => &["booked date", "booking date", "booked on"],
            VendorField::StreetAddress => &["address", "street", "address line 1", "address 1"],
            VendorField::StreetAddress2 => &["address line 2", "address 2", "suite", "unit"],
            VendorField::City => &["town"],
            VendorField::State => &["province", "region", "state province"],
            VendorField::PostalCode => &["zip", "zip code", "postcode", "postal"],
            VendorField::Country => &["nation"],
            VendorField::BudgetCategoryId => &["budget category", "category id", "budget category id"],
            VendorField::Notes => &["note", "comments", "comment", "remarks", "description"],
        }
    }

    /// セル値の変換方法
    pub fn kind(&self) -> FieldKind {
        match self {
            VendorField::QuotedAmount => FieldKind::Amount,
            VendorField::IsBooked => FieldKind::Boolean,
            VendorField::DateBooked => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }

    /// 必須フィールドか（空の行は取り込まない）
    pub fn is_required(&self) -> bool {
        matches!(self, VendorField::VendorName)
    }
}

impl std::fmt::Display for VendorField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for VendorField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // vendor_name / vendor-name / vendorName / "Vendor Name" を同一視
        let compact: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .flat_map(|c| c.to_lowercase())
            .collect();

        VendorField::ALL
            .iter()
            .copied()
            .find(|field| field.key().replace('_', "") == compact)
            .ok_or_else(|| Error::UnknownField(s.to_string()))
    }
}

/// 取り込み先フィールド → 列番号の対応
///
/// 1つの列に割り当てられるフィールドは最大1つ。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    columns: BTreeMap<VendorField, usize>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// フィールドの列番号
    pub fn get(&self, field: VendorField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    /// 列を割り当てているフィールド
    pub fn field_for_column(&self, column: usize) -> Option<VendorField> {
        self.columns
            .iter()
            .find(|(_, &c)| c == column)
            .map(|(&field, _)| field)
    }

    /// 列を割り当てる
    ///
    /// 既に同じ列を持っていたフィールドは割り当て解除され、そのフィールドを返す。
    pub fn assign(&mut self, field: VendorField, column: usize) -> Option<VendorField> {
        let displaced = self.field_for_column(column).filter(|&f| f != field);
        if let Some(previous) = displaced {
            self.columns.remove(&previous);
        }
        self.columns.insert(field, column);
        displaced
    }

    /// 列数を検証してから割り当てる
    pub fn assign_checked(
        &mut self,
        field: VendorField,
        column: usize,
        width: usize,
    ) -> Result<Option<VendorField>> {
        if column >= width {
            return Err(Error::ColumnOutOfRange { column, width });
        }
        Ok(self.assign(field, column))
    }

    /// 割り当て解除
    pub fn unassign(&mut self, field: VendorField) -> Option<usize> {
        self.columns.remove(&field)
    }

    pub fn is_mapped(&self, field: VendorField) -> bool {
        self.columns.contains_key(&field)
    }

    /// 未割り当てのフィールド（優先順）
    pub fn unmapped_fields(&self) -> Vec<VendorField> {
        VendorField::ALL
            .iter()
            .copied()
            .filter(|f| !self.is_mapped(*f))
            .collect()
    }

    /// (フィールド, 列番号) を優先順に列挙
    pub fn iter(&self) -> impl Iterator<Item = (VendorField, usize)> + '_ {
        self.columns.iter().map(|(&f, &c)| (f, c))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// テナント（取り込み先の所有者）ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TenantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TenantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim())
            .map(TenantId)
            .map_err(|e| Error::InvalidTenant(format!("{}: {}", s, e)))
    }
}

/// 業者の取り込み対象フィールド
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorDetails {
    pub vendor_name: String,
    pub vendor_type: Option<String>,
    pub contact_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub quoted_amount: Option<f64>,
    pub is_booked: Option<bool>,
    pub date_booked: Option<NaiveDate>,
    pub street_address: Option<String>,
    pub street_address_2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub budget_category_id: Option<String>,
    pub notes: Option<String>,
}

/// 変換済み・未保存の業者レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRecord {
    pub tenant_id: TenantId,
    /// 元ファイルのデータ行番号（0始まり、ヘッダー除く）
    pub source_row: usize,
    #[serde(flatten)]
    pub details: VendorDetails,
}

/// 保存済みの業者
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub details: VendorDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// ファイル読み込み結果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportPreview {
    pub file_name: String,
    pub headers: Vec<String>,
    /// 各行の長さは headers と同じ
    pub rows: Vec<Vec<String>>,
    /// ファイル全体のデータ行数（rows はプレビュー件数に切り詰められる場合がある）
    pub total_rows: usize,
    /// 列数をヘッダーに合わせて補正した行数
    #[serde(default)]
    pub adjusted_rows: usize,
    /// rows の各行のファイル上の行番号（1始まり）
    #[serde(default)]
    pub source_lines: Vec<usize>,
}

impl ImportPreview {
    /// 列数
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// セル値（範囲外は空文字）
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// データ行のファイル上の行番号（1始まり）
    ///
    /// 記録がなければヘッダーを1行目とした連番とみなす。
    pub fn line_number(&self, row: usize) -> usize {
        self.source_lines.get(row).copied().unwrap_or(row + 2)
    }

    /// 全行を保持しているか
    pub fn is_complete(&self) -> bool {
        self.rows.len() == self.total_rows
    }
}

/// 取り込み方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportMode {
    /// 新規のみ追加（既存は変更・削除しない）
    #[default]
    AddOnly,
    /// ファイルに合わせて追加・更新・削除
    Sync,
}

impl std::str::FromStr for ImportMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "add" | "add-only" | "add_only" | "addonly" => Ok(ImportMode::AddOnly),
            "sync" => Ok(ImportMode::Sync),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ImportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportMode::AddOnly => write!(f, "add"),
            ImportMode::Sync => write!(f, "sync"),
        }
    }
}

/// 取り込み結果の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStats {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
}

impl ImportStats {
    /// 処理した候補レコード数（削除を除く）
    pub fn processed(&self) -> usize {
        self.added + self.updated + self.skipped
    }

    /// 保存先に変更があるか
    pub fn has_changes(&self) -> bool {
        self.added + self.updated + self.deleted > 0
    }
}
