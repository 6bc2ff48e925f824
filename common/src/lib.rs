//! Vendor Import Common Library
//!
//! 業者リスト取り込みの純粋ロジック（I/Oなし）
//!
//! ## 処理フロー
//! 1. mapper: 列名 → 取り込み先フィールドの推定
//! 2. converter: 行 → CandidateRecord への変換
//! 3. merger: 既存一覧との突き合わせ（AddOnly / Sync）

pub mod types;
pub mod error;
pub mod similarity;
pub mod coerce;
pub mod mapper;
pub mod converter;
pub mod merger;

pub use types::{
    CandidateRecord, FieldKind, FieldMapping, ImportMode, ImportPreview, ImportStats, TenantId,
    Vendor, VendorDetails, VendorField,
};
pub use error::{Error, Result};
pub use mapper::{apply_overrides, infer_mapping, infer_mapping_report, infer_vendor_mapping, MappingReport};
pub use converter::{convert_rows, Conversion, DropReason, DroppedRow};
pub use merger::{identity_key, merge, ImportOperation, MergePlan};
