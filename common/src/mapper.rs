//! 列マッピング推定モジュール
//!
//! 任意の列名を取り込み先フィールドに自動で対応付ける。
//! ユーザーが個別に上書きできるよう、推定結果は助言として扱う。

use crate::error::{Error, Result};
use crate::similarity::{normalize_header, score_normalized};
use crate::types::{FieldMapping, VendorField};
use serde::Serialize;

/// 自動割り当ての閾値（このスコアを超えた列のみ割り当てる）
pub const DEFAULT_THRESHOLD: f64 = 0.75;

/// フィールドごとの推定結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMatch {
    pub field: VendorField,
    pub column: usize,
    pub header: String,
    pub score: f64,
}

/// 推定結果の詳細（表示用）
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingReport {
    pub mapping: FieldMapping,
    pub matches: Vec<FieldMatch>,
    /// どのフィールドにも割り当てられなかった列
    pub unclaimed_headers: Vec<(usize, String)>,
}

/// フィールドの候補名（正式名 + 別名）に対する列名の最高スコア
fn field_score(field: VendorField, normalized_header: &str) -> f64 {
    std::iter::once(field.key())
        .chain(std::iter::once(field.canonical_name()))
        .chain(field.synonyms().iter().copied())
        .map(|candidate| score_normalized(normalized_header, &normalize_header(candidate)))
        .fold(0.0, f64::max)
}

/// 列マッピングを推定する
///
/// フィールドの優先順に、未割り当ての列から最高スコアの列を選ぶ。
/// 同点の場合は左の列を優先する。閾値以下しかなければ未割り当てのまま。
pub fn infer_mapping_report(
    headers: &[String],
    fields: &[VendorField],
    threshold: f64,
) -> MappingReport {
    let normalized: Vec<String> = headers.iter().map(|h| normalize_header(h)).collect();
    let mut claimed = vec![false; headers.len()];
    let mut mapping = FieldMapping::new();
    let mut matches = Vec::new();

    let mut ordered: Vec<VendorField> = fields.to_vec();
    ordered.sort();
    ordered.dedup();

    for field in ordered {
        let mut best: Option<(usize, f64)> = None;

        for (column, header) in normalized.iter().enumerate() {
            if claimed[column] || header.is_empty() {
                continue;
            }
            let score = field_score(field, header);
            if score > threshold && best.map_or(true, |(_, s)| score > s) {
                best = Some((column, score));
            }
        }

        if let Some((column, score)) = best {
            claimed[column] = true;
            mapping.assign(field, column);
            matches.push(FieldMatch {
                field,
                column,
                header: headers[column].clone(),
                score,
            });
        }
    }

    let unclaimed_headers = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed[*i])
        .map(|(i, h)| (i, h.clone()))
        .collect();

    tracing::debug!(
        mapped = mapping.len(),
        columns = headers.len(),
        "column mapping inferred"
    );

    MappingReport {
        mapping,
        matches,
        unclaimed_headers,
    }
}

/// 列マッピングを推定する（結果のみ）
pub fn infer_mapping(headers: &[String], fields: &[VendorField], threshold: f64) -> FieldMapping {
    infer_mapping_report(headers, fields, threshold).mapping
}

/// 全フィールド・既定閾値で推定する
pub fn infer_vendor_mapping(headers: &[String]) -> FieldMapping {
    infer_mapping(headers, &VendorField::ALL, DEFAULT_THRESHOLD)
}

/// 列指定を列番号に解決する
///
/// - `#3` は列番号（0始まり）
/// - それ以外は列名（正規化して比較、最初に一致した列）
pub fn resolve_column(headers: &[String], spec: &str) -> Result<usize> {
    let spec = spec.trim();

    if let Some(index) = spec.strip_prefix('#') {
        let column: usize = index
            .trim()
            .parse()
            .map_err(|_| Error::InvalidOverride(format!("列番号が不正: {}", spec)))?;
        if column >= headers.len() {
            return Err(Error::ColumnOutOfRange {
                column,
                width: headers.len(),
            });
        }
        return Ok(column);
    }

    let wanted = normalize_header(spec);
    headers
        .iter()
        .position(|h| normalize_header(h) == wanted)
        .ok_or_else(|| Error::ColumnNotFound(spec.to_string()))
}

/// `field=Header` 形式の上書き指定を適用する
///
/// - `vendor_name=Business` 列名で指定
/// - `vendor_name=#0` 列番号で指定
/// - `notes=` 割り当て解除
pub fn apply_overrides(
    mapping: &mut FieldMapping,
    headers: &[String],
    overrides: &[String],
) -> Result<()> {
    for entry in overrides {
        let (field, target) = entry
            .split_once('=')
            .ok_or_else(|| Error::InvalidOverride(entry.clone()))?;
        let field: VendorField = field.parse()?;

        if target.trim().is_empty() {
            mapping.unassign(field);
            continue;
        }

        let column = resolve_column(headers, target)?;
        if let Some(displaced) = mapping.assign_checked(field, column, headers.len())? {
            tracing::debug!(%field, %displaced, column, "override displaced field");
        }
    }

    Ok(())
}
