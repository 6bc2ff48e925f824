//! 取り込みパイプライン
//!
//! ## 処理フロー
//! 1. ファイル読み込み（ブロッキングスレッド）
//! 2. 列マッピング推定 + 上書き指定
//! 3. レコード変換
//! 4. 既存一覧とのマージ
//! 5. 保存（ドライラン時は省略）
//!
//! キャンセルは読み込み後と保存前に確認する。

use crate::error::{ImportError, Result};
use crate::ingest;
use crate::store::VendorRepository;
use serde::Serialize;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use vendor_import_common::{
    apply_overrides, convert_rows, infer_mapping, merge, mapper::DEFAULT_THRESHOLD, DroppedRow,
    FieldMapping, ImportMode, ImportPreview, ImportStats, MergePlan, TenantId, Vendor, VendorField,
};

/// 取り込み要求
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub path: PathBuf,
    pub mode: ImportMode,
    pub tenant: TenantId,
    /// `field=Header` 形式の上書き指定
    pub overrides: Vec<String>,
    /// 推定済み（対話で修正済み）のマッピング。指定時は推定しない
    pub mapping: Option<FieldMapping>,
    pub threshold: f64,
    pub dry_run: bool,
}

impl ImportRequest {
    pub fn new(path: impl Into<PathBuf>, mode: ImportMode, tenant: TenantId) -> Self {
        Self {
            path: path.into(),
            mode,
            tenant,
            overrides: Vec::new(),
            mapping: None,
            threshold: DEFAULT_THRESHOLD,
            dry_run: false,
        }
    }
}

/// 取り込み結果
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub file_name: String,
    pub mode: ImportMode,
    pub total_rows: usize,
    pub adjusted_rows: usize,
    pub mapping: FieldMapping,
    pub dropped: Vec<DroppedRow>,
    pub stats: ImportStats,
    pub dry_run: bool,
    /// 保存された（追加・更新された）業者
    pub persisted: Vec<Vendor>,
}

impl ImportOutcome {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    /// JSONレポートとして保存
    pub fn write_report(&self, path: &std::path::Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn check_cancelled(cancel: &CancellationToken, stage: &str) -> Result<()> {
    if cancel.is_cancelled() {
        tracing::info!(stage, "import cancelled");
        return Err(ImportError::Cancelled);
    }
    Ok(())
}

/// マッピングを決める（指定済みならそれを使い、上書き指定を適用）
pub fn resolve_mapping(preview: &ImportPreview, request: &ImportRequest) -> Result<FieldMapping> {
    let mut mapping = match &request.mapping {
        Some(mapping) => mapping.clone(),
        None => infer_mapping(&preview.headers, &VendorField::ALL, request.threshold),
    };
    apply_overrides(&mut mapping, &preview.headers, &request.overrides)?;
    Ok(mapping)
}

/// 読み込み済みのファイルからマージ計画を作る（I/Oなし）
pub fn plan_import(
    preview: &ImportPreview,
    mapping: &FieldMapping,
    existing: &[Vendor],
    tenant: TenantId,
    mode: ImportMode,
) -> (MergePlan, Vec<DroppedRow>) {
    let conversion = convert_rows(preview, mapping, tenant);
    let plan = merge(existing, &conversion.records, mode);
    (plan, conversion.dropped)
}

/// 取り込みを実行する
pub async fn run_import<R: VendorRepository>(
    request: &ImportRequest,
    repo: &mut R,
    cancel: &CancellationToken,
) -> Result<ImportOutcome> {
    let preview = ingest::read_preview_async(request.path.clone(), None).await?;
    check_cancelled(cancel, "ingest")?;

    let mapping = resolve_mapping(&preview, request)?;
    // 名前列がないと候補が空になり、同期では全件削除になる
    if request.mode == ImportMode::Sync && !mapping.is_mapped(VendorField::VendorName) {
        return Err(vendor_import_common::Error::RequiredFieldUnmapped(
            VendorField::VendorName.key().to_string(),
        )
        .into());
    }

    let existing = repo.list(request.tenant)?;
    let (plan, dropped) = plan_import(&preview, &mapping, &existing, request.tenant, request.mode);
    check_cancelled(cancel, "merge")?;

    let persisted = if request.dry_run || plan.operations.is_empty() {
        Vec::new()
    } else {
        repo.apply(request.tenant, &plan.operations)?
    };

    tracing::info!(
        file = %preview.file_name,
        mode = %request.mode,
        dry_run = request.dry_run,
        added = plan.stats.added,
        updated = plan.stats.updated,
        deleted = plan.stats.deleted,
        skipped = plan.stats.skipped,
        dropped = dropped.len(),
        "import finished"
    );

    Ok(ImportOutcome {
        file_name: preview.file_name,
        mode: request.mode,
        total_rows: preview.total_rows,
        adjusted_rows: preview.adjusted_rows,
        mapping,
        dropped,
        stats: plan.stats,
        dry_run: request.dry_run,
        persisted,
    })
}
