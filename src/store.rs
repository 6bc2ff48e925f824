//! 業者データ保存モジュール
//!
//! 取り込みパイプラインが作った操作（追加・更新・削除）をまとめて保存する。
//! バッチ全体を検証してから反映し、1件でも失敗すれば何も変更しない。

use crate::error::{ImportError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use vendor_import_common::{ImportOperation, TenantId, Vendor};

/// 保存先のインターフェース
pub trait VendorRepository {
    /// テナントの業者一覧
    fn list(&self, tenant: TenantId) -> Result<Vec<Vendor>>;

    /// 操作をまとめて反映し、追加・更新された業者を返す
    fn apply(&mut self, tenant: TenantId, operations: &[ImportOperation]) -> Result<Vec<Vendor>>;
}

/// メモリ上の保存先（テスト・ドライラン用）
#[derive(Debug, Clone, Default)]
pub struct InMemoryVendorStore {
    vendors: Vec<Vendor>,
}

impl InMemoryVendorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vendors(vendors: Vec<Vendor>) -> Self {
        Self { vendors }
    }

    pub fn vendors(&self) -> &[Vendor] {
        &self.vendors
    }
}

impl VendorRepository for InMemoryVendorStore {
    fn list(&self, tenant: TenantId) -> Result<Vec<Vendor>> {
        Ok(self
            .vendors
            .iter()
            .filter(|v| v.tenant_id == tenant)
            .cloned()
            .collect())
    }

    fn apply(&mut self, tenant: TenantId, operations: &[ImportOperation]) -> Result<Vec<Vendor>> {
        let mut staged = self.vendors.clone();
        let persisted = apply_operations(&mut staged, tenant, operations)?;
        self.vendors = staged;
        Ok(persisted)
    }
}

/// JSONファイルの構造
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoreFile {
    /// バージョン（互換性チェック用）
    version: u32,
    vendors: Vec<Vendor>,
}

impl Default for StoreFile {
    fn default() -> Self {
        Self {
            version: JsonVendorStore::CURRENT_VERSION,
            vendors: Vec::new(),
        }
    }
}

/// JSONファイルの保存先
#[derive(Debug, Clone)]
pub struct JsonVendorStore {
    path: PathBuf,
}

impl JsonVendorStore {
    const CURRENT_VERSION: u32 = 1;

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }

        let file = File::open(&self.path)?;
        let store: StoreFile = serde_json::from_reader(BufReader::new(file))?;

        if store.version != Self::CURRENT_VERSION {
            return Err(ImportError::Store(format!(
                "保存ファイルのバージョンが不一致です（{} != {}）: {}",
                store.version,
                Self::CURRENT_VERSION,
                self.path.display()
            )));
        }
        Ok(store)
    }

    /// 一時ファイルに書いてから置き換える
    fn save(&self, store: &StoreFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut temp_path = self.path.clone().into_os_string();
        temp_path.push(".tmp");
        let temp_path = PathBuf::from(temp_path);

        {
            let file = File::create(&temp_path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, store)?;
        }
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

impl VendorRepository for JsonVendorStore {
    fn list(&self, tenant: TenantId) -> Result<Vec<Vendor>> {
        Ok(self
            .load()?
            .vendors
            .into_iter()
            .filter(|v| v.tenant_id == tenant)
            .collect())
    }

    fn apply(&mut self, tenant: TenantId, operations: &[ImportOperation]) -> Result<Vec<Vendor>> {
        let mut store = self.load()?;
        let persisted = apply_operations(&mut store.vendors, tenant, operations)?;
        if !operations.is_empty() {
            self.save(&store)?;
        }
        tracing::info!(
            path = %self.path.display(),
            operations = operations.len(),
            "vendor store updated"
        );
        Ok(persisted)
    }
}

/// 操作を検証してから反映する
///
/// 更新・削除は対象が存在し、マージ時点から更新されていないことを確認する。
fn apply_operations(
    vendors: &mut Vec<Vendor>,
    tenant: TenantId,
    operations: &[ImportOperation],
) -> Result<Vec<Vendor>> {
    let index: HashMap<Uuid, usize> = vendors
        .iter()
        .enumerate()
        .map(|(i, v)| (v.id, i))
        .collect();

    for op in operations {
        match op {
            ImportOperation::Insert(record) => {
                if record.tenant_id != tenant {
                    return Err(ImportError::Store(format!(
                        "テナントが一致しません: {}",
                        record.details.vendor_name
                    )));
                }
            }
            ImportOperation::Update { id, expected_updated_at, .. }
            | ImportOperation::Delete { id, expected_updated_at, .. } => {
                let vendor = index
                    .get(id)
                    .map(|&i| &vendors[i])
                    .filter(|v| v.tenant_id == tenant)
                    .ok_or_else(|| {
                        ImportError::StoreConflict(format!("業者が見つかりません: {}", id))
                    })?;
                if vendor.updated_at != *expected_updated_at {
                    return Err(ImportError::StoreConflict(format!(
                        "「{}」は取り込み中に他で更新されました",
                        vendor.details.vendor_name
                    )));
                }
            }
        }
    }

    let now = Utc::now();
    let mut persisted = Vec::new();
    let mut deleted: Vec<Uuid> = Vec::new();

    for op in operations {
        match op {
            ImportOperation::Insert(record) => {
                let vendor = Vendor {
                    id: Uuid::new_v4(),
                    tenant_id: tenant,
                    details: record.details.clone(),
                    created_at: now,
                    updated_at: now,
                };
                persisted.push(vendor.clone());
                vendors.push(vendor);
            }
            ImportOperation::Update { id, details, .. } => {
                if let Some(&i) = index.get(id) {
                    vendors[i].details = details.clone();
                    vendors[i].updated_at = now;
                    persisted.push(vendors[i].clone());
                }
            }
            ImportOperation::Delete { id, .. } => deleted.push(*id),
        }
    }

    vendors.retain(|v| !deleted.contains(&v.id));
    Ok(persisted)
}
