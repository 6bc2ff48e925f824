//! 取り込みマージモジュール
//!
//! 既存の業者一覧と変換済みレコードを突き合わせ、
//! 保存先に渡す操作（追加・更新・削除）と件数を求める。
//!
//! ## 取り込み方式
//! - AddOnly: 一致しないレコードのみ追加。既存は変更しない
//! - Sync: 追加・差分があれば更新・ファイルにない既存は削除
//!
//! 業者名（前後空白除去・小文字化）の完全一致で照合する。

use crate::types::{CandidateRecord, ImportMode, ImportStats, Vendor, VendorDetails};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// 保存先に渡す操作
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ImportOperation {
    Insert(CandidateRecord),
    #[serde(rename_all = "camelCase")]
    Update {
        id: Uuid,
        /// マージ時点の更新日時（保存時の競合検出用）
        expected_updated_at: DateTime<Utc>,
        details: VendorDetails,
    },
    #[serde(rename_all = "camelCase")]
    Delete {
        id: Uuid,
        expected_updated_at: DateTime<Utc>,
        vendor_name: String,
    },
}

/// マージ結果
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergePlan {
    pub operations: Vec<ImportOperation>,
    pub stats: ImportStats,
}

impl MergePlan {
    pub fn inserts(&self) -> impl Iterator<Item = &CandidateRecord> {
        self.operations.iter().filter_map(|op| match op {
            ImportOperation::Insert(record) => Some(record),
            _ => None,
        })
    }

    pub fn has_deletes(&self) -> bool {
        self.operations
            .iter()
            .any(|op| matches!(op, ImportOperation::Delete { .. }))
    }
}

/// 照合キー（業者名の前後空白除去・小文字化）
pub fn identity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// 既存の業者とレコードを突き合わせる
pub fn merge(existing: &[Vendor], candidates: &[CandidateRecord], mode: ImportMode) -> MergePlan {
    // 同じキーの既存が複数あれば先頭を照合対象にする
    let mut by_key: HashMap<String, &Vendor> = HashMap::new();
    for vendor in existing {
        by_key
            .entry(identity_key(&vendor.details.vendor_name))
            .or_insert(vendor);
    }

    let mut plan = MergePlan::default();
    let mut seen: HashSet<String> = HashSet::new();

    for candidate in candidates {
        let key = identity_key(&candidate.details.vendor_name);

        // ファイル内の重複は先頭のみ
        if !seen.insert(key.clone()) {
            plan.stats.skipped += 1;
            continue;
        }

        match (by_key.get(&key), mode) {
            (None, _) => {
                plan.operations.push(ImportOperation::Insert(candidate.clone()));
                plan.stats.added += 1;
            }
            (Some(_), ImportMode::AddOnly) => {
                plan.stats.skipped += 1;
            }
            (Some(vendor), ImportMode::Sync) => {
                if vendor.details == candidate.details {
                    plan.stats.skipped += 1;
                } else {
                    plan.operations.push(ImportOperation::Update {
                        id: vendor.id,
                        expected_updated_at: vendor.updated_at,
                        details: candidate.details.clone(),
                    });
                    plan.stats.updated += 1;
                }
            }
        }
    }

    if mode == ImportMode::Sync {
        for vendor in existing {
            if !seen.contains(&identity_key(&vendor.details.vendor_name)) {
                plan.operations.push(ImportOperation::Delete {
                    id: vendor.id,
                    expected_updated_at: vendor.updated_at,
                    vendor_name: vendor.details.vendor_name.clone(),
                });
                plan.stats.deleted += 1;
            }
        }
    }

    tracing::debug!(
        %mode,
        added = plan.stats.added,
        updated = plan.stats.updated,
        deleted = plan.stats.deleted,
        skipped = plan.stats.skipped,
        "merge planned"
    );

    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TenantId;

    fn details(name: &str, vendor_type: &str) -> VendorDetails {
        VendorDetails {
            vendor_name: name.to_string(),
            vendor_type: Some(vendor_type.to_string()),
            ..Default::default()
        }
    }

    fn candidate(tenant: TenantId, row: usize, name: &str, vendor_type: &str) -> CandidateRecord {
        CandidateRecord {
            tenant_id: tenant,
            source_row: row,
            details: details(name, vendor_type),
        }
    }

    fn vendor(tenant: TenantId, name: &str, vendor_type: &str) -> Vendor {
        let now = Utc::now();
        Vendor {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            details: details(name, vendor_type),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_only_into_empty() {
        let t = TenantId::new_random();
        let candidates = vec![candidate(t, 0, "Acme Catering", "Catering")];
        let plan = merge(&[], &candidates, ImportMode::AddOnly);
        assert_eq!(
            plan.stats,
            ImportStats { added: 1, updated: 0, deleted: 0, skipped: 0 }
        );
        assert_eq!(plan.inserts().count(), 1);
    }

    #[test]
    fn test_add_only_skips_existing_and_never_deletes() {
        let t = TenantId::new_random();
        let existing = vec![vendor(t, "Acme Catering", "Bakery"), vendor(t, "Old Vendor", "DJ")];
        let candidates = vec![
            candidate(t, 0, "ACME catering ", "Catering"),
            candidate(t, 1, "New Florist", "Florist"),
        ];
        let plan = merge(&existing, &candidates, ImportMode::AddOnly);
        assert_eq!(plan.stats.added, 1);
        assert_eq!(plan.stats.skipped, 1);
        assert_eq!(plan.stats.updated, 0);
        assert_eq!(plan.stats.deleted, 0);
        assert!(!plan.has_deletes());
    }

    #[test]
    fn test_sync_identical_is_skipped() {
        let t = TenantId::new_random();
        let existing = vec![vendor(t, "Acme Catering", "Catering")];
        let candidates = vec![candidate(t, 0, "Acme Catering", "Catering")];
        let plan = merge(&existing, &candidates, ImportMode::Sync);
        assert_eq!(
            plan.stats,
            ImportStats { added: 0, updated: 0, deleted: 0, skipped: 1 }
        );
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn test_sync_updates_changed_and_deletes_missing() {
        let t = TenantId::new_random();
        let acme = vendor(t, "Acme Catering", "Catering");
        let old = vendor(t, "Old Vendor", "DJ");
        let existing = vec![acme.clone(), old.clone()];
        let candidates = vec![
            candidate(t, 0, "Acme Catering", "Catering & Bar"),
            candidate(t, 1, "Fresh Flowers", "Florist"),
        ];

        let plan = merge(&existing, &candidates, ImportMode::Sync);
        assert_eq!(
            plan.stats,
            ImportStats { added: 1, updated: 1, deleted: 1, skipped: 0 }
        );
        assert!(plan.operations.contains(&ImportOperation::Update {
            id: acme.id,
            expected_updated_at: acme.updated_at,
            details: details("Acme Catering", "Catering & Bar"),
        }));
        assert!(plan.operations.contains(&ImportOperation::Delete {
            id: old.id,
            expected_updated_at: old.updated_at,
            vendor_name: "Old Vendor".to_string(),
        }));
    }

    #[test]
    fn test_sync_counts_match_candidates() {
        let t = TenantId::new_random();
        let existing = vec![
            vendor(t, "A", "x"),
            vendor(t, "B", "x"),
            vendor(t, "C", "x"),
        ];
        let candidates = vec![
            candidate(t, 0, "a", "x"),
            candidate(t, 1, "B", "x"),
            candidate(t, 2, "D", "x"),
            candidate(t, 3, "d", "y"),
        ];
        let plan = merge(&existing, &candidates, ImportMode::Sync);
        assert_eq!(plan.stats.processed(), candidates.len());
        // C のみファイルにない
        assert_eq!(plan.stats.deleted, 1);
        // "a" は名前の大文字小文字が違うので更新
        assert_eq!(plan.stats.updated, 1);
        assert_eq!(plan.stats.added, 1);
        assert_eq!(plan.stats.skipped, 2);
    }

    #[test]
    fn test_duplicate_candidates_inserted_once() {
        let t = TenantId::new_random();
        let candidates = vec![
            candidate(t, 0, "Acme", "Catering"),
            candidate(t, 1, "acme", "Catering"),
        ];
        let plan = merge(&[], &candidates, ImportMode::AddOnly);
        assert_eq!(plan.stats.added, 1);
        assert_eq!(plan.stats.skipped, 1);
        assert_eq!(plan.inserts().next().map(|r| r.source_row), Some(0));
    }

    #[test]
    fn test_sync_empty_file_deletes_everything() {
        let t = TenantId::new_random();
        let existing = vec![vendor(t, "A", "x"), vendor(t, "B", "y")];
        let plan = merge(&existing, &[], ImportMode::Sync);
        assert_eq!(plan.stats.deleted, 2);
        assert_eq!(plan.stats.processed(), 0);
    }

    #[test]
    fn test_sync_with_duplicate_existing_keys() {
        let t = TenantId::new_random();
        let first = vendor(t, "Acme", "Catering");
        let second = vendor(t, "ACME", "Catering");
        let existing = vec![
            first.clone(),
            second.clone(),
            vendor(t, "Old DJ", "DJ"),
            vendor(t, "old dj", "DJ"),
        ];
        let candidates = vec![candidate(t, 0, "Acme", "Bakery")];

        let plan = merge(&existing, &candidates, ImportMode::Sync);

        // 更新は先頭の1件のみ、後の重複はそのまま
        assert_eq!(plan.stats.updated, 1);
        assert!(plan.operations.iter().any(
            |op| matches!(op, ImportOperation::Update { id, .. } if *id == first.id)
        ));
        assert!(!plan.operations.iter().any(|op| match op {
            ImportOperation::Update { id, .. } | ImportOperation::Delete { id, .. } => {
                *id == second.id
            }
            ImportOperation::Insert(_) => false,
        }));

        // 削除数は業者の件数（同じキーの2件とも削除）
        assert_eq!(plan.stats.deleted, 2);
    }

    #[test]
    fn test_identity_key() {
        assert_eq!(identity_key("  Acme Catering "), "acme catering");
        assert_eq!(identity_key("ÉCLAT"), "éclat");
    }
}
