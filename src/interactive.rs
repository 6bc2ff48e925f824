//! 対話式マッピング修正モジュール
//!
//! 推定した列マッピングをフィールドごとに確認・変更する。

use crate::error::{ImportError, Result};
use dialoguer::Select;
use vendor_import_common::{FieldMapping, ImportPreview, VendorField};

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingAction {
    /// 変更しない
    Keep,
    /// 割り当て解除
    Unassign,
    /// 列を割り当て
    Assign(usize),
    /// 残りは変更せず終了
    Finish,
}

/// 列の選択肢（列名 + 先頭行の値）
pub fn column_choices(preview: &ImportPreview) -> Vec<String> {
    preview
        .headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let sample = preview.cell(0, i);
            if sample.is_empty() {
                format!("#{} {}", i, header)
            } else {
                format!("#{} {} (例: {})", i, header, truncate(sample, 30))
            }
        })
        .collect()
}

/// 現在の割り当ての表示
pub fn describe_assignment(preview: &ImportPreview, mapping: &FieldMapping, field: VendorField) -> String {
    match mapping.get(field) {
        Some(column) => format!(
            "{} → #{} {}",
            field,
            column,
            preview.headers.get(column).map(String::as_str).unwrap_or("?")
        ),
        None => format!("{} → （未割り当て）", field),
    }
}

/// アクションを適用し、割り当てを外されたフィールドを返す
pub fn apply_action(
    mapping: &mut FieldMapping,
    field: VendorField,
    action: &MappingAction,
) -> Option<VendorField> {
    match action {
        MappingAction::Keep | MappingAction::Finish => None,
        MappingAction::Unassign => {
            mapping.unassign(field);
            None
        }
        MappingAction::Assign(column) => mapping.assign(field, *column),
    }
}

fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let head: String = value.chars().take(max_chars).collect();
        format!("{}…", head)
    }
}

/// 選択肢の並び: 変更なし / 割り当てなし / 列... / 終了
fn prompt_action(
    preview: &ImportPreview,
    mapping: &FieldMapping,
    field: VendorField,
    choices: &[String],
) -> Result<MappingAction> {
    let mut items = vec!["（変更なし）".to_string(), "（割り当てなし）".to_string()];
    items.extend(choices.iter().cloned());
    items.push("（確定して終了）".to_string());

    let selection = Select::new()
        .with_prompt(describe_assignment(preview, mapping, field))
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(|e| ImportError::Prompt(e.to_string()))?;

    Ok(match selection {
        None => MappingAction::Finish,
        Some(0) => MappingAction::Keep,
        Some(1) => MappingAction::Unassign,
        Some(i) if i == items.len() - 1 => MappingAction::Finish,
        Some(i) => MappingAction::Assign(i - 2),
    })
}

/// 対話式でマッピングを修正
pub fn review_mapping_interactive(
    preview: &ImportPreview,
    mut mapping: FieldMapping,
) -> Result<FieldMapping> {
    let choices = column_choices(preview);

    println!("📋 列マッピングを確認してください（Escで確定）\n");

    for field in VendorField::ALL {
        let action = prompt_action(preview, &mapping, field, &choices)?;
        if action == MappingAction::Finish {
            break;
        }
        if let Some(displaced) = apply_action(&mut mapping, field, &action) {
            println!("  → {} の割り当てを解除しました", displaced);
        }
    }

    println!();
    Ok(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preview() -> ImportPreview {
        ImportPreview {
            file_name: "vendors.csv".into(),
            headers: vec!["Business".into(), "Owner".into()],
            rows: vec![vec!["Acme Catering".into(), "".into()]],
            total_rows: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_column_choices() {
        let choices = column_choices(&preview());
        assert_eq!(choices, vec!["#0 Business (例: Acme Catering)", "#1 Owner"]);
    }

    #[test]
    fn test_describe_assignment() {
        let p = preview();
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);
        assert_eq!(describe_assignment(&p, &mapping, VendorField::VendorName), "vendor_name → #0 Business");
        assert_eq!(describe_assignment(&p, &mapping, VendorField::Email), "email → （未割り当て）");
    }

    #[test]
    fn test_apply_action() {
        let mut mapping = FieldMapping::new();
        mapping.assign(VendorField::VendorName, 0);

        assert_eq!(apply_action(&mut mapping, VendorField::ContactName, &MappingAction::Assign(0)), Some(VendorField::VendorName));
        assert_eq!(mapping.get(VendorField::ContactName), Some(0));

        apply_action(&mut mapping, VendorField::ContactName, &MappingAction::Unassign);
        assert!(mapping.is_empty());

        assert_eq!(apply_action(&mut mapping, VendorField::Email, &MappingAction::Keep), None);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 30), "short");
        assert_eq!(truncate("abcdef", 3), "abc…");
    }
}
