//! セル値の型変換
//!
//! 変換できない値はエラーにせず None を返す（行は取り込みを続ける）。

use chrono::NaiveDate;
use regex::Regex;

const TRUTHY: &[&str] = &["yes", "y", "true", "t", "1", "x", "✓", "booked"];

const CURRENCY_SYMBOLS: &[char] = &['$', '€', '£', '¥', '₹'];

/// 日付フォーマット（上から順に試す。%y は %Y より先）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %B %Y",
];

/// 文字列: 前後の空白を除去、空なら None
pub fn coerce_text(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 真偽値: 空なら None、yes/true/1 などは true、それ以外は false
pub fn coerce_bool(cell: &str) -> Option<bool> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_lowercase();
    Some(TRUTHY.contains(&lower.as_str()))
}

/// 金額: 通貨記号・桁区切りを除去して数値化
///
/// `(1,200)` は負数として扱う。数値以外が残れば None。
pub fn coerce_amount(cell: &str) -> Option<f64> {
    lazy_static::lazy_static! {
        static ref NUMBER_RE: Regex = Regex::new(r"^-?(\d+\.?\d*|\.\d+)$").unwrap();
    }

    let trimmed = cell.trim();
    let (negative, body) = match trimmed.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = body
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',' && !c.is_whitespace())
        .collect();

    if !NUMBER_RE.is_match(&cleaned) {
        return None;
    }

    let value: f64 = cleaned.parse().ok()?;
    if !value.is_finite() {
        return None;
    }

    Some(if negative { -value } else { value })
}

/// 日付: よく使われる書式を順に試す
pub fn coerce_date(cell: &str) -> Option<NaiveDate> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }

    // ISO日時（2025-06-01T10:00:00Z / 2025-06-01 10:00）は日付部分のみ
    if let (Some(date_part), Some(sep)) = (trimmed.get(..10), trimmed.get(10..11)) {
        if sep == "T" || sep == " " {
            return NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok();
        }
    }

    None
}
