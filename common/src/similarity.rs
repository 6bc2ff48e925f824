//! 列名の類似度計算
//!
//! 表記ゆれ（大文字小文字・記号・camelCase）を吸収してから
//! 編集距離とトークン一致率で 0.0〜1.0 のスコアを出す。

use std::collections::HashSet;

/// 列名を正規化する
///
/// - camelCase の境界で分割
/// - 英数字以外の連続を1つの空白に置換
/// - 小文字化・前後の空白除去
pub fn normalize_header(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_lower = false;
    let mut pending_space = false;

    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_space || (prev_lower && c.is_uppercase()) {
                if !out.is_empty() {
                    out.push(' ');
                }
                pending_space = false;
            }
            out.extend(c.to_lowercase());
            prev_lower = c.is_lowercase() || c.is_numeric();
        } else {
            pending_space = true;
            prev_lower = false;
        }
    }

    out
}

/// 編集距離（Levenshtein）
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// 編集距離ベースの類似度（空白を除いて比較）
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let a: String = a.chars().filter(|c| !c.is_whitespace()).collect();
    let b: String = b.chars().filter(|c| !c.is_whitespace()).collect();

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

/// トークン一致率（Dice係数）
pub fn token_similarity(a: &str, b: &str) -> f64 {
    let ta: HashSet<&str> = a.split_whitespace().collect();
    let tb: HashSet<&str> = b.split_whitespace().collect();

    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let shared = ta.intersection(&tb).count();
    2.0 * shared as f64 / (ta.len() + tb.len()) as f64
}

/// 正規化済みの列名と候補名のスコア
pub fn score_normalized(header: &str, candidate: &str) -> f64 {
    if header.is_empty() || candidate.is_empty() {
        return 0.0;
    }
    if header == candidate {
        return 1.0;
    }
    edit_similarity(header, candidate).max(token_similarity(header, candidate))
}

/// 生の列名と候補名のスコア
pub fn score(header: &str, candidate: &str) -> f64 {
    score_normalized(&normalize_header(header), &normalize_header(candidate))
}
