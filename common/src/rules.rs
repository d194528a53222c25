//! コード割当ルール表
//!
//! 表ファイル（パス列とコード列）の行から、正規化パス→ルールの表を作る。
//! 照合1回ごとに作り直す。

use crate::normalize::{last_segment, normalize_path};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 表計算のエクスポートで空セルを表すプレースホルダ
const PLACEHOLDER_CODES: [&str; 1] = ["nan"];

/// 表ファイルの1行（パス列とコード列）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRow {
    pub path: String,
    pub code: String,
}

impl RuleRow {
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }
}

/// 照合ルール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// 正規化パス（キー）
    pub normalized_path: String,
    pub code: String,
    /// 元パスの最終セグメント
    pub leaf: String,
    /// 表ファイル上の元パス
    pub raw_path: String,
}

/// 正規化パス→ルールの表
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: HashMap<String, Rule>,
    skipped_rows: usize,
    overwritten: Vec<String>,
}

impl RuleTable {
    /// 行の並びから表を作る
    ///
    /// 前後の空白を除き、パスかコードが空の行、プレースホルダコードの行は
    /// 読み飛ばす。同じ正規化パスが複数行にある場合は後の行が勝ち、
    /// 上書きされたキーは `overwritten()` に残す。
    pub fn build<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a RuleRow>,
    {
        let mut table = Self::default();

        for row in rows {
            let path = row.path.trim();
            let code = row.code.trim();
            if path.is_empty() || code.is_empty() || is_placeholder(code) {
                table.skipped_rows += 1;
                continue;
            }

            let key = normalize_path(path);
            let rule = Rule {
                normalized_path: key.clone(),
                code: code.to_string(),
                leaf: last_segment(path).to_string(),
                raw_path: path.to_string(),
            };
            if let Some(previous) = table.rules.insert(key.clone(), rule) {
                log::warn!(
                    "duplicate rule path {:?}: code {} replaced by later row",
                    previous.raw_path,
                    previous.code
                );
                table.overwritten.push(key);
            }
        }

        log::debug!(
            "rule table built: {} rules, {} skipped rows, {} overwritten",
            table.rules.len(),
            table.skipped_rows,
            table.overwritten.len()
        );
        table
    }

    pub fn lookup(&self, key: &str) -> Option<&Rule> {
        self.rules.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(|k| k.as_str())
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.values()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 読み飛ばした行数
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// 後の行に上書きされたキー（出現順、重複あり）
    pub fn overwritten(&self) -> &[String] {
        &self.overwritten
    }
}

fn is_placeholder(code: &str) -> bool {
    PLACEHOLDER_CODES
        .iter()
        .any(|placeholder| code.eq_ignore_ascii_case(placeholder))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_lookup() {
        let rows = vec![RuleRow::new("Tools\\Drills\\Cordless Drill", "TL-201")];
        let table = RuleTable::build(&rows);
        let rule = table.lookup(&normalize_path("Tools/Drills/Cordless Drill")).unwrap();
        assert_eq!(rule.code, "TL-201");
        assert_eq!(rule.leaf, "Cordless Drill");
        assert_eq!(rule.raw_path, "Tools\\Drills\\Cordless Drill");
        assert_eq!(rule.normalized_path, "tools/drills/cordlessdrill");
    }

    #[test]
    fn test_skips_blank_and_placeholder_rows() {
        let rows = vec![
            RuleRow::new("", "A/1"),
            RuleRow::new("Garden", "  "),
            RuleRow::new("Garden", "nan"),
            RuleRow::new("Garden", "NaN"),
            RuleRow::new("  Garden  ", " GD/1 "),
        ];
        let table = RuleTable::build(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.skipped_rows(), 4);
        let rule = table.lookup("garden").unwrap();
        assert_eq!(rule.code, "GD/1");
        assert_eq!(rule.raw_path, "Garden");
    }

    #[test]
    fn test_duplicate_keys_last_row_wins() {
        let rows = vec![
            RuleRow::new("Tools/Saws", "OLD/1"),
            RuleRow::new("tools > saws", "NEW/2"),
        ];
        let table = RuleTable::build(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup("tools/saws").unwrap().code, "NEW/2");
        assert_eq!(table.overwritten(), &["tools/saws".to_string()]);
    }

    #[test]
    fn test_empty_input() {
        let table = RuleTable::build(&Vec::<RuleRow>::new());
        assert!(table.is_empty());
        assert_eq!(table.keys().count(), 0);
    }
}
