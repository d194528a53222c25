//! ツリーのリーフとルール表の照合
//!
//! ## 判定順
//! 1. 完全一致: 正規化フルパスがルール表のキーにある → 自動適用
//! 2. あいまい一致: 全キーと類似度を比較し、最良候補が閾値以上なら
//!    リーフ名と候補の最終セグメントを比べて「末尾切れ」か「OCR誤字」に分類
//! 3. どれにも当たらないリーフは黙って捨てる

use crate::normalize::normalize_path;
use crate::rules::{Rule, RuleTable};
use crate::similarity::{ratio, similarity, upper_bound};
use crate::tree::{CategoryNode, CategoryTree, NodePath};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 照合の閾値
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchOptions {
    /// パス全体の類似度がこれ以上なら候補にする
    pub fuzzy_threshold: f64,
    /// OCR誤字と判定する接頭部分の類似度（これを超えること）
    pub typo_threshold: f64,
    /// リーフ名が候補より何文字まで長くてよいか
    pub length_slack: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.75,
            typo_threshold: 0.75,
            length_slack: 2,
        }
    }
}

/// あいまい一致の種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// 取込時に末尾が切れた（候補がリーフ名で始まる）
    TruncatedTail,
    /// 文字認識の誤り（同じ長さの接頭部分が似ている）
    OcrTypo,
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchKind::TruncatedTail => write!(f, "末尾切れ"),
            MatchKind::OcrTypo => write!(f, "OCR誤字"),
        }
    }
}

/// 完全一致
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactMatch {
    pub node: NodePath,
    pub code: String,
}

/// あいまい一致（要確認）
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub node: NodePath,
    pub code: String,
    /// ツリー上のフルパス（認識結果）
    pub full_path: String,
    /// 一致したルールの元パス（正解）
    pub matched_raw_path: String,
    pub classification: MatchKind,
    /// リーフの名前
    pub tree_name: String,
    /// パス全体の類似度
    pub score: f64,
}

/// 適用候補
#[derive(Debug, Clone, PartialEq)]
pub enum MatchCandidate {
    Exact(ExactMatch),
    Fuzzy(FuzzyMatch),
}

impl MatchCandidate {
    pub fn node(&self) -> &NodePath {
        match self {
            MatchCandidate::Exact(m) => &m.node,
            MatchCandidate::Fuzzy(m) => &m.node,
        }
    }

    pub fn code(&self) -> &str {
        match self {
            MatchCandidate::Exact(m) => &m.code,
            MatchCandidate::Fuzzy(m) => &m.code,
        }
    }
}

/// 走査結果
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub exact: Vec<ExactMatch>,
    pub fuzzy: Vec<FuzzyMatch>,
    /// 走査したリーフ数
    pub leaves: usize,
    /// どれにも当たらなかったリーフ数
    pub unmatched: usize,
}

enum Outcome {
    Exact(ExactMatch),
    Fuzzy(FuzzyMatch),
    Unmatched,
}

struct LeafEntry<'a> {
    path: NodePath,
    node: &'a CategoryNode,
    full_path: String,
}

/// ツリーの全リーフを照合する
///
/// 読み取りのみで、リーフごとの判定は並列に行う。結果は後行順。
pub fn scan(tree: &CategoryTree, table: &RuleTable, options: &MatchOptions) -> ScanResult {
    let mut leaves = Vec::new();
    tree.for_each_leaf_post_order(|path, names, node| {
        if node.name().is_empty() {
            return;
        }
        leaves.push(LeafEntry {
            path: path.clone(),
            node,
            full_path: names.join("/"),
        });
    });

    let candidates: Vec<(&Rule, Vec<char>)> = table
        .rules()
        .map(|rule| (rule, rule.normalized_path.chars().collect()))
        .collect();

    let outcomes: Vec<Outcome> = leaves
        .par_iter()
        .map(|leaf| classify_leaf(leaf, table, &candidates, options))
        .collect();

    let mut result = ScanResult {
        leaves: leaves.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        match outcome {
            Outcome::Exact(m) => result.exact.push(m),
            Outcome::Fuzzy(m) => result.fuzzy.push(m),
            Outcome::Unmatched => result.unmatched += 1,
        }
    }

    log::debug!(
        "scan: {} leaves, {} exact, {} fuzzy, {} unmatched",
        result.leaves,
        result.exact.len(),
        result.fuzzy.len(),
        result.unmatched
    );
    result
}

fn classify_leaf(
    leaf: &LeafEntry<'_>,
    table: &RuleTable,
    candidates: &[(&Rule, Vec<char>)],
    options: &MatchOptions,
) -> Outcome {
    let key = normalize_path(&leaf.full_path);
    if let Some(rule) = table.lookup(&key) {
        return Outcome::Exact(ExactMatch {
            node: leaf.path.clone(),
            code: rule.code.clone(),
        });
    }

    let key_chars: Vec<char> = key.chars().collect();
    let Some((rule, score)) = best_candidate(&key_chars, candidates, options.fuzzy_threshold) else {
        return Outcome::Unmatched;
    };
    let Some(classification) = classify_names(leaf.node.name(), &rule.leaf, options) else {
        return Outcome::Unmatched;
    };

    Outcome::Fuzzy(FuzzyMatch {
        node: leaf.path.clone(),
        code: rule.code.clone(),
        full_path: leaf.full_path.clone(),
        matched_raw_path: rule.raw_path.clone(),
        classification,
        tree_name: leaf.node.name().to_string(),
        score,
    })
}

/// 長さによる枝刈りの余裕（上限と実際の比率は丸めで1ulpずれる）
const PRUNE_EPSILON: f64 = 1e-9;

/// 類似度が最大のルールを選ぶ
///
/// 閾値未満は候補にしない。同点なら正規化パスが辞書順で大きい方。
fn best_candidate<'r>(
    key: &[char],
    candidates: &[(&'r Rule, Vec<char>)],
    threshold: f64,
) -> Option<(&'r Rule, f64)> {
    let mut best: Option<(&'r Rule, f64)> = None;

    for (rule, chars) in candidates {
        let floor = best.map_or(threshold, |(_, score)| score);
        if upper_bound(key.len(), chars.len()) < floor - PRUNE_EPSILON {
            continue;
        }
        let score = ratio(key, chars);
        if score < threshold {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, best_score)) => {
                score > best_score
                    || (score == best_score && rule.normalized_path > current.normalized_path)
            }
        };
        if better {
            best = Some((*rule, score));
        }
    }

    best
}

/// リーフ名と候補の最終セグメントから種別を決める
///
/// リーフ名が候補より `length_slack` 文字を超えて長い場合は不一致。
pub fn classify_names(target: &str, candidate: &str, options: &MatchOptions) -> Option<MatchKind> {
    let target_len = target.chars().count();
    let candidate_len = candidate.chars().count();
    if target_len > candidate_len + options.length_slack {
        return None;
    }

    let target_lower = target.to_lowercase();
    let candidate_lower = candidate.to_lowercase();
    if candidate_lower.starts_with(&target_lower) {
        return Some(MatchKind::TruncatedTail);
    }

    let head: String = candidate.chars().take(target_len).collect();
    if similarity(&target_lower, &head.to_lowercase()) > options.typo_threshold {
        return Some(MatchKind::OcrTypo);
    }
    None
}
