//! 照合セッション
//!
//! 1. `run`: ルール表を作って走査し、レビュー依頼を返す（ツリーは読むだけ）
//! 2. 呼び出し側があいまい一致をレビューして `ReviewDecision` を作る
//! 3. `finalize`: 完全一致と承認分を適用する
//!
//! レビュー中はツリーを編集しないこと。適用時に見つからない候補は
//! 古い候補として数えて飛ばす。

use crate::color::ColorAssigner;
use crate::matcher::{scan, ExactMatch, FuzzyMatch, MatchCandidate, MatchOptions};
use crate::rules::{RuleRow, RuleTable};
use crate::tree::CategoryTree;
use std::collections::BTreeSet;

/// 走査の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub leaves: usize,
    pub unmatched: usize,
    pub rules: usize,
    pub skipped_rows: usize,
    /// 後の行に上書きされたルールキー
    pub overwritten: Vec<String>,
}

/// レビュー依頼
#[derive(Debug, Clone, Default)]
pub struct ReviewRequest {
    /// 完全一致（承認済み扱い）
    pub exact: Vec<ExactMatch>,
    /// あいまい一致（要レビュー）
    pub fuzzy: Vec<FuzzyMatch>,
    pub summary: ScanSummary,
}

impl ReviewRequest {
    /// レビューが必要か
    pub fn needs_review(&self) -> bool {
        !self.fuzzy.is_empty()
    }

    /// 判断に従って承認されたあいまい一致を取り出す
    pub fn approved_fuzzy(&self, decision: &ReviewDecision) -> Vec<FuzzyMatch> {
        match decision {
            ReviewDecision::ApproveAll => self.fuzzy.clone(),
            ReviewDecision::RejectAll => Vec::new(),
            ReviewDecision::Approve(indices) => {
                let picked: BTreeSet<usize> = indices.iter().copied().collect();
                picked
                    .into_iter()
                    .filter_map(|i| self.fuzzy.get(i).cloned())
                    .collect()
            }
        }
    }
}

/// レビュー結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    ApproveAll,
    RejectAll,
    /// `ReviewRequest::fuzzy` の添字（範囲外は無視）
    Approve(Vec<usize>),
}

/// 適用結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// コードが変わったリーフ数
    pub applied: usize,
    pub exact_applied: usize,
    pub fuzzy_applied: usize,
    /// 既に同じコードだった候補
    pub unchanged: usize,
    /// リーフとして見つからなかった候補
    pub stale: usize,
}

/// 照合セッション（色割当を持つ）
#[derive(Debug, Clone, Default)]
pub struct ReconciliationSession {
    colors: ColorAssigner,
    options: MatchOptions,
}

impl ReconciliationSession {
    pub fn new(colors: ColorAssigner, options: MatchOptions) -> Self {
        Self { colors, options }
    }

    /// ツリーの既存コードで色割当を初期化して作成
    pub fn for_tree(tree: &CategoryTree, mut colors: ColorAssigner, options: MatchOptions) -> Self {
        colors.seed_from(tree);
        Self { colors, options }
    }

    /// 別のツリーを読み込んだときに色割当をやり直す
    pub fn reset_for(&mut self, tree: &CategoryTree) {
        self.colors.seed_from(tree);
    }

    pub fn colors(&self) -> &ColorAssigner {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut ColorAssigner {
        &mut self.colors
    }

    pub fn options(&self) -> &MatchOptions {
        &self.options
    }

    /// ルール行からレビュー依頼を作る
    pub fn run(&self, tree: &CategoryTree, rows: &[RuleRow]) -> ReviewRequest {
        let table = RuleTable::build(rows);
        let result = scan(tree, &table, &self.options);
        log::info!(
            "reconcile scan: {} exact, {} fuzzy, {} unmatched of {} leaves",
            result.exact.len(),
            result.fuzzy.len(),
            result.unmatched,
            result.leaves
        );
        ReviewRequest {
            exact: result.exact,
            fuzzy: result.fuzzy,
            summary: ScanSummary {
                leaves: result.leaves,
                unmatched: result.unmatched,
                rules: table.len(),
                skipped_rows: table.skipped_rows(),
                overwritten: table.overwritten().to_vec(),
            },
        }
    }

    /// 完全一致と承認済みあいまい一致を適用する
    ///
    /// コードが変わった候補ごとに色を割り当て、祖先を展開する。
    /// 1件以上変わったときだけツリーを未保存状態にする。
    pub fn finalize(
        &mut self,
        tree: &mut CategoryTree,
        approved: Vec<FuzzyMatch>,
        exact: Vec<ExactMatch>,
    ) -> ApplyReport {
        let candidates = exact
            .into_iter()
            .map(MatchCandidate::Exact)
            .chain(approved.into_iter().map(MatchCandidate::Fuzzy));

        let mut report = ApplyReport::default();
        for candidate in candidates {
            let path = candidate.node();
            let is_leaf = tree.node(path).is_some_and(|node| !node.is_folder());
            if !is_leaf {
                log::warn!("stale candidate skipped: {} ({})", path, candidate.code());
                report.stale += 1;
                continue;
            }

            match tree.set_code(path, candidate.code()) {
                Ok(true) => {}
                Ok(false) => {
                    report.unchanged += 1;
                    continue;
                }
                Err(e) => {
                    log::warn!("candidate {} not applied: {}", path, e);
                    report.stale += 1;
                    continue;
                }
            }
            self.colors.color_for(candidate.code());
            if let Err(e) = tree.expand_ancestors(path) {
                log::warn!("expand failed for {}: {}", path, e);
            }

            report.applied += 1;
            match candidate {
                MatchCandidate::Exact(_) => report.exact_applied += 1,
                MatchCandidate::Fuzzy(_) => report.fuzzy_applied += 1,
            }
        }

        log::info!(
            "applied {} codes ({} exact, {} fuzzy), {} unchanged, {} stale",
            report.applied,
            report.exact_applied,
            report.fuzzy_applied,
            report.unchanged,
            report.stale
        );
        report
    }

    /// レビュー依頼と判断をまとめて適用する
    pub fn apply_decision(
        &mut self,
        tree: &mut CategoryTree,
        request: ReviewRequest,
        decision: &ReviewDecision,
    ) -> ApplyReport {
        let approved = request.approved_fuzzy(decision);
        self.finalize(tree, approved, request.exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::MatchKind;
    use crate::tree::{CategoryNode, NodePath};

    fn drills_tree() -> CategoryTree {
        CategoryTree::from_roots(vec![CategoryNode::folder(
            "Tools",
            vec![
                CategoryNode::folder(
                    "Drills",
                    vec![CategoryNode::leaf("Cordless Drill"), CategoryNode::leaf("Powr Tools")],
                ),
                CategoryNode::leaf("Power Too"),
            ],
        )])
    }

    fn rows() -> Vec<RuleRow> {
        vec![
            RuleRow::new("Tools\\Drills\\Cordless Drill", "TL-201"),
            RuleRow::new("Tools/Drills/Power Tools", "PW/1"),
            RuleRow::new("Tools/Power Tools", "PW/2"),
        ]
    }

    #[test]
    fn test_run_does_not_mutate() {
        let tree = drills_tree();
        let session = ReconciliationSession::default();
        let request = session.run(&tree, &rows());
        assert!(!tree.is_dirty());
        assert_eq!(request.exact.len(), 1);
        assert_eq!(request.fuzzy.len(), 2);
        assert_eq!(request.summary.leaves, 3);
        assert_eq!(request.summary.rules, 3);
        assert!(request.needs_review());
    }

    #[test]
    fn test_exact_match_applied() {
        let mut tree = drills_tree();
        let mut session = ReconciliationSession::default();
        let request = session.run(&tree, &rows());
        let report = session.apply_decision(&mut tree, request, &ReviewDecision::RejectAll);

        let drill = NodePath::new(vec![0, 0, 0]);
        assert_eq!(tree.node(&drill).unwrap().code(), "TL-201");
        assert_eq!(report.applied, 1);
        assert_eq!(report.exact_applied, 1);
        assert_eq!(report.fuzzy_applied, 0);
        assert!(tree.is_dirty());
        assert!(tree.node(&NodePath::new(vec![0])).unwrap().is_expanded());
        assert!(tree.node(&NodePath::new(vec![0, 0])).unwrap().is_expanded());
        assert!(session.colors().peek("TL-201").is_some());
    }

    #[test]
    fn test_fuzzy_classification_in_request() {
        let tree = drills_tree();
        let request = ReconciliationSession::default().run(&tree, &rows());
        let kind_of = |name: &str| {
            request
                .fuzzy
                .iter()
                .find(|m| m.tree_name == name)
                .map(|m| m.classification)
        };
        assert_eq!(kind_of("Power Too"), Some(MatchKind::TruncatedTail));
        assert_eq!(kind_of("Powr Tools"), Some(MatchKind::OcrTypo));
    }

    #[test]
    fn test_approve_subset() {
        let mut tree = drills_tree();
        let mut session = ReconciliationSession::default();
        let request = session.run(&tree, &rows());
        let first = request.fuzzy[0].clone();
        let report = session.apply_decision(&mut tree, request, &ReviewDecision::Approve(vec![0, 0, 99]));
        assert_eq!(report.fuzzy_applied, 1);
        assert_eq!(report.applied, 2);
        assert_eq!(tree.node(&first.node).unwrap().code(), first.code);
    }

    #[test]
    fn test_finalize_nothing_is_noop() {
        let mut tree = drills_tree();
        let mut session = ReconciliationSession::default();
        let report = session.finalize(&mut tree, Vec::new(), Vec::new());
        assert_eq!(report, ApplyReport::default());
        assert!(!tree.is_dirty());
        assert_eq!(session.colors().assigned(), 0);
    }

    #[test]
    fn test_unchanged_code_not_counted() {
        let mut tree = drills_tree();
        tree.set_code(&NodePath::new(vec![0, 0, 0]), "TL-201").unwrap();
        tree.mark_clean();
        let mut session = ReconciliationSession::for_tree(&tree, ColorAssigner::default(), MatchOptions::default());
        let request = session.run(&tree, &rows());
        let report = session.apply_decision(&mut tree, request, &ReviewDecision::RejectAll);
        assert_eq!(report.applied, 0);
        assert_eq!(report.unchanged, 1);
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_stale_candidate_skipped() {
        let mut tree = drills_tree();
        let mut session = ReconciliationSession::default();
        let request = session.run(&tree, &rows());
        tree.remove(&NodePath::new(vec![0, 1])).unwrap();
        tree.mark_clean();
        let report = session.apply_decision(&mut tree, request, &ReviewDecision::ApproveAll);
        assert_eq!(report.stale, 1);
        assert_eq!(report.applied, 2);
        assert_eq!(tree.node(&NodePath::new(vec![0, 0, 1])).unwrap().code(), "PW/1");
    }

    #[test]
    fn test_folder_candidate_is_stale() {
        let mut tree = drills_tree();
        let mut session = ReconciliationSession::default();
        let exact = vec![ExactMatch {
            node: NodePath::new(vec![0, 0]),
            code: "X/1".to_string(),
        }];
        let report = session.finalize(&mut tree, Vec::new(), exact);
        assert_eq!(report.stale, 1);
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_reset_for_reseeds_colors() {
        let tree = CategoryTree::from_roots(vec![CategoryNode::leaf("x").with_code("Z/1")]);
        let mut session = ReconciliationSession::default();
        session.colors_mut().color_for("A/1");
        session.reset_for(&tree);
        assert_eq!(session.colors().assigned(), 1);
        assert!(session.colors().peek("Z/9").is_some());
        assert!(session.colors().peek("A/1").is_none());
    }
}
