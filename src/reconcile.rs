//! 照合の一連の流れ（走査 → レビュー → 適用）

use crate::error::Result;
use crate::review::Reviewer;
use catalog_recon_common::{
    ApplyReport, CategoryTree, ReconciliationSession, ReviewDecision, RuleRow, ScanSummary,
};
use std::path::{Path, PathBuf};

/// 照合結果
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    pub summary: ScanSummary,
    pub exact: usize,
    pub fuzzy: usize,
    pub report: ApplyReport,
}

/// ルール行でツリーを照合し、レビュー後に適用する
///
/// あいまい一致がなければレビューは呼ばない。
pub fn reconcile(
    tree: &mut CategoryTree,
    rows: &[RuleRow],
    session: &mut ReconciliationSession,
    reviewer: &mut dyn Reviewer,
) -> Result<ReconcileOutcome> {
    let request = session.run(tree, rows);
    let decision = if request.needs_review() {
        reviewer.review(&request)?
    } else {
        ReviewDecision::RejectAll
    };

    let summary = request.summary.clone();
    let exact = request.exact.len();
    let fuzzy = request.fuzzy.len();
    let report = session.apply_decision(tree, request, &decision);

    Ok(ReconcileOutcome {
        summary,
        exact,
        fuzzy,
        report,
    })
}

/// 照合後の保存先
///
/// 出力先が指定されていれば変更の有無にかかわらずそこへ書く。
/// 指定がなければ、変更があったときだけ元のプロジェクトを上書きする。
pub fn save_target(project: &Path, output: Option<&Path>, dirty: bool) -> Option<PathBuf> {
    match output {
        Some(output) => Some(output.to_path_buf()),
        None if dirty => Some(project.to_path_buf()),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ScriptedReviewer;
    use catalog_recon_common::{CategoryNode, NodePath};

    #[test]
    fn test_reviewer_not_called_without_fuzzy() {
        let mut tree = CategoryTree::from_roots(vec![CategoryNode::folder(
            "Tools",
            vec![CategoryNode::leaf("Saws")],
        )]);
        let rows = vec![RuleRow::new("Tools/Saws", "SW/1")];
        let mut reviewer = ScriptedReviewer::new(ReviewDecision::ApproveAll);
        let mut session = ReconciliationSession::default();

        let outcome = reconcile(&mut tree, &rows, &mut session, &mut reviewer).unwrap();
        assert!(reviewer.seen.is_empty());
        assert_eq!(outcome.exact, 1);
        assert_eq!(outcome.report.applied, 1);
        assert_eq!(tree.node(&NodePath::new(vec![0, 0])).unwrap().code(), "SW/1");
    }

    #[test]
    fn test_rejected_fuzzy_not_applied() {
        let mut tree = CategoryTree::from_roots(vec![CategoryNode::folder(
            "Tools",
            vec![CategoryNode::leaf("Power Too")],
        )]);
        let rows = vec![RuleRow::new("Tools/Power Tools", "PW/1")];
        let mut reviewer = ScriptedReviewer::new(ReviewDecision::RejectAll);
        let mut session = ReconciliationSession::default();

        let outcome = reconcile(&mut tree, &rows, &mut session, &mut reviewer).unwrap();
        assert_eq!(reviewer.seen, vec![1]);
        assert_eq!(outcome.fuzzy, 1);
        assert_eq!(outcome.report.applied, 0);
        assert!(!tree.is_dirty());
    }

    #[test]
    fn test_save_target() {
        let project = Path::new("project.json");
        let output = Path::new("out.json");
        assert_eq!(save_target(project, Some(output), false), Some(output.to_path_buf()));
        assert_eq!(save_target(project, Some(output), true), Some(output.to_path_buf()));
        assert_eq!(save_target(project, None, true), Some(project.to_path_buf()));
        assert_eq!(save_target(project, None, false), None);
    }
}
