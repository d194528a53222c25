//! あいまい一致のレビュー

use crate::error::{CatalogError, Result};
use catalog_recon_common::{ReviewDecision, ReviewRequest};
use dialoguer::MultiSelect;

/// レビュー依頼に対して判断を返す
pub trait Reviewer {
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewDecision>;
}

/// すべて承認
pub struct AcceptAll;

impl Reviewer for AcceptAll {
    fn review(&mut self, _request: &ReviewRequest) -> Result<ReviewDecision> {
        Ok(ReviewDecision::ApproveAll)
    }
}

/// すべて却下（完全一致のみ適用）
pub struct RejectAll;

impl Reviewer for RejectAll {
    fn review(&mut self, _request: &ReviewRequest) -> Result<ReviewDecision> {
        Ok(ReviewDecision::RejectAll)
    }
}

/// 端末で選択（初期状態は全選択）
pub struct InteractiveReviewer;

impl Reviewer for InteractiveReviewer {
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewDecision> {
        println!("\n🔍 あいまい一致 {}件 を確認してください", request.fuzzy.len());
        println!("  (スペース: 切替 / Enter: 確定 / Esc: 全部却下)\n");

        let items: Vec<String> = request
            .fuzzy
            .iter()
            .map(|m| {
                format!(
                    "[{}] {}\n      → {}  ({}, {:.2})",
                    m.classification, m.full_path, m.matched_raw_path, m.code, m.score
                )
            })
            .collect();
        let defaults = vec![true; items.len()];

        let selection = MultiSelect::new()
            .with_prompt("適用する候補")
            .items(&items)
            .defaults(&defaults)
            .interact_opt()
            .map_err(|e| CatalogError::Prompt(e.to_string()))?;

        Ok(match selection {
            None => {
                println!("→ あいまい一致をすべて却下しました");
                ReviewDecision::RejectAll
            }
            Some(indices) if indices.len() == items.len() => ReviewDecision::ApproveAll,
            Some(indices) => ReviewDecision::Approve(indices),
        })
    }
}

/// 事前に決めた判断を返す
pub struct ScriptedReviewer {
    decision: ReviewDecision,
    /// 受け取った依頼のあいまい一致件数
    pub seen: Vec<usize>,
}

impl ScriptedReviewer {
    pub fn new(decision: ReviewDecision) -> Self {
        Self {
            decision,
            seen: Vec::new(),
        }
    }
}

impl Reviewer for ScriptedReviewer {
    fn review(&mut self, request: &ReviewRequest) -> Result<ReviewDecision> {
        self.seen.push(request.fuzzy.len());
        Ok(self.decision.clone())
    }
}
