//! ノード名のあいまい検索

use crate::similarity::similarity;
use crate::tree::{CategoryTree, NodePath};

/// この値を超えた場合のみ見つかったとみなす
pub const SEARCH_THRESHOLD: f64 = 0.6;

/// 検索結果
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub path: NodePath,
    pub full_path: String,
    pub score: f64,
}

/// クエリに最も近いノードを探す
///
/// フルパスと名前のそれぞれと比較して大きい方をスコアとする（大文字小文字無視）。
/// 同点なら先行順で先のノード。空クエリや閾値以下は `None`。
pub fn find_best(tree: &CategoryTree, query: &str) -> Option<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    let mut best: Option<SearchHit> = None;
    tree.for_each_post_order(|path, names, node| {
        let full_path = names.join("/");
        let score = similarity(&query, &full_path.to_lowercase())
            .max(similarity(&query, &node.name().to_lowercase()));
        let better = match &best {
            None => true,
            Some(current) => score > current.score || (score == current.score && *path < current.path),
        };
        if better {
            best = Some(SearchHit {
                path: path.clone(),
                full_path,
                score,
            });
        }
    });

    best.filter(|hit| hit.score > SEARCH_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::CategoryNode;

    fn tree() -> CategoryTree {
        CategoryTree::from_roots(vec![
            CategoryNode::folder(
                "Tools",
                vec![
                    CategoryNode::folder("Drills", vec![CategoryNode::leaf("Cordless Drill")]),
                    CategoryNode::leaf("Saws"),
                ],
            ),
            CategoryNode::folder("Garden", vec![CategoryNode::leaf("Hoses")]),
        ])
    }

    #[test]
    fn test_find_by_name() {
        let hit = find_best(&tree(), "cordless dril").unwrap();
        assert_eq!(hit.path, NodePath::new(vec![0, 0, 0]));
        assert_eq!(hit.full_path, "Tools/Drills/Cordless Drill");
    }

    #[test]
    fn test_find_by_full_path() {
        let hit = find_best(&tree(), "garden/hoses").unwrap();
        assert_eq!(hit.path, NodePath::new(vec![1, 0]));
        assert_eq!(hit.score, 1.0);
    }

    #[test]
    fn test_no_match_below_threshold() {
        assert!(find_best(&tree(), "zzzzzzzz").is_none());
        assert!(find_best(&tree(), "   ").is_none());
        assert!(find_best(&CategoryTree::new(), "tools").is_none());
    }

    #[test]
    fn test_tie_prefers_pre_order_first() {
        let tree = CategoryTree::from_roots(vec![
            CategoryNode::folder("A", vec![CategoryNode::leaf("Saws")]),
            CategoryNode::folder("B", vec![CategoryNode::leaf("Saws")]),
        ]);
        let hit = find_best(&tree, "saws").unwrap();
        assert_eq!(hit.path, NodePath::new(vec![0, 0]));
    }
}
